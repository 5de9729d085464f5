//! Interactive pager over the article list

use anyhow::Result;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::list::format_page;
use crate::state::PAGE_PARAM;
use crate::Blog;

/// A line typed at the browse prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Goto(usize),
    Quit,
    Unknown,
}

impl BrowseCommand {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "n" | "next" => BrowseCommand::Next,
            "p" | "prev" => BrowseCommand::Prev,
            "q" | "quit" | "exit" => BrowseCommand::Quit,
            other => match other.parse::<usize>() {
                Ok(page) if page >= 1 => BrowseCommand::Goto(page),
                _ => BrowseCommand::Unknown,
            },
        }
    }
}

/// Page through the list from stdin until `q` or EOF
pub async fn run(blog: &Blog, page: usize) -> Result<()> {
    let gateway = blog.connect().await?;
    let query = format!("{}={}", PAGE_PARAM, page);
    let mut controller = blog.list_controller(gateway, "/", Some(query.as_str()));

    controller.refresh().await;
    print!("{}", format_page(&blog.config, &controller));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("[n]ext [p]rev <page> [q]uit > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let moved = match BrowseCommand::parse(&line) {
            BrowseCommand::Next => controller.next_page().await,
            BrowseCommand::Prev => controller.prev_page().await,
            BrowseCommand::Goto(n) => controller.set_page(n).await,
            BrowseCommand::Quit => break,
            BrowseCommand::Unknown => {
                println!("Unknown command: {}", line.trim());
                continue;
            }
        };

        if moved {
            println!("{}", controller.pages().location());
            print!("{}", format_page(&blog.config, &controller));
        } else {
            println!("Staying on page {}", controller.pages().current_page());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(BrowseCommand::parse("n"), BrowseCommand::Next);
        assert_eq!(BrowseCommand::parse(" prev "), BrowseCommand::Prev);
        assert_eq!(BrowseCommand::parse("3"), BrowseCommand::Goto(3));
        assert_eq!(BrowseCommand::parse("0"), BrowseCommand::Unknown);
        assert_eq!(BrowseCommand::parse("q"), BrowseCommand::Quit);
        assert_eq!(BrowseCommand::parse("jump"), BrowseCommand::Unknown);
    }
}
