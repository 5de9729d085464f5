//! CLI entry point for webhook-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "webhook-blog")]
#[command(version)]
#[command(about = "A blog front-end and admin console backed by a single webhook", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the public list and the admin console
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Print one page of articles
    #[command(alias = "ls")]
    List {
        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Only show articles in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Page through the articles interactively
    Browse {
        /// Page to start on
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Delete an article
    Delete {
        /// Article number
        #[arg(short, long)]
        no: i64,

        /// Admin password
        #[arg(long, env = "WEBHOOK_BLOG_PASSWORD", default_value = "")]
        pwd: String,

        /// Admin page to show afterwards
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Create a post, or update one with --no
    Post {
        /// Article number to update
        #[arg(short, long)]
        no: Option<i64>,

        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post category
        #[arg(long, default_value = "技術")]
        category: String,

        /// Post body
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,

        /// Read the post body from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Admin password
        #[arg(long, env = "WEBHOOK_BLOG_PASSWORD", default_value = "")]
        pwd: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "webhook_blog=debug,info"
    } else {
        "webhook_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let blog = webhook_blog::Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            webhook_blog::server::start(&blog, &ip, port).await?;
        }

        Commands::List { page, category } => {
            let blog = webhook_blog::Blog::new(&base_dir)?;
            webhook_blog::commands::list::run(&blog, page, category.as_deref()).await?;
        }

        Commands::Browse { page } => {
            let blog = webhook_blog::Blog::new(&base_dir)?;
            webhook_blog::commands::browse::run(&blog, page).await?;
        }

        Commands::Delete { no, pwd, page } => {
            let blog = webhook_blog::Blog::new(&base_dir)?;
            tracing::info!("Deleting article #{}", no);
            webhook_blog::commands::delete::run(&blog, no, &pwd, page).await?;
        }

        Commands::Post {
            no,
            title,
            category,
            content,
            file,
            pwd,
        } => {
            let blog = webhook_blog::Blog::new(&base_dir)?;
            let content = webhook_blog::commands::post::read_content(content, file.as_deref())?;
            let draft = webhook_blog::content::PostDraft {
                id: no,
                title,
                category,
                content,
            };
            match no {
                Some(no) => tracing::info!("Updating article #{}", no),
                None => tracing::info!("Creating article {:?}", draft.title),
            }
            webhook_blog::commands::post::run(&blog, &draft, &pwd).await?;
        }

        Commands::Version => {
            println!("webhook-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
