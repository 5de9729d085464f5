//! List one page of articles

use anyhow::Result;
use url::form_urlencoded;

use crate::config::SiteConfig;
use crate::controller::{ListController, ListView, LIST_FAILED};
use crate::gateway::Webhook;
use crate::helpers::{format_published_date, get_excerpt};
use crate::state::{CATEGORY_PARAM, PAGE_PARAM};
use crate::Blog;

/// Excerpt length for terminal output
const CLI_EXCERPT_LENGTH: usize = 60;

/// Print the articles on `page`, optionally only those in `category`
pub async fn run(blog: &Blog, page: usize, category: Option<&str>) -> Result<()> {
    let gateway = blog.connect().await?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair(PAGE_PARAM, &page.to_string());
    if let Some(category) = category {
        query.append_pair(CATEGORY_PARAM, category);
    }
    let query = query.finish();

    let mut controller = blog.list_controller(gateway, "/", Some(query.as_str()));
    controller.refresh().await;
    print!("{}", format_page(&blog.config, &controller));
    Ok(())
}

/// Plain-text rendering of a controller's current page
pub fn format_page<W: Webhook>(config: &SiteConfig, controller: &ListController<W>) -> String {
    let mut out = String::new();

    if let Some(banner) = controller.banner() {
        out.push_str(&format!("[{}] {}\n", banner.kind.as_str(), banner.message));
    }

    let pages = controller.pages();
    if let Some(category) = pages.category() {
        out.push_str(&format!("{}文章\n", category));
    }
    match controller.pagination() {
        Some(view) => out.push_str(&format!(
            "Posts (page {}/{}, {} total):\n",
            view.current_page, view.total_pages, view.total_items
        )),
        None => out.push_str(&format!("Posts (page {}):\n", pages.current_page())),
    }

    let articles = controller.visible_articles();
    match controller.list() {
        ListView::Loading => out.push_str("  (loading)\n"),
        ListView::Failed(error) => out.push_str(&format!("  {} ({})\n", LIST_FAILED, error)),
        ListView::Loaded(_) if articles.is_empty() => out.push_str("  暫無文章\n"),
        ListView::Loaded(_) => {
            for article in articles {
                let date = format_published_date(
                    &article.published_date,
                    &config.date_format,
                    &config.timezone,
                );
                out.push_str(&format!(
                    "  #{} {} - {} [{}]\n",
                    article.id, date, article.title, article.category
                ));
                let excerpt = get_excerpt(&article.body, CLI_EXCERPT_LENGTH);
                if !excerpt.trim().is_empty() {
                    out.push_str(&format!("      {}\n", excerpt.replace('\n', " ")));
                }
            }
        }
    }

    out
}
