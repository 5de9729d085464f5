//! Delete an article through the webhook

use anyhow::Result;

use super::list::format_page;
use crate::controller::DeleteResult;
use crate::server::ADMIN_PATH;
use crate::state::PAGE_PARAM;
use crate::Blog;

/// Delete article `id`, then show the refreshed admin page
pub async fn run(blog: &Blog, id: i64, password: &str, page: usize) -> Result<()> {
    let gateway = blog.connect().await?;
    let query = format!("{}={}", PAGE_PARAM, page);
    let mut controller = blog.list_controller(gateway, ADMIN_PATH, Some(query.as_str()));

    let result = controller.delete(id, password).await;
    match result {
        DeleteResult::Deleted => {
            print!("{}", format_page(&blog.config, &controller));
            Ok(())
        }
        _ => {
            let message = controller
                .banner()
                .map(|b| b.message.clone())
                .unwrap_or_default();
            anyhow::bail!("{}", message)
        }
    }
}
