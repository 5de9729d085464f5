//! Create or update a post through the webhook

use anyhow::{Context, Result};
use std::path::Path;

use crate::content::PostDraft;
use crate::controller::SubmitResult;
use crate::server::ADMIN_PATH;
use crate::Blog;

/// Post body, from `--content` or read from `--file`
pub fn read_content(content: Option<String>, file: Option<&Path>) -> Result<String> {
    match (content, file) {
        (Some(content), _) => Ok(content),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read post content from {:?}", path)),
        (None, None) => Ok(String::new()),
    }
}

/// Submit `draft`; an id means update
pub async fn run(blog: &Blog, draft: &PostDraft, password: &str) -> Result<()> {
    let gateway = blog.connect().await?;
    let mut controller = blog.list_controller(gateway, ADMIN_PATH, None);

    let result = controller.submit_post(draft, password).await;
    let message = controller
        .banner()
        .map(|b| b.message.clone())
        .unwrap_or_default();

    match result {
        SubmitResult::Submitted => {
            println!("{}", message);
            Ok(())
        }
        _ => anyhow::bail!("{}", message),
    }
}
