//! Configuration module

mod site;
mod webhook;

pub use site::SiteConfig;
pub use webhook::{fetch_config, WebhookConfig};
