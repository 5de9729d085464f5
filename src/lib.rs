//! webhook-blog: a blog front-end backed by a single webhook
//!
//! Articles, counts, posts and deletes all go through one remote webhook. This
//! crate pages through them, renders the public list and the admin console,
//! and keeps the `pg` query parameter in step with the page shown.

pub mod commands;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod helpers;
pub mod server;
pub mod state;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use controller::ListController;
use error::ConfigError;
use gateway::{RemoteGateway, Webhook};
use state::PageStateController;

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory served for static assets
    pub static_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            static_dir,
        })
    }

    /// Load the webhook config and build the gateway
    pub async fn connect(&self) -> Result<RemoteGateway, ConfigError> {
        RemoteGateway::connect(&self.config, &self.base_dir).await
    }

    /// Page state for a list at `path?query`
    pub fn page_state(&self, path: &str, query: Option<&str>) -> PageStateController {
        PageStateController::init_from_url(path, query)
    }

    /// A list controller for `path?query`, not yet loaded
    pub fn list_controller<W: Webhook>(
        &self,
        webhook: W,
        path: &str,
        query: Option<&str>,
    ) -> ListController<W> {
        ListController::new(webhook, self.page_state(path, query))
    }
}
