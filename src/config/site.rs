//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub language: String,
    pub timezone: String,

    // Webhook
    /// Path (relative to the site directory) or http(s) URL of the
    /// document holding `webhookUrl`
    pub webhook_config: String,
    pub request_timeout_secs: Option<u64>,

    // Links
    pub article_path: String,
    pub edit_path: String,
    pub static_dir: String,

    // Date / Time format
    pub date_format: String,

    // List
    pub excerpt_length: usize,

    // Category tags
    pub category_colors: IndexMap<String, String>,
    pub default_category_color: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut category_colors = IndexMap::new();
        category_colors.insert("技術".to_string(), "#4CAF50".to_string());
        category_colors.insert("生活".to_string(), "#2196F3".to_string());
        category_colors.insert("心情".to_string(), "#FF9800".to_string());

        Self {
            title: "部落格".to_string(),
            subtitle: String::new(),
            language: "zh-TW".to_string(),
            timezone: String::new(),

            webhook_config: "webhook_config.json".to_string(),
            request_timeout_secs: None,

            article_path: "article.html".to_string(),
            edit_path: "/admin/post".to_string(),
            static_dir: "public".to_string(),

            date_format: "YYYY-MM-DD".to_string(),

            excerpt_length: 150,

            category_colors,
            default_category_color: "#777".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Background color for a category tag
    pub fn category_color(&self, category: &str) -> &str {
        self.category_colors
            .get(category)
            .map(String::as_str)
            .unwrap_or(&self.default_category_color)
    }

    /// Client-side request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
