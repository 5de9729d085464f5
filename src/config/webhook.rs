//! Webhook configuration (webhook_config.json)

use reqwest::Url;
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Location of the single webhook every request goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub webhook_url: Url,
}

#[derive(Deserialize)]
struct RawWebhookConfig {
    #[serde(rename = "webhookUrl")]
    webhook_url: Option<String>,
}

impl WebhookConfig {
    /// Parse the config document body
    pub fn from_json(body: &str) -> Result<Self, ConfigError> {
        let raw: RawWebhookConfig = serde_json::from_str(body)?;
        let url = raw
            .webhook_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingField)?;

        let webhook_url = Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(webhook_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url,
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(Self { webhook_url })
    }
}

/// Read the config document from a local path or an http(s) URL.
///
/// Relative paths are resolved against `base_dir`.
pub async fn fetch_config(
    client: &reqwest::Client,
    source: &str,
    base_dir: &Path,
) -> Result<WebhookConfig, ConfigError> {
    let body = if source.starts_with("http://") || source.starts_with("https://") {
        let response = client
            .get(source)
            .send()
            .await
            .map_err(|e| ConfigError::Unreachable {
                source_ref: source.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ConfigError::Missing(source.to_string()));
        }
        if !response.status().is_success() {
            return Err(ConfigError::Unreachable {
                source_ref: source.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        response.text().await.map_err(|e| ConfigError::Unreachable {
            source_ref: source.to_string(),
            reason: e.to_string(),
        })?
    } else {
        let path = base_dir.join(source);
        if !path.exists() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        tokio::fs::read_to_string(&path).await?
    };

    let config = WebhookConfig::from_json(&body)?;
    tracing::debug!("Loaded webhook config from {}: {}", source, config.webhook_url);
    Ok(config)
}
