//! Webhook gateway
//!
//! Every read and write goes to one webhook URL as a multipart POST. The
//! `page` form field selects the operation; it is unrelated to the `pg`
//! field, which carries the pagination page number.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::config::{fetch_config, SiteConfig, WebhookConfig};
use crate::content::{value_as_i64, Article, PostDraft, RawArticle};
use crate::error::{ConfigError, FetchError};

/// Operation marker for the article list
pub const MODE_LIST: &str = "列表";
/// Operation marker for the total article count
pub const MODE_TOTAL_COUNT: &str = "總筆數";
/// Operation marker for deleting an article
pub const MODE_DELETE: &str = "刪除";
/// Operation marker for publishing a new article
pub const MODE_CREATE: &str = "新增";
/// Operation marker for saving changes to an existing article
pub const MODE_UPDATE: &str = "修改";

/// Message used when a rejected delete carries none
const UNKNOWN_ERROR: &str = "未知錯誤";

/// Result of a delete request the webhook answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// `{"state": 0}`
    Deleted,
    /// Any other state, with the webhook's message
    Rejected { message: String },
}

/// The operations the blog needs from its backend
#[async_trait]
pub trait Webhook: Send + Sync {
    /// Fetch the articles for a 1-based page
    async fn fetch_list(&self, page: usize) -> Result<Vec<Article>, FetchError>;

    /// Fetch the total number of articles
    async fn fetch_total_count(&self, page: usize) -> Result<usize, FetchError>;

    /// Delete an article, authorized by the admin password
    async fn delete_article(&self, id: i64, password: &str)
        -> Result<DeleteOutcome, FetchError>;

    /// Create or update an article; any 2xx reply counts as accepted
    async fn submit_post(&self, draft: &PostDraft, password: &str) -> Result<(), FetchError>;
}

#[async_trait]
impl<W: Webhook + ?Sized> Webhook for Arc<W> {
    async fn fetch_list(&self, page: usize) -> Result<Vec<Article>, FetchError> {
        (**self).fetch_list(page).await
    }

    async fn fetch_total_count(&self, page: usize) -> Result<usize, FetchError> {
        (**self).fetch_total_count(page).await
    }

    async fn delete_article(
        &self,
        id: i64,
        password: &str,
    ) -> Result<DeleteOutcome, FetchError> {
        (**self).delete_article(id, password).await
    }

    async fn submit_post(&self, draft: &PostDraft, password: &str) -> Result<(), FetchError> {
        (**self).submit_post(draft, password).await
    }
}

/// HTTP implementation of [`Webhook`]
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    client: reqwest::Client,
    webhook_url: Url,
}

#[derive(Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    state: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl RemoteGateway {
    /// Create a gateway from an already loaded config
    pub fn new(client: reqwest::Client, config: WebhookConfig) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url,
        }
    }

    /// Load the webhook config named by the site config, then build the gateway.
    ///
    /// No webhook request can be made before this succeeds.
    pub async fn connect(site: &SiteConfig, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = site.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::Unreachable {
            source_ref: site.webhook_config.clone(),
            reason: e.to_string(),
        })?;

        let config = fetch_config(&client, &site.webhook_config, base_dir).await?;
        tracing::info!("Using webhook {}", config.webhook_url);
        Ok(Self::new(client, config))
    }

    /// POST a multipart form; non-2xx replies are errors
    async fn send(&self, form: Form) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        Ok(response)
    }

    /// POST a multipart form and parse the JSON reply
    async fn post(&self, form: Form) -> Result<Value, FetchError> {
        let body = self.send(form).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Webhook for RemoteGateway {
    async fn fetch_list(&self, page: usize) -> Result<Vec<Article>, FetchError> {
        tracing::debug!("Fetching article list for page {}", page);
        let form = Form::new()
            .text("page", MODE_LIST)
            .text("pg", page.to_string());

        let body = self.post(form).await?;
        let articles = parse_list(body)?;
        tracing::debug!("Page {} returned {} articles", page, articles.len());
        Ok(articles)
    }

    async fn fetch_total_count(&self, page: usize) -> Result<usize, FetchError> {
        tracing::debug!("Fetching total count (pg={})", page);
        let form = Form::new()
            .text("page", MODE_TOTAL_COUNT)
            .text("pg", page.to_string());

        parse_total_count(&self.post(form).await?)
    }

    async fn delete_article(
        &self,
        id: i64,
        password: &str,
    ) -> Result<DeleteOutcome, FetchError> {
        tracing::info!("Deleting article {}", id);
        let form = Form::new()
            .text("page", MODE_DELETE)
            .text("no", id.to_string())
            .text("pwd", password.to_string());

        parse_delete(self.post(form).await?)
    }

    async fn submit_post(&self, draft: &PostDraft, password: &str) -> Result<(), FetchError> {
        let mut form = Form::new()
            .text("title", draft.title.clone())
            .text("content", draft.content.clone())
            .text("category", draft.category.clone())
            .text("pwd", password.to_string());

        form = match draft.id {
            Some(id) => {
                tracing::info!("Updating article {}", id);
                form.text("page", MODE_UPDATE).text("no", id.to_string())
            }
            None => {
                tracing::info!("Creating article {:?}", draft.title);
                form.text("page", MODE_CREATE)
            }
        };

        self.send(form).await?;
        Ok(())
    }
}

/// Extract and normalize the `data` array of a list response
pub fn parse_list(body: Value) -> Result<Vec<Article>, FetchError> {
    let Value::Object(mut map) = body else {
        return Err(FetchError::shape("list response is not an object"));
    };
    let Some(Value::Array(records)) = map.remove("data") else {
        return Err(FetchError::shape("list response has no `data` array"));
    };

    let articles = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match serde_json::from_value::<RawArticle>(record) {
                Ok(raw) => {
                    let article = raw.normalize();
                    if article.is_none() {
                        tracing::warn!("Skipping record {} without a usable id", index);
                    }
                    article
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed record {}: {}", index, e);
                    None
                }
            }
        })
        .collect();

    Ok(articles)
}

/// Read `maxdata` from a total-count response
pub fn parse_total_count(body: &Value) -> Result<usize, FetchError> {
    let total = body
        .get("maxdata")
        .ok_or_else(|| FetchError::shape("count response has no `maxdata` field"))?;

    value_as_i64(total)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| FetchError::shape(format!("`maxdata` is not a count: {}", total)))
}

/// Interpret a delete response; only state 0 means success
pub fn parse_delete(body: Value) -> Result<DeleteOutcome, FetchError> {
    let response: DeleteResponse = serde_json::from_value(body)?;

    if response.state.as_ref().and_then(value_as_i64) == Some(0) {
        return Ok(DeleteOutcome::Deleted);
    }

    let message = response
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
    Ok(DeleteOutcome::Rejected { message })
}
