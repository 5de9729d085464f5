//! List controller
//!
//! Drives one article list (public or admin): fetches the current page and
//! the total count, keeps what came back, and reacts to page changes and
//! deletes. Rendering reads everything it needs from here.

use crate::content::{Article, PostDraft};
use crate::error::FetchError;
use crate::gateway::{DeleteOutcome, Webhook};
use crate::state::{PageStateController, PageTicket, PaginationView};

/// Inline message shown in place of a list that failed to load
pub const LIST_FAILED: &str = "獲取文章列表失敗，請稍後再試";

/// What the list region currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// No response applied yet
    Loading,
    Loaded(Vec<Article>),
    /// The list request failed; holds the error for the log line
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
    Info,
}

impl BannerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerKind::Success => "success",
            BannerKind::Error => "error",
            BannerKind::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "success" => BannerKind::Success,
            "error" => BannerKind::Error,
            _ => BannerKind::Info,
        }
    }
}

/// Status message shown above the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn new(kind: BannerKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// How a delete attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteResult {
    /// Webhook answered state 0; the list has been reloaded
    Deleted,
    /// Webhook answered another state
    Rejected { message: String },
    /// The request itself failed
    Failed { error: String },
    /// Nothing was sent because the password was blank
    PasswordRequired,
}

/// How a create or update attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Submitted,
    /// A required field was blank; nothing was sent
    Invalid { message: String },
    /// The request failed or the webhook answered non-2xx
    Failed { error: String },
    PasswordRequired,
}

/// Banner text for an accepted post
pub const POST_SUBMITTED: &str = "文章提交成功！";
/// Banner text for a confirmed delete
pub const POST_DELETED: &str = "文章刪除成功";
const PASSWORD_REQUIRED: &str = "請輸入管理員密碼";

/// One list view bound to a webhook
pub struct ListController<W> {
    webhook: W,
    pages: PageStateController,
    list: ListView,
    count_failed: bool,
    banner: Option<Banner>,
}

impl<W: Webhook> ListController<W> {
    pub fn new(webhook: W, pages: PageStateController) -> Self {
        Self {
            webhook,
            pages,
            list: ListView::Loading,
            count_failed: false,
            banner: None,
        }
    }

    pub fn pages(&self) -> &PageStateController {
        &self.pages
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn set_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    /// Every article of the current page, ignoring the category filter
    pub fn page_articles(&self) -> &[Article] {
        match &self.list {
            ListView::Loaded(articles) => self.pages.page_window(articles),
            _ => &[],
        }
    }

    /// Articles of the current page in webhook order, narrowed to
    /// `?category=` when one is set
    pub fn visible_articles(&self) -> Vec<&Article> {
        let category = self.pages.category();
        self.page_articles()
            .iter()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .collect()
    }

    /// Number of articles on the current page in `category`, or all of them
    pub fn category_count(&self, category: Option<&str>) -> usize {
        let articles = self.page_articles();
        match category {
            Some(c) => articles.iter().filter(|a| a.category == c).count(),
            None => articles.len(),
        }
    }

    /// Look up a loaded article by id
    pub fn find_article(&self, id: i64) -> Option<&Article> {
        match &self.list {
            ListView::Loaded(articles) => articles.iter().find(|a| a.id == id),
            _ => None,
        }
    }

    /// Pagination controls; omitted while the list is not loaded or when the
    /// count request failed
    pub fn pagination(&self) -> Option<PaginationView> {
        if self.count_failed || !matches!(self.list, ListView::Loaded(_)) {
            return None;
        }
        self.pages.pagination()
    }

    /// Fetch the current page and the total count.
    ///
    /// Both requests go out together. If the count moves the page (the
    /// requested page is past the end), the list is fetched once more for the
    /// page the state settled on.
    pub async fn refresh(&mut self) {
        let ticket = self.pages.begin_request();
        let page = ticket.page;

        let (list, count) = tokio::join!(
            self.webhook.fetch_list(page),
            self.webhook.fetch_total_count(page)
        );

        self.accept_count(&ticket, count);

        if self.accept_list(&ticket, list) {
            return;
        }

        let ticket = self.pages.begin_request();
        let list = self.webhook.fetch_list(ticket.page).await;
        self.accept_list(&ticket, list);
    }

    /// Go to page `n`. Returns false, without any request, when `n` is the
    /// current page.
    pub async fn set_page(&mut self, n: usize) -> bool {
        if self.pages.set_page(n).is_none() {
            return false;
        }
        self.list = ListView::Loading;
        self.refresh().await;
        true
    }

    /// Go to the next page if there is one
    pub async fn next_page(&mut self) -> bool {
        let current = self.pages.current_page();
        match self.pages.state().total_pages() {
            Some(total) if current < total => self.set_page(current + 1).await,
            _ => false,
        }
    }

    /// Go to the previous page if there is one
    pub async fn prev_page(&mut self) -> bool {
        let current = self.pages.current_page();
        if current > 1 {
            self.set_page(current - 1).await
        } else {
            false
        }
    }

    /// Delete an article and report the outcome through the banner.
    ///
    /// Only a confirmed delete reloads the list; rejections and failures
    /// leave the loaded list as it was.
    pub async fn delete(&mut self, id: i64, password: &str) -> DeleteResult {
        let result = self.send_delete(id, password).await;
        if result == DeleteResult::Deleted {
            self.refresh().await;
        }
        result
    }

    /// Send the delete and set the banner, without reloading the list
    pub async fn send_delete(&mut self, id: i64, password: &str) -> DeleteResult {
        if password.trim().is_empty() {
            self.set_banner(Banner::new(BannerKind::Error, PASSWORD_REQUIRED));
            return DeleteResult::PasswordRequired;
        }

        match self.webhook.delete_article(id, password).await {
            Ok(DeleteOutcome::Deleted) => {
                tracing::info!("Article {} deleted", id);
                self.set_banner(Banner::new(BannerKind::Success, POST_DELETED));
                DeleteResult::Deleted
            }
            Ok(DeleteOutcome::Rejected { message }) => {
                tracing::warn!("Delete of article {} rejected: {}", id, message);
                self.set_banner(Banner::new(
                    BannerKind::Error,
                    format!("刪除文章失敗: {}", message),
                ));
                DeleteResult::Rejected { message }
            }
            Err(e) => {
                tracing::error!("Delete of article {} failed: {}", id, e);
                self.set_banner(Banner::new(
                    BannerKind::Error,
                    format!("刪除文章時發生錯誤: {}", e),
                ));
                DeleteResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Create or update a post. The list is left as it was.
    pub async fn submit_post(&mut self, draft: &PostDraft, password: &str) -> SubmitResult {
        if let Some(message) = draft.missing_field() {
            self.set_banner(Banner::new(BannerKind::Error, message));
            return SubmitResult::Invalid {
                message: message.to_string(),
            };
        }
        if password.trim().is_empty() {
            self.set_banner(Banner::new(BannerKind::Error, PASSWORD_REQUIRED));
            return SubmitResult::PasswordRequired;
        }

        match self.webhook.submit_post(draft, password).await {
            Ok(()) => {
                self.set_banner(Banner::new(BannerKind::Success, POST_SUBMITTED));
                SubmitResult::Submitted
            }
            Err(e) => {
                tracing::error!("Submitting post {:?} failed: {}", draft.title, e);
                self.set_banner(Banner::new(BannerKind::Error, format!("提交失敗：{}", e)));
                SubmitResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Apply a list response; returns false if it was for a stale page
    fn accept_list(
        &mut self,
        ticket: &PageTicket,
        result: Result<Vec<Article>, FetchError>,
    ) -> bool {
        if !self.pages.is_current(ticket) {
            tracing::debug!("Discarding list response for stale page {}", ticket.page);
            return false;
        }

        self.list = match result {
            Ok(articles) => ListView::Loaded(articles),
            Err(e) => {
                tracing::error!("Failed to fetch article list for page {}: {}", ticket.page, e);
                ListView::Failed(e.to_string())
            }
        };
        true
    }

    /// Apply a count response; a failure only hides the pagination
    fn accept_count(&mut self, ticket: &PageTicket, result: Result<usize, FetchError>) {
        if !self.pages.is_current(ticket) {
            tracing::debug!("Discarding count response for stale page {}", ticket.page);
            return;
        }

        match result {
            Ok(total) => {
                self.count_failed = false;
                self.pages.apply_total_count(total);
            }
            Err(e) => {
                tracing::warn!("Failed to fetch total count: {}", e);
                self.count_failed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn article(id: i64) -> Article {
        Article {
            id,
            title: format!("Post {}", id),
            category: "技術".to_string(),
            published_date: "2024-01-01".to_string(),
            body: "body".to_string(),
        }
    }

    /// In-memory webhook that pages its articles ten at a time
    #[derive(Default)]
    struct FakeWebhook {
        articles: Vec<Article>,
        fail_list: bool,
        fail_count: bool,
        delete_reply: Option<DeleteOutcome>,
        fail_submit: bool,
        list_pages: Mutex<Vec<usize>>,
        count_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        submitted: Mutex<Vec<PostDraft>>,
    }

    impl FakeWebhook {
        fn with_articles(n: i64) -> Self {
            Self {
                articles: (1..=n).map(article).collect(),
                ..Default::default()
            }
        }

        fn list_calls(&self) -> usize {
            self.list_pages.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Webhook for FakeWebhook {
        async fn fetch_list(&self, page: usize) -> Result<Vec<Article>, FetchError> {
            self.list_pages.lock().unwrap().push(page);
            if self.fail_list {
                return Err(FetchError::shape("list response has no `data` array"));
            }
            Ok(self
                .articles
                .iter()
                .skip((page - 1) * 10)
                .take(10)
                .cloned()
                .collect())
        }

        async fn fetch_total_count(&self, _page: usize) -> Result<usize, FetchError> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_count {
                return Err(FetchError::shape("count response has no `maxdata` field"));
            }
            Ok(self.articles.len())
        }

        async fn delete_article(
            &self,
            _id: i64,
            _password: &str,
        ) -> Result<DeleteOutcome, FetchError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.delete_reply
                .clone()
                .ok_or_else(|| FetchError::shape("connection reset"))
        }

        async fn submit_post(&self, draft: &PostDraft, _password: &str) -> Result<(), FetchError> {
            if self.fail_submit {
                return Err(FetchError::shape("connection reset"));
            }
            self.submitted.lock().unwrap().push(draft.clone());
            Ok(())
        }
    }

    fn controller(
        webhook: FakeWebhook,
        query: Option<&str>,
    ) -> ListController<std::sync::Arc<FakeWebhook>> {
        let pages = PageStateController::init_from_url("/admin", query);
        ListController::new(std::sync::Arc::new(webhook), pages)
    }

    #[tokio::test]
    async fn loads_page_from_url() {
        let mut c = controller(FakeWebhook::with_articles(35), Some("pg=3"));
        c.refresh().await;

        assert_eq!(c.pages().current_page(), 3);
        assert_eq!(*c.webhook.list_pages.lock().unwrap(), vec![3]);
        let ids: Vec<i64> = c.visible_articles().iter().map(|a| a.id).collect();
        assert_eq!(ids, (21..=30).collect::<Vec<_>>());

        let view = c.pagination().unwrap();
        assert_eq!(view.total_pages, 4);
        assert!(view.pages[2].active);
    }

    #[tokio::test]
    async fn same_page_issues_no_requests() {
        let mut c = controller(FakeWebhook::with_articles(35), Some("pg=2"));
        c.refresh().await;
        let location = c.pages().location();

        assert!(!c.set_page(2).await);
        assert_eq!(c.webhook.list_calls(), 1);
        assert_eq!(c.webhook.count_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.pages().location(), location);
    }

    #[tokio::test]
    async fn set_page_fetches_fresh_pair() {
        let mut c = controller(FakeWebhook::with_articles(35), None);
        c.refresh().await;

        assert!(c.set_page(4).await);
        assert_eq!(*c.webhook.list_pages.lock().unwrap(), vec![1, 4]);
        assert_eq!(c.webhook.count_calls.load(Ordering::SeqCst), 2);
        assert_eq!(c.pages().location(), "/admin?pg=4");
        assert_eq!(c.visible_articles().len(), 5);
    }

    #[tokio::test]
    async fn prev_and_next_stop_at_edges() {
        let mut c = controller(FakeWebhook::with_articles(15), None);
        c.refresh().await;

        assert!(!c.prev_page().await);
        assert!(c.next_page().await);
        assert_eq!(c.pages().current_page(), 2);
        assert!(!c.next_page().await);
        assert!(c.prev_page().await);
        assert_eq!(c.pages().current_page(), 1);
    }

    #[tokio::test]
    async fn stale_page_is_clamped_and_refetched() {
        let mut c = controller(FakeWebhook::with_articles(25), Some("pg=9"));
        c.refresh().await;

        assert_eq!(c.pages().current_page(), 3);
        assert_eq!(c.pages().location(), "/admin?pg=3");
        assert_eq!(*c.webhook.list_pages.lock().unwrap(), vec![9, 3]);
        assert_eq!(c.visible_articles().len(), 5);
    }

    #[tokio::test]
    async fn stale_list_response_is_discarded() {
        let mut c = controller(FakeWebhook::with_articles(35), None);
        let old = c.pages.begin_request();
        c.pages.set_page(2);

        assert!(!c.accept_list(&old, Ok(vec![article(1)])));
        assert_eq!(*c.list(), ListView::Loading);

        let current = c.pages.begin_request();
        assert!(c.accept_list(&current, Ok(vec![article(11)])));
        assert_eq!(c.visible_articles()[0].id, 11);
    }

    #[tokio::test]
    async fn list_failure_hides_pagination() {
        let webhook = FakeWebhook {
            fail_list: true,
            ..FakeWebhook::with_articles(20)
        };
        let mut c = controller(webhook, None);
        c.refresh().await;

        assert!(matches!(c.list(), ListView::Failed(_)));
        assert!(c.pagination().is_none());
    }

    #[tokio::test]
    async fn count_failure_keeps_list() {
        let webhook = FakeWebhook {
            fail_count: true,
            ..FakeWebhook::with_articles(20)
        };
        let mut c = controller(webhook, None);
        c.refresh().await;

        assert_eq!(c.visible_articles().len(), 10);
        assert!(c.pagination().is_none());
    }

    #[tokio::test]
    async fn delete_success_refetches_once() {
        let webhook = FakeWebhook {
            delete_reply: Some(DeleteOutcome::Deleted),
            ..FakeWebhook::with_articles(20)
        };
        let mut c = controller(webhook, Some("pg=2"));
        c.refresh().await;

        assert_eq!(c.delete(15, "secret").await, DeleteResult::Deleted);
        assert_eq!(*c.webhook.list_pages.lock().unwrap(), vec![2, 2]);
        assert_eq!(c.banner().unwrap().kind, BannerKind::Success);
    }

    #[tokio::test]
    async fn delete_rejection_shows_message_without_refetch() {
        let webhook = FakeWebhook {
            delete_reply: Some(DeleteOutcome::Rejected {
                message: "bad password".to_string(),
            }),
            ..FakeWebhook::with_articles(20)
        };
        let mut c = controller(webhook, None);
        c.refresh().await;
        let before = c.list().clone();

        let result = c.delete(3, "wrong").await;
        assert_eq!(
            result,
            DeleteResult::Rejected {
                message: "bad password".to_string()
            }
        );
        let banner = c.banner().unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        assert!(banner.message.contains("bad password"));
        assert_eq!(c.webhook.list_calls(), 1);
        assert_eq!(*c.list(), before);
    }

    #[tokio::test]
    async fn delete_transport_error_leaves_list() {
        let mut c = controller(FakeWebhook::with_articles(5), None);
        c.refresh().await;

        assert!(matches!(c.delete(1, "pw").await, DeleteResult::Failed { .. }));
        assert_eq!(c.webhook.list_calls(), 1);
        assert_eq!(c.visible_articles().len(), 5);
    }

    #[tokio::test]
    async fn blank_password_sends_nothing() {
        let mut c = controller(FakeWebhook::with_articles(5), None);
        assert_eq!(c.delete(1, "  ").await, DeleteResult::PasswordRequired);
        assert_eq!(c.webhook.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_article_reachable_by_paging() {
        let mut c = controller(FakeWebhook::with_articles(30), None);
        c.refresh().await;

        let mut seen: Vec<i64> = c.visible_articles().iter().map(|a| a.id).collect();
        while c.next_page().await {
            seen.extend(c.visible_articles().iter().map(|a| a.id));
        }
        assert_eq!(seen, (1..=30).collect::<Vec<_>>());
        assert_eq!(c.pagination().unwrap().total_pages, 3);
    }

    #[tokio::test]
    async fn category_filter_narrows_page() {
        let mut webhook = FakeWebhook::with_articles(10);
        for a in webhook.articles.iter_mut().filter(|a| a.id % 2 == 0) {
            a.category = "生活".to_string();
        }
        let mut c = controller(webhook, Some("category=%E7%94%9F%E6%B4%BB"));
        c.refresh().await;

        let ids: Vec<i64> = c.visible_articles().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 4, 6, 8, 10]);
        assert_eq!(c.category_count(None), 10);
        assert_eq!(c.category_count(Some("技術")), 5);
        assert_eq!(c.category_count(Some("心情")), 0);
    }

    #[tokio::test]
    async fn send_delete_does_not_reload() {
        let webhook = FakeWebhook {
            delete_reply: Some(DeleteOutcome::Deleted),
            ..FakeWebhook::with_articles(20)
        };
        let mut c = controller(webhook, None);

        assert_eq!(c.send_delete(4, "secret").await, DeleteResult::Deleted);
        assert_eq!(c.webhook.list_calls(), 0);
        assert_eq!(c.banner().unwrap().message, POST_DELETED);
    }

    #[tokio::test]
    async fn submit_post_reports_success() {
        let mut c = controller(FakeWebhook::default(), None);
        let draft = PostDraft {
            id: Some(3),
            title: "Updated".to_string(),
            category: "技術".to_string(),
            content: "new body".to_string(),
        };

        assert_eq!(c.submit_post(&draft, "secret").await, SubmitResult::Submitted);
        assert_eq!(*c.webhook.submitted.lock().unwrap(), vec![draft]);
        assert_eq!(c.banner().unwrap().message, POST_SUBMITTED);
        assert_eq!(c.webhook.list_calls(), 0);
    }

    #[tokio::test]
    async fn submit_post_validates_before_sending() {
        let mut c = controller(FakeWebhook::default(), None);
        let blank = PostDraft {
            title: "Only a title".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            c.submit_post(&blank, "secret").await,
            SubmitResult::Invalid { .. }
        ));

        let draft = PostDraft {
            title: "t".to_string(),
            content: "c".to_string(),
            ..Default::default()
        };
        assert_eq!(c.submit_post(&draft, "").await, SubmitResult::PasswordRequired);
        assert!(c.webhook.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_post_failure_sets_error_banner() {
        let webhook = FakeWebhook {
            fail_submit: true,
            ..Default::default()
        };
        let mut c = controller(webhook, None);
        let draft = PostDraft {
            title: "t".to_string(),
            content: "c".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            c.submit_post(&draft, "pw").await,
            SubmitResult::Failed { .. }
        ));
        let banner = c.banner().unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        assert!(banner.message.starts_with("提交失敗："));
    }

    #[test]
    fn banner_kind_round_trips_through_query() {
        for kind in [BannerKind::Success, BannerKind::Error, BannerKind::Info] {
            assert_eq!(BannerKind::parse(kind.as_str()), kind);
        }
        assert_eq!(BannerKind::parse("weird"), BannerKind::Info);
    }
}
