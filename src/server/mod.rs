//! HTTP server for the public list and the admin console

use anyhow::Result;
use axum::{
    extract::{Form, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use url::form_urlencoded;

use crate::content::PostDraft;
use crate::controller::{Banner, BannerKind, DeleteResult, SubmitResult, POST_DELETED};
use crate::error::ConfigError;
use crate::gateway::RemoteGateway;
use crate::helpers::with_query;
use crate::state::{parse_page_param, PAGE_PARAM};
use crate::templates::{ListKind, Renderer, ADMIN_DELETE_PATH, ADMIN_POST_PATH};
use crate::Blog;

/// Admin list route
pub const ADMIN_PATH: &str = "/admin";

/// Query parameters carrying a banner across a redirect
const STATUS_PARAM: &str = "status";
const MESSAGE_PARAM: &str = "message";

/// Server state
pub struct ServerState {
    blog: Blog,
    /// Set once the webhook config has loaded; a failed load is retried on
    /// the next request
    gateway: OnceCell<Arc<RemoteGateway>>,
}

impl ServerState {
    pub fn new(blog: Blog) -> Self {
        Self {
            blog,
            gateway: OnceCell::new(),
        }
    }

    async fn gateway(&self) -> Result<Arc<RemoteGateway>, ConfigError> {
        self.gateway
            .get_or_try_init(|| async { self.blog.connect().await.map(Arc::new) })
            .await
            .cloned()
    }
}

#[derive(Debug, Deserialize)]
struct DeleteForm {
    no: String,
    #[serde(default)]
    pwd: String,
    #[serde(default)]
    pg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostFormQuery {
    no: Option<String>,
    pg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostForm {
    #[serde(default)]
    no: Option<String>,
    #[serde(default)]
    pg: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    pwd: String,
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    let static_files = ServeDir::new(&state.blog.static_dir);

    Router::new()
        .route("/", get(public_list_handler))
        .route(ADMIN_PATH, get(admin_list_handler))
        .route(ADMIN_DELETE_PATH, post(delete_handler))
        .route(ADMIN_POST_PATH, get(post_form_handler).post(submit_post_handler))
        .route("/health", get(|| async { "ok" }))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(blog.clone()));

    // Load the webhook config up front so a bad config shows in the log
    if let Err(e) = state.gateway().await {
        tracing::error!("Failed to load webhook config: {}", e);
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `GET /?pg=N`
async fn public_list_handler(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    render_list(
        &state,
        ListKind::Public,
        uri.path(),
        uri.query(),
        None,
        &requested(&uri),
    )
    .await
}

/// `GET /admin?pg=N[&status=..&message=..]`
async fn admin_list_handler(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let banner = banner_from_query(uri.query());
    let query = uri
        .query()
        .map(|q| without_params(q, &[STATUS_PARAM, MESSAGE_PARAM]));

    render_list(
        &state,
        ListKind::Admin,
        uri.path(),
        query.as_deref(),
        banner,
        &requested(&uri),
    )
    .await
}

/// `POST /admin/delete` with `no`, `pwd` and `pg`
async fn delete_handler(
    State(state): State<Arc<ServerState>>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let page = form.pg.as_deref().map(parse_page_param).unwrap_or(1);
    let back = with_query(ADMIN_PATH, PAGE_PARAM, &page.to_string());

    let Ok(id) = form.no.trim().parse::<i64>() else {
        tracing::warn!("Delete request with invalid article number {:?}", form.no);
        return banner_redirect(&back, BannerKind::Error, "無效的文章編號");
    };

    let gateway = match state.gateway().await {
        Ok(gateway) => gateway,
        Err(e) => return config_error(&state, &e),
    };

    let query = format!("{}={}", PAGE_PARAM, page);
    let mut controller = state
        .blog
        .list_controller(gateway, ADMIN_PATH, Some(query.as_str()));

    match controller.send_delete(id, &form.pwd).await {
        DeleteResult::Deleted => banner_redirect(&back, BannerKind::Success, POST_DELETED),
        _ => {
            let message = controller
                .banner()
                .map(|b| b.message.clone())
                .unwrap_or_default();
            banner_redirect(&back, BannerKind::Error, &message)
        }
    }
}

/// `GET /admin/post[?no=N&pg=P]`: blank form, or prefilled from the admin
/// list page the edit link came from
async fn post_form_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PostFormQuery>,
) -> Response {
    let page = params.pg.as_deref().map(parse_page_param).unwrap_or(1);
    let renderer = Renderer::new(&state.blog.config);

    let Some(no) = params.no.filter(|no| !no.trim().is_empty()) else {
        return Html(renderer.post_form(&PostDraft::default(), page, None)).into_response();
    };
    let Ok(id) = no.trim().parse::<i64>() else {
        let banner = Banner::new(BannerKind::Error, "無效的文章編號");
        return Html(renderer.post_form(&PostDraft::default(), page, Some(&banner)))
            .into_response();
    };

    let gateway = match state.gateway().await {
        Ok(gateway) => gateway,
        Err(e) => return config_error(&state, &e),
    };

    let query = format!("{}={}", PAGE_PARAM, page);
    let mut controller = state
        .blog
        .list_controller(gateway, ADMIN_PATH, Some(query.as_str()));
    controller.refresh().await;

    match controller.find_article(id) {
        Some(article) => {
            Html(renderer.post_form(&PostDraft::from_article(article), page, None))
                .into_response()
        }
        None => {
            tracing::warn!("Article {} not found on admin page {}", id, page);
            let draft = PostDraft {
                id: Some(id),
                ..Default::default()
            };
            let banner = Banner::new(BannerKind::Error, format!("找不到編號 {} 的文章", id));
            Html(renderer.post_form(&draft, page, Some(&banner))).into_response()
        }
    }
}

/// `POST /admin/post`: create, or update when `no` is set
async fn submit_post_handler(
    State(state): State<Arc<ServerState>>,
    Form(form): Form<PostForm>,
) -> Response {
    let page = form.pg.as_deref().map(parse_page_param).unwrap_or(1);
    let renderer = Renderer::new(&state.blog.config);

    let mut draft = PostDraft {
        id: None,
        title: form.title,
        category: form.category,
        content: form.content,
    };
    if let Some(no) = form.no.as_deref().map(str::trim).filter(|no| !no.is_empty()) {
        match no.parse::<i64>() {
            Ok(id) => draft.id = Some(id),
            Err(_) => {
                let banner = Banner::new(BannerKind::Error, "無效的文章編號");
                return Html(renderer.post_form(&draft, page, Some(&banner))).into_response();
            }
        }
    }

    let gateway = match state.gateway().await {
        Ok(gateway) => gateway,
        Err(e) => return config_error(&state, &e),
    };

    let query = format!("{}={}", PAGE_PARAM, page);
    let mut controller = state
        .blog
        .list_controller(gateway, ADMIN_PATH, Some(query.as_str()));

    match controller.submit_post(&draft, &form.pwd).await {
        SubmitResult::Submitted => {
            let message = controller
                .banner()
                .map(|b| b.message.clone())
                .unwrap_or_default();
            let back = with_query(ADMIN_PATH, PAGE_PARAM, &page.to_string());
            banner_redirect(&back, BannerKind::Success, &message)
        }
        _ => Html(renderer.post_form(&draft, page, controller.banner())).into_response(),
    }
}

async fn render_list(
    state: &ServerState,
    kind: ListKind,
    path: &str,
    query: Option<&str>,
    banner: Option<Banner>,
    requested: &str,
) -> Response {
    let gateway = match state.gateway().await {
        Ok(gateway) => gateway,
        Err(e) => return config_error(state, &e),
    };

    let mut controller = state.blog.list_controller(gateway, path, query);
    if let Some(banner) = banner {
        controller.set_banner(banner);
    }
    controller.refresh().await;

    let renderer = Renderer::new(&state.blog.config);
    Html(renderer.list_page(&controller, kind, requested)).into_response()
}

fn config_error(state: &ServerState, error: &ConfigError) -> Response {
    tracing::error!("Webhook config unavailable: {}", error);
    let renderer = Renderer::new(&state.blog.config);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(renderer.config_error_page(&error.to_string())),
    )
        .into_response()
}

fn banner_redirect(back: &str, kind: BannerKind, message: &str) -> Response {
    let location = with_query(
        &with_query(back, STATUS_PARAM, kind.as_str()),
        MESSAGE_PARAM,
        message,
    );
    Redirect::to(&location).into_response()
}

/// Path and query exactly as requested
fn requested(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

fn banner_from_query(query: Option<&str>) -> Option<Banner> {
    let mut status = None;
    let mut message = None;
    for (key, value) in form_urlencoded::parse(query?.as_bytes()) {
        match key.as_ref() {
            STATUS_PARAM if status.is_none() => status = Some(value),
            MESSAGE_PARAM if message.is_none() => message = Some(value),
            _ => {}
        }
    }

    let message = message?;
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    let kind = status
        .map(|s| BannerKind::parse(&s))
        .unwrap_or(BannerKind::Info);
    Some(Banner::new(kind, message))
}

/// Drop the given keys from a query string, keeping the other pairs in order
fn without_params(query: &str, keys: &[&str]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(
            form_urlencoded::parse(query.as_bytes())
                .filter(|(key, _)| !keys.contains(&key.as_ref())),
        )
        .finish()
}
