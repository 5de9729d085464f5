//! HTML rendering for the article list pages
//!
//! Markup is assembled with the helpers in [`crate::helpers`]; every value
//! that came from the webhook is escaped on the way in.

use crate::config::SiteConfig;
use crate::content::{Article, PostDraft};
use crate::controller::{Banner, BannerKind, ListController, ListView, LIST_FAILED};
use crate::gateway::Webhook;
use crate::helpers::{
    article_url, edit_url, format_published_date, get_excerpt, html_escape, link_to,
    meta_generator, with_query,
};
use crate::state::{PageButton, PaginationView, CATEGORY_PARAM};

/// Form target for admin deletes
pub const ADMIN_DELETE_PATH: &str = "/admin/delete";
/// Create/edit form, shown with GET and submitted with POST
pub const ADMIN_POST_PATH: &str = "/admin/post";

const EMPTY_LIST: &str = "暫無文章";
const EMPTY_BODY: &str = "無內容";

/// Which list a page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Public,
    Admin,
}

impl ListKind {
    fn heading(&self, category: Option<&str>) -> String {
        match (self, category) {
            (ListKind::Public, Some(category)) => format!("{}文章", category),
            (ListKind::Public, None) => "最新文章".to_string(),
            (ListKind::Admin, _) => "文章管理".to_string(),
        }
    }
}

/// Renders list pages for one site
pub struct Renderer<'a> {
    config: &'a SiteConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Full HTML page for a list controller.
    ///
    /// `requested` is the location the client asked for; when the controller
    /// ended up elsewhere the page rewrites the address bar to match.
    pub fn list_page<W: Webhook>(
        &self,
        controller: &ListController<W>,
        kind: ListKind,
        requested: &str,
    ) -> String {
        let heading = kind.heading(controller.pages().category());
        let mut body = String::new();
        body.push_str(&format!(
            r#"<h1 class="page-title">{}</h1>"#,
            html_escape(&heading)
        ));

        match kind {
            ListKind::Public => body.push_str(&self.category_list(controller)),
            ListKind::Admin => body.push_str(&format!(
                r#"<p class="admin-toolbar"><a class="new-post-btn" href="{}">新增文章</a></p>"#,
                ADMIN_POST_PATH
            )),
        }

        if let Some(banner) = controller.banner() {
            body.push_str(&self.banner(banner));
        }

        body.push_str(&self.list(
            controller.list(),
            &controller.visible_articles(),
            kind,
            controller.pages().current_page(),
        ));

        if let Some(view) = controller.pagination() {
            body.push_str(&self.pagination(&view));
        }

        let location = controller.pages().location();
        if location != requested {
            body.push_str(&replace_location_script(&location));
        }

        self.layout(&heading, &body)
    }

    /// Category tags with per-category counts for the loaded page.
    ///
    /// "全部文章" clears the filter; the tag for the active filter is marked.
    pub fn category_list<W: Webhook>(&self, controller: &ListController<W>) -> String {
        let path = controller.pages().path();
        let active = controller.pages().category();

        let mut html = String::from(r#"<nav id="category-list" class="category-list">"#);
        html.push_str(&category_tag(
            path,
            "all",
            "全部文章",
            &self.config.default_category_color,
            controller.category_count(None),
            active.is_none(),
        ));
        for (name, color) in &self.config.category_colors {
            html.push_str(&category_tag(
                &with_query(path, CATEGORY_PARAM, name),
                name,
                name,
                color,
                controller.category_count(Some(name)),
                active == Some(name.as_str()),
            ));
        }
        html.push_str("</nav>");
        html
    }

    /// Create or edit form. `draft.id` set means edit.
    pub fn post_form(&self, draft: &PostDraft, page: usize, banner: Option<&Banner>) -> String {
        let heading = if draft.id.is_some() {
            "編輯文章"
        } else {
            "新增文章"
        };

        let mut body = format!(r#"<h1 class="page-title">{}</h1>"#, heading);
        if let Some(banner) = banner {
            body.push_str(&self.banner(banner));
        }

        let id_input = draft
            .id
            .map(|id| format!(r#"<input type="hidden" name="no" value="{}">"#, id))
            .unwrap_or_default();

        let mut options = String::new();
        let known = self.config.category_colors.contains_key(&draft.category);
        if !known && !draft.category.is_empty() {
            options.push_str(&category_option(&draft.category, true));
        }
        for name in self.config.category_colors.keys() {
            options.push_str(&category_option(name, *name == draft.category));
        }

        body.push_str(&format!(
            r#"<form id="post-form" class="post-form" method="post" action="{action}">
  {id_input}
  <input type="hidden" name="pg" value="{page}">
  <label for="title">標題</label>
  <input type="text" id="title" name="title" value="{title}" required>
  <label for="category">分類</label>
  <select id="category" name="category">{options}</select>
  <label for="content">內容</label>
  <textarea id="content" name="content" rows="20">{content}</textarea>
  <input type="password" name="pwd" placeholder="管理員密碼" required>
  <button type="submit" class="submit-btn">提交</button>
  <a class="cancel-btn" href="{back}">返回</a>
</form>"#,
            action = ADMIN_POST_PATH,
            id_input = id_input,
            page = page,
            title = html_escape(&draft.title),
            options = options,
            content = html_escape(&draft.content),
            back = html_escape(&with_query("/admin", "pg", &page.to_string())),
        ));

        self.layout(heading, &body)
    }

    /// Page shown when the webhook config could not be loaded
    pub fn config_error_page(&self, detail: &str) -> String {
        let banner = Banner::new(
            BannerKind::Error,
            "無法讀取 webhook 配置，請稍後再試",
        );
        let body = format!(
            r#"{}<p class="error-detail">{}</p>"#,
            self.banner(&banner),
            html_escape(detail)
        );
        self.layout("錯誤", &body)
    }

    /// The list region: loading, error, placeholder or articles
    pub fn list(
        &self,
        view: &ListView,
        articles: &[&Article],
        kind: ListKind,
        current_page: usize,
    ) -> String {
        let inner = match view {
            ListView::Loading => {
                r#"<div class="loading-indicator">正在載入文章列表...</div>"#.to_string()
            }
            ListView::Failed(_) => {
                format!(r#"<div class="no-posts-message">{}</div>"#, LIST_FAILED)
            }
            ListView::Loaded(_) if articles.is_empty() => {
                format!(r#"<div class="no-posts-message">{}</div>"#, EMPTY_LIST)
            }
            ListView::Loaded(_) => articles
                .iter()
                .map(|a| self.article(a, kind, current_page))
                .collect::<Vec<_>>()
                .join("\n"),
        };

        format!(r#"<div class="posts-container">{}</div>"#, inner)
    }

    /// One article card
    pub fn article(&self, article: &Article, kind: ListKind, current_page: usize) -> String {
        let category = html_escape(&article.category);
        let color = html_escape(self.config.category_color(&article.category));
        let date = format_published_date(
            &article.published_date,
            &self.config.date_format,
            &self.config.timezone,
        );
        let excerpt = get_excerpt(&article.body, self.config.excerpt_length);
        let excerpt = if excerpt.trim().is_empty() {
            EMPTY_BODY.to_string()
        } else {
            html_escape(&excerpt)
        };

        let mut html = format!(
            r#"<article class="post-item" data-post-id="{id}">
  <div class="post-category" data-category="{category}" style="background-color: {color}">{category}</div>
  <h2 class="post-title">{title}</h2>
  <div class="post-meta">發布日期：{date}</div>
  <p class="post-excerpt">{excerpt}</p>"#,
            id = article.id,
            category = category,
            color = color,
            title = link_to(&article_url(self.config, article.id), &article.title, true),
            date = html_escape(&date),
            excerpt = excerpt,
        );

        if kind == ListKind::Admin {
            html.push_str(&self.admin_actions(article, current_page));
        }

        html.push_str("\n</article>");
        html
    }

    /// Edit link and delete form for the admin list
    fn admin_actions(&self, article: &Article, current_page: usize) -> String {
        let confirm = format!(
            "您確定要刪除「{}」這篇文章嗎？此操作無法撤銷。",
            article.title
        );
        let confirm_js = serde_json::to_string(&confirm).unwrap_or_else(|_| "\"\"".to_string());

        format!(
            r#"
  <div class="post-actions">
    <a href="{edit}" class="edit-btn">編輯</a>
    <form class="delete-form" method="post" action="{action}" onsubmit="return confirm({confirm})">
      <input type="hidden" name="no" value="{id}">
      <input type="hidden" name="pg" value="{page}">
      <input type="password" name="pwd" placeholder="管理員密碼" required>
      <button type="submit" class="delete-btn" data-post-id="{id}">刪除</button>
    </form>
  </div>"#,
            edit = html_escape(&edit_url(self.config, article.id, current_page)),
            action = ADMIN_DELETE_PATH,
            confirm = html_escape(&confirm_js),
            id = article.id,
            page = current_page,
        )
    }

    /// Total-count line and pagination buttons
    pub fn pagination(&self, view: &PaginationView) -> String {
        let mut html = format!(
            r#"<div class="total-count-info">共有 {} 篇文章，分 {} 頁顯示</div>"#,
            view.total_items, view.total_pages
        );

        html.push_str(r#"<div class="pagination">"#);
        html.push_str(&step_button(&view.prev, "prev-btn", "上一頁"));
        for button in &view.pages {
            html.push_str(&page_button(button));
        }
        html.push_str(&step_button(&view.next, "next-btn", "下一頁"));
        html.push_str("</div>");
        html
    }

    /// Status banner
    pub fn banner(&self, banner: &Banner) -> String {
        format!(
            r#"<div id="status-message" class="status-message {}" role="status">{}</div>"#,
            banner.kind.as_str(),
            html_escape(&banner.message)
        )
    }

    fn layout(&self, heading: &str, body: &str) -> String {
        let subtitle = if self.config.subtitle.is_empty() {
            String::new()
        } else {
            format!(
                r#"<p class="site-subtitle">{}</p>"#,
                html_escape(&self.config.subtitle)
            )
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{generator}
<title>{heading} | {title}</title>
<link rel="stylesheet" href="/css/style.css">
</head>
<body>
<header id="header"><a class="site-title" href="/">{title}</a>{subtitle}</header>
<main class="post-list">
{body}
</main>
</body>
</html>
"#,
            lang = html_escape(&self.config.language),
            generator = meta_generator(),
            heading = html_escape(heading),
            title = html_escape(&self.config.title),
            subtitle = subtitle,
            body = body,
        )
    }
}

fn category_tag(
    href: &str,
    key: &str,
    label: &str,
    color: &str,
    count: usize,
    active: bool,
) -> String {
    format!(
        r#"<a class="category-tag{active}" data-category="{key}" href="{href}" style="background-color: {color}">{label} <span class="category-count">({count})</span></a>"#,
        active = if active { " active" } else { "" },
        key = html_escape(key),
        href = html_escape(href),
        color = html_escape(color),
        label = html_escape(label),
        count = count,
    )
}

fn category_option(name: &str, selected: bool) -> String {
    format!(
        r#"<option value="{0}"{1}>{0}</option>"#,
        html_escape(name),
        if selected { " selected" } else { "" }
    )
}

/// Prev/next button; disabled ones cannot be followed
fn step_button(button: &PageButton, class: &str, label: &str) -> String {
    if button.disabled {
        format!(
            r#"<button class="pagination-btn {}" disabled>{}</button>"#,
            class, label
        )
    } else {
        format!(
            r#"<a class="pagination-btn {}" href="{}">{}</a>"#,
            class,
            html_escape(&button.href),
            label
        )
    }
}

/// Numbered page button; the active one has no link
fn page_button(button: &PageButton) -> String {
    if button.active {
        format!(
            r#"<a class="pagination-btn page-btn active" data-page="{0}" aria-current="page">{0}</a>"#,
            button.page
        )
    } else {
        format!(
            r#"<a class="pagination-btn page-btn" data-page="{0}" href="{1}">{0}</a>"#,
            button.page,
            html_escape(&button.href)
        )
    }
}

/// Rewrite the address bar without reloading
fn replace_location_script(location: &str) -> String {
    let location = serde_json::to_string(location).unwrap_or_else(|_| "\"/\"".to_string());
    format!(
        "<script>window.history.replaceState({{}}, '', {});</script>",
        location
    )
}
