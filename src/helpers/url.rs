//! URL helper functions

use url::form_urlencoded;

use crate::config::SiteConfig;

/// Query parameter carrying an article number
pub const ARTICLE_PARAM: &str = "no";

/// Append `key=value` to a URL, form-encoding both
///
/// # Examples
/// ```ignore
/// with_query("/admin?pg=2", "status", "success") // -> "/admin?pg=2&status=success"
/// ```
pub fn with_query(url: &str, key: &str, value: &str) -> String {
    let pair = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, pair)
}

/// Link to an article's detail page
pub fn article_url(config: &SiteConfig, id: i64) -> String {
    with_query(&config.article_path, ARTICLE_PARAM, &id.to_string())
}

/// Link to the edit form for an article listed on admin page `page`
pub fn edit_url(config: &SiteConfig, id: i64, page: usize) -> String {
    with_query(
        &with_query(&config.edit_path, ARTICLE_PARAM, &id.to_string()),
        "pg",
        &page.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/admin", "pg", "2"), "/admin?pg=2");
        assert_eq!(
            with_query("/admin?pg=2", "message", "bad password"),
            "/admin?pg=2&message=bad+password"
        );
        assert_eq!(
            with_query("/", "category", "技術"),
            "/?category=%E6%8A%80%E8%A1%93"
        );
    }

    #[test]
    fn test_article_links() {
        let config = SiteConfig::default();
        assert_eq!(article_url(&config, 12), "article.html?no=12");
        assert_eq!(edit_url(&config, 12, 3), "/admin/post?no=12&pg=3");
    }
}
