//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").expect("static tag pattern");
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string.
///
/// Only complete `<...>` tags are removed; a lone `<` stays.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Plain-text excerpt of at most `max_length` characters.
///
/// Markup is stripped before measuring. Text that fits is returned as-is,
/// longer text is cut and gets a `...` suffix.
///
/// # Examples
/// ```ignore
/// get_excerpt("<b>hello</b> world", 5) // -> "hello..."
/// ```
pub fn get_excerpt(text: &str, max_length: usize) -> String {
    let plain = strip_tags(text);

    match plain.char_indices().nth(max_length) {
        None => plain,
        Some((cut, _)) => format!("{}...", &plain[..cut]),
    }
}

/// Generate an anchor tag
pub fn link_to(href: &str, text: &str, new_tab: bool) -> String {
    if new_tab {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(href),
            html_escape(text)
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), html_escape(text))
    }
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="webhook-blog {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}
