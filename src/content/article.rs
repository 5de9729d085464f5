//! Article model and webhook record normalization

use serde::Deserialize;
use serde_json::Value;

/// Title used when a record has none
pub const UNTITLED: &str = "無標題";

/// Category used when a record has none
pub const UNCATEGORIZED: &str = "未分類";

/// A blog post as served by the webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Post number, used to address the detail page and delete requests
    pub id: i64,

    /// Post title
    pub title: String,

    /// Category name (`class` on the wire)
    pub category: String,

    /// Publication date as sent by the webhook, possibly empty
    pub published_date: String,

    /// Summary or full body, possibly containing markup
    pub body: String,
}

/// One element of the list response's `data` array.
///
/// The webhook has shipped two generations of field names; both are
/// accepted and the newer one wins when a record carries both.
#[derive(Debug, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    number: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    class: Option<Value>,
    #[serde(default)]
    pushdate: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    summary: Option<Value>,
    #[serde(default)]
    text: Option<Value>,
}

impl RawArticle {
    /// Collapse aliases into the canonical [`Article`] shape.
    ///
    /// Returns `None` when neither `number` nor `id` holds an integer.
    pub fn normalize(self) -> Option<Article> {
        let id = first_integer([self.number.as_ref(), self.id.as_ref()])?;

        Some(Article {
            id,
            title: first_text([self.title.as_ref()]).unwrap_or_else(|| UNTITLED.to_string()),
            category: first_text([self.class.as_ref()])
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            published_date: first_text([self.pushdate.as_ref(), self.date.as_ref()])
                .unwrap_or_default(),
            body: first_text([self.summary.as_ref(), self.text.as_ref()]).unwrap_or_default(),
        })
    }
}

/// A post as entered in the admin form, new when `id` is `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub id: Option<i64>,
    pub title: String,
    pub category: String,
    pub content: String,
}

impl PostDraft {
    /// Start an edit from a loaded article
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: Some(article.id),
            title: article.title.clone(),
            category: article.category.clone(),
            content: article.body.clone(),
        }
    }

    /// Message for the first required field left blank
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("請填寫文章標題")
        } else if self.content.trim().is_empty() {
            Some("請填寫文章內容")
        } else {
            None
        }
    }
}

/// Read a JSON value as an integer, accepting numeric strings
pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first_integer<const N: usize>(candidates: [Option<&Value>; N]) -> Option<i64> {
    candidates.into_iter().flatten().find_map(value_as_i64)
}

/// First non-empty string (numbers are stringified)
fn first_text<const N: usize>(candidates: [Option<&Value>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawArticle {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_current_names() {
        let article = raw(json!({
            "number": 12,
            "title": "Hello",
            "class": "技術",
            "pushdate": "2024-03-01",
            "summary": "short",
            "state": 1
        }))
        .normalize()
        .unwrap();

        assert_eq!(
            article,
            Article {
                id: 12,
                title: "Hello".to_string(),
                category: "技術".to_string(),
                published_date: "2024-03-01".to_string(),
                body: "short".to_string(),
            }
        );
    }

    #[test]
    fn test_normalize_legacy_names() {
        let article = raw(json!({
            "id": "7",
            "title": "Old",
            "date": "2023-12-31",
            "text": "<p>body</p>"
        }))
        .normalize()
        .unwrap();

        assert_eq!(article.id, 7);
        assert_eq!(article.published_date, "2023-12-31");
        assert_eq!(article.body, "<p>body</p>");
        assert_eq!(article.category, UNCATEGORIZED);
    }

    #[test]
    fn test_newer_alias_wins() {
        let article = raw(json!({
            "number": 3,
            "id": 99,
            "pushdate": "2024-01-02",
            "date": "1999-01-01",
            "summary": "",
            "text": "full text"
        }))
        .normalize()
        .unwrap();

        assert_eq!(article.id, 3);
        assert_eq!(article.published_date, "2024-01-02");
        // Empty summary falls through to the body text
        assert_eq!(article.body, "full text");
    }

    #[test]
    fn test_missing_title_and_id() {
        let article = raw(json!({ "number": 1 })).normalize().unwrap();
        assert_eq!(article.title, UNTITLED);
        assert!(article.published_date.is_empty());

        assert!(raw(json!({ "title": "no id" })).normalize().is_none());
        assert!(raw(json!({ "id": "abc" })).normalize().is_none());
    }

    #[test]
    fn test_draft_from_article() {
        let article = raw(json!({ "number": 5, "title": "Edit me", "class": "生活", "summary": "<p>x</p>" }))
            .normalize()
            .unwrap();
        let draft = PostDraft::from_article(&article);
        assert_eq!(draft.id, Some(5));
        assert_eq!(draft.category, "生活");
        assert_eq!(draft.content, "<p>x</p>");
        assert_eq!(draft.missing_field(), None);
    }

    #[test]
    fn test_draft_requires_title_and_content() {
        let mut draft = PostDraft {
            content: "body".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.missing_field(), Some("請填寫文章標題"));

        draft.title = "Title".to_string();
        draft.content = "   ".to_string();
        assert_eq!(draft.missing_field(), Some("請填寫文章內容"));
    }

    #[test]
    fn test_value_as_i64() {
        assert_eq!(value_as_i64(&json!(42)), Some(42));
        assert_eq!(value_as_i64(&json!(42.0)), Some(42));
        assert_eq!(value_as_i64(&json!(" 8 ")), Some(8));
        assert_eq!(value_as_i64(&json!(4.5)), None);
        assert_eq!(value_as_i64(&json!(null)), None);
    }
}
