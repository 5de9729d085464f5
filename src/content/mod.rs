//! Content models

mod article;

pub use article::{Article, PostDraft, RawArticle, UNCATEGORIZED, UNTITLED};
pub(crate) use article::value_as_i64;
