//! CLI commands

pub mod browse;
pub mod delete;
pub mod list;
pub mod post;
