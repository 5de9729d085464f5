//! Helper functions used by the renderer
//!
//! Escaping, excerpts, date display and link building.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
