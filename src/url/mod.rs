//! URL handling for catalogue traversal
//!
//! This module validates catalogue base URLs, builds per-page URLs from the
//! fixed `/page/{index}` path scheme, and classifies image sources.

mod pagination;
mod validate;

pub use pagination::{page_url, page_urls};
pub use validate::{is_absolute_http, parse_base_url};
