//! Entities resolved by the CMS pipeline

mod block;
mod content;
mod file;
mod kinds;

pub use block::{Block, BlockFilter, BlockId, BlockTranslation, RenderedBlock};
pub use content::{Content, ContentId, ContentTranslation, Route, RouteTranslation};
pub use file::{Attachable, File, FileAttachment, FileId};
pub use kinds::{BlockKind, ContentKind, FileKind, Region};

/// Normalize a route path: no surrounding slashes, no empty segments
///
/// # Examples
///
/// ```
/// use gzero_cms::models::normalize_path;
///
/// assert_eq!(normalize_path("/news//2024/"), "news/2024");
/// assert_eq!(normalize_path("/"), "");
/// ```
pub fn normalize_path(path: &str) -> String {
	path.split('/')
		.filter(|segment| !segment.is_empty())
		.collect::<Vec<_>>()
		.join("/")
}
