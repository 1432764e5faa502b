//! Collaborator contracts for persistence
//!
//! The resolution pipeline only depends on the read traits
//! ([`ContentRepository`], [`BlockRepository`], [`FileRepository`]). The
//! admin service additionally needs the write traits. [`MemoryStore`]
//! implements all of them.

mod memory;

pub use memory::MemoryStore;

use crate::error::CmsResult;
use crate::models::{Attachable, Block, BlockFilter, BlockId, Content, ContentId, File, FileId};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Sort order for content listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentOrder {
	/// promoted DESC, sticky DESC, weight ASC, published_at DESC
	#[default]
	Category,
	/// Identifier ascending
	Id,
}

impl ContentOrder {
	/// Compare two contents under this order
	pub fn compare(&self, a: &Content, b: &Content) -> Ordering {
		match self {
			ContentOrder::Category => b
				.is_promoted
				.cmp(&a.is_promoted)
				.then_with(|| b.is_sticky.cmp(&a.is_sticky))
				.then_with(|| a.weight.cmp(&b.weight))
				.then_with(|| b.published_at.cmp(&a.published_at))
				.then_with(|| a.id.cmp(&b.id)),
			ContentOrder::Id => a.id.cmp(&b.id),
		}
	}
}

/// Filters for content listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
	/// Only direct children of this node
	pub parent_id: Option<ContentId>,
	/// Only root nodes
	pub roots_only: bool,
	/// Match the `is_active` flag
	pub is_active: Option<bool>,
	/// Match the `is_on_home` flag
	pub is_on_home: Option<bool>,
	/// Match the discriminator
	pub content_type: Option<String>,
	/// Require an active translation in this language
	pub language_code: Option<String>,
	/// Only already published contents
	pub published_only: bool,
}

impl ContentFilter {
	/// Whether `content` passes the filter (trash is handled by the caller)
	pub fn matches(&self, content: &Content) -> bool {
		if let Some(parent_id) = self.parent_id
			&& content.parent_id != Some(parent_id)
		{
			return false;
		}
		if self.roots_only && content.parent_id.is_some() {
			return false;
		}
		if self.is_active.is_some_and(|flag| content.is_active != flag) {
			return false;
		}
		if self.is_on_home.is_some_and(|flag| content.is_on_home != flag) {
			return false;
		}
		if let Some(content_type) = &self.content_type
			&& &content.content_type != content_type
		{
			return false;
		}
		if let Some(code) = &self.language_code
			&& content.translation(code).is_none()
		{
			return false;
		}
		if self.published_only
			&& content
				.published_at
				.is_none_or(|published_at| published_at > chrono::Utc::now())
		{
			return false;
		}
		true
	}
}

/// Paginated content listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
	/// Filters
	pub filter: ContentFilter,
	/// Sort order
	pub order: ContentOrder,
	/// 1-based page number
	pub page: u32,
	/// Page size
	pub per_page: u32,
}

impl ContentQuery {
	/// First page of `per_page` items matching `filter`
	pub fn new(filter: ContentFilter, per_page: u32) -> Self {
		Self {
			filter,
			order: ContentOrder::default(),
			page: 1,
			per_page,
		}
	}

	/// Select a page
	pub fn page(mut self, page: u32) -> Self {
		self.page = page.max(1);
		self
	}

	/// Select an order
	pub fn order(mut self, order: ContentOrder) -> Self {
		self.order = order;
		self
	}

	/// Active direct children of `parent_id`
	pub fn active_children(parent_id: ContentId, per_page: u32) -> Self {
		Self::new(
			ContentFilter {
				parent_id: Some(parent_id),
				is_active: Some(true),
				..Default::default()
			},
			per_page,
		)
	}

	/// Offset of the first item of the page
	pub fn offset(&self) -> usize {
		(self.page.max(1) as usize - 1) * self.per_page as usize
	}
}

/// One page of results and the total match count
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<T> {
	/// Items of the requested page
	pub items: Vec<T>,
	/// Number of items matching the query
	pub total: u64,
}

/// Read access to contents
#[async_trait]
pub trait ContentRepository: Send + Sync {
	/// Non-trashed content whose active route in `language_code` is `path`
	async fn find_by_path(&self, path: &str, language_code: &str) -> CmsResult<Option<Content>>;

	/// Non-trashed content by id
	async fn find(&self, id: ContentId) -> CmsResult<Option<Content>>;

	/// Ancestors from the root down to the parent
	async fn ancestors(&self, content: &Content) -> CmsResult<Vec<Content>>;

	/// Filtered, sorted, paginated listing of non-trashed contents
	async fn query(&self, query: &ContentQuery) -> CmsResult<QueryPage<Content>>;
}

/// Write access to contents
#[async_trait]
pub trait ContentAdminRepository: ContentRepository {
	/// Store a new content, assigning id and tree path
	async fn insert(&self, content: Content) -> CmsResult<Content>;

	/// Replace a stored content
	async fn save(&self, content: &Content) -> CmsResult<()>;

	/// Content by id, trashed included
	async fn find_with_trashed(&self, id: ContentId) -> CmsResult<Option<Content>>;

	/// Every non-trashed content ordered by tree path
	async fn all(&self) -> CmsResult<Vec<Content>>;

	/// Trashed contents
	async fn trashed(&self, page: u32, per_page: u32) -> CmsResult<QueryPage<Content>>;

	/// Whether another content already uses `path` in `language_code`
	async fn route_exists(
		&self,
		path: &str,
		language_code: &str,
		except: Option<ContentId>,
	) -> CmsResult<bool>;

	/// Trash a content and its descendants, returning affected ids
	async fn soft_delete(&self, id: ContentId) -> CmsResult<Vec<ContentId>>;

	/// Restore a content and its descendants
	async fn restore(&self, id: ContentId) -> CmsResult<Vec<ContentId>>;

	/// Permanently remove a content and its descendants
	async fn force_delete(&self, id: ContentId) -> CmsResult<Vec<ContentId>>;
}

/// Read access to blocks (the block service of the pipeline)
#[async_trait]
pub trait BlockRepository: Send + Sync {
	/// Filter of every non-trashed block
	async fn filters(&self) -> CmsResult<Vec<(BlockId, Option<BlockFilter>)>>;

	/// Blocks among `ids` that are not trashed, optionally only active ones,
	/// sorted by weight
	async fn visible(&self, ids: &BTreeSet<BlockId>, only_active: bool) -> CmsResult<Vec<Block>>;

	/// Non-trashed block by id
	async fn find(&self, id: BlockId) -> CmsResult<Option<Block>>;
}

/// Write access to blocks
#[async_trait]
pub trait BlockAdminRepository: BlockRepository {
	/// Store a new block, assigning its id
	async fn insert(&self, block: Block) -> CmsResult<Block>;

	/// Replace a stored block
	async fn save(&self, block: &Block) -> CmsResult<()>;

	/// Block by id, trashed included
	async fn find_with_trashed(&self, id: BlockId) -> CmsResult<Option<Block>>;

	/// Every non-trashed block ordered by region then weight
	async fn all(&self) -> CmsResult<Vec<Block>>;

	/// Trashed blocks
	async fn trashed(&self) -> CmsResult<Vec<Block>>;

	/// Trash a block
	async fn soft_delete(&self, id: BlockId) -> CmsResult<()>;

	/// Restore a trashed block
	async fn restore(&self, id: BlockId) -> CmsResult<()>;

	/// Permanently remove a block
	async fn force_delete(&self, id: BlockId) -> CmsResult<()>;
}

/// Read access to file attachments
#[async_trait]
pub trait FileRepository: Send + Sync {
	/// Active files attached to `owner`, by weight
	///
	/// Kinds are resolved by the caller through the configured file types.
	async fn active_files(&self, owner: Attachable) -> CmsResult<Vec<File>>;
}

/// Write access to files
#[async_trait]
pub trait FileAdminRepository: FileRepository {
	/// Store a new file, assigning its id
	async fn insert(&self, file: File) -> CmsResult<File>;

	/// File by id
	async fn find(&self, id: FileId) -> CmsResult<Option<File>>;

	/// Replace the attachments of `owner` with `files` (id, weight)
	async fn sync(&self, owner: Attachable, files: &[(FileId, i32)]) -> CmsResult<()>;

	/// Every attachment of `owner`, inactive files included, by weight
	async fn attached(&self, owner: Attachable) -> CmsResult<Vec<File>>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, Utc};
	use proptest::prelude::*;
	use rstest::rstest;

	fn content(id: ContentId, weight: i32, promoted: bool, sticky: bool, age_days: i64) -> Content {
		let mut content = Content::new("content");
		content.id = id;
		content.weight = weight;
		content.is_promoted = promoted;
		content.is_sticky = sticky;
		content.published_at = Some(Utc::now() - Duration::days(age_days));
		content
	}

	#[rstest]
	fn test_promoted_beats_weight() {
		// Arrange
		let a = content(1, 5, false, false, 0);
		let b = content(2, 1, true, false, 0);
		let mut items = vec![a, b];

		// Act
		items.sort_by(|x, y| ContentOrder::Category.compare(x, y));

		// Assert
		assert_eq!(items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 1]);
	}

	#[rstest]
	fn test_newer_publication_breaks_weight_tie() {
		let old = content(1, 0, false, false, 10);
		let new = content(2, 0, false, false, 1);
		assert_eq!(ContentOrder::Category.compare(&new, &old), Ordering::Less);
	}

	#[rstest]
	fn test_filter_requires_translation() {
		let filter = ContentFilter {
			language_code: Some("en".into()),
			..Default::default()
		};
		assert!(!filter.matches(&Content::new("content")));
	}

	proptest! {
		#[test]
		fn prop_category_order_keeps_promoted_then_sticky_first(
			specs in prop::collection::vec((0i32..10, any::<bool>(), any::<bool>(), 0i64..30), 1..20)
		) {
			let mut items: Vec<Content> = specs
				.iter()
				.enumerate()
				.map(|(i, (w, p, s, d))| content(i as u64 + 1, *w, *p, *s, *d))
				.collect();

			items.sort_by(|x, y| ContentOrder::Category.compare(x, y));

			for pair in items.windows(2) {
				let (a, b) = (&pair[0], &pair[1]);
				prop_assert!(a.is_promoted >= b.is_promoted);
				if a.is_promoted == b.is_promoted {
					prop_assert!(a.is_sticky >= b.is_sticky);
					if a.is_sticky == b.is_sticky {
						prop_assert!(a.weight <= b.weight);
					}
				}
			}
		}
	}
}
