//! Block finder: which blocks apply to a route path
//!
//! Block filters are compiled into an in-memory index on first use. The
//! index stays valid until [`BlockFinder::invalidate`] is called, which the
//! block cache invalidator does on every block mutation. An index compiled
//! from filters read before an invalidation is served to its own lookup but
//! never stored.
//!
//! Matching rules:
//!
//! - a block without a filter, or with no include pattern, applies everywhere
//! - `news/2024` applies to exactly that path
//! - `news/*` applies to `news` itself, and to everything below it when the
//!   lookup is recursive (dynamic content routes)
//! - exclusions win over inclusions; an excluded subtree hides the block on
//!   every descendant regardless of the lookup mode

use crate::error::CmsResult;
use crate::models::{BlockFilter, BlockId, normalize_path};
use crate::repository::BlockRepository;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
	Exact(String),
	Subtree(String),
}

impl Pattern {
	fn parse(raw: &str) -> Self {
		let trimmed = raw.trim();
		match trimmed.strip_suffix('*') {
			Some(base) if base.is_empty() || base.ends_with('/') => {
				Pattern::Subtree(normalize_path(base))
			}
			_ => Pattern::Exact(normalize_path(trimmed)),
		}
	}

	fn matches(&self, path: &str, recursive: bool) -> bool {
		match self {
			Pattern::Exact(exact) => exact == path,
			Pattern::Subtree(base) if path == base => true,
			Pattern::Subtree(_) if !recursive => false,
			Pattern::Subtree(base) if base.is_empty() => true,
			Pattern::Subtree(base) => path
				.strip_prefix(base.as_str())
				.is_some_and(|rest| rest.starts_with('/')),
		}
	}
}

#[derive(Debug)]
struct Rule {
	block_id: BlockId,
	include: Vec<Pattern>,
	exclude: Vec<Pattern>,
}

impl Rule {
	fn compile(block_id: BlockId, filter: &BlockFilter) -> Self {
		Self {
			block_id,
			include: filter.include.iter().map(|p| Pattern::parse(p)).collect(),
			exclude: filter.exclude.iter().map(|p| Pattern::parse(p)).collect(),
		}
	}

	fn applies(&self, path: &str, recursive: bool) -> bool {
		if self.exclude.iter().any(|p| p.matches(path, true)) {
			return false;
		}
		self.include.is_empty() || self.include.iter().any(|p| p.matches(path, recursive))
	}
}

#[derive(Debug, Default)]
struct FilterIndex {
	global: BTreeSet<BlockId>,
	rules: Vec<Rule>,
}

impl FilterIndex {
	fn compile(filters: Vec<(BlockId, Option<BlockFilter>)>) -> Self {
		let mut index = FilterIndex::default();
		for (block_id, filter) in filters {
			match filter {
				None => {
					index.global.insert(block_id);
				}
				Some(filter) => index.rules.push(Rule::compile(block_id, &filter)),
			}
		}
		index
	}

	fn lookup(&self, path: &str, recursive: bool) -> BTreeSet<BlockId> {
		let mut ids = self.global.clone();
		ids.extend(
			self.rules
				.iter()
				.filter(|rule| rule.applies(path, recursive))
				.map(|rule| rule.block_id),
		);
		ids
	}
}

#[derive(Default)]
struct IndexSlot {
	generation: u64,
	index: Option<Arc<FilterIndex>>,
}

/// Resolves route paths to applicable block ids
pub struct BlockFinder {
	blocks: Arc<dyn BlockRepository>,
	slot: RwLock<IndexSlot>,
}

impl BlockFinder {
	/// Finder over the block repository
	pub fn new(blocks: Arc<dyn BlockRepository>) -> Self {
		Self {
			blocks,
			slot: RwLock::new(IndexSlot::default()),
		}
	}

	async fn index(&self) -> CmsResult<Arc<FilterIndex>> {
		let generation = {
			let slot = self.slot.read();
			if let Some(index) = slot.index.as_ref() {
				return Ok(Arc::clone(index));
			}
			slot.generation
		};

		let filters = self.blocks.filters().await?;
		let index = Arc::new(FilterIndex::compile(filters));

		let mut slot = self.slot.write();
		if slot.generation == generation {
			slot.index = Some(Arc::clone(&index));
			debug!(
				global = index.global.len(),
				filtered = index.rules.len(),
				"Block filter index compiled"
			);
		} else {
			debug!("Block filters changed while compiling, index not kept");
		}
		Ok(index)
	}

	/// Ids of the blocks whose filter matches `path`
	///
	/// `recursive` extends subtree patterns to descendants of their base
	/// path. Activity is not checked here.
	pub async fn find_block_ids(&self, path: &str, recursive: bool) -> CmsResult<BTreeSet<BlockId>> {
		let path = normalize_path(path);
		let index = self.index().await?;
		Ok(index.lookup(&path, recursive))
	}

	/// Drop the compiled index; the next lookup reloads the filters
	pub fn invalidate(&self) {
		let mut slot = self.slot.write();
		slot.generation = slot.generation.wrapping_add(1);
		slot.index = None;
	}

	/// Whether an index is currently compiled
	pub fn is_compiled(&self) -> bool {
		self.slot.read().index.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{Block, Region};
	use crate::repository::{BlockAdminRepository, MemoryStore};
	use async_trait::async_trait;
	use proptest::prelude::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicBool, Ordering};
	use tokio::sync::Notify;

	#[rstest]
	#[case("news/*", "news", false, true)]
	#[case("news/*", "news/2024", false, false)]
	#[case("news/*", "news/2024", true, true)]
	#[case("news/*", "newsletter", true, false)]
	#[case("/news/", "news", false, true)]
	#[case("news", "news/2024", true, false)]
	#[case("*", "anything/below", true, true)]
	#[case("*", "anything", false, false)]
	#[case("*", "", false, true)]
	fn test_pattern_matching(
		#[case] pattern: &str,
		#[case] path: &str,
		#[case] recursive: bool,
		#[case] expected: bool,
	) {
		assert_eq!(Pattern::parse(pattern).matches(path, recursive), expected);
	}

	#[rstest]
	fn test_exclusion_wins() {
		let filter = BlockFilter::including(["news/*"]).excluding(["news/private/*"]);
		let rule = Rule::compile(1, &filter);

		assert!(rule.applies("news/public", true));
		assert!(!rule.applies("news/private", true));
		assert!(!rule.applies("news/private/item", true));
	}

	#[rstest]
	fn test_exclusion_only_filter_applies_elsewhere() {
		let rule = Rule::compile(1, &BlockFilter::default().excluding(["contact"]));

		assert!(rule.applies("about", false));
		assert!(!rule.applies("contact", false));
	}

	async fn insert(store: &MemoryStore, filter: Option<BlockFilter>) -> BlockId {
		let mut block = Block::new("basic", Region::Header);
		block.filter = filter;
		BlockAdminRepository::insert(store, block).await.unwrap().id
	}

	#[rstest]
	#[tokio::test]
	async fn test_find_block_ids() {
		// Arrange
		let store = Arc::new(MemoryStore::new());
		let global = insert(&store, None).await;
		let about = insert(&store, Some(BlockFilter::including(["about"]))).await;
		let news = insert(&store, Some(BlockFilter::including(["news/*"]))).await;
		let finder = BlockFinder::new(store.clone());

		// Act
		let on_about = finder.find_block_ids("/about", false).await.unwrap();
		let on_article = finder.find_block_ids("news/article", true).await.unwrap();
		let on_article_static = finder.find_block_ids("news/article", false).await.unwrap();

		// Assert
		assert_eq!(on_about, BTreeSet::from([global, about]));
		assert_eq!(on_article, BTreeSet::from([global, news]));
		assert_eq!(on_article_static, BTreeSet::from([global]));
	}

	/// Holds the first `filters()` call after its snapshot was taken
	struct PausingBlocks {
		store: Arc<MemoryStore>,
		armed: AtomicBool,
		paused: Notify,
		resume: Notify,
	}

	#[async_trait]
	impl BlockRepository for PausingBlocks {
		async fn filters(&self) -> CmsResult<Vec<(BlockId, Option<BlockFilter>)>> {
			let snapshot = self.store.filters().await?;
			if self.armed.swap(false, Ordering::SeqCst) {
				self.paused.notify_one();
				self.resume.notified().await;
			}
			Ok(snapshot)
		}

		async fn visible(&self, ids: &BTreeSet<BlockId>, only_active: bool) -> CmsResult<Vec<Block>> {
			self.store.visible(ids, only_active).await
		}

		async fn find(&self, id: BlockId) -> CmsResult<Option<Block>> {
			BlockRepository::find(self.store.as_ref(), id).await
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalidation_during_compile_discards_stale_index() {
		// Arrange
		let store = Arc::new(MemoryStore::new());
		let first = insert(&store, None).await;
		let blocks = Arc::new(PausingBlocks {
			store: store.clone(),
			armed: AtomicBool::new(true),
			paused: Notify::new(),
			resume: Notify::new(),
		});
		let finder = Arc::new(BlockFinder::new(blocks.clone()));
		let compiling = tokio::spawn({
			let finder = finder.clone();
			async move { finder.find_block_ids("", false).await }
		});
		blocks.paused.notified().await;

		// Act
		let second = insert(&store, None).await;
		finder.invalidate();
		blocks.resume.notify_one();
		let in_flight = compiling.await.unwrap().unwrap();
		let after = finder.find_block_ids("", false).await.unwrap();

		// Assert
		assert_eq!(in_flight, BTreeSet::from([first]));
		assert_eq!(after, BTreeSet::from([first, second]));
	}

	#[rstest]
	#[tokio::test]
	async fn test_index_is_reused_until_invalidated() {
		// Arrange
		let store = Arc::new(MemoryStore::new());
		let first = insert(&store, None).await;
		let finder = BlockFinder::new(store.clone());
		assert_eq!(finder.find_block_ids("", false).await.unwrap(), BTreeSet::from([first]));

		// Act
		let second = insert(&store, None).await;
		let stale = finder.find_block_ids("", false).await.unwrap();
		finder.invalidate();
		let fresh = finder.find_block_ids("", false).await.unwrap();

		// Assert
		assert_eq!(stale, BTreeSet::from([first]));
		assert_eq!(fresh, BTreeSet::from([first, second]));
	}

	proptest! {
		#[test]
		fn test_recursive_lookup_only_widens(
			base in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
			path in "[a-z]{1,6}(/[a-z]{1,6}){0,3}",
		) {
			let rule = Rule::compile(1, &BlockFilter::including([format!("{}/*", base)]));
			if rule.applies(&path, false) {
				prop_assert!(rule.applies(&path, true));
			}
		}

		#[test]
		fn test_excluded_subtree_hides_every_descendant(
			base in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
			tail in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
			recursive in any::<bool>(),
		) {
			let filter = BlockFilter::including(["*", base.as_str()])
				.excluding([format!("{}/*", base)]);
			let rule = Rule::compile(1, &filter);

			prop_assert!(!rule.applies(&base, recursive));
			let descendant = format!("{}/{}", base, tail);
			prop_assert!(!rule.applies(&descendant, recursive));
		}
	}
}
