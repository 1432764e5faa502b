//! In-memory implementation of every repository contract

use super::{
	BlockAdminRepository, BlockRepository, ContentAdminRepository, ContentOrder, ContentQuery,
	ContentRepository, FileAdminRepository, FileRepository, QueryPage,
};
use crate::error::{CmsError, CmsResult};
use crate::models::{
	Attachable, Block, BlockFilter, BlockId, Content, ContentId, File, FileAttachment, FileId,
	normalize_path,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct State {
	contents: BTreeMap<ContentId, Content>,
	blocks: BTreeMap<BlockId, Block>,
	files: BTreeMap<FileId, File>,
	attachments: Vec<FileAttachment>,
	next_content_id: ContentId,
	next_block_id: BlockId,
	next_file_id: FileId,
}

impl State {
	/// `id` and every node below it
	fn subtree(&self, id: ContentId) -> Vec<ContentId> {
		self.contents
			.values()
			.filter(|c| c.path.contains(&id))
			.map(|c| c.id)
			.collect()
	}

	fn detach_owner(&mut self, owner: Attachable) {
		self.attachments.retain(|a| a.owner != owner);
	}
}

/// Thread-safe in-memory store
///
/// Used as the default backend for tests and small deployments. All reads
/// return clones, so entities never outlive the request that loaded them.
#[derive(Default)]
pub struct MemoryStore {
	state: RwLock<State>,
}

impl MemoryStore {
	/// Empty store
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl ContentRepository for MemoryStore {
	async fn find_by_path(&self, path: &str, language_code: &str) -> CmsResult<Option<Content>> {
		let path = normalize_path(path);
		let state = self.state.read();
		Ok(state
			.contents
			.values()
			.find(|c| !c.is_trashed() && c.route.matches(&path, language_code))
			.cloned())
	}

	async fn find(&self, id: ContentId) -> CmsResult<Option<Content>> {
		let state = self.state.read();
		Ok(state.contents.get(&id).filter(|c| !c.is_trashed()).cloned())
	}

	async fn ancestors(&self, content: &Content) -> CmsResult<Vec<Content>> {
		let state = self.state.read();
		content
			.ancestor_ids()
			.iter()
			.map(|id| {
				state.contents.get(id).cloned().ok_or_else(|| {
					CmsError::Repository(format!(
						"Content {} references missing ancestor {}",
						content.id, id
					))
				})
			})
			.collect()
	}

	async fn query(&self, query: &ContentQuery) -> CmsResult<QueryPage<Content>> {
		let state = self.state.read();
		let mut matches: Vec<&Content> = state
			.contents
			.values()
			.filter(|c| !c.is_trashed() && query.filter.matches(c))
			.collect();
		matches.sort_by(|a, b| query.order.compare(a, b));

		let total = matches.len() as u64;
		let items = matches
			.into_iter()
			.skip(query.offset())
			.take(query.per_page as usize)
			.cloned()
			.collect();
		Ok(QueryPage { items, total })
	}
}

#[async_trait]
impl ContentAdminRepository for MemoryStore {
	async fn insert(&self, mut content: Content) -> CmsResult<Content> {
		let mut state = self.state.write();
		let parent_path = match content.parent_id {
			Some(parent_id) => state
				.contents
				.get(&parent_id)
				.filter(|p| !p.is_trashed())
				.map(|p| p.path.clone())
				.ok_or_else(|| CmsError::NotFound(format!("parent content {}", parent_id)))?,
			None => Vec::new(),
		};

		state.next_content_id += 1;
		content.id = state.next_content_id;
		content.path = parent_path;
		content.path.push(content.id);
		state.contents.insert(content.id, content.clone());
		Ok(content)
	}

	async fn save(&self, content: &Content) -> CmsResult<()> {
		let mut state = self.state.write();
		match state.contents.get_mut(&content.id) {
			Some(stored) => {
				*stored = content.clone();
				stored.updated_at = Utc::now();
				Ok(())
			}
			None => Err(CmsError::NotFound(format!("content {}", content.id))),
		}
	}

	async fn find_with_trashed(&self, id: ContentId) -> CmsResult<Option<Content>> {
		Ok(self.state.read().contents.get(&id).cloned())
	}

	async fn all(&self) -> CmsResult<Vec<Content>> {
		let state = self.state.read();
		let mut contents: Vec<Content> = state
			.contents
			.values()
			.filter(|c| !c.is_trashed())
			.cloned()
			.collect();
		contents.sort_by(|a, b| a.path.cmp(&b.path));
		Ok(contents)
	}

	async fn trashed(&self, page: u32, per_page: u32) -> CmsResult<QueryPage<Content>> {
		let state = self.state.read();
		let trashed: Vec<&Content> = state.contents.values().filter(|c| c.is_trashed()).collect();
		let total = trashed.len() as u64;
		let offset = (page.max(1) as usize - 1) * per_page as usize;
		let items = trashed
			.into_iter()
			.skip(offset)
			.take(per_page as usize)
			.cloned()
			.collect();
		Ok(QueryPage { items, total })
	}

	async fn route_exists(
		&self,
		path: &str,
		language_code: &str,
		except: Option<ContentId>,
	) -> CmsResult<bool> {
		let path = normalize_path(path);
		let state = self.state.read();
		Ok(state
			.contents
			.values()
			.any(|c| Some(c.id) != except && c.route.matches(&path, language_code)))
	}

	async fn soft_delete(&self, id: ContentId) -> CmsResult<Vec<ContentId>> {
		let mut state = self.state.write();
		if state.contents.get(&id).is_none_or(|c| c.is_trashed()) {
			return Err(CmsError::NotFound(format!("content {}", id)));
		}
		let now = Utc::now();
		let ids = state.subtree(id);
		for affected in &ids {
			if let Some(content) = state.contents.get_mut(affected)
				&& content.deleted_at.is_none()
			{
				content.deleted_at = Some(now);
			}
		}
		Ok(ids)
	}

	async fn restore(&self, id: ContentId) -> CmsResult<Vec<ContentId>> {
		let mut state = self.state.write();
		let content = state
			.contents
			.get(&id)
			.filter(|c| c.is_trashed())
			.ok_or_else(|| CmsError::NotFound(format!("trashed content {}", id)))?;
		if let Some(parent_id) = content.parent_id
			&& state.contents.get(&parent_id).is_none_or(|p| p.is_trashed())
		{
			return Err(CmsError::validation(
				"parent_id",
				format!("Parent content {} must be restored first", parent_id),
			));
		}
		let ids = state.subtree(id);
		for affected in &ids {
			if let Some(content) = state.contents.get_mut(affected) {
				content.deleted_at = None;
			}
		}
		Ok(ids)
	}

	async fn force_delete(&self, id: ContentId) -> CmsResult<Vec<ContentId>> {
		let mut state = self.state.write();
		if !state.contents.contains_key(&id) {
			return Err(CmsError::NotFound(format!("content {}", id)));
		}
		let ids = state.subtree(id);
		for removed in &ids {
			state.contents.remove(removed);
			state.detach_owner(Attachable::Content(*removed));
		}
		Ok(ids)
	}
}

#[async_trait]
impl BlockRepository for MemoryStore {
	async fn filters(&self) -> CmsResult<Vec<(BlockId, Option<BlockFilter>)>> {
		let state = self.state.read();
		Ok(state
			.blocks
			.values()
			.filter(|b| !b.is_trashed())
			.map(|b| (b.id, b.filter.clone()))
			.collect())
	}

	async fn visible(&self, ids: &BTreeSet<BlockId>, only_active: bool) -> CmsResult<Vec<Block>> {
		let state = self.state.read();
		let mut blocks: Vec<Block> = ids
			.iter()
			.filter_map(|id| state.blocks.get(id))
			.filter(|b| !b.is_trashed() && (!only_active || b.is_active))
			.cloned()
			.collect();
		blocks.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.id.cmp(&b.id)));
		Ok(blocks)
	}

	async fn find(&self, id: BlockId) -> CmsResult<Option<Block>> {
		let state = self.state.read();
		Ok(state.blocks.get(&id).filter(|b| !b.is_trashed()).cloned())
	}
}

#[async_trait]
impl BlockAdminRepository for MemoryStore {
	async fn insert(&self, mut block: Block) -> CmsResult<Block> {
		let mut state = self.state.write();
		state.next_block_id += 1;
		block.id = state.next_block_id;
		state.blocks.insert(block.id, block.clone());
		Ok(block)
	}

	async fn save(&self, block: &Block) -> CmsResult<()> {
		let mut state = self.state.write();
		match state.blocks.get_mut(&block.id) {
			Some(stored) => {
				*stored = block.clone();
				stored.updated_at = Utc::now();
				Ok(())
			}
			None => Err(CmsError::NotFound(format!("block {}", block.id))),
		}
	}

	async fn find_with_trashed(&self, id: BlockId) -> CmsResult<Option<Block>> {
		Ok(self.state.read().blocks.get(&id).cloned())
	}

	async fn all(&self) -> CmsResult<Vec<Block>> {
		let state = self.state.read();
		let mut blocks: Vec<Block> = state
			.blocks
			.values()
			.filter(|b| !b.is_trashed())
			.cloned()
			.collect();
		blocks.sort_by(|a, b| {
			a.region
				.cmp(&b.region)
				.then_with(|| a.weight.cmp(&b.weight))
				.then_with(|| a.id.cmp(&b.id))
		});
		Ok(blocks)
	}

	async fn trashed(&self) -> CmsResult<Vec<Block>> {
		let state = self.state.read();
		Ok(state
			.blocks
			.values()
			.filter(|b| b.is_trashed())
			.cloned()
			.collect())
	}

	async fn soft_delete(&self, id: BlockId) -> CmsResult<()> {
		let mut state = self.state.write();
		match state.blocks.get_mut(&id).filter(|b| !b.is_trashed()) {
			Some(block) => {
				block.deleted_at = Some(Utc::now());
				Ok(())
			}
			None => Err(CmsError::NotFound(format!("block {}", id))),
		}
	}

	async fn restore(&self, id: BlockId) -> CmsResult<()> {
		let mut state = self.state.write();
		match state.blocks.get_mut(&id).filter(|b| b.is_trashed()) {
			Some(block) => {
				block.deleted_at = None;
				Ok(())
			}
			None => Err(CmsError::NotFound(format!("trashed block {}", id))),
		}
	}

	async fn force_delete(&self, id: BlockId) -> CmsResult<()> {
		let mut state = self.state.write();
		state
			.blocks
			.remove(&id)
			.ok_or_else(|| CmsError::NotFound(format!("block {}", id)))?;
		state.detach_owner(Attachable::Block(id));
		Ok(())
	}
}

impl MemoryStore {
	fn attached_files(&self, owner: Attachable, predicate: impl Fn(&File) -> bool) -> Vec<File> {
		let state = self.state.read();
		let mut attachments: Vec<&FileAttachment> =
			state.attachments.iter().filter(|a| a.owner == owner).collect();
		attachments.sort_by_key(|a| (a.weight, a.file_id));
		attachments
			.into_iter()
			.filter_map(|a| state.files.get(&a.file_id))
			.filter(|f| f.deleted_at.is_none() && predicate(f))
			.cloned()
			.collect()
	}
}

#[async_trait]
impl FileRepository for MemoryStore {
	async fn active_files(&self, owner: Attachable) -> CmsResult<Vec<File>> {
		Ok(self.attached_files(owner, |file| file.is_active))
	}
}

#[async_trait]
impl FileAdminRepository for MemoryStore {
	async fn insert(&self, mut file: File) -> CmsResult<File> {
		let mut state = self.state.write();
		state.next_file_id += 1;
		file.id = state.next_file_id;
		state.files.insert(file.id, file.clone());
		Ok(file)
	}

	async fn find(&self, id: FileId) -> CmsResult<Option<File>> {
		Ok(self.state.read().files.get(&id).cloned())
	}

	async fn sync(&self, owner: Attachable, files: &[(FileId, i32)]) -> CmsResult<()> {
		let mut state = self.state.write();
		if let Some((missing, _)) = files.iter().find(|(id, _)| !state.files.contains_key(id)) {
			return Err(CmsError::NotFound(format!("file {}", missing)));
		}
		state.detach_owner(owner);
		state
			.attachments
			.extend(files.iter().map(|(file_id, weight)| FileAttachment {
				file_id: *file_id,
				owner,
				weight: *weight,
			}));
		Ok(())
	}

	async fn attached(&self, owner: Attachable) -> CmsResult<Vec<File>> {
		Ok(self.attached_files(owner, |_| true))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{ContentTranslation, Region};
	use crate::repository::ContentFilter;
	use rstest::rstest;

	async fn insert_page(
		store: &MemoryStore,
		parent_id: Option<ContentId>,
		path: &str,
	) -> Content {
		let mut content = Content::new("content");
		content.parent_id = parent_id;
		content.translations.push(ContentTranslation::new("en", path));
		content.route.set_path("en", path);
		ContentAdminRepository::insert(store, content).await.unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_builds_tree_path() {
		// Arrange
		let store = MemoryStore::new();

		// Act
		let root = insert_page(&store, None, "a").await;
		let child = insert_page(&store, Some(root.id), "a/b").await;
		let grandchild = insert_page(&store, Some(child.id), "a/b/c").await;

		// Assert
		assert_eq!(grandchild.path, vec![root.id, child.id, grandchild.id]);
		let ancestors = store.ancestors(&grandchild).await.unwrap();
		assert_eq!(
			ancestors.iter().map(|c| c.id).collect::<Vec<_>>(),
			vec![root.id, child.id]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_find_by_path_normalizes_and_skips_trash() {
		let store = MemoryStore::new();
		let page = insert_page(&store, None, "about").await;

		assert!(store.find_by_path("/about/", "en").await.unwrap().is_some());
		assert!(store.find_by_path("about", "pl").await.unwrap().is_none());

		ContentAdminRepository::soft_delete(&store, page.id)
			.await
			.unwrap();
		assert!(store.find_by_path("about", "en").await.unwrap().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_soft_delete_and_restore_cascade() {
		// Arrange
		let store = MemoryStore::new();
		let root = insert_page(&store, None, "a").await;
		let child = insert_page(&store, Some(root.id), "a/b").await;

		// Act
		let trashed = ContentAdminRepository::soft_delete(&store, root.id)
			.await
			.unwrap();

		// Assert
		assert_eq!(trashed.len(), 2);
		assert!(ContentRepository::find(&store, child.id).await.unwrap().is_none());
		assert!(matches!(
			ContentAdminRepository::restore(&store, child.id).await,
			Err(CmsError::Validation(_))
		));
		ContentAdminRepository::restore(&store, root.id)
			.await
			.unwrap();
		assert!(ContentRepository::find(&store, child.id).await.unwrap().is_some());
	}

	#[rstest]
	#[tokio::test]
	async fn test_query_paginates_children() {
		// Arrange
		let store = MemoryStore::new();
		let root = insert_page(&store, None, "news").await;
		for i in 0..5 {
			insert_page(&store, Some(root.id), &format!("news/{}", i)).await;
		}
		let query = ContentQuery::active_children(root.id, 2).page(3);

		// Act
		let page = store.query(&query).await.unwrap();

		// Assert
		assert_eq!(page.total, 5);
		assert_eq!(page.items.len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_roots_only_filter() {
		let store = MemoryStore::new();
		let root = insert_page(&store, None, "a").await;
		insert_page(&store, Some(root.id), "a/b").await;
		let query = ContentQuery::new(
			ContentFilter {
				roots_only: true,
				..Default::default()
			},
			10,
		);

		let page = store.query(&query).await.unwrap();

		assert_eq!(page.total, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_visible_blocks_sorted_and_active_only() {
		// Arrange
		let store = MemoryStore::new();
		let mut heavy = Block::new("basic", Region::Header);
		heavy.weight = 10;
		let heavy = BlockAdminRepository::insert(&store, heavy).await.unwrap();
		let light = BlockAdminRepository::insert(&store, Block::new("basic", Region::Header))
			.await
			.unwrap();
		let mut off = Block::new("basic", Region::Header);
		off.is_active = false;
		let off = BlockAdminRepository::insert(&store, off).await.unwrap();
		let ids: BTreeSet<BlockId> = [heavy.id, light.id, off.id].into_iter().collect();

		// Act
		let active = store.visible(&ids, true).await.unwrap();
		let all = store.visible(&ids, false).await.unwrap();

		// Assert
		assert_eq!(
			active.iter().map(|b| b.id).collect::<Vec<_>>(),
			vec![light.id, heavy.id]
		);
		assert_eq!(all.len(), 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_active_files_skip_inactive() {
		// Arrange
		let store = MemoryStore::new();
		let image = FileAdminRepository::insert(&store, File::new("image", "a", "png"))
			.await
			.unwrap();
		let doc = FileAdminRepository::insert(&store, File::new("document", "b", "pdf"))
			.await
			.unwrap();
		let mut hidden = File::new("image", "c", "jpg");
		hidden.is_active = false;
		let hidden = FileAdminRepository::insert(&store, hidden).await.unwrap();
		let owner = Attachable::Block(1);
		store
			.sync(owner, &[(doc.id, 0), (hidden.id, 1), (image.id, 2)])
			.await
			.unwrap();

		// Act
		let active = store.active_files(owner).await.unwrap();

		// Assert
		assert_eq!(
			active.iter().map(|f| f.id).collect::<Vec<_>>(),
			vec![doc.id, image.id]
		);
		assert_eq!(store.attached(owner).await.unwrap().len(), 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_sync_rejects_unknown_file() {
		let store = MemoryStore::new();
		let result = store.sync(Attachable::Content(1), &[(99, 0)]).await;
		assert!(matches!(result, Err(CmsError::NotFound(_))));
	}
}
