//! Block mutation events
//!
//! The admin service publishes a [`BlockEvent`] after every block or block
//! translation change. Listeners run synchronously in registration order.

use crate::error::CmsResult;
use crate::finder::BlockFinder;
use crate::handlers::cached::block_cache_keys;
use crate::models::BlockId;
use async_trait::async_trait;
use gzero_cache::Cache;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A change to a block or one of its translations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEvent {
	/// Block created
	Created(BlockId),
	/// Block fields changed
	Updated(BlockId),
	/// Block moved to the trash or removed
	Deleted(BlockId),
	/// Block restored from the trash
	Restored(BlockId),
	/// Translation added
	TranslationCreated {
		/// Owning block
		block_id: BlockId,
		/// New translation
		translation_id: Uuid,
	},
	/// Translation removed
	TranslationDeleted {
		/// Owning block
		block_id: BlockId,
		/// Removed translation
		translation_id: Uuid,
	},
}

impl BlockEvent {
	/// Block the event concerns
	pub fn block_id(&self) -> BlockId {
		match self {
			BlockEvent::Created(id)
			| BlockEvent::Updated(id)
			| BlockEvent::Deleted(id)
			| BlockEvent::Restored(id) => *id,
			BlockEvent::TranslationCreated { block_id, .. }
			| BlockEvent::TranslationDeleted { block_id, .. } => *block_id,
		}
	}
}

/// Reacts to block mutations
#[async_trait]
pub trait BlockEventListener: Send + Sync {
	/// Handle one event; errors are returned to the mutating caller
	async fn on_block_event(&self, event: &BlockEvent) -> CmsResult<()>;
}

/// Ordered list of block event listeners
#[derive(Default, Clone)]
pub struct EventDispatcher {
	listeners: Vec<Arc<dyn BlockEventListener>>,
}

impl EventDispatcher {
	/// Dispatcher without listeners
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a listener after the existing ones
	pub fn connect(&mut self, listener: Arc<dyn BlockEventListener>) {
		self.listeners.push(listener);
	}

	/// Number of registered listeners
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Deliver `event` to every listener in order, stopping at the first error
	pub async fn dispatch(&self, event: BlockEvent) -> CmsResult<()> {
		for listener in &self.listeners {
			listener.on_block_event(&event).await?;
		}
		Ok(())
	}
}

/// Drops every block fragment and the finder index on any block change
pub struct BlockCacheInvalidator {
	cache: Arc<dyn Cache>,
	finder: Arc<BlockFinder>,
}

impl BlockCacheInvalidator {
	/// Invalidator over the fragment cache and the block finder
	pub fn new(cache: Arc<dyn Cache>, finder: Arc<BlockFinder>) -> Self {
		Self { cache, finder }
	}
}

#[async_trait]
impl BlockEventListener for BlockCacheInvalidator {
	async fn on_block_event(&self, event: &BlockEvent) -> CmsResult<()> {
		let removed = self.cache.clear_prefix(&block_cache_keys().prefix()).await?;
		self.finder.invalidate();
		info!(
			block_id = event.block_id(),
			removed = removed,
			"Block cache invalidated"
		);
		Ok(())
	}
}
