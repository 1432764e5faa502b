//! Fragment cache decorator for block handlers

use super::BlockTypeHandler;
use crate::error::CmsResult;
use crate::language::Language;
use crate::models::{Block, BlockKind};
use async_trait::async_trait;
use gzero_cache::{Cache, CacheExt, CacheKeyBuilder};
use std::sync::Arc;
use tracing::debug;

/// Namespace of rendered block fragments
pub const BLOCK_CACHE_NAMESPACE: &str = "blocks";

/// Key builder for block fragments (`blocks:{id}:{language}`)
pub fn block_cache_keys() -> CacheKeyBuilder {
	CacheKeyBuilder::new(BLOCK_CACHE_NAMESPACE)
}

/// Wraps a block handler with cache-check, render, store
///
/// Blocks whose `is_cacheable` flag is off bypass the cache in both
/// directions. Entries carry no TTL; they are dropped by namespace when
/// blocks change.
pub struct CachedBlockHandler {
	inner: Arc<dyn BlockTypeHandler>,
	cache: Arc<dyn Cache>,
	keys: CacheKeyBuilder,
}

impl CachedBlockHandler {
	/// Decorate `inner` with `cache`
	pub fn new(inner: Arc<dyn BlockTypeHandler>, cache: Arc<dyn Cache>) -> Self {
		Self {
			inner,
			cache,
			keys: block_cache_keys(),
		}
	}

	/// Cache key of a block rendered in a language
	pub fn cache_key(&self, block: &Block, language: &Language) -> String {
		self.keys.build(&[&block.id, &language.code])
	}
}

#[async_trait]
impl BlockTypeHandler for CachedBlockHandler {
	fn kind(&self) -> BlockKind {
		self.inner.kind()
	}

	async fn render(&self, block: &Block, language: &Language) -> CmsResult<String> {
		if !block.is_cacheable {
			return self.inner.render(block, language).await;
		}

		let key = self.cache_key(block, language);
		if let Some(fragment) = self.cache.fetch::<String>(&key).await? {
			debug!(block_id = block.id, key = %key, "Block fragment cache hit");
			return Ok(fragment);
		}

		let fragment = self.inner.render(block, language).await?;
		self.cache.put(&key, &fragment, None).await?;
		debug!(block_id = block.id, key = %key, "Block fragment cached");
		Ok(fragment)
	}
}
