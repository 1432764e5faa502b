//! # Gzero Cache
//!
//! Key-value fragment cache used by the CMS to keep pre-rendered HTML for
//! cacheable blocks.
//!
//! The [`Cache`] trait is object safe so handlers can share one backend
//! through `Arc<dyn Cache>`. Typed access goes through [`CacheExt`], which
//! stores values as JSON.
//!
//! ```
//! use gzero_cache::{Cache, CacheExt, InMemoryCache};
//!
//! # tokio_test::block_on(async {
//! let cache = InMemoryCache::new();
//! cache.put("blocks:1:en", &"<p>hi</p>", None).await.unwrap();
//!
//! let html: Option<String> = cache.fetch("blocks:1:en").await.unwrap();
//! assert_eq!(html.as_deref(), Some("<p>hi</p>"));
//!
//! cache.clear_prefix("blocks:").await.unwrap();
//! assert!(!cache.has_key("blocks:1:en").await.unwrap());
//! # });
//! ```

#![warn(missing_docs)]

mod in_memory;
mod key_builder;
mod statistics;

pub use in_memory::InMemoryCache;
pub use key_builder::CacheKeyBuilder;
pub use statistics::CacheStatistics;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by cache backends
#[derive(Error, Debug)]
pub enum CacheError {
	/// Value could not be encoded or decoded
	#[error("Cache serialization error: {0}")]
	Serialization(String),

	/// Backend failure (connection, IO, ...)
	#[error("Cache backend error: {0}")]
	Backend(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Raw key-value cache backend
///
/// No locking is offered across calls: two readers missing the same key
/// will both recompute and both write it.
#[async_trait]
pub trait Cache: Send + Sync {
	/// Read raw bytes stored under `key`
	async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

	/// Store raw bytes under `key`, with an optional TTL
	async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()>;

	/// Remove a single key
	async fn delete(&self, key: &str) -> CacheResult<()>;

	/// Check whether a live entry exists for `key`
	async fn has_key(&self, key: &str) -> CacheResult<bool>;

	/// Remove every key starting with `prefix`, returning how many were removed
	async fn clear_prefix(&self, prefix: &str) -> CacheResult<usize>;

	/// Remove everything
	async fn clear(&self) -> CacheResult<()>;
}

/// Typed helpers on top of [`Cache`]
#[async_trait]
pub trait CacheExt: Cache {
	/// Read and decode a JSON encoded value
	async fn fetch<T>(&self, key: &str) -> CacheResult<Option<T>>
	where
		T: DeserializeOwned + Send,
	{
		match self.get_raw(key).await? {
			Some(bytes) => serde_json::from_slice(&bytes)
				.map(Some)
				.map_err(|e| CacheError::Serialization(e.to_string())),
			None => Ok(None),
		}
	}

	/// Encode a value as JSON and store it
	async fn put<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
	where
		T: Serialize + Send + Sync + ?Sized,
	{
		let bytes =
			serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
		self.set_raw(key, bytes, ttl).await
	}
}

impl<C: Cache + ?Sized> CacheExt for C {}
