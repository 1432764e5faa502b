//! In-memory cache implementation

use crate::statistics::CacheStatistics;
use crate::{Cache, CacheResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Stored bytes and the instant they stop being served
#[derive(Debug, Clone)]
struct Fragment {
	bytes: Vec<u8>,
	deadline: Option<Instant>,
}

impl Fragment {
	fn new(bytes: Vec<u8>, ttl: Option<Duration>, now: Instant) -> Self {
		Self {
			bytes,
			deadline: ttl.map(|ttl| now + ttl),
		}
	}

	fn is_live_at(&self, now: Instant) -> bool {
		self.deadline.is_none_or(|deadline| now < deadline)
	}
}

/// In-memory cache backend
///
/// Clones share the same store, so one instance can be handed to every
/// handler and to the invalidation listener.
#[derive(Clone, Default)]
pub struct InMemoryCache {
	store: Arc<RwLock<HashMap<String, Fragment>>>,
	default_ttl: Option<Duration>,
	hits: Arc<AtomicU64>,
	misses: Arc<AtomicU64>,
	writes: Arc<AtomicU64>,
}

impl InMemoryCache {
	/// Create a new in-memory cache without default TTL
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a default TTL applied when `set_raw` receives none
	///
	/// # Examples
	///
	/// ```
	/// use gzero_cache::{Cache, CacheExt, InMemoryCache};
	/// use std::time::Duration;
	///
	/// # tokio_test::block_on(async {
	/// let cache = InMemoryCache::new().with_default_ttl(Duration::from_millis(10));
	/// cache.put("key", &"value", None).await.unwrap();
	///
	/// tokio::time::sleep(Duration::from_millis(20)).await;
	///
	/// assert!(!cache.has_key("key").await.unwrap());
	/// # });
	/// ```
	pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
		self.default_ttl = Some(ttl);
		self
	}

	/// Drop expired entries
	pub async fn cleanup_expired(&self) {
		let now = Instant::now();
		let mut store = self.store.write().await;
		store.retain(|_, fragment| fragment.is_live_at(now));
	}

	/// Snapshot of the counters
	pub async fn statistics(&self) -> CacheStatistics {
		let store = self.store.read().await;
		CacheStatistics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			writes: self.writes.load(Ordering::Relaxed),
			entry_count: store.len() as u64,
			memory_usage: store.values().map(|f| f.bytes.len() as u64).sum(),
		}
	}

	/// List every stored key, expired ones included
	pub async fn keys(&self) -> Vec<String> {
		let store = self.store.read().await;
		let mut keys: Vec<String> = store.keys().cloned().collect();
		keys.sort();
		keys
	}
}

#[async_trait]
impl Cache for InMemoryCache {
	async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
		let store = self.store.read().await;
		match store.get(key) {
			Some(fragment) if fragment.is_live_at(Instant::now()) => {
				self.hits.fetch_add(1, Ordering::Relaxed);
				Ok(Some(fragment.bytes.clone()))
			}
			_ => {
				self.misses.fetch_add(1, Ordering::Relaxed);
				Ok(None)
			}
		}
	}

	async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
		let fragment = Fragment::new(value, ttl.or(self.default_ttl), Instant::now());
		let mut store = self.store.write().await;
		store.insert(key.to_string(), fragment);
		self.writes.fetch_add(1, Ordering::Relaxed);
		Ok(())
	}

	async fn delete(&self, key: &str) -> CacheResult<()> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn has_key(&self, key: &str) -> CacheResult<bool> {
		let store = self.store.read().await;
		Ok(store
			.get(key)
			.is_some_and(|fragment| fragment.is_live_at(Instant::now())))
	}

	async fn clear_prefix(&self, prefix: &str) -> CacheResult<usize> {
		let mut store = self.store.write().await;
		let before = store.len();
		store.retain(|key, _| !key.starts_with(prefix));
		let removed = before - store.len();
		tracing::debug!(prefix, removed, "cleared cache namespace");
		Ok(removed)
	}

	async fn clear(&self) -> CacheResult<()> {
		let mut store = self.store.write().await;
		store.clear();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CacheExt;
	use rstest::rstest;

	#[rstest]
	fn test_fragment_deadline() {
		let now = Instant::now();
		let expiring = Fragment::new(vec![1], Some(Duration::from_secs(5)), now);
		let permanent = Fragment::new(vec![2], None, now);

		assert!(expiring.is_live_at(now + Duration::from_secs(4)));
		assert!(!expiring.is_live_at(now + Duration::from_secs(5)));
		assert!(permanent.is_live_at(now + Duration::from_secs(3600)));
	}

	#[rstest]
	#[tokio::test]
	async fn test_in_memory_cache_basic() {
		let cache = InMemoryCache::new();

		cache.put("key1", &"value1", None).await.unwrap();
		let value: Option<String> = cache.fetch("key1").await.unwrap();
		assert_eq!(value, Some("value1".to_string()));

		assert!(cache.has_key("key1").await.unwrap());
		assert!(!cache.has_key("key2").await.unwrap());

		cache.delete("key1").await.unwrap();
		let value: Option<String> = cache.fetch("key1").await.unwrap();
		assert_eq!(value, None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_in_memory_cache_ttl() {
		let cache = InMemoryCache::new();

		cache
			.put("key1", &"value1", Some(Duration::from_millis(50)))
			.await
			.unwrap();
		assert!(cache.has_key("key1").await.unwrap());

		tokio::time::sleep(Duration::from_millis(80)).await;

		let value: Option<String> = cache.fetch("key1").await.unwrap();
		assert_eq!(value, None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_clear_prefix_keeps_other_namespaces() {
		// Arrange
		let cache = InMemoryCache::new();
		cache.put("blocks:1:en", &"a", None).await.unwrap();
		cache.put("blocks:2:pl", &"b", None).await.unwrap();
		cache.put("menus:1", &"c", None).await.unwrap();

		// Act
		let removed = cache.clear_prefix("blocks:").await.unwrap();

		// Assert
		assert_eq!(removed, 2);
		assert_eq!(cache.keys().await, vec!["menus:1".to_string()]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_statistics_track_hits_and_misses() {
		// Arrange
		let cache = InMemoryCache::new();
		cache.put("key1", &"value1", None).await.unwrap();

		// Act
		let _: Option<String> = cache.fetch("key1").await.unwrap();
		let _: Option<String> = cache.fetch("key1").await.unwrap();
		let _: Option<String> = cache.fetch("missing").await.unwrap();
		let stats = cache.statistics().await;

		// Assert
		assert_eq!(stats.hits, 2);
		assert_eq!(stats.misses, 1);
		assert_eq!(stats.writes, 1);
		assert_eq!(stats.entry_count, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_clones_share_store() {
		let cache = InMemoryCache::new();
		let other = cache.clone();

		cache.put("key", &1u32, None).await.unwrap();

		let value: Option<u32> = other.fetch("key").await.unwrap();
		assert_eq!(value, Some(1));
	}

	#[rstest]
	#[tokio::test]
	async fn test_cleanup_expired_drops_entries() {
		let cache = InMemoryCache::new();
		cache
			.put("short", &"x", Some(Duration::from_millis(10)))
			.await
			.unwrap();
		cache.put("long", &"y", None).await.unwrap();

		tokio::time::sleep(Duration::from_millis(30)).await;
		cache.cleanup_expired().await;

		assert_eq!(cache.keys().await, vec!["long".to_string()]);
	}
}
