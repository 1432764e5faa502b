//! Cache statistics

/// Snapshot of the counters kept by a cache backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
	/// Number of cache hits
	pub hits: u64,
	/// Number of cache misses
	pub misses: u64,
	/// Number of writes
	pub writes: u64,
	/// Current number of entries in cache
	pub entry_count: u64,
	/// Approximate memory usage in bytes
	pub memory_usage: u64,
}

impl CacheStatistics {
	/// Total number of reads
	pub fn total_requests(&self) -> u64 {
		self.hits + self.misses
	}

	/// Calculate hit rate (0.0 to 1.0)
	///
	/// # Examples
	///
	/// ```
	/// use gzero_cache::CacheStatistics;
	///
	/// let stats = CacheStatistics {
	///     hits: 3,
	///     misses: 1,
	///     ..Default::default()
	/// };
	///
	/// assert_eq!(stats.hit_rate(), 0.75);
	/// ```
	pub fn hit_rate(&self) -> f64 {
		let total = self.total_requests();
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}
}
