//! Namespaced cache keys

/// Builds `namespace:part:part` keys
///
/// # Examples
///
/// ```
/// use gzero_cache::CacheKeyBuilder;
///
/// let keys = CacheKeyBuilder::new("blocks");
/// assert_eq!(keys.build(&[&7, &"en"]), "blocks:7:en");
/// assert_eq!(keys.prefix(), "blocks:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyBuilder {
	namespace: String,
}

impl CacheKeyBuilder {
	/// Create a builder for `namespace`
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
		}
	}

	/// The namespace itself
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Prefix shared by every key of this namespace
	pub fn prefix(&self) -> String {
		format!("{}:", self.namespace)
	}

	/// Join the namespace and `parts` with `:`
	pub fn build(&self, parts: &[&dyn std::fmt::Display]) -> String {
		let mut key = self.namespace.clone();
		for part in parts {
			key.push(':');
			key.push_str(&part.to_string());
		}
		key
	}
}
