//! Length-aware paginator for rendered listings

use serde::Serialize;

/// One page of items plus what a template needs to render page links
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginator<T> {
	/// Items of the current page
	pub items: Vec<T>,
	/// Number of items across all pages
	pub total: u64,
	/// Items per page
	pub per_page: u32,
	/// 1-based current page
	pub current_page: u32,
	/// Last page number (at least 1)
	pub last_page: u32,
	/// URL page links are built from
	pub base_path: String,
}

impl<T> Paginator<T> {
	/// Build a paginator; `current_page` is clamped to at least 1
	pub fn new(
		items: Vec<T>,
		total: u64,
		per_page: u32,
		current_page: u32,
		base_path: impl Into<String>,
	) -> Self {
		let per_page = per_page.max(1);
		let last_page = total.div_ceil(per_page as u64).max(1) as u32;
		Self {
			items,
			total,
			per_page,
			current_page: current_page.max(1),
			last_page,
			base_path: base_path.into(),
		}
	}

	/// Whether a page follows the current one
	pub fn has_more_pages(&self) -> bool {
		self.current_page < self.last_page
	}

	/// Link to `page`, keeping the base path and its other query parameters
	///
	/// # Examples
	///
	/// ```
	/// use gzero_cms::pagination::Paginator;
	///
	/// let paginator = Paginator::new(vec![1, 2], 5, 2, 1, "/news");
	/// assert_eq!(paginator.url(2), "/news?page=2");
	/// assert_eq!(paginator.last_page, 3);
	///
	/// let filtered = Paginator::new(vec![1], 5, 2, 1, "/news?tag=rust&page=1");
	/// assert_eq!(filtered.url(3), "/news?tag=rust&page=3");
	/// ```
	pub fn url(&self, page: u32) -> String {
		with_query_param(&self.base_path, "page", &page.max(1).to_string())
	}

	/// Carry `key=value` in every page link, replacing a previous value
	pub fn keep_query(mut self, key: &str, value: &str) -> Self {
		self.base_path = with_query_param(&self.base_path, key, value);
		self
	}

	/// Map items, keeping the page metadata
	pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginator<U> {
		Paginator {
			items: self.items.into_iter().map(f).collect(),
			total: self.total,
			per_page: self.per_page,
			current_page: self.current_page,
			last_page: self.last_page,
			base_path: self.base_path,
		}
	}
}

/// `url` with `key` set to `value`, other parameters kept in order
fn with_query_param(url: &str, key: &str, value: &str) -> String {
	let (path, query) = url.split_once('?').unwrap_or((url, ""));
	let prefix = format!("{}=", key);
	let mut pairs: Vec<String> = query
		.split('&')
		.filter(|pair| !pair.is_empty() && *pair != key && !pair.starts_with(&prefix))
		.map(str::to_string)
		.collect();
	pairs.push(format!("{}={}", key, value));
	format!("{}?{}", path, pairs.join("&"))
}
