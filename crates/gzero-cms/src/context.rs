//! Per-request context and rendered responses

use crate::error::{CmsError, CmsResult};
use http::StatusCode;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Named values shared with the outer page template
///
/// Clones share the same map; route observers publish into it while the
/// router assembles the response.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
	values: Arc<RwLock<Map<String, JsonValue>>>,
}

impl ViewContext {
	/// Empty context
	pub fn new() -> Self {
		Self::default()
	}

	/// Publish `value` under `key`, replacing any previous value
	pub fn share<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CmsResult<()> {
		let value = serde_json::to_value(value)
			.map_err(|e| CmsError::Template(format!("Cannot share '{}': {}", key, e)))?;
		self.values.write().insert(key.to_string(), value);
		Ok(())
	}

	/// Read back a shared value
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let values = self.values.read();
		values
			.get(key)
			.and_then(|value| serde_json::from_value(value.clone()).ok())
	}

	/// Whether `key` was published
	pub fn contains(&self, key: &str) -> bool {
		self.values.read().contains_key(key)
	}

	/// Copy of everything published so far
	pub fn snapshot(&self) -> Map<String, JsonValue> {
		self.values.read().clone()
	}
}

/// What the pipeline needs from the incoming HTTP request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	/// Current URL path, used as pagination base
	pub url: String,
	/// Query string parameters
	pub query: HashMap<String, String>,
	view: ViewContext,
}

impl RequestContext {
	/// Context for `url` without query parameters
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			query: HashMap::new(),
			view: ViewContext::new(),
		}
	}

	/// Add a query parameter
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());
		self
	}

	/// Shared rendering context of this request
	pub fn view(&self) -> &ViewContext {
		&self.view
	}

	/// Requested page number, 1 when absent or malformed
	pub fn page(&self) -> u32 {
		self.query
			.get("page")
			.and_then(|v| v.parse::<u32>().ok())
			.unwrap_or(1)
			.max(1)
	}

	/// Requested page size, `default` when absent or malformed
	pub fn per_page(&self, default: u32) -> u32 {
		self.query
			.get("per_page")
			.and_then(|v| v.parse::<u32>().ok())
			.filter(|n| *n > 0)
			.unwrap_or(default)
	}
}

/// Output of a content type handler
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
	/// HTTP status
	pub status: StatusCode,
	/// Template used for the body
	pub template: String,
	/// Rendered body fragment
	pub body: String,
	/// Data the body was rendered from
	pub data: JsonValue,
	/// Values published to the shared rendering context
	pub shared: Map<String, JsonValue>,
}

impl RenderedResponse {
	/// `200 OK` response
	pub fn ok(template: impl Into<String>, body: String, data: JsonValue) -> Self {
		Self {
			status: StatusCode::OK,
			template: template.into(),
			body,
			data,
			shared: Map::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(None, 1)]
	#[case(Some("3"), 3)]
	#[case(Some("0"), 1)]
	#[case(Some("abc"), 1)]
	fn test_page_parsing(#[case] raw: Option<&str>, #[case] expected: u32) {
		let mut request = RequestContext::new("/news");
		if let Some(raw) = raw {
			request = request.with_query("page", raw);
		}
		assert_eq!(request.page(), expected);
	}

	#[rstest]
	fn test_per_page_falls_back_to_default() {
		let request = RequestContext::new("/").with_query("per_page", "0");
		assert_eq!(request.per_page(15), 15);
		let request = RequestContext::new("/").with_query("per_page", "4");
		assert_eq!(request.per_page(15), 4);
	}

	#[rstest]
	fn test_view_context_is_shared_between_clones() {
		// Arrange
		let request = RequestContext::new("/");
		let view = request.view().clone();

		// Act
		view.share("blocks", &json!({"header": []})).unwrap();

		// Assert
		assert!(request.view().contains("blocks"));
		assert_eq!(
			request.view().snapshot().get("blocks"),
			Some(&json!({"header": []}))
		);
	}
}
