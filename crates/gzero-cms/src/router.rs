//! Dynamic router
//!
//! Resolves a request path to a content node, dispatches it to the content
//! type handler and then notifies the registered route observers. Observers
//! run in registration order, exactly once per successfully resolved
//! request, and never on the not-found path.

use crate::context::{RenderedResponse, RequestContext};
use crate::error::{CmsError, CmsResult};
use crate::language::Language;
use crate::models::{Content, normalize_path};
use crate::registry::TypeRegistry;
use crate::repository::ContentRepository;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, warn};

/// Notification fired once a request path is resolved
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatched {
	/// A named application route (homepage, search, ...)
	Static {
		/// Route name
		name: String,
		/// Normalized request path
		path: String,
		/// Request language
		language: Language,
	},
	/// A content route
	Dynamic {
		/// The resolved content
		content: Box<Content>,
		/// Normalized request path
		path: String,
		/// Request language
		language: Language,
	},
}

impl RouteMatched {
	/// Normalized request path
	pub fn path(&self) -> &str {
		match self {
			RouteMatched::Static { path, .. } | RouteMatched::Dynamic { path, .. } => path,
		}
	}

	/// Request language
	pub fn language(&self) -> &Language {
		match self {
			RouteMatched::Static { language, .. } | RouteMatched::Dynamic { language, .. } => {
				language
			}
		}
	}

	/// Resolved content of a dynamic route
	pub fn content(&self) -> Option<&Content> {
		match self {
			RouteMatched::Dynamic { content, .. } => Some(content.as_ref()),
			RouteMatched::Static { .. } => None,
		}
	}

	/// Content routes also pick up blocks targeting their ancestors' subtrees
	pub fn is_recursive(&self) -> bool {
		matches!(self, RouteMatched::Dynamic { .. })
	}
}

/// Reacts to resolved routes before the response is returned
#[async_trait]
pub trait RouteObserver: Send + Sync {
	/// Called once per resolved route; errors abort the request
	async fn on_route_matched(&self, event: &RouteMatched, request: &RequestContext)
	-> CmsResult<()>;
}

/// Path -> content -> handler -> response
pub struct DynamicRouter {
	contents: Arc<dyn ContentRepository>,
	registry: Arc<TypeRegistry>,
	observers: Vec<Arc<dyn RouteObserver>>,
}

impl DynamicRouter {
	/// Router without observers
	pub fn new(contents: Arc<dyn ContentRepository>, registry: Arc<TypeRegistry>) -> Self {
		Self {
			contents,
			registry,
			observers: Vec::new(),
		}
	}

	/// Append an observer; observers are notified in insertion order
	pub fn with_observer(mut self, observer: Arc<dyn RouteObserver>) -> Self {
		self.observers.push(observer);
		self
	}

	/// Number of registered observers
	pub fn observer_count(&self) -> usize {
		self.observers.len()
	}

	async fn notify(&self, event: &RouteMatched, request: &RequestContext) -> CmsResult<()> {
		for observer in &self.observers {
			observer.on_route_matched(event, request).await?;
		}
		Ok(())
	}

	/// Resolve `path` in `language` and render the matching content
	///
	/// Fails with [`CmsError::NotFound`] when no active content owns the
	/// path, and with [`CmsError::UnknownType`] when the content type has no
	/// handler. In both cases no observer is notified.
	pub async fn handle_request(
		&self,
		path: &str,
		language: &Language,
		request: &RequestContext,
	) -> CmsResult<RenderedResponse> {
		let path = normalize_path(path);
		debug!(path = %path, language = %language.code, "Resolving dynamic route");

		let content = match self.contents.find_by_path(&path, &language.code).await? {
			Some(content) if content.is_active => content,
			Some(content) => {
				warn!(path = %path, content_id = content.id, "Route resolves to inactive content");
				return Err(CmsError::NotFound(path));
			}
			None => {
				warn!(path = %path, language = %language.code, "No content for route");
				return Err(CmsError::NotFound(path));
			}
		};

		let handler = self.registry.content_handler(&content.content_type)?;
		debug!(
			content_id = content.id,
			content_type = %content.content_type,
			handler = %handler.kind(),
			"Dispatching content"
		);
		let mut response = handler.handle(&content, language, request).await?;

		let event = RouteMatched::Dynamic {
			content: Box::new(content),
			path,
			language: language.clone(),
		};
		self.notify(&event, request).await?;

		response.shared = request.view().snapshot();
		Ok(response)
	}

	/// Announce a named application route
	///
	/// Returns what the observers published to the shared context.
	pub async fn handle_static(
		&self,
		name: &str,
		path: &str,
		language: &Language,
		request: &RequestContext,
	) -> CmsResult<Map<String, JsonValue>> {
		let event = RouteMatched::Static {
			name: name.to_string(),
			path: normalize_path(path),
			language: language.clone(),
		};
		debug!(route = name, path = %event.path(), "Static route matched");
		self.notify(&event, request).await?;
		Ok(request.view().snapshot())
	}
}
