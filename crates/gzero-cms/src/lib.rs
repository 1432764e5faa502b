//! # Gzero CMS
//!
//! Request-time resolution engine of a multi-language content management
//! system: route paths resolve to content nodes, content nodes dispatch to a
//! type specific handler, and the UI blocks that apply to the matched route
//! are rendered and grouped into layout regions.
//!
//! ## Architecture
//!
//! ```text
//! gzero-cms
//! ├── language   - Languages, default language invariant, localized URLs
//! ├── models     - Content / Block / File entities and discriminators
//! ├── settings   - Handler tables, file allow-lists, regions, page size
//! ├── repository - Collaborator contracts + in-memory store
//! ├── handlers   - Content, block (with fragment cache) and file handlers
//! ├── registry   - Discriminator -> handler dispatch table
//! ├── finder     - Block filter index (route path -> block ids)
//! ├── loader     - Renders applicable blocks into region maps
//! ├── router     - Path -> content -> handler -> response, route matched
//! ├── events     - Block mutation events and cache invalidation
//! ├── admin      - Admin operations (CRUD, trash, translations, files)
//! └── public     - Public listing
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gzero_cms::prelude::*;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let app = CmsApp::builder()
//!     .with_store(Arc::new(MemoryStore::new()))
//!     .build()
//!     .unwrap();
//!
//! let english = app.languages.default_language();
//! let page = app
//!     .admin
//!     .create_content(CreateContent::new("content", "en", "About us"))
//!     .await
//!     .unwrap();
//! assert_eq!(page.route.path("en"), Some("about-us"));
//!
//! let response = app
//!     .router
//!     .handle_request("about-us", &english, &RequestContext::new("/about-us"))
//!     .await
//!     .unwrap();
//! assert!(response.body.contains("About us"));
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub use serde;
pub use serde_json;

pub mod admin;
pub mod app;
pub mod context;
pub mod events;
pub mod finder;
pub mod handlers;
pub mod language;
pub mod loader;
pub mod models;
pub mod pagination;
pub mod public;
pub mod registry;
pub mod render;
pub mod repository;
pub mod router;
pub mod settings;

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::admin::{
		AdminService, CreateBlock, CreateBlockTranslation, CreateContent, CreateContentTranslation,
		CreateFile, UpdateBlock, UpdateContent,
	};
	pub use crate::app::{CmsApp, CmsAppBuilder};
	pub use crate::context::{RenderedResponse, RequestContext, ViewContext};
	pub use crate::error::{CmsError, CmsResult, TypeFamily, ValidationErrors};
	pub use crate::events::{BlockCacheInvalidator, BlockEvent, BlockEventListener, EventDispatcher};
	pub use crate::finder::BlockFinder;
	pub use crate::handlers::{BlockTypeHandler, ContentTypeHandler, FileTypeHandler};
	pub use crate::language::{Language, LanguageRegistry};
	pub use crate::loader::{BlockLoader, RegionMap};
	pub use crate::models::{
		Attachable, Block, BlockFilter, BlockKind, Content, ContentKind, File, FileKind, Region,
	};
	pub use crate::public::PublicService;
	pub use crate::registry::TypeRegistry;
	pub use crate::repository::MemoryStore;
	pub use crate::router::{DynamicRouter, RouteMatched, RouteObserver};
	pub use crate::settings::CmsSettings;
}

/// CMS error types
pub mod error {
	use gzero_cache::CacheError;
	use http::StatusCode;
	use serde::Serialize;
	use std::collections::BTreeMap;
	use std::fmt;
	use thiserror::Error;

	/// Family of polymorphic handlers a discriminator belongs to
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
	#[serde(rename_all = "lowercase")]
	pub enum TypeFamily {
		/// Content type handlers
		Content,
		/// Block type handlers
		Block,
		/// File type handlers
		File,
	}

	impl fmt::Display for TypeFamily {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str(match self {
				TypeFamily::Content => "content",
				TypeFamily::Block => "block",
				TypeFamily::File => "file",
			})
		}
	}

	/// Per-field validation messages
	#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
	pub struct ValidationErrors {
		/// Messages keyed by field name
		pub fields: BTreeMap<String, Vec<String>>,
	}

	impl ValidationErrors {
		/// Empty error set
		pub fn new() -> Self {
			Self::default()
		}

		/// Record a message for `field`
		pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
			self.fields
				.entry(field.into())
				.or_default()
				.push(message.into());
		}

		/// Whether no message was recorded
		pub fn is_empty(&self) -> bool {
			self.fields.is_empty()
		}

		/// `Ok(())` when empty, the collected errors otherwise
		pub fn into_result(self) -> CmsResult<()> {
			if self.is_empty() {
				Ok(())
			} else {
				Err(CmsError::Validation(self))
			}
		}
	}

	impl fmt::Display for ValidationErrors {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			let parts: Vec<String> = self
				.fields
				.iter()
				.map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
				.collect();
			f.write_str(&parts.join("; "))
		}
	}

	/// CMS-related errors
	#[derive(Error, Debug)]
	pub enum CmsError {
		/// Path or entity does not resolve to anything visible
		#[error("Not found: {0}")]
		NotFound(String),

		/// Discriminator has no registered handler
		#[error("Unknown {family} type: {discriminator}")]
		UnknownType {
			/// Handler family
			family: TypeFamily,
			/// Offending discriminator
			discriminator: String,
		},

		/// File extension not allowed for the declared file type
		#[error("Extension '{extension}' is not allowed for {file_type} files")]
		FileType {
			/// Declared file type
			file_type: String,
			/// Rejected extension
			extension: String,
		},

		/// Malformed admin payload
		#[error("Validation failed: {0}")]
		Validation(ValidationErrors),

		/// Settings or handler table are inconsistent
		#[error("Configuration error: {0}")]
		Configuration(String),

		/// View rendering failed
		#[error("Template error: {0}")]
		Template(String),

		/// Fragment cache failure
		#[error(transparent)]
		Cache(#[from] CacheError),

		/// Backing store failure
		#[error("Repository error: {0}")]
		Repository(String),
	}

	impl CmsError {
		/// Single field validation error
		pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
			let mut errors = ValidationErrors::new();
			errors.add(field, message);
			CmsError::Validation(errors)
		}

		/// Protocol level status for this error
		pub fn status_code(&self) -> StatusCode {
			match self {
				CmsError::NotFound(_) => StatusCode::NOT_FOUND,
				CmsError::FileType { .. } => StatusCode::UNPROCESSABLE_ENTITY,
				CmsError::Validation(_) => StatusCode::BAD_REQUEST,
				CmsError::UnknownType { .. }
				| CmsError::Configuration(_)
				| CmsError::Template(_)
				| CmsError::Cache(_)
				| CmsError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
			}
		}

		/// Whether operators should be alerted (data/config mismatch)
		pub fn is_operational_alert(&self) -> bool {
			matches!(
				self,
				CmsError::UnknownType { .. } | CmsError::Configuration(_)
			)
		}
	}

	impl From<tera::Error> for CmsError {
		fn from(err: tera::Error) -> Self {
			use std::error::Error as _;

			let mut message = err.to_string();
			let mut source = err.source();
			while let Some(cause) = source {
				message.push_str(": ");
				message.push_str(&cause.to_string());
				source = cause.source();
			}
			CmsError::Template(message)
		}
	}

	/// Result type for CMS operations
	pub type CmsResult<T> = Result<T, CmsError>;

}
