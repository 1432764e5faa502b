//! # Gzero
//!
//! A multi-language content management system: hierarchical content pages,
//! themeable blocks placed into layout regions, and file attachments.
//!
//! This crate is a facade over the workspace crates:
//!
//! - [`cache`] - fragment cache contract and in-memory backend
//! - [`cms`] - dynamic routing, type handlers, block resolution, admin and
//!   public services
//!
//! ## Feature Flags
//!
//! - `cache` - fragment cache only
//! - `cms` - resolution engine (enables `cache`)
//! - `full` (default) - everything
//!
//! ## Quick Start
//!
//! ```rust
//! use gzero::prelude::*;
//! use std::sync::Arc;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let app = CmsApp::builder()
//!         .with_store(Arc::new(MemoryStore::new()))
//!         .build()
//!         .unwrap();
//!
//!     let english = app.languages.default_language();
//!     app.admin
//!         .create_content(CreateContent::new("category", "en", "News"))
//!         .await
//!         .unwrap();
//!
//!     let response = app
//!         .router
//!         .handle_request("news", &english, &RequestContext::new("/news"))
//!         .await
//!         .unwrap();
//!     assert_eq!(response.template, "category.html");
//!     assert!(response.shared.contains_key("blocks"));
//! });
//! ```

#![warn(missing_docs)]

/// Fragment cache
#[cfg(feature = "cache")]
pub use gzero_cache as cache;

/// Resolution engine and services
#[cfg(feature = "cms")]
pub use gzero_cms as cms;

pub mod prelude {
	//! Commonly used items of every enabled crate

	#[cfg(feature = "cache")]
	pub use gzero_cache::{Cache, CacheExt, CacheKeyBuilder, InMemoryCache};

	#[cfg(feature = "cms")]
	pub use gzero_cms::prelude::*;
}
