//! Polymorphic type handlers
//!
//! Every discriminator family has its own capability trait. Concrete
//! handlers are selected per entity by the [`TypeRegistry`](crate::registry::TypeRegistry).

pub mod block;
pub mod cached;
pub mod content;
pub mod file;

pub use block::{BasicBlockHandler, MenuBlockHandler, SliderBlockHandler, WidgetBlockHandler};
pub use cached::CachedBlockHandler;
pub use content::{Breadcrumb, CategoryHandler, ContentHandler, ContentView};
pub use file::AllowListFileHandler;

use crate::context::{RenderedResponse, RequestContext};
use crate::error::CmsResult;
use crate::language::Language;
use crate::models::{Block, BlockKind, Content, ContentKind, File, FileKind};
use crate::render::ViewRenderer;
use crate::repository::{ContentRepository, FileRepository};
use crate::settings::CmsSettings;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Builds a response for a resolved content node
#[async_trait]
pub trait ContentTypeHandler: Send + Sync {
	/// Handler variant
	fn kind(&self) -> ContentKind;

	/// Render `content` in `language`
	async fn handle(
		&self,
		content: &Content,
		language: &Language,
		request: &RequestContext,
	) -> CmsResult<RenderedResponse>;
}

/// Renders a block into an HTML fragment
#[async_trait]
pub trait BlockTypeHandler: Send + Sync {
	/// Handler variant
	fn kind(&self) -> BlockKind;

	/// Render `block` in `language`
	async fn render(&self, block: &Block, language: &Language) -> CmsResult<String>;
}

/// Validates files of one file type
pub trait FileTypeHandler: Send + Sync {
	/// Handler variant
	fn kind(&self) -> FileKind;

	/// Lowercase extensions accepted for this type
	fn allowed_extensions(&self) -> &[String];

	/// Reject extensions missing from the allow-list
	fn validate_extension(&self, extension: &str) -> CmsResult<()>;
}

/// Collaborators shared by the built-in handlers
#[derive(Clone)]
pub struct HandlerContext {
	/// Engine settings
	pub settings: Arc<CmsSettings>,
	/// View renderer
	pub renderer: Arc<ViewRenderer>,
	/// Content lookups (breadcrumbs, children)
	pub contents: Arc<dyn ContentRepository>,
	/// Attached files
	pub files: Arc<dyn FileRepository>,
}

/// Template-facing view of an attached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileView {
	/// File id
	pub id: u64,
	/// Display name
	pub name: String,
	/// Lowercase extension
	pub extension: String,
	/// Public URL
	pub src: String,
}

impl FileView {
	pub(crate) fn new(file: &File, settings: &CmsSettings) -> Self {
		Self {
			id: file.id,
			name: file.name.clone(),
			extension: file.extension.clone(),
			src: settings.file_url(file),
		}
	}
}

pub(crate) fn to_view_data<T: Serialize>(view: &T) -> CmsResult<serde_json::Value> {
	serde_json::to_value(view).map_err(|e| {
		crate::error::CmsError::Template(format!("Cannot serialize view data: {}", e))
	})
}
