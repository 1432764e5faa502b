//! Discriminator -> handler dispatch table
//!
//! The registry is assembled once at startup from the configured
//! discriminator tables. Every discriminator must map to a registered
//! handler implementation, otherwise [`TypeRegistryBuilder::build`] fails.
//! Lookups never fall back to a default handler.

use crate::error::{CmsError, CmsResult, TypeFamily};
use crate::handlers::{
	AllowListFileHandler, BasicBlockHandler, BlockTypeHandler, CachedBlockHandler, CategoryHandler,
	ContentHandler, ContentTypeHandler, FileTypeHandler, HandlerContext, MenuBlockHandler,
	SliderBlockHandler, WidgetBlockHandler,
};
use crate::models::{BlockKind, ContentKind};
use gzero_cache::Cache;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, error};

/// A resolved handler of any family
#[derive(Clone)]
pub enum Handler {
	/// Content type handler
	Content(Arc<dyn ContentTypeHandler>),
	/// Block type handler
	Block(Arc<dyn BlockTypeHandler>),
	/// File type handler
	File(Arc<dyn FileTypeHandler>),
}

impl Handler {
	/// Family of the handler
	pub fn family(&self) -> TypeFamily {
		match self {
			Handler::Content(_) => TypeFamily::Content,
			Handler::Block(_) => TypeFamily::Block,
			Handler::File(_) => TypeFamily::File,
		}
	}
}

impl std::fmt::Debug for Handler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Handler::Content(h) => write!(f, "Handler::Content({})", h.kind()),
			Handler::Block(h) => write!(f, "Handler::Block({})", h.kind()),
			Handler::File(h) => write!(f, "Handler::File({})", h.kind()),
		}
	}
}

/// Startup-time dispatch table
pub struct TypeRegistry {
	contents: HashMap<String, Arc<dyn ContentTypeHandler>>,
	blocks: HashMap<String, Arc<dyn BlockTypeHandler>>,
	files: HashMap<String, Arc<dyn FileTypeHandler>>,
}

fn unknown(family: TypeFamily, discriminator: &str) -> CmsError {
	error!(
		family = %family,
		discriminator = discriminator,
		"No handler registered for discriminator"
	);
	CmsError::UnknownType {
		family,
		discriminator: discriminator.to_string(),
	}
}

impl TypeRegistry {
	/// Start an empty registry
	pub fn builder() -> TypeRegistryBuilder {
		TypeRegistryBuilder::default()
	}

	/// Registry with the built-in handlers wired from `ctx.settings`
	///
	/// Block kinds listed in `cacheable_block_types` are wrapped with
	/// [`CachedBlockHandler`] over `cache`.
	pub fn with_defaults(ctx: HandlerContext, cache: Arc<dyn Cache>) -> CmsResult<Self> {
		let settings = Arc::clone(&ctx.settings);
		let mut builder = Self::builder()
			.content_kind(Arc::new(ContentHandler::new(ctx.clone())))
			.content_kind(Arc::new(CategoryHandler::new(ctx.clone())))
			.block_kind(Arc::new(BasicBlockHandler::new(ctx.clone())))
			.block_kind(Arc::new(MenuBlockHandler::new(ctx.clone())))
			.block_kind(Arc::new(SliderBlockHandler::new(ctx.clone())))
			.block_kind(Arc::new(WidgetBlockHandler::new(ctx)))
			.cache(cache, settings.cacheable_block_types.iter().copied());

		for (discriminator, kind) in &settings.content_types {
			builder = builder.content_type(discriminator.as_str(), *kind);
		}
		for (discriminator, kind) in &settings.block_types {
			builder = builder.block_type(discriminator.as_str(), *kind);
		}
		for (discriminator, kind) in &settings.file_types {
			builder = builder.file_type(
				discriminator.as_str(),
				Arc::new(AllowListFileHandler::new(
					*kind,
					discriminator.as_str(),
					settings.extensions_for(discriminator),
				)),
			);
		}
		builder.build()
	}

	/// Handler for a content discriminator
	pub fn content_handler(&self, discriminator: &str) -> CmsResult<Arc<dyn ContentTypeHandler>> {
		self.contents
			.get(discriminator)
			.cloned()
			.ok_or_else(|| unknown(TypeFamily::Content, discriminator))
	}

	/// Handler for a block discriminator
	pub fn block_handler(&self, discriminator: &str) -> CmsResult<Arc<dyn BlockTypeHandler>> {
		self.blocks
			.get(discriminator)
			.cloned()
			.ok_or_else(|| unknown(TypeFamily::Block, discriminator))
	}

	/// Handler for a file discriminator
	pub fn file_handler(&self, discriminator: &str) -> CmsResult<Arc<dyn FileTypeHandler>> {
		self.files
			.get(discriminator)
			.cloned()
			.ok_or_else(|| unknown(TypeFamily::File, discriminator))
	}

	/// Resolve a discriminator of any family
	pub fn resolve(&self, family: TypeFamily, discriminator: &str) -> CmsResult<Handler> {
		match family {
			TypeFamily::Content => self.content_handler(discriminator).map(Handler::Content),
			TypeFamily::Block => self.block_handler(discriminator).map(Handler::Block),
			TypeFamily::File => self.file_handler(discriminator).map(Handler::File),
		}
	}

	/// Whether `discriminator` is registered in `family`
	pub fn contains(&self, family: TypeFamily, discriminator: &str) -> bool {
		match family {
			TypeFamily::Content => self.contents.contains_key(discriminator),
			TypeFamily::Block => self.blocks.contains_key(discriminator),
			TypeFamily::File => self.files.contains_key(discriminator),
		}
	}

	/// Registered discriminators of `family`, sorted
	pub fn discriminators(&self, family: TypeFamily) -> Vec<String> {
		let mut keys: Vec<String> = match family {
			TypeFamily::Content => self.contents.keys().cloned().collect(),
			TypeFamily::Block => self.blocks.keys().cloned().collect(),
			TypeFamily::File => self.files.keys().cloned().collect(),
		};
		keys.sort();
		keys
	}
}

/// Collects handler implementations and discriminator tables
#[derive(Default)]
pub struct TypeRegistryBuilder {
	content_kinds: HashMap<ContentKind, Arc<dyn ContentTypeHandler>>,
	block_kinds: HashMap<BlockKind, Arc<dyn BlockTypeHandler>>,
	content_types: BTreeMap<String, ContentKind>,
	block_types: BTreeMap<String, BlockKind>,
	files: HashMap<String, Arc<dyn FileTypeHandler>>,
	cache: Option<(Arc<dyn Cache>, BTreeSet<BlockKind>)>,
}

impl TypeRegistryBuilder {
	/// Register the implementation of a content kind, replacing any previous one
	pub fn content_kind(mut self, handler: Arc<dyn ContentTypeHandler>) -> Self {
		self.content_kinds.insert(handler.kind(), handler);
		self
	}

	/// Register the implementation of a block kind, replacing any previous one
	pub fn block_kind(mut self, handler: Arc<dyn BlockTypeHandler>) -> Self {
		self.block_kinds.insert(handler.kind(), handler);
		self
	}

	/// Map a content discriminator to a kind
	pub fn content_type(mut self, discriminator: impl Into<String>, kind: ContentKind) -> Self {
		self.content_types.insert(discriminator.into(), kind);
		self
	}

	/// Map a block discriminator to a kind
	pub fn block_type(mut self, discriminator: impl Into<String>, kind: BlockKind) -> Self {
		self.block_types.insert(discriminator.into(), kind);
		self
	}

	/// Register the handler of a file discriminator
	pub fn file_type(
		mut self,
		discriminator: impl Into<String>,
		handler: Arc<dyn FileTypeHandler>,
	) -> Self {
		self.files.insert(discriminator.into(), handler);
		self
	}

	/// Wrap the given block kinds with the fragment cache
	pub fn cache(
		mut self,
		cache: Arc<dyn Cache>,
		kinds: impl IntoIterator<Item = BlockKind>,
	) -> Self {
		self.cache = Some((cache, kinds.into_iter().collect()));
		self
	}

	/// Check completeness and assemble the registry
	pub fn build(self) -> CmsResult<TypeRegistry> {
		let mut contents = HashMap::new();
		for (discriminator, kind) in self.content_types {
			let handler = self.content_kinds.get(&kind).ok_or_else(|| {
				CmsError::Configuration(format!(
					"Content type '{}' maps to '{}' which has no registered handler",
					discriminator, kind
				))
			})?;
			contents.insert(discriminator, Arc::clone(handler));
		}

		let mut decorated: HashMap<BlockKind, Arc<dyn BlockTypeHandler>> = HashMap::new();
		for (kind, handler) in self.block_kinds {
			let handler = match &self.cache {
				Some((cache, cacheable)) if cacheable.contains(&kind) => {
					Arc::new(CachedBlockHandler::new(handler, Arc::clone(cache)))
						as Arc<dyn BlockTypeHandler>
				}
				_ => handler,
			};
			decorated.insert(kind, handler);
		}

		let mut blocks = HashMap::new();
		for (discriminator, kind) in self.block_types {
			let handler = decorated.get(&kind).ok_or_else(|| {
				CmsError::Configuration(format!(
					"Block type '{}' maps to '{}' which has no registered handler",
					discriminator, kind
				))
			})?;
			blocks.insert(discriminator, Arc::clone(handler));
		}

		debug!(
			content_types = contents.len(),
			block_types = blocks.len(),
			file_types = self.files.len(),
			"Type registry assembled"
		);
		Ok(TypeRegistry {
			contents,
			blocks,
			files: self.files,
		})
	}
}
