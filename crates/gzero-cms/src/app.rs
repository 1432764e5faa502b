//! Application assembly
//!
//! [`CmsAppBuilder`] wires settings, languages, repositories, the fragment
//! cache and the renderer into a ready [`CmsApp`]: the block loader is the
//! first route observer and the block cache invalidator the first block
//! event listener.

use crate::admin::AdminService;
use crate::error::{CmsError, CmsResult};
use crate::events::{BlockCacheInvalidator, BlockEventListener, EventDispatcher};
use crate::finder::BlockFinder;
use crate::handlers::HandlerContext;
use crate::language::LanguageRegistry;
use crate::loader::BlockLoader;
use crate::public::PublicService;
use crate::registry::TypeRegistry;
use crate::render::ViewRenderer;
use crate::repository::{
	BlockAdminRepository, BlockRepository, ContentAdminRepository, ContentRepository,
	FileAdminRepository, FileRepository,
};
use crate::router::{DynamicRouter, RouteObserver};
use crate::settings::CmsSettings;
use gzero_cache::{Cache, InMemoryCache};
use std::sync::Arc;
use tracing::info;

/// A fully wired CMS
pub struct CmsApp {
	/// Validated settings
	pub settings: Arc<CmsSettings>,
	/// Configured languages
	pub languages: Arc<LanguageRegistry>,
	/// Handler dispatch table
	pub registry: Arc<TypeRegistry>,
	/// Block filter index
	pub finder: Arc<BlockFinder>,
	/// Block load orchestrator
	pub loader: Arc<BlockLoader>,
	/// Dynamic router
	pub router: DynamicRouter,
	/// Admin operations
	pub admin: AdminService,
	/// Public listings
	pub public: PublicService,
	/// Fragment cache
	pub cache: Arc<dyn Cache>,
}

impl CmsApp {
	/// Start configuring an application
	pub fn builder() -> CmsAppBuilder {
		CmsAppBuilder::default()
	}
}

struct Stores {
	contents: Arc<dyn ContentRepository>,
	content_admin: Arc<dyn ContentAdminRepository>,
	blocks: Arc<dyn BlockRepository>,
	block_admin: Arc<dyn BlockAdminRepository>,
	files: Arc<dyn FileRepository>,
	file_admin: Arc<dyn FileAdminRepository>,
}

/// Builder for [`CmsApp`]
#[derive(Default)]
pub struct CmsAppBuilder {
	settings: Option<CmsSettings>,
	languages: Option<LanguageRegistry>,
	cache: Option<Arc<dyn Cache>>,
	renderer: Option<ViewRenderer>,
	stores: Option<Stores>,
	file_reads: Option<Arc<dyn FileRepository>>,
	observers: Vec<Arc<dyn RouteObserver>>,
	listeners: Vec<Arc<dyn BlockEventListener>>,
}

impl CmsAppBuilder {
	/// Use one store for every repository contract
	pub fn with_store<S>(mut self, store: Arc<S>) -> Self
	where
		S: ContentAdminRepository + BlockAdminRepository + FileAdminRepository + 'static,
	{
		self.stores = Some(Stores {
			contents: store.clone(),
			content_admin: store.clone(),
			blocks: store.clone(),
			block_admin: store.clone(),
			files: store.clone(),
			file_admin: store,
		});
		self
	}

	/// Serve attachment reads of the rendering pipeline from `files`
	pub fn with_file_repository(mut self, files: Arc<dyn FileRepository>) -> Self {
		self.file_reads = Some(files);
		self
	}

	/// Use `settings` instead of the defaults
	pub fn with_settings(mut self, settings: CmsSettings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Use `languages` instead of English only
	pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
		self.languages = Some(languages);
		self
	}

	/// Use `cache` as fragment cache instead of a fresh in-memory one
	pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
		self.cache = Some(cache);
		self
	}

	/// Use a renderer with custom templates
	pub fn with_renderer(mut self, renderer: ViewRenderer) -> Self {
		self.renderer = Some(renderer);
		self
	}

	/// Notify `observer` after the block loader on every matched route
	pub fn with_observer(mut self, observer: Arc<dyn RouteObserver>) -> Self {
		self.observers.push(observer);
		self
	}

	/// Notify `listener` after the cache invalidator on every block change
	pub fn with_block_listener(mut self, listener: Arc<dyn BlockEventListener>) -> Self {
		self.listeners.push(listener);
		self
	}

	/// Validate the configuration and wire the application
	pub fn build(self) -> CmsResult<CmsApp> {
		let stores = self.stores.ok_or_else(|| {
			CmsError::Configuration("A repository store is required".to_string())
		})?;
		let settings = self.settings.unwrap_or_default();
		settings.validate()?;
		let settings = Arc::new(settings);
		let languages = Arc::new(self.languages.unwrap_or_default());
		let cache = self
			.cache
			.unwrap_or_else(|| Arc::new(InMemoryCache::new()) as Arc<dyn Cache>);
		let renderer = match self.renderer {
			Some(renderer) => renderer,
			None => ViewRenderer::new()?,
		};
		let file_reads = self.file_reads.unwrap_or_else(|| stores.files.clone());

		let ctx = HandlerContext {
			settings: settings.clone(),
			renderer: Arc::new(renderer),
			contents: stores.contents.clone(),
			files: file_reads,
		};
		let registry = Arc::new(TypeRegistry::with_defaults(ctx, cache.clone())?);

		let finder = Arc::new(BlockFinder::new(stores.blocks.clone()));
		let loader = Arc::new(BlockLoader::new(
			finder.clone(),
			stores.blocks.clone(),
			registry.clone(),
			settings.clone(),
		));

		let mut router =
			DynamicRouter::new(stores.contents.clone(), registry.clone()).with_observer(loader.clone());
		for observer in self.observers {
			router = router.with_observer(observer);
		}

		let mut events = EventDispatcher::new();
		events.connect(Arc::new(BlockCacheInvalidator::new(
			cache.clone(),
			finder.clone(),
		)));
		for listener in self.listeners {
			events.connect(listener);
		}

		let admin = AdminService::new(
			stores.content_admin,
			stores.block_admin,
			stores.file_admin,
			registry.clone(),
			languages.clone(),
			settings.clone(),
			events,
		);
		let public = PublicService::new(stores.contents, settings.clone());

		info!(
			languages = languages.enabled().len(),
			observers = router.observer_count(),
			"CMS application ready"
		);
		Ok(CmsApp {
			settings,
			languages,
			registry,
			finder,
			loader,
			router,
			admin,
			public,
			cache,
		})
	}
}
