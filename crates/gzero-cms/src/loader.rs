//! Block load orchestration
//!
//! On every matched route the loader finds the applicable blocks, renders
//! the visible ones one after another and publishes them to the shared view
//! context under [`BLOCKS_KEY`], grouped by region.

use crate::context::RequestContext;
use crate::error::CmsResult;
use crate::finder::BlockFinder;
use crate::language::Language;
use crate::models::{Region, RenderedBlock};
use crate::registry::TypeRegistry;
use crate::repository::BlockRepository;
use crate::router::{RouteMatched, RouteObserver};
use crate::settings::CmsSettings;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Shared context key of the region map
pub const BLOCKS_KEY: &str = "blocks";

/// Rendered blocks per region, each list in weight order
pub type RegionMap = BTreeMap<Region, Vec<RenderedBlock>>;

/// Renders the blocks of a matched route
pub struct BlockLoader {
	finder: Arc<BlockFinder>,
	blocks: Arc<dyn BlockRepository>,
	registry: Arc<TypeRegistry>,
	settings: Arc<CmsSettings>,
}

impl BlockLoader {
	/// Loader over the shared collaborators
	pub fn new(
		finder: Arc<BlockFinder>,
		blocks: Arc<dyn BlockRepository>,
		registry: Arc<TypeRegistry>,
		settings: Arc<CmsSettings>,
	) -> Self {
		Self {
			finder,
			blocks,
			registry,
			settings,
		}
	}

	/// Render the active blocks applying to `path`, grouped by region
	///
	/// Blocks placed in a region that is not enabled are skipped. A handler
	/// failure aborts the whole load.
	pub async fn load(&self, path: &str, language: &Language, recursive: bool) -> CmsResult<RegionMap> {
		let ids = self.finder.find_block_ids(path, recursive).await?;
		let visible = self.blocks.visible(&ids, true).await?;
		debug!(
			path = path,
			matched = ids.len(),
			visible = visible.len(),
			"Loading blocks"
		);

		let mut regions = RegionMap::new();
		for block in visible {
			if !self.settings.is_region_enabled(block.region) {
				debug!(block_id = block.id, region = %block.region, "Skipping block in disabled region");
				continue;
			}
			let handler = self.registry.block_handler(&block.block_type)?;
			let view = handler.render(&block, language).await?;
			regions
				.entry(block.region)
				.or_default()
				.push(RenderedBlock { block, view });
		}
		Ok(regions)
	}
}

#[async_trait]
impl RouteObserver for BlockLoader {
	async fn on_route_matched(
		&self,
		event: &RouteMatched,
		request: &RequestContext,
	) -> CmsResult<()> {
		let regions = self
			.load(event.path(), event.language(), event.is_recursive())
			.await?;
		request.view().share(BLOCKS_KEY, &regions)
	}
}
