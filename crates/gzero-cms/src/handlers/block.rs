//! Block type handlers

use super::{BlockTypeHandler, FileView, HandlerContext};
use crate::error::CmsResult;
use crate::language::Language;
use crate::models::{Attachable, Block, BlockKind, BlockTranslation, FileKind};
use crate::render::{
	BASIC_BLOCK_TEMPLATE, MENU_BLOCK_TEMPLATE, SLIDER_BLOCK_TEMPLATE, WIDGET_BLOCK_TEMPLATE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct BlockView<'a, E: Serialize> {
	block: &'a Block,
	translation: Option<&'a BlockTranslation>,
	#[serde(flatten)]
	extra: E,
}

fn render_block<E: Serialize>(
	ctx: &HandlerContext,
	template: &str,
	block: &Block,
	language: &Language,
	extra: E,
) -> CmsResult<String> {
	let view = BlockView {
		block,
		translation: block.translation(&language.code),
		extra,
	};
	ctx.renderer.render(template, &view)
}

#[derive(Serialize)]
struct NoExtra {}

/// Title and body from the block translation
pub struct BasicBlockHandler {
	ctx: HandlerContext,
}

impl BasicBlockHandler {
	/// Create the handler
	pub fn new(ctx: HandlerContext) -> Self {
		Self { ctx }
	}
}

#[async_trait]
impl BlockTypeHandler for BasicBlockHandler {
	fn kind(&self) -> BlockKind {
		BlockKind::Basic
	}

	async fn render(&self, block: &Block, language: &Language) -> CmsResult<String> {
		render_block(&self.ctx, BASIC_BLOCK_TEMPLATE, block, language, NoExtra {})
	}
}

/// Menu entry stored in the block options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
	/// Link label
	pub title: String,
	/// Link target
	pub url: String,
}

#[derive(Serialize)]
struct MenuExtra {
	items: Vec<MenuItem>,
}

/// Navigation list built from `options.items`
pub struct MenuBlockHandler {
	ctx: HandlerContext,
}

impl MenuBlockHandler {
	/// Create the handler
	pub fn new(ctx: HandlerContext) -> Self {
		Self { ctx }
	}

	/// Menu entries, empty when the options carry none
	pub fn items(block: &Block) -> Vec<MenuItem> {
		block
			.options
			.get("items")
			.and_then(|items| serde_json::from_value(items.clone()).ok())
			.unwrap_or_default()
	}
}

#[async_trait]
impl BlockTypeHandler for MenuBlockHandler {
	fn kind(&self) -> BlockKind {
		BlockKind::Menu
	}

	async fn render(&self, block: &Block, language: &Language) -> CmsResult<String> {
		let items = Self::items(block);
		render_block(&self.ctx, MENU_BLOCK_TEMPLATE, block, language, MenuExtra { items })
	}
}

#[derive(Serialize)]
struct SliderExtra {
	images: Vec<FileView>,
}

/// Image slider over the block's active image attachments
pub struct SliderBlockHandler {
	ctx: HandlerContext,
}

impl SliderBlockHandler {
	/// Create the handler
	pub fn new(ctx: HandlerContext) -> Self {
		Self { ctx }
	}
}

#[async_trait]
impl BlockTypeHandler for SliderBlockHandler {
	fn kind(&self) -> BlockKind {
		BlockKind::Slider
	}

	async fn render(&self, block: &Block, language: &Language) -> CmsResult<String> {
		let files = self.ctx.files.active_files(Attachable::Block(block.id)).await?;
		let images: Vec<FileView> = files
			.iter()
			.filter(|file| self.ctx.settings.file_kind(file) == Some(FileKind::Image))
			.map(|file| FileView::new(file, &self.ctx.settings))
			.collect();
		debug!(block_id = block.id, images = images.len(), "Loaded slider images");

		render_block(&self.ctx, SLIDER_BLOCK_TEMPLATE, block, language, SliderExtra { images })
	}
}

#[derive(Serialize)]
struct WidgetExtra<'a> {
	widget: Option<&'a str>,
}

/// Named widget placeholder filled by the theme
pub struct WidgetBlockHandler {
	ctx: HandlerContext,
}

impl WidgetBlockHandler {
	/// Create the handler
	pub fn new(ctx: HandlerContext) -> Self {
		Self { ctx }
	}
}

#[async_trait]
impl BlockTypeHandler for WidgetBlockHandler {
	fn kind(&self) -> BlockKind {
		BlockKind::Widget
	}

	async fn render(&self, block: &Block, language: &Language) -> CmsResult<String> {
		let widget = block.options.get("name").and_then(|name| name.as_str());
		render_block(&self.ctx, WIDGET_BLOCK_TEMPLATE, block, language, WidgetExtra { widget })
	}
}
