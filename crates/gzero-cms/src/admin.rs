//! Admin operations
//!
//! The operations behind the admin endpoints for contents, blocks and files.
//! Payloads are validated here and rejected with per-field messages; every
//! block mutation is announced to the registered [`BlockEventListener`]s.
//!
//! [`BlockEventListener`]: crate::events::BlockEventListener

use crate::error::{CmsError, CmsResult, TypeFamily, ValidationErrors};
use crate::events::{BlockEvent, EventDispatcher};
use crate::language::LanguageRegistry;
use crate::models::{
	Attachable, Block, BlockFilter, BlockId, BlockTranslation, Content, ContentId,
	ContentTranslation, File, FileId, Region, normalize_path,
};
use crate::repository::{
	BlockAdminRepository, ContentAdminRepository, ContentQuery, FileAdminRepository, QueryPage,
};
use crate::registry::TypeRegistry;
use crate::settings::CmsSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

fn default_true() -> bool {
	true
}

/// New content with its first translation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContent {
	/// Content discriminator
	#[serde(rename = "type")]
	pub content_type: String,
	/// Parent node
	#[serde(default)]
	pub parent_id: Option<ContentId>,
	/// Language of the first translation
	pub language_code: String,
	/// Title, also the source of the route slug
	pub title: String,
	/// Teaser HTML
	#[serde(default)]
	pub teaser: Option<String>,
	/// Body HTML
	#[serde(default)]
	pub body: Option<String>,
	/// SEO title
	#[serde(default)]
	pub seo_title: Option<String>,
	/// SEO description
	#[serde(default)]
	pub seo_description: Option<String>,
	/// Sort key among siblings
	#[serde(default)]
	pub weight: i32,
	/// Theme identifier
	#[serde(default)]
	pub theme: Option<String>,
	/// Listed on the homepage
	#[serde(default)]
	pub is_on_home: bool,
	/// Comments enabled
	#[serde(default)]
	pub is_comment_allowed: bool,
	/// Promoted
	#[serde(default)]
	pub is_promoted: bool,
	/// Sticky
	#[serde(default)]
	pub is_sticky: bool,
	/// Active
	#[serde(default = "default_true")]
	pub is_active: bool,
	/// Publication date, now when absent
	#[serde(default)]
	pub published_at: Option<DateTime<Utc>>,
}

impl CreateContent {
	/// Active root content with a title
	pub fn new(
		content_type: impl Into<String>,
		language_code: impl Into<String>,
		title: impl Into<String>,
	) -> Self {
		Self {
			content_type: content_type.into(),
			parent_id: None,
			language_code: language_code.into(),
			title: title.into(),
			teaser: None,
			body: None,
			seo_title: None,
			seo_description: None,
			weight: 0,
			theme: None,
			is_on_home: false,
			is_comment_allowed: false,
			is_promoted: false,
			is_sticky: false,
			is_active: true,
			published_at: None,
		}
	}

	/// Place under `parent_id`
	pub fn parent(mut self, parent_id: ContentId) -> Self {
		self.parent_id = Some(parent_id);
		self
	}
}

/// Partial content update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContent {
	/// Sort key
	pub weight: Option<i32>,
	/// Theme identifier
	pub theme: Option<String>,
	/// Thumbnail
	pub thumb_id: Option<FileId>,
	/// Rating
	pub rating: Option<u32>,
	/// Homepage flag
	pub is_on_home: Option<bool>,
	/// Comments flag
	pub is_comment_allowed: Option<bool>,
	/// Promoted flag
	pub is_promoted: Option<bool>,
	/// Sticky flag
	pub is_sticky: Option<bool>,
	/// Active flag
	pub is_active: Option<bool>,
	/// Publication date
	pub published_at: Option<DateTime<Utc>>,
}

/// New content translation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentTranslation {
	/// Language code
	pub language_code: String,
	/// Title
	pub title: String,
	/// Teaser HTML
	#[serde(default)]
	pub teaser: Option<String>,
	/// Body HTML
	#[serde(default)]
	pub body: Option<String>,
	/// SEO title
	#[serde(default)]
	pub seo_title: Option<String>,
	/// SEO description
	#[serde(default)]
	pub seo_description: Option<String>,
}

impl CreateContentTranslation {
	/// Translation with a title only
	pub fn new(language_code: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			language_code: language_code.into(),
			title: title.into(),
			teaser: None,
			body: None,
			seo_title: None,
			seo_description: None,
		}
	}
}

/// New block with its first translation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlock {
	/// Block discriminator
	#[serde(rename = "type")]
	pub block_type: String,
	/// Region name (camelCase)
	pub region: String,
	/// Theme identifier
	#[serde(default)]
	pub theme: Option<String>,
	/// Sort key within the region
	#[serde(default)]
	pub weight: i32,
	/// Route filter, `None` shows the block everywhere
	#[serde(default)]
	pub filter: Option<BlockFilter>,
	/// Type specific options
	#[serde(default)]
	pub options: JsonValue,
	/// Active
	#[serde(default = "default_true")]
	pub is_active: bool,
	/// Use the fragment cache
	#[serde(default)]
	pub is_cacheable: bool,
	/// Language of the first translation
	pub language_code: String,
	/// Title
	pub title: String,
	/// Body HTML
	#[serde(default)]
	pub body: Option<String>,
	/// Free form fields
	#[serde(default)]
	pub custom_fields: JsonValue,
}

impl CreateBlock {
	/// Active block shown everywhere
	pub fn new(
		block_type: impl Into<String>,
		region: impl Into<String>,
		language_code: impl Into<String>,
		title: impl Into<String>,
	) -> Self {
		Self {
			block_type: block_type.into(),
			region: region.into(),
			theme: None,
			weight: 0,
			filter: None,
			options: JsonValue::Null,
			is_active: true,
			is_cacheable: false,
			language_code: language_code.into(),
			title: title.into(),
			body: None,
			custom_fields: JsonValue::Null,
		}
	}
}

/// Partial block update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBlock {
	/// Region name (camelCase)
	pub region: Option<String>,
	/// Theme identifier
	pub theme: Option<String>,
	/// Sort key
	pub weight: Option<i32>,
	/// Replace the route filter; `Some(None)` removes it
	pub filter: Option<Option<BlockFilter>>,
	/// Type specific options
	pub options: Option<JsonValue>,
	/// Active flag
	pub is_active: Option<bool>,
	/// Fragment cache flag
	pub is_cacheable: Option<bool>,
}

/// New block translation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlockTranslation {
	/// Language code
	pub language_code: String,
	/// Title
	pub title: String,
	/// Body HTML
	#[serde(default)]
	pub body: Option<String>,
	/// Free form fields
	#[serde(default)]
	pub custom_fields: JsonValue,
}

impl CreateBlockTranslation {
	/// Translation with a title and body
	pub fn new(
		language_code: impl Into<String>,
		title: impl Into<String>,
		body: Option<String>,
	) -> Self {
		Self {
			language_code: language_code.into(),
			title: title.into(),
			body,
			custom_fields: JsonValue::Null,
		}
	}
}

/// Metadata of an uploaded file
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFile {
	/// File discriminator
	#[serde(rename = "type")]
	pub file_type: String,
	/// Name without extension
	pub name: String,
	/// Extension, with or without the leading dot
	pub extension: String,
	/// Size in bytes
	#[serde(default)]
	pub size: u64,
	/// MIME type
	#[serde(default)]
	pub mime_type: String,
	/// Active
	#[serde(default = "default_true")]
	pub is_active: bool,
}

impl CreateFile {
	/// Active file record
	pub fn new(
		file_type: impl Into<String>,
		name: impl Into<String>,
		extension: impl Into<String>,
	) -> Self {
		Self {
			file_type: file_type.into(),
			name: name.into(),
			extension: extension.into(),
			size: 0,
			mime_type: String::new(),
			is_active: true,
		}
	}
}

/// Node of the admin content tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTreeNode {
	/// The content
	pub content: Content,
	/// Direct children, ordered like category listings
	pub children: Vec<ContentTreeNode>,
}

/// URL slug of a title: lowercase words joined with dashes
///
/// # Examples
///
/// ```
/// use gzero_cms::admin::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Zażółć gęślą "), "zażółć-gęślą");
/// ```
pub fn slugify(title: &str) -> String {
	let mut slug = String::with_capacity(title.len());
	let mut pending_dash = false;
	for ch in title.chars() {
		if ch.is_alphanumeric() {
			if pending_dash && !slug.is_empty() {
				slug.push('-');
			}
			pending_dash = false;
			slug.extend(ch.to_lowercase());
		} else {
			pending_dash = true;
		}
	}
	slug
}

fn is_valid_route_path(path: &str) -> bool {
	!path.is_empty()
		&& path
			.chars()
			.all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '/' | '.'))
}

/// Admin service over the writable repositories
pub struct AdminService {
	contents: Arc<dyn ContentAdminRepository>,
	blocks: Arc<dyn BlockAdminRepository>,
	files: Arc<dyn FileAdminRepository>,
	registry: Arc<TypeRegistry>,
	languages: Arc<LanguageRegistry>,
	settings: Arc<CmsSettings>,
	events: EventDispatcher,
}

impl AdminService {
	/// Assemble the service
	pub fn new(
		contents: Arc<dyn ContentAdminRepository>,
		blocks: Arc<dyn BlockAdminRepository>,
		files: Arc<dyn FileAdminRepository>,
		registry: Arc<TypeRegistry>,
		languages: Arc<LanguageRegistry>,
		settings: Arc<CmsSettings>,
		events: EventDispatcher,
	) -> Self {
		Self {
			contents,
			blocks,
			files,
			registry,
			languages,
			settings,
			events,
		}
	}

	fn check_language(&self, errors: &mut ValidationErrors, code: &str) {
		if !self.languages.is_enabled(code) {
			errors.add("language_code", format!("Unknown language '{}'", code));
		}
	}

	fn check_title(errors: &mut ValidationErrors, title: &str) {
		if title.trim().is_empty() {
			errors.add("title", "The title is required");
		}
	}

	fn check_type(&self, errors: &mut ValidationErrors, family: TypeFamily, discriminator: &str) {
		if !self.registry.contains(family, discriminator) {
			errors.add("type", format!("Unknown {} type '{}'", family, discriminator));
		}
	}

	fn parse_region(&self, errors: &mut ValidationErrors, raw: &str) -> Option<Region> {
		match raw.parse::<Region>() {
			Ok(region) if self.settings.is_region_enabled(region) => Some(region),
			Ok(region) => {
				errors.add("region", format!("Region '{}' is not enabled", region));
				None
			}
			Err(_) => {
				errors.add("region", format!("Unknown region '{}'", raw));
				None
			}
		}
	}

	// Contents

	/// One page of contents matching `query`
	pub async fn list_contents(&self, query: &ContentQuery) -> CmsResult<QueryPage<Content>> {
		self.contents.query(query).await
	}

	/// Content by id
	pub async fn show_content(&self, id: ContentId) -> CmsResult<Content> {
		self.contents
			.find(id)
			.await?
			.ok_or_else(|| CmsError::NotFound(format!("content {}", id)))
	}

	async fn unique_route(
		&self,
		parent: Option<&Content>,
		language_code: &str,
		title: &str,
		except: Option<ContentId>,
	) -> CmsResult<String> {
		let slug = slugify(title);
		let base = match parent.and_then(|p| p.route.path(language_code)) {
			Some(parent_path) if !parent_path.is_empty() => format!("{}/{}", parent_path, slug),
			_ => slug,
		};

		let mut candidate = base.clone();
		let mut suffix = 1;
		while self
			.contents
			.route_exists(&candidate, language_code, except)
			.await?
		{
			candidate = format!("{}-{}", base, suffix);
			suffix += 1;
		}
		Ok(candidate)
	}

	/// Create a content, its first translation and its route
	pub async fn create_content(&self, input: CreateContent) -> CmsResult<Content> {
		let mut errors = ValidationErrors::new();
		self.check_type(&mut errors, TypeFamily::Content, &input.content_type);
		self.check_language(&mut errors, &input.language_code);
		Self::check_title(&mut errors, &input.title);
		if !input.title.trim().is_empty() && slugify(&input.title).is_empty() {
			errors.add("title", "The title must contain letters or digits");
		}
		let parent = match input.parent_id {
			Some(parent_id) => {
				let parent = self.contents.find(parent_id).await?;
				if parent.is_none() {
					errors.add("parent_id", format!("Parent content {} does not exist", parent_id));
				}
				parent
			}
			None => None,
		};
		errors.into_result()?;

		let path = self
			.unique_route(parent.as_ref(), &input.language_code, &input.title, None)
			.await?;

		let mut content = Content::new(input.content_type);
		content.parent_id = input.parent_id;
		content.weight = input.weight;
		content.theme = input.theme;
		content.is_on_home = input.is_on_home;
		content.is_comment_allowed = input.is_comment_allowed;
		content.is_promoted = input.is_promoted;
		content.is_sticky = input.is_sticky;
		content.is_active = input.is_active;
		if input.published_at.is_some() {
			content.published_at = input.published_at;
		}
		let mut translation = ContentTranslation::new(&input.language_code, input.title.trim());
		translation.teaser = input.teaser;
		translation.body = input.body;
		translation.seo_title = input.seo_title;
		translation.seo_description = input.seo_description;
		content.translations.push(translation);
		content.route.set_path(&input.language_code, &path);

		let content = self.contents.insert(content).await?;
		info!(content_id = content.id, path = %path, "Content created");
		Ok(content)
	}

	/// Apply a partial update
	pub async fn update_content(&self, id: ContentId, input: UpdateContent) -> CmsResult<Content> {
		let mut content = self.show_content(id).await?;
		if let Some(weight) = input.weight {
			content.weight = weight;
		}
		if let Some(theme) = input.theme {
			content.theme = Some(theme);
		}
		if let Some(thumb_id) = input.thumb_id {
			if self.files.find(thumb_id).await?.is_none() {
				return Err(CmsError::validation(
					"thumb_id",
					format!("File {} does not exist", thumb_id),
				));
			}
			content.thumb_id = Some(thumb_id);
		}
		if let Some(rating) = input.rating {
			content.rating = rating;
		}
		if let Some(flag) = input.is_on_home {
			content.is_on_home = flag;
		}
		if let Some(flag) = input.is_comment_allowed {
			content.is_comment_allowed = flag;
		}
		if let Some(flag) = input.is_promoted {
			content.is_promoted = flag;
		}
		if let Some(flag) = input.is_sticky {
			content.is_sticky = flag;
		}
		if let Some(flag) = input.is_active {
			content.is_active = flag;
		}
		if let Some(published_at) = input.published_at {
			content.published_at = Some(published_at);
		}
		self.contents.save(&content).await?;
		info!(content_id = id, "Content updated");
		self.show_content(id).await
	}

	/// Move a content and its descendants to the trash
	pub async fn delete_content(&self, id: ContentId) -> CmsResult<Vec<ContentId>> {
		let ids = self.contents.soft_delete(id).await?;
		info!(content_id = id, affected = ids.len(), "Content trashed");
		Ok(ids)
	}

	/// Trashed contents
	pub async fn deleted_contents(&self, page: u32, per_page: u32) -> CmsResult<QueryPage<Content>> {
		let per_page = if per_page == 0 {
			self.settings.default_page_size
		} else {
			per_page
		};
		self.contents.trashed(page, per_page).await
	}

	/// Restore a trashed content and its descendants
	pub async fn restore_content(&self, id: ContentId) -> CmsResult<Vec<ContentId>> {
		let ids = self.contents.restore(id).await?;
		info!(content_id = id, affected = ids.len(), "Content restored");
		Ok(ids)
	}

	/// Permanently remove a content and its descendants
	pub async fn force_delete_content(&self, id: ContentId) -> CmsResult<Vec<ContentId>> {
		let ids = self.contents.force_delete(id).await?;
		info!(content_id = id, affected = ids.len(), "Content removed");
		Ok(ids)
	}

	/// Nested content tree, optionally limited to one discriminator
	///
	/// Nodes whose parent is filtered out become roots.
	pub async fn content_tree(&self, content_type: Option<&str>) -> CmsResult<Vec<ContentTreeNode>> {
		let mut contents = self.contents.all().await?;
		if let Some(content_type) = content_type {
			contents.retain(|c| c.content_type == content_type);
		}
		let order = crate::repository::ContentOrder::default();
		contents.sort_by(|a, b| order.compare(a, b));

		let ids: std::collections::BTreeSet<ContentId> = contents.iter().map(|c| c.id).collect();
		let mut by_parent: BTreeMap<Option<ContentId>, Vec<Content>> = BTreeMap::new();
		for content in contents {
			let parent = content.parent_id.filter(|id| ids.contains(id));
			by_parent.entry(parent).or_default().push(content);
		}

		fn attach(
			parent: Option<ContentId>,
			by_parent: &mut BTreeMap<Option<ContentId>, Vec<Content>>,
		) -> Vec<ContentTreeNode> {
			by_parent
				.remove(&parent)
				.unwrap_or_default()
				.into_iter()
				.map(|content| {
					let children = attach(Some(content.id), by_parent);
					ContentTreeNode { content, children }
				})
				.collect()
		}
		Ok(attach(None, &mut by_parent))
	}

	/// Direct children of a content, active or not
	pub async fn content_children(
		&self,
		id: ContentId,
		page: u32,
		per_page: u32,
	) -> CmsResult<QueryPage<Content>> {
		self.show_content(id).await?;
		let mut query = ContentQuery::active_children(id, per_page.max(1)).page(page);
		query.filter.is_active = None;
		self.contents.query(&query).await
	}

	/// Replace the route path of a content in one language
	pub async fn update_route(
		&self,
		id: ContentId,
		language_code: &str,
		path: &str,
	) -> CmsResult<Content> {
		let mut content = self.show_content(id).await?;
		let path = normalize_path(path);

		let mut errors = ValidationErrors::new();
		self.check_language(&mut errors, language_code);
		if path.is_empty() {
			errors.add("path", "The path is required");
		} else if !is_valid_route_path(&path) {
			errors.add("path", "The path may only contain letters, digits, '-', '_', '.' and '/'");
		} else if self
			.contents
			.route_exists(&path, language_code, Some(id))
			.await?
		{
			errors.add("path", format!("The path '{}' is already taken", path));
		}
		errors.into_result()?;

		content.route.set_path(language_code, &path);
		self.contents.save(&content).await?;
		info!(content_id = id, language = language_code, path = %path, "Route updated");
		self.show_content(id).await
	}

	/// Every translation of a content, inactive ones included
	pub async fn content_translations(&self, id: ContentId) -> CmsResult<Vec<ContentTranslation>> {
		Ok(self.show_content(id).await?.translations)
	}

	/// Add a translation; it supersedes the active one of the same language
	///
	/// A route is created for the language when the content has none yet.
	pub async fn create_content_translation(
		&self,
		id: ContentId,
		input: CreateContentTranslation,
	) -> CmsResult<ContentTranslation> {
		let mut content = self.show_content(id).await?;
		let mut errors = ValidationErrors::new();
		self.check_language(&mut errors, &input.language_code);
		Self::check_title(&mut errors, &input.title);
		errors.into_result()?;

		for existing in content
			.translations
			.iter_mut()
			.filter(|t| t.language_code == input.language_code)
		{
			existing.is_active = false;
		}
		let mut translation = ContentTranslation::new(&input.language_code, input.title.trim());
		translation.teaser = input.teaser;
		translation.body = input.body;
		translation.seo_title = input.seo_title;
		translation.seo_description = input.seo_description;
		content.translations.push(translation.clone());

		if content.route.path(&input.language_code).is_none() && !slugify(&input.title).is_empty() {
			let parent = match content.parent_id {
				Some(parent_id) => self.contents.find(parent_id).await?,
				None => None,
			};
			let path = self
				.unique_route(parent.as_ref(), &input.language_code, &input.title, Some(id))
				.await?;
			content.route.set_path(&input.language_code, &path);
		}

		self.contents.save(&content).await?;
		info!(
			content_id = id,
			language = %input.language_code,
			"Content translation created"
		);
		Ok(translation)
	}

	/// Remove a translation
	pub async fn delete_content_translation(&self, id: ContentId, translation_id: Uuid) -> CmsResult<()> {
		let mut content = self.show_content(id).await?;
		let before = content.translations.len();
		content.translations.retain(|t| t.id != translation_id);
		if content.translations.len() == before {
			return Err(CmsError::NotFound(format!(
				"translation {} of content {}",
				translation_id, id
			)));
		}
		self.contents.save(&content).await?;
		info!(content_id = id, %translation_id, "Content translation deleted");
		Ok(())
	}

	/// Replace the files attached to a content (`(file, weight)` pairs)
	pub async fn sync_content_files(&self, id: ContentId, files: &[(FileId, i32)]) -> CmsResult<Vec<File>> {
		self.show_content(id).await?;
		let owner = Attachable::Content(id);
		self.files.sync(owner, files).await?;
		self.files.attached(owner).await
	}

	// Blocks

	/// Every block, by region then weight
	pub async fn list_blocks(&self) -> CmsResult<Vec<Block>> {
		self.blocks.all().await
	}

	/// Block by id
	pub async fn show_block(&self, id: BlockId) -> CmsResult<Block> {
		self.blocks
			.find(id)
			.await?
			.ok_or_else(|| CmsError::NotFound(format!("block {}", id)))
	}

	/// Create a block with its first translation
	pub async fn create_block(&self, input: CreateBlock) -> CmsResult<Block> {
		let mut errors = ValidationErrors::new();
		self.check_type(&mut errors, TypeFamily::Block, &input.block_type);
		let region = self.parse_region(&mut errors, &input.region);
		self.check_language(&mut errors, &input.language_code);
		Self::check_title(&mut errors, &input.title);
		errors.into_result()?;
		let region = region.ok_or_else(|| CmsError::validation("region", "The region is required"))?;

		let mut block = Block::new(input.block_type, region);
		block.theme = input.theme;
		block.weight = input.weight;
		block.filter = input.filter;
		block.options = input.options;
		block.is_active = input.is_active;
		block.is_cacheable = input.is_cacheable;
		let mut translation =
			BlockTranslation::new(&input.language_code, input.title.trim(), input.body);
		translation.custom_fields = input.custom_fields;
		block.translations.push(translation);

		let block = self.blocks.insert(block).await?;
		info!(block_id = block.id, region = %block.region, "Block created");
		self.events.dispatch(BlockEvent::Created(block.id)).await?;
		Ok(block)
	}

	/// Apply a partial update
	pub async fn update_block(&self, id: BlockId, input: UpdateBlock) -> CmsResult<Block> {
		let mut block = self.show_block(id).await?;
		if let Some(raw) = &input.region {
			let mut errors = ValidationErrors::new();
			let region = self.parse_region(&mut errors, raw);
			errors.into_result()?;
			if let Some(region) = region {
				block.region = region;
			}
		}
		if let Some(theme) = input.theme {
			block.theme = Some(theme);
		}
		if let Some(weight) = input.weight {
			block.weight = weight;
		}
		if let Some(filter) = input.filter {
			block.filter = filter;
		}
		if let Some(options) = input.options {
			block.options = options;
		}
		if let Some(flag) = input.is_active {
			block.is_active = flag;
		}
		if let Some(flag) = input.is_cacheable {
			block.is_cacheable = flag;
		}
		self.blocks.save(&block).await?;
		info!(block_id = id, "Block updated");
		self.events.dispatch(BlockEvent::Updated(id)).await?;
		self.show_block(id).await
	}

	/// Move a block to the trash
	pub async fn delete_block(&self, id: BlockId) -> CmsResult<()> {
		self.blocks.soft_delete(id).await?;
		info!(block_id = id, "Block trashed");
		self.events.dispatch(BlockEvent::Deleted(id)).await
	}

	/// Trashed blocks
	pub async fn deleted_blocks(&self) -> CmsResult<Vec<Block>> {
		self.blocks.trashed().await
	}

	/// Restore a trashed block
	pub async fn restore_block(&self, id: BlockId) -> CmsResult<()> {
		self.blocks.restore(id).await?;
		info!(block_id = id, "Block restored");
		self.events.dispatch(BlockEvent::Restored(id)).await
	}

	/// Permanently remove a block
	pub async fn force_delete_block(&self, id: BlockId) -> CmsResult<()> {
		self.blocks.force_delete(id).await?;
		info!(block_id = id, "Block removed");
		self.events.dispatch(BlockEvent::Deleted(id)).await
	}

	/// Every translation of a block, inactive ones included
	pub async fn block_translations(&self, id: BlockId) -> CmsResult<Vec<BlockTranslation>> {
		Ok(self.show_block(id).await?.translations)
	}

	/// Add a translation; it supersedes the active one of the same language
	pub async fn create_block_translation(
		&self,
		id: BlockId,
		input: CreateBlockTranslation,
	) -> CmsResult<BlockTranslation> {
		let mut block = self.show_block(id).await?;
		let mut errors = ValidationErrors::new();
		self.check_language(&mut errors, &input.language_code);
		Self::check_title(&mut errors, &input.title);
		errors.into_result()?;

		for existing in block
			.translations
			.iter_mut()
			.filter(|t| t.language_code == input.language_code)
		{
			existing.is_active = false;
		}
		let mut translation =
			BlockTranslation::new(&input.language_code, input.title.trim(), input.body);
		translation.custom_fields = input.custom_fields;
		block.translations.push(translation.clone());

		self.blocks.save(&block).await?;
		info!(block_id = id, language = %input.language_code, "Block translation created");
		self.events
			.dispatch(BlockEvent::TranslationCreated {
				block_id: id,
				translation_id: translation.id,
			})
			.await?;
		Ok(translation)
	}

	/// Remove a translation
	pub async fn delete_block_translation(&self, id: BlockId, translation_id: Uuid) -> CmsResult<()> {
		let mut block = self.show_block(id).await?;
		let before = block.translations.len();
		block.translations.retain(|t| t.id != translation_id);
		if block.translations.len() == before {
			return Err(CmsError::NotFound(format!(
				"translation {} of block {}",
				translation_id, id
			)));
		}
		self.blocks.save(&block).await?;
		info!(block_id = id, %translation_id, "Block translation deleted");
		self.events
			.dispatch(BlockEvent::TranslationDeleted {
				block_id: id,
				translation_id,
			})
			.await
	}

	/// Replace the files attached to a block (`(file, weight)` pairs)
	pub async fn sync_block_files(&self, id: BlockId, files: &[(FileId, i32)]) -> CmsResult<Vec<File>> {
		self.show_block(id).await?;
		let owner = Attachable::Block(id);
		self.files.sync(owner, files).await?;
		self.events.dispatch(BlockEvent::Updated(id)).await?;
		self.files.attached(owner).await
	}

	// Files

	/// Validate the extension against the file type and store the record
	pub async fn create_file(&self, input: CreateFile) -> CmsResult<File> {
		let mut errors = ValidationErrors::new();
		self.check_type(&mut errors, TypeFamily::File, &input.file_type);
		if input.name.trim().is_empty() {
			errors.add("name", "The name is required");
		}
		errors.into_result()?;

		self.registry
			.file_handler(&input.file_type)?
			.validate_extension(&input.extension)?;

		let mut file = File::new(input.file_type, input.name.trim(), input.extension.trim());
		file.size = input.size;
		file.mime_type = input.mime_type;
		file.is_active = input.is_active;

		let file = self.files.insert(file).await?;
		info!(file_id = file.id, file = %file.file_name(), "File created");
		Ok(file)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("About us", "about-us")]
	#[case("  --Hello--World--  ", "hello-world")]
	#[case("C++ & Rust", "c-rust")]
	#[case("2024", "2024")]
	#[case("!!!", "")]
	fn test_slugify(#[case] title: &str, #[case] expected: &str) {
		assert_eq!(slugify(title), expected);
	}

	#[rstest]
	#[case("news/2024", true)]
	#[case("o-nas", true)]
	#[case("bad path", false)]
	#[case("quote\"s", false)]
	fn test_route_path_characters(#[case] path: &str, #[case] expected: bool) {
		assert_eq!(is_valid_route_path(path), expected);
	}
}
