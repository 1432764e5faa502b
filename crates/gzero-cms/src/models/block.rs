//! Layout blocks

use super::kinds::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Block identifier
pub type BlockId = u64;

/// A themeable UI fragment placed into a layout region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
	/// Identifier, assigned by the repository
	pub id: BlockId,
	/// Discriminator selecting the block type handler
	#[serde(rename = "type")]
	pub block_type: String,
	/// Layout slot
	pub region: Region,
	/// Theme identifier
	pub theme: Option<String>,
	/// Sort key inside the region
	pub weight: i32,
	/// Routes the block applies to, `None` means everywhere
	pub filter: Option<BlockFilter>,
	/// Type specific configuration
	pub options: JsonValue,
	/// Inactive blocks are never rendered
	pub is_active: bool,
	/// Rendered fragment may be cached
	pub is_cacheable: bool,
	/// Creation date
	pub created_at: DateTime<Utc>,
	/// Last modification date
	pub updated_at: DateTime<Utc>,
	/// Soft delete marker
	pub deleted_at: Option<DateTime<Utc>>,
	/// Translations, newest last
	pub translations: Vec<BlockTranslation>,
}

impl Block {
	/// Create an active, non cacheable block shown everywhere
	pub fn new(block_type: impl Into<String>, region: Region) -> Self {
		let now = Utc::now();
		Self {
			id: 0,
			block_type: block_type.into(),
			region,
			theme: None,
			weight: 0,
			filter: None,
			options: JsonValue::Null,
			is_active: true,
			is_cacheable: false,
			created_at: now,
			updated_at: now,
			deleted_at: None,
			translations: Vec::new(),
		}
	}

	/// Active translation for `language_code`
	pub fn translation(&self, language_code: &str) -> Option<&BlockTranslation> {
		self.translations
			.iter()
			.rev()
			.find(|t| t.is_active && t.language_code == language_code)
	}

	/// Whether the block is soft deleted
	pub fn is_trashed(&self) -> bool {
		self.deleted_at.is_some()
	}
}

/// Per-language texts of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTranslation {
	/// Identifier
	pub id: Uuid,
	/// Language code
	pub language_code: String,
	/// Title
	pub title: String,
	/// HTML body
	pub body: Option<String>,
	/// Free form fields used by block templates
	pub custom_fields: JsonValue,
	/// Only active translations are rendered
	pub is_active: bool,
	/// Creation date
	pub created_at: DateTime<Utc>,
}

impl BlockTranslation {
	/// Active translation with a title and body
	pub fn new(
		language_code: impl Into<String>,
		title: impl Into<String>,
		body: Option<String>,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			language_code: language_code.into(),
			title: title.into(),
			body,
			custom_fields: JsonValue::Null,
			is_active: true,
			created_at: Utc::now(),
		}
	}
}

/// Route patterns selecting where a block is shown
///
/// A pattern is a route path (`news/2024`) or a subtree pattern ending in
/// `/*` (`news/*`). Exclusions take precedence over inclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFilter {
	/// Patterns the block is shown on
	#[serde(rename = "+", default)]
	pub include: Vec<String>,
	/// Patterns the block is hidden on
	#[serde(rename = "-", default)]
	pub exclude: Vec<String>,
}

impl BlockFilter {
	/// Filter showing the block on `patterns`
	pub fn including<I, S>(patterns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			include: patterns.into_iter().map(Into::into).collect(),
			exclude: Vec::new(),
		}
	}

	/// Add exclusions
	pub fn excluding<I, S>(mut self, patterns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.exclude.extend(patterns.into_iter().map(Into::into));
		self
	}
}

/// A block together with its rendered HTML
///
/// This is the view object published per region to the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBlock {
	/// The block record
	pub block: Block,
	/// Rendered fragment
	pub view: String,
}
