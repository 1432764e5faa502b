//! Content tree entities

use super::file::FileId;
use super::normalize_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content identifier
pub type ContentId = u64;

/// A node of the content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
	/// Identifier, assigned by the repository
	pub id: ContentId,
	/// Discriminator selecting the content type handler
	#[serde(rename = "type")]
	pub content_type: String,
	/// Parent node, `None` for roots
	pub parent_id: Option<ContentId>,
	/// Ids from the root down to this node (inclusive)
	pub path: Vec<ContentId>,
	/// Sort key among siblings
	pub weight: i32,
	/// Average rating
	pub rating: u32,
	/// Visit counter
	pub visits: u64,
	/// Theme identifier
	pub theme: Option<String>,
	/// Optional thumbnail
	pub thumb_id: Option<FileId>,
	/// Listed on the homepage
	pub is_on_home: bool,
	/// Comments enabled
	pub is_comment_allowed: bool,
	/// Promoted items sort first
	pub is_promoted: bool,
	/// Sticky items sort right after promoted ones
	pub is_sticky: bool,
	/// Inactive content is invisible to routing
	pub is_active: bool,
	/// Publication date
	pub published_at: Option<DateTime<Utc>>,
	/// Creation date
	pub created_at: DateTime<Utc>,
	/// Last modification date
	pub updated_at: DateTime<Utc>,
	/// Soft delete marker
	pub deleted_at: Option<DateTime<Utc>>,
	/// Translations, newest last
	pub translations: Vec<ContentTranslation>,
	/// URL route
	pub route: Route,
}

impl Content {
	/// Create an active content without translations
	pub fn new(content_type: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: 0,
			content_type: content_type.into(),
			parent_id: None,
			path: Vec::new(),
			weight: 0,
			rating: 0,
			visits: 0,
			theme: None,
			thumb_id: None,
			is_on_home: false,
			is_comment_allowed: false,
			is_promoted: false,
			is_sticky: false,
			is_active: true,
			published_at: Some(now),
			created_at: now,
			updated_at: now,
			deleted_at: None,
			translations: Vec::new(),
			route: Route::default(),
		}
	}

	/// Depth in the tree, roots are level 0
	pub fn level(&self) -> usize {
		self.path.len().saturating_sub(1)
	}

	/// Ancestor ids from the root down to the parent
	pub fn ancestor_ids(&self) -> &[ContentId] {
		match self.path.split_last() {
			Some((_, ancestors)) => ancestors,
			None => &[],
		}
	}

	/// Whether the content is soft deleted
	pub fn is_trashed(&self) -> bool {
		self.deleted_at.is_some()
	}

	/// Active translation for `language_code`
	///
	/// When several active translations exist the newest one wins.
	pub fn translation(&self, language_code: &str) -> Option<&ContentTranslation> {
		self.translations
			.iter()
			.rev()
			.find(|t| t.is_active && t.language_code == language_code)
	}

	/// Title in `language_code`, empty when untranslated
	pub fn title(&self, language_code: &str) -> &str {
		self.translation(language_code)
			.map(|t| t.title.as_str())
			.unwrap_or("")
	}
}

/// Per-language texts of a content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTranslation {
	/// Identifier
	pub id: Uuid,
	/// Language code, e.g. `en`
	pub language_code: String,
	/// Title
	pub title: String,
	/// Short introduction
	pub teaser: Option<String>,
	/// HTML body
	pub body: Option<String>,
	/// SEO title override
	pub seo_title: Option<String>,
	/// SEO description
	pub seo_description: Option<String>,
	/// Only active translations are rendered
	pub is_active: bool,
	/// Creation date
	pub created_at: DateTime<Utc>,
}

impl ContentTranslation {
	/// Active translation with a title only
	pub fn new(language_code: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4(),
			language_code: language_code.into(),
			title: title.into(),
			teaser: None,
			body: None,
			seo_title: None,
			seo_description: None,
			is_active: true,
			created_at: Utc::now(),
		}
	}
}

/// URL route of a content, one path per language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
	/// Per-language paths
	pub translations: Vec<RouteTranslation>,
}

impl Route {
	/// Active path for `language_code`
	pub fn path(&self, language_code: &str) -> Option<&str> {
		self.translations
			.iter()
			.rev()
			.find(|t| t.is_active && t.language_code == language_code)
			.map(|t| t.path.as_str())
	}

	/// Set the path for a language, replacing the previous one
	pub fn set_path(&mut self, language_code: &str, path: &str) {
		self.translations
			.retain(|t| t.language_code != language_code);
		self.translations.push(RouteTranslation {
			language_code: language_code.to_string(),
			path: normalize_path(path),
			is_active: true,
		});
	}

	/// Whether any active translation resolves to `path`
	pub fn matches(&self, path: &str, language_code: &str) -> bool {
		self.path(language_code) == Some(path)
	}
}

/// Path of a route in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTranslation {
	/// Language code
	pub language_code: String,
	/// Normalized path without surrounding slashes
	pub path: String,
	/// Inactive paths do not resolve
	pub is_active: bool,
}
