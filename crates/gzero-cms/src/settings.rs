//! CMS settings
//!
//! Handler tables, file allow-lists and layout configuration. Settings are
//! plain serde structs so they can be embedded into a larger project
//! configuration or loaded on their own from TOML:
//!
//! ```
//! use gzero_cms::settings::CmsSettings;
//! use gzero_cms::models::ContentKind;
//!
//! let settings = CmsSettings::from_toml_str(r#"
//!     default_page_size = 5
//!
//!     [content_types]
//!     content = "content"
//!     category = "category"
//!     news = "content"
//! "#).unwrap();
//!
//! assert_eq!(settings.default_page_size, 5);
//! assert_eq!(settings.content_types["news"], ContentKind::Content);
//! ```

use crate::error::{CmsError, CmsResult};
use crate::models::{BlockKind, ContentKind, File, FileKind, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Multi-language URL mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultilangSettings {
	/// Prefix non-default language URLs with the language code
	pub enabled: bool,
	/// Language detected from the URL prefix
	pub detected: bool,
}

/// Settings consumed by the resolution engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
	/// Content discriminator -> handler
	pub content_types: BTreeMap<String, ContentKind>,
	/// Block discriminator -> handler
	pub block_types: BTreeMap<String, BlockKind>,
	/// File discriminator -> handler
	pub file_types: BTreeMap<String, FileKind>,
	/// File discriminator -> allowed lowercase extensions
	pub allowed_file_extensions: BTreeMap<String, Vec<String>>,
	/// Category children per page when the request does not say
	pub default_page_size: u32,
	/// Regions blocks may be placed into
	pub block_regions: Vec<Region>,
	/// Block handlers wrapped with the fragment cache
	pub cacheable_block_types: Vec<BlockKind>,
	/// Multi-language URL mode
	pub multilang: MultilangSettings,
	/// Title of the first breadcrumb entry
	pub home_label: String,
	/// Public URL prefix of uploaded files
	pub upload_url: String,
}

impl Default for CmsSettings {
	fn default() -> Self {
		let content_types = ContentKind::ALL
			.iter()
			.map(|kind| (kind.as_str().to_string(), *kind))
			.collect();
		let block_types = BlockKind::ALL
			.iter()
			.map(|kind| (kind.as_str().to_string(), *kind))
			.collect();
		let file_types = FileKind::ALL
			.iter()
			.map(|kind| (kind.as_str().to_string(), *kind))
			.collect();
		let allowed_file_extensions = [
			("image", &["png", "jpg", "jpeg", "tif"][..]),
			(
				"document",
				&["pdf", "odt", "ods", "doc", "docx", "xls", "xlsx", "txt"][..],
			),
			("video", &["mp4"][..]),
			("music", &["mp3"][..]),
		]
		.into_iter()
		.map(|(kind, extensions)| {
			(
				kind.to_string(),
				extensions.iter().map(|e| e.to_string()).collect(),
			)
		})
		.collect();

		Self {
			content_types,
			block_types,
			file_types,
			allowed_file_extensions,
			default_page_size: 20,
			block_regions: Region::ALL.to_vec(),
			cacheable_block_types: vec![BlockKind::Slider, BlockKind::Widget],
			multilang: MultilangSettings::default(),
			home_label: "Home".to_string(),
			upload_url: "/uploads".to_string(),
		}
	}
}

impl CmsSettings {
	/// Parse and validate settings from TOML; missing keys use defaults
	pub fn from_toml_str(source: &str) -> CmsResult<Self> {
		let settings: CmsSettings = toml::from_str(source)
			.map_err(|e| CmsError::Configuration(format!("Invalid settings: {}", e)))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> CmsResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|e| {
			CmsError::Configuration(format!("Cannot read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&source)
	}

	/// Check cross-field consistency
	pub fn validate(&self) -> CmsResult<()> {
		if self.default_page_size == 0 {
			return Err(CmsError::Configuration(
				"default_page_size must be greater than zero".to_string(),
			));
		}
		if self.block_regions.is_empty() {
			return Err(CmsError::Configuration(
				"At least one block region is required".to_string(),
			));
		}
		for discriminator in self.file_types.keys() {
			let extensions = self.allowed_file_extensions.get(discriminator);
			if extensions.is_none_or(|list| list.is_empty()) {
				return Err(CmsError::Configuration(format!(
					"No allowed extensions for file type '{}'",
					discriminator
				)));
			}
		}
		if let Some(orphan) = self
			.allowed_file_extensions
			.keys()
			.find(|key| !self.file_types.contains_key(*key))
		{
			return Err(CmsError::Configuration(format!(
				"Extensions configured for unknown file type '{}'",
				orphan
			)));
		}
		Ok(())
	}

	/// Allowed extensions for a file discriminator
	pub fn extensions_for(&self, file_type: &str) -> &[String] {
		self.allowed_file_extensions
			.get(file_type)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Handler kind of a stored file, through the `file_types` table
	pub fn file_kind(&self, file: &File) -> Option<FileKind> {
		self.file_types.get(&file.file_type).copied()
	}

	/// Public URL of a stored file
	pub fn file_url(&self, file: &File) -> String {
		format!("{}/{}", self.upload_url.trim_end_matches('/'), file.file_name())
	}

	/// Whether blocks may be placed into `region`
	pub fn is_region_enabled(&self, region: Region) -> bool {
		self.block_regions.contains(&region)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults_are_valid() {
		let settings = CmsSettings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.extensions_for("image"), &["png", "jpg", "jpeg", "tif"]);
		assert_eq!(settings.block_regions.len(), 8);
	}

	#[rstest]
	fn test_toml_overrides_keep_other_defaults() {
		// Act
		let settings = CmsSettings::from_toml_str(
			r#"
			block_regions = ["header", "sidebarLeft", "footer"]

			[multilang]
			enabled = true
			"#,
		)
		.unwrap();

		// Assert
		assert!(settings.multilang.enabled);
		assert_eq!(
			settings.block_regions,
			vec![Region::Header, Region::SidebarLeft, Region::Footer]
		);
		assert_eq!(settings.default_page_size, 20);
		assert!(!settings.is_region_enabled(Region::Homepage));
	}

	#[rstest]
	fn test_unknown_handler_in_table_fails() {
		let result = CmsSettings::from_toml_str(
			r#"
			[block_types]
			carousel = "carousel"
			"#,
		);
		assert!(matches!(result, Err(CmsError::Configuration(_))));
	}

	#[rstest]
	fn test_zero_page_size_fails() {
		let result = CmsSettings::from_toml_str("default_page_size = 0");
		assert!(matches!(result, Err(CmsError::Configuration(_))));
	}

	#[rstest]
	fn test_file_type_without_extensions_fails() {
		let mut settings = CmsSettings::default();
		settings.file_types.insert("archive".into(), FileKind::Document);
		assert!(settings.validate().is_err());
	}

	#[rstest]
	fn test_settings_load_from_file() {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("cms.toml");
		std::fs::write(
			&path,
			"home_label = \"Start\"\nupload_url = \"https://cdn.example.com/files/\"\n",
		)
		.unwrap();

		// Act
		let settings = CmsSettings::from_file(&path).unwrap();

		// Assert
		assert_eq!(settings.home_label, "Start");
		let file = File::new("image", "logo", "png");
		assert_eq!(settings.file_url(&file), "https://cdn.example.com/files/logo.png");
	}

	#[rstest]
	fn test_file_kind_follows_aliases() {
		let mut settings = CmsSettings::default();
		settings.file_types.insert("photo".into(), FileKind::Image);

		assert_eq!(
			settings.file_kind(&File::new("photo", "sunset", "png")),
			Some(FileKind::Image)
		);
		assert_eq!(settings.file_kind(&File::new("archive", "backup", "zip")), None);
	}

	#[rstest]
	fn test_missing_settings_file_is_configuration_error() {
		let dir = tempfile::tempdir().unwrap();

		let result = CmsSettings::from_file(dir.path().join("missing.toml"));

		assert!(matches!(result, Err(CmsError::Configuration(_))));
	}
}
