//! Languages
//!
//! The active language is always passed explicitly through the pipeline.
//! [`LanguageRegistry`] only answers which languages exist and which one is
//! the default.

use crate::error::{CmsError, CmsResult};
use crate::settings::MultilangSettings;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A site language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
	/// Short code used in URLs and translations, e.g. `en`
	pub code: String,
	/// Locale identifier, e.g. `en_US`
	pub locale: String,
	/// Disabled languages cannot be requested
	pub is_enabled: bool,
	/// The default language has no URL prefix
	pub is_default: bool,
}

impl Language {
	/// Enabled, non-default language
	pub fn new(code: impl Into<String>, locale: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			locale: locale.into(),
			is_enabled: true,
			is_default: false,
		}
	}

	/// Mark as default
	pub fn default_language(mut self) -> Self {
		self.is_default = true;
		self
	}

	/// Absolute URL of `path` in this language
	///
	/// Non-default languages get a `/{code}` prefix when multi-language mode
	/// is enabled.
	///
	/// # Examples
	///
	/// ```
	/// use gzero_cms::language::Language;
	/// use gzero_cms::settings::MultilangSettings;
	///
	/// let multilang = MultilangSettings { enabled: true, detected: false };
	/// let en = Language::new("en", "en_US").default_language();
	/// let pl = Language::new("pl", "pl_PL");
	///
	/// assert_eq!(en.url("about", &multilang), "/about");
	/// assert_eq!(pl.url("o-nas", &multilang), "/pl/o-nas");
	/// assert_eq!(pl.url("", &multilang), "/pl");
	/// ```
	pub fn url(&self, path: &str, multilang: &MultilangSettings) -> String {
		let path = crate::models::normalize_path(path);
		let prefixed = multilang.enabled && !self.is_default;
		match (prefixed, path.is_empty()) {
			(true, true) => format!("/{}", self.code),
			(true, false) => format!("/{}/{}", self.code, path),
			(false, _) => format!("/{}", path),
		}
	}
}

/// Configured languages with exactly one default
#[derive(Debug)]
pub struct LanguageRegistry {
	languages: RwLock<Vec<Language>>,
}

impl LanguageRegistry {
	/// Build the registry, checking the single default invariant
	pub fn new(languages: Vec<Language>) -> CmsResult<Self> {
		Self::check(&languages)?;
		Ok(Self {
			languages: RwLock::new(languages),
		})
	}

	/// Registry with English as the only language
	pub fn english() -> Self {
		Self {
			languages: RwLock::new(vec![Language::new("en", "en_US").default_language()]),
		}
	}

	fn check(languages: &[Language]) -> CmsResult<()> {
		let defaults: Vec<&Language> = languages.iter().filter(|l| l.is_default).collect();
		match defaults.as_slice() {
			[default] if default.is_enabled => Ok(()),
			[default] => Err(CmsError::Configuration(format!(
				"Default language '{}' is disabled",
				default.code
			))),
			[] => Err(CmsError::Configuration(
				"No default language configured".to_string(),
			)),
			many => Err(CmsError::Configuration(format!(
				"Expected one default language, found {}",
				many.len()
			))),
		}
	}

	/// Enabled language with the given code
	pub fn get(&self, code: &str) -> Option<Language> {
		self.languages
			.read()
			.iter()
			.find(|l| l.code == code && l.is_enabled)
			.cloned()
	}

	/// Whether `code` is an enabled language
	pub fn is_enabled(&self, code: &str) -> bool {
		self.get(code).is_some()
	}

	/// The default language
	pub fn default_language(&self) -> Language {
		self.languages
			.read()
			.iter()
			.find(|l| l.is_default)
			.cloned()
			.unwrap_or_else(|| Language::new("en", "en_US").default_language())
	}

	/// Every enabled language, default first
	pub fn enabled(&self) -> Vec<Language> {
		let mut enabled: Vec<Language> = self
			.languages
			.read()
			.iter()
			.filter(|l| l.is_enabled)
			.cloned()
			.collect();
		enabled.sort_by_key(|l| !l.is_default);
		enabled
	}

	/// Switch the default language
	///
	/// The previous default loses its flag in the same step.
	pub fn set_default(&self, code: &str) -> CmsResult<()> {
		let mut languages = self.languages.write();
		match languages.iter().find(|l| l.code == code) {
			Some(language) if language.is_enabled => {}
			Some(_) => {
				return Err(CmsError::validation(
					"code",
					format!("Language '{}' is disabled", code),
				));
			}
			None => return Err(CmsError::NotFound(format!("language '{}'", code))),
		}
		for language in languages.iter_mut() {
			language.is_default = language.code == code;
		}
		tracing::info!(code, "default language changed");
		Ok(())
	}
}

impl Default for LanguageRegistry {
	fn default() -> Self {
		Self::english()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> LanguageRegistry {
		LanguageRegistry::new(vec![
			Language::new("en", "en_US").default_language(),
			Language::new("pl", "pl_PL"),
			Language {
				is_enabled: false,
				..Language::new("de", "de_DE")
			},
		])
		.unwrap()
	}

	#[rstest]
	fn test_rejects_missing_default() {
		let result = LanguageRegistry::new(vec![Language::new("en", "en_US")]);
		assert!(matches!(result, Err(CmsError::Configuration(_))));
	}

	#[rstest]
	fn test_rejects_two_defaults() {
		let result = LanguageRegistry::new(vec![
			Language::new("en", "en_US").default_language(),
			Language::new("pl", "pl_PL").default_language(),
		]);
		assert!(matches!(result, Err(CmsError::Configuration(_))));
	}

	#[rstest]
	fn test_disabled_language_is_not_resolved(registry: LanguageRegistry) {
		assert!(registry.get("pl").is_some());
		assert!(registry.get("de").is_none());
		assert_eq!(registry.enabled().len(), 2);
	}

	#[rstest]
	fn test_set_default_moves_flag(registry: LanguageRegistry) {
		// Act
		registry.set_default("pl").unwrap();

		// Assert
		assert_eq!(registry.default_language().code, "pl");
		assert!(!registry.get("en").unwrap().is_default);
		assert_eq!(registry.enabled()[0].code, "pl");
	}

	#[rstest]
	fn test_set_default_rejects_disabled(registry: LanguageRegistry) {
		assert!(matches!(
			registry.set_default("de"),
			Err(CmsError::Validation(_))
		));
		assert_eq!(registry.default_language().code, "en");
	}

	#[rstest]
	fn test_url_without_multilang_has_no_prefix() {
		let multilang = MultilangSettings::default();
		let pl = Language::new("pl", "pl_PL");
		assert_eq!(pl.url("/o-nas/", &multilang), "/o-nas");
	}
}
