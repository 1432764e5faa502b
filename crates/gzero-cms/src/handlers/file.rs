//! File type handlers
//!
//! Extension checks run when a file is created, never while rendering.

use super::FileTypeHandler;
use crate::error::{CmsError, CmsResult};
use crate::models::FileKind;

/// Case-insensitive extension allow-list for one file type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowListFileHandler {
	kind: FileKind,
	file_type: String,
	extensions: Vec<String>,
}

impl AllowListFileHandler {
	/// Allow-list for the `file_type` discriminator handled as `kind`
	pub fn new<I, S>(kind: FileKind, file_type: impl Into<String>, extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			kind,
			file_type: file_type.into(),
			extensions: extensions
				.into_iter()
				.map(|ext| normalize_extension(ext.as_ref()))
				.filter(|ext| !ext.is_empty())
				.collect(),
		}
	}

	/// Discriminator this handler was registered for
	pub fn file_type(&self) -> &str {
		&self.file_type
	}
}

/// Lowercase, without surrounding whitespace or a leading dot
pub fn normalize_extension(extension: &str) -> String {
	extension.trim().trim_start_matches('.').to_lowercase()
}

impl FileTypeHandler for AllowListFileHandler {
	fn kind(&self) -> FileKind {
		self.kind
	}

	fn allowed_extensions(&self) -> &[String] {
		&self.extensions
	}

	fn validate_extension(&self, extension: &str) -> CmsResult<()> {
		let normalized = normalize_extension(extension);
		if !normalized.is_empty() && self.extensions.contains(&normalized) {
			return Ok(());
		}
		Err(CmsError::FileType {
			file_type: self.file_type.clone(),
			extension: extension.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn images() -> AllowListFileHandler {
		AllowListFileHandler::new(FileKind::Image, "image", ["png", "jpg", "jpeg", "tif"])
	}

	#[rstest]
	#[case("png")]
	#[case("PNG")]
	#[case(".jpg")]
	#[case(" tif ")]
	fn test_allowed_extensions(images: AllowListFileHandler, #[case] extension: &str) {
		assert!(images.validate_extension(extension).is_ok());
	}

	#[rstest]
	#[case("exe")]
	#[case("")]
	#[case(".")]
	#[case("png.exe")]
	fn test_rejected_extensions(images: AllowListFileHandler, #[case] extension: &str) {
		let error = images.validate_extension(extension).unwrap_err();
		match error {
			CmsError::FileType {
				file_type,
				extension: rejected,
			} => {
				assert_eq!(file_type, "image");
				assert_eq!(rejected, extension);
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[rstest]
	fn test_configured_extensions_are_normalized() {
		let handler = AllowListFileHandler::new(FileKind::Document, "document", [".PDF", "", "txt"]);
		assert_eq!(handler.allowed_extensions(), ["pdf", "txt"]);
		assert_eq!(handler.kind(), FileKind::Document);
	}
}
