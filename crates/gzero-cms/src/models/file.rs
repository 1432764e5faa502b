//! File attachments

use super::block::BlockId;
use super::content::ContentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File identifier
pub type FileId = u64;

/// An uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	/// Identifier, assigned by the repository
	pub id: FileId,
	/// Discriminator selecting the file type handler
	#[serde(rename = "type")]
	pub file_type: String,
	/// Stored name without extension
	pub name: String,
	/// Lowercase extension without dot
	pub extension: String,
	/// Size in bytes
	pub size: u64,
	/// MIME type
	pub mime_type: String,
	/// Inactive files are not attached to rendered pages
	pub is_active: bool,
	/// Creation date
	pub created_at: DateTime<Utc>,
	/// Soft delete marker
	pub deleted_at: Option<DateTime<Utc>>,
}

impl File {
	/// Create an active file record
	pub fn new(
		file_type: impl Into<String>,
		name: impl Into<String>,
		extension: impl Into<String>,
	) -> Self {
		Self {
			id: 0,
			file_type: file_type.into(),
			name: name.into(),
			extension: extension.into().trim_start_matches('.').to_lowercase(),
			size: 0,
			mime_type: String::new(),
			is_active: true,
			created_at: Utc::now(),
			deleted_at: None,
		}
	}

	/// `name.extension`
	pub fn file_name(&self) -> String {
		format!("{}.{}", self.name, self.extension)
	}
}

/// Entity a file can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "lowercase")]
pub enum Attachable {
	/// A content node
	Content(ContentId),
	/// A block
	Block(BlockId),
}

/// Link between a file and its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
	/// Attached file
	pub file_id: FileId,
	/// Owning entity
	pub owner: Attachable,
	/// Sort key among the owner's files
	pub weight: i32,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_extension_is_normalized() {
		let file = File::new("image", "logo", ".PNG");
		assert_eq!(file.extension, "png");
		assert_eq!(file.file_name(), "logo.png");
	}
}
