//! Type discriminators and layout regions

use crate::error::{CmsError, CmsResult, TypeFamily};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! discriminator {
	(
		$(#[$meta:meta])*
		$name:ident, $family:expr, { $($variant:ident => $tag:literal),+ $(,)? }
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(rename_all = "lowercase")]
		pub enum $name {
			$(
				#[doc = concat!("`", $tag, "`")]
				$variant,
			)+
		}

		impl $name {
			/// Every variant, in declaration order
			pub const ALL: &'static [$name] = &[$($name::$variant),+];

			/// The discriminator string
			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $tag,)+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = CmsError;

			fn from_str(s: &str) -> CmsResult<Self> {
				match s {
					$($tag => Ok($name::$variant),)+
					other => Err(CmsError::UnknownType {
						family: $family,
						discriminator: other.to_string(),
					}),
				}
			}
		}
	};
}

discriminator!(
	/// Handler implementations available for content entities
	ContentKind, TypeFamily::Content, {
		Content => "content",
		Category => "category",
	}
);

discriminator!(
	/// Handler implementations available for blocks
	BlockKind, TypeFamily::Block, {
		Basic => "basic",
		Menu => "menu",
		Slider => "slider",
		Widget => "widget",
	}
);

discriminator!(
	/// Handler implementations available for files
	FileKind, TypeFamily::File, {
		Image => "image",
		Document => "document",
		Video => "video",
		Music => "music",
	}
);

/// Named layout slot a block is placed into
///
/// Ordering follows the page from top to bottom, which is also the order
/// regions appear in a published region map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
	/// Page header
	Header,
	/// Homepage only area
	Homepage,
	/// Featured strip below the header
	Featured,
	/// Above the main content
	ContentHeader,
	/// Left sidebar
	SidebarLeft,
	/// Right sidebar
	SidebarRight,
	/// Below the main content
	ContentFooter,
	/// Page footer
	Footer,
}

impl Region {
	/// Every region
	pub const ALL: &'static [Region] = &[
		Region::Header,
		Region::Homepage,
		Region::Featured,
		Region::ContentHeader,
		Region::SidebarLeft,
		Region::SidebarRight,
		Region::ContentFooter,
		Region::Footer,
	];

	/// Name used in templates and payloads
	pub fn as_str(&self) -> &'static str {
		match self {
			Region::Header => "header",
			Region::Homepage => "homepage",
			Region::Featured => "featured",
			Region::ContentHeader => "contentHeader",
			Region::SidebarLeft => "sidebarLeft",
			Region::SidebarRight => "sidebarRight",
			Region::ContentFooter => "contentFooter",
			Region::Footer => "footer",
		}
	}
}

impl fmt::Display for Region {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Region {
	type Err = CmsError;

	fn from_str(s: &str) -> CmsResult<Self> {
		Region::ALL
			.iter()
			.copied()
			.find(|region| region.as_str() == s)
			.ok_or_else(|| CmsError::validation("region", format!("Unknown region: {}", s)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("content", ContentKind::Content)]
	#[case("category", ContentKind::Category)]
	fn test_content_kind_parses(#[case] input: &str, #[case] expected: ContentKind) {
		assert_eq!(input.parse::<ContentKind>().unwrap(), expected);
		assert_eq!(expected.as_str(), input);
	}

	#[rstest]
	fn test_unknown_block_kind_is_unknown_type() {
		let err = "carousel".parse::<BlockKind>().unwrap_err();
		assert!(matches!(
			err,
			CmsError::UnknownType {
				family: TypeFamily::Block,
				ref discriminator,
			} if discriminator == "carousel"
		));
	}

	#[rstest]
	#[case("sidebarLeft", Region::SidebarLeft)]
	#[case("contentFooter", Region::ContentFooter)]
	fn test_region_round_trips_names(#[case] input: &str, #[case] expected: Region) {
		assert_eq!(input.parse::<Region>().unwrap(), expected);
		assert_eq!(
			serde_json::to_value(expected).unwrap(),
			serde_json::json!(input)
		);
	}

	#[rstest]
	fn test_unknown_region_is_validation_error() {
		assert!(matches!(
			"basement".parse::<Region>(),
			Err(CmsError::Validation(_))
		));
	}
}
