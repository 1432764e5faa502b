//! Public, unauthenticated listings

use crate::error::CmsResult;
use crate::language::Language;
use crate::models::Content;
use crate::pagination::Paginator;
use crate::repository::{ContentFilter, ContentQuery, ContentRepository};
use crate::settings::CmsSettings;
use std::sync::Arc;
use tracing::debug;

/// Read-only service behind the public API
pub struct PublicService {
	contents: Arc<dyn ContentRepository>,
	settings: Arc<CmsSettings>,
}

impl PublicService {
	/// Service over the content repository
	pub fn new(contents: Arc<dyn ContentRepository>, settings: Arc<CmsSettings>) -> Self {
		Self { contents, settings }
	}

	/// Homepage listing: active, published, `is_on_home` contents translated
	/// into `language`, ordered like category children
	pub async fn homepage_contents(
		&self,
		language: &Language,
		page: u32,
	) -> CmsResult<Paginator<Content>> {
		let per_page = self.settings.default_page_size;
		let query = ContentQuery::new(
			ContentFilter {
				is_active: Some(true),
				is_on_home: Some(true),
				language_code: Some(language.code.clone()),
				published_only: true,
				..Default::default()
			},
			per_page,
		)
		.page(page);

		let result = self.contents.query(&query).await?;
		debug!(
			language = %language.code,
			page = query.page,
			total = result.total,
			"Homepage contents listed"
		);
		Ok(Paginator::new(
			result.items,
			result.total,
			per_page,
			query.page,
			language.url("", &self.settings.multilang),
		))
	}
}
