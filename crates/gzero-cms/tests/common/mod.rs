//! Shared fixtures for the integration tests
#![allow(dead_code)]

use gzero_cms::prelude::*;
use gzero_cms::repository::ContentAdminRepository;
use rstest::fixture;
use std::sync::Arc;

/// Application over a fresh in-memory store
pub struct TestCms {
	pub app: CmsApp,
	pub store: Arc<MemoryStore>,
}

impl TestCms {
	pub fn new() -> Self {
		Self::with(|builder| builder)
	}

	/// Customize the builder before the store is attached
	pub fn with(configure: impl FnOnce(CmsAppBuilder) -> CmsAppBuilder) -> Self {
		let store = Arc::new(MemoryStore::new());
		let app = configure(CmsApp::builder())
			.with_store(store.clone())
			.build()
			.unwrap();
		Self { app, store }
	}

	pub fn english(&self) -> Language {
		self.app.languages.default_language()
	}

	/// Active content of `content_type` under `parent`
	pub async fn content(&self, content_type: &str, parent: Option<&Content>, title: &str) -> Content {
		let mut input = CreateContent::new(content_type, "en", title);
		if let Some(parent) = parent {
			input = input.parent(parent.id);
		}
		self.app.admin.create_content(input).await.unwrap()
	}

	/// Store a content bypassing admin validation
	pub async fn raw_content(&self, content: Content) -> Content {
		ContentAdminRepository::insert(self.store.as_ref(), content)
			.await
			.unwrap()
	}
}

#[fixture]
pub fn cms() -> TestCms {
	TestCms::new()
}

/// English (default) and Polish
pub fn bilingual() -> LanguageRegistry {
	LanguageRegistry::new(vec![
		Language::new("en", "en_US").default_language(),
		Language::new("pl", "pl_PL"),
	])
	.unwrap()
}
