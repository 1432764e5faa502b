//! Public homepage listing

mod common;

use chrono::{Duration, Utc};
use common::{TestCms, bilingual, cms};
use gzero_cms::prelude::*;
use rstest::rstest;

async fn home_page(cms: &TestCms, title: &str, configure: impl FnOnce(&mut CreateContent)) -> Content {
	let mut input = CreateContent::new("content", "en", title);
	input.is_on_home = true;
	configure(&mut input);
	cms.app.admin.create_content(input).await.unwrap()
}

#[rstest]
#[tokio::test]
async fn test_homepage_lists_published_home_contents(cms: TestCms) {
	// Arrange
	home_page(&cms, "Welcome", |_| {}).await;
	home_page(&cms, "Draft", |input| input.is_active = false).await;
	home_page(&cms, "Scheduled", |input| {
		input.published_at = Some(Utc::now() + Duration::days(3))
	})
	.await;
	home_page(&cms, "Elsewhere", |input| input.is_on_home = false).await;

	// Act
	let page = cms
		.app
		.public
		.homepage_contents(&cms.english(), 1)
		.await
		.unwrap();

	// Assert
	assert_eq!(page.total, 1);
	assert_eq!(page.items[0].title("en"), "Welcome");
	assert_eq!(page.base_path, "/");
	assert!(!page.has_more_pages());
}

#[rstest]
#[tokio::test]
async fn test_homepage_is_paginated_with_default_page_size() {
	// Arrange
	let settings = CmsSettings {
		default_page_size: 2,
		..Default::default()
	};
	let cms = TestCms::with(|builder| builder.with_settings(settings));
	for (weight, title) in [(0, "One"), (1, "Two"), (2, "Three")] {
		home_page(&cms, title, |input| input.weight = weight).await;
	}

	// Act
	let first = cms.app.public.homepage_contents(&cms.english(), 1).await.unwrap();
	let second = cms.app.public.homepage_contents(&cms.english(), 2).await.unwrap();

	// Assert
	assert_eq!(first.items.len(), 2);
	assert_eq!(first.last_page, 2);
	assert!(first.has_more_pages());
	assert_eq!(second.items.len(), 1);
	assert_eq!(second.current_page, 2);
	assert_eq!(first.url(2), "/?page=2");
}

#[rstest]
#[tokio::test]
async fn test_homepage_requires_translation_in_language() {
	// Arrange
	let mut settings = CmsSettings::default();
	settings.multilang.enabled = true;
	let cms = TestCms::with(|builder| {
		builder
			.with_languages(bilingual())
			.with_settings(settings)
	});
	let page = home_page(&cms, "Welcome", |_| {}).await;
	home_page(&cms, "English only", |_| {}).await;
	cms.app
		.admin
		.create_content_translation(page.id, CreateContentTranslation::new("pl", "Witamy"))
		.await
		.unwrap();
	let polish = cms.app.languages.get("pl").unwrap();

	// Act
	let listing = cms.app.public.homepage_contents(&polish, 1).await.unwrap();

	// Assert
	assert_eq!(listing.total, 1);
	assert_eq!(listing.items[0].id, page.id);
	assert_eq!(listing.base_path, "/pl");
}
