//! Block resolution into layout regions

mod common;

use common::{TestCms, cms};
use gzero_cms::loader::BLOCKS_KEY;
use gzero_cms::prelude::*;
use gzero_cms::repository::BlockAdminRepository;
use rstest::rstest;

async fn block(cms: &TestCms, region: &str, title: &str, filter: Option<BlockFilter>) -> Block {
	let mut input = CreateBlock::new("basic", region, "en", title);
	input.filter = filter;
	cms.app.admin.create_block(input).await.unwrap()
}

fn titles(regions: &RegionMap, region: Region) -> Vec<String> {
	regions
		.get(&region)
		.map(|blocks| {
			blocks
				.iter()
				.map(|rendered| rendered.block.translation("en").unwrap().title.clone())
				.collect()
		})
		.unwrap_or_default()
}

#[rstest]
#[tokio::test]
async fn test_static_route_groups_active_blocks_by_region(cms: TestCms) {
	// Arrange
	let header = block(&cms, "header", "Logo", None).await;
	let footer = block(&cms, "footer", "Copyright", None).await;
	let hidden = block(&cms, "header", "Hidden", None).await;
	cms.app
		.admin
		.update_block(
			hidden.id,
			UpdateBlock {
				is_active: Some(false),
				..Default::default()
			},
		)
		.await
		.unwrap();
	let request = RequestContext::new("/");

	// Act
	cms.app
		.router
		.handle_static("home", "", &cms.english(), &request)
		.await
		.unwrap();

	// Assert
	let regions: RegionMap = request.view().get(BLOCKS_KEY).unwrap();
	assert_eq!(regions.len(), 2);
	assert_eq!(
		regions[&Region::Header]
			.iter()
			.map(|r| r.block.id)
			.collect::<Vec<_>>(),
		vec![header.id]
	);
	assert_eq!(
		regions[&Region::Footer]
			.iter()
			.map(|r| r.block.id)
			.collect::<Vec<_>>(),
		vec![footer.id]
	);
	assert!(regions[&Region::Header][0].view.contains("Logo"));
}

#[rstest]
#[tokio::test]
async fn test_blocks_keep_weight_order_within_region(cms: TestCms) {
	// Arrange
	for (weight, title) in [(2, "Third"), (0, "First"), (1, "Second")] {
		let mut input = CreateBlock::new("basic", "sidebarLeft", "en", title);
		input.weight = weight;
		cms.app.admin.create_block(input).await.unwrap();
	}

	// Act
	let regions = cms.app.loader.load("", &cms.english(), false).await.unwrap();

	// Assert
	assert_eq!(
		titles(&regions, Region::SidebarLeft),
		vec!["First", "Second", "Third"]
	);
}

#[rstest]
#[tokio::test]
async fn test_subtree_blocks_follow_dynamic_routes(cms: TestCms) {
	// Arrange
	let news = cms.content("category", None, "News").await;
	cms.content("content", Some(&news), "Article").await;
	block(&cms, "sidebarRight", "News sidebar", Some(BlockFilter::including(["news/*"]))).await;
	block(&cms, "sidebarRight", "Front only", Some(BlockFilter::including(["news"]))).await;
	let request = RequestContext::new("/news/article");

	// Act
	let response = cms
		.app
		.router
		.handle_request("news/article", &cms.english(), &request)
		.await
		.unwrap();

	// Assert
	let regions: RegionMap = serde_json::from_value(response.shared[BLOCKS_KEY].clone()).unwrap();
	assert_eq!(titles(&regions, Region::SidebarRight), vec!["News sidebar"]);
}

#[rstest]
#[tokio::test]
async fn test_static_routes_do_not_match_descendants(cms: TestCms) {
	// Arrange
	block(&cms, "featured", "Search tips", Some(BlockFilter::including(["search/*"]))).await;

	// Act
	let on_base = cms.app.loader.load("search", &cms.english(), false).await.unwrap();
	let below = cms.app.loader.load("search/results", &cms.english(), false).await.unwrap();

	// Assert
	assert_eq!(titles(&on_base, Region::Featured), vec!["Search tips"]);
	assert!(below.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_excluded_paths_hide_blocks(cms: TestCms) {
	// Arrange
	block(
		&cms,
		"contentFooter",
		"Newsletter",
		Some(BlockFilter::default().excluding(["contact"])),
	)
	.await;

	// Act
	let about = cms.app.loader.load("about", &cms.english(), false).await.unwrap();
	let contact = cms.app.loader.load("contact", &cms.english(), false).await.unwrap();

	// Assert
	assert_eq!(titles(&about, Region::ContentFooter), vec!["Newsletter"]);
	assert!(contact.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_new_blocks_are_visible_after_mutation(cms: TestCms) {
	// Arrange
	block(&cms, "header", "First", None).await;
	let first = cms.app.loader.load("", &cms.english(), false).await.unwrap();

	// Act
	block(&cms, "header", "Second", None).await;
	let second = cms.app.loader.load("", &cms.english(), false).await.unwrap();

	// Assert
	assert_eq!(titles(&first, Region::Header).len(), 1);
	assert_eq!(titles(&second, Region::Header).len(), 2);
}

#[rstest]
#[tokio::test]
async fn test_unknown_block_type_aborts_the_request(cms: TestCms) {
	// Arrange
	BlockAdminRepository::insert(cms.store.as_ref(), Block::new("carousel", Region::Header))
		.await
		.unwrap();

	// Act
	let result = cms
		.app
		.router
		.handle_static("home", "", &cms.english(), &RequestContext::new("/"))
		.await;

	// Assert
	assert!(matches!(
		result,
		Err(CmsError::UnknownType {
			family: TypeFamily::Block,
			..
		})
	));
}

#[rstest]
#[tokio::test]
async fn test_blocks_in_disabled_regions_are_skipped() {
	// Arrange
	let settings = CmsSettings {
		block_regions: vec![Region::Header],
		..Default::default()
	};
	let cms = TestCms::with(|builder| builder.with_settings(settings));
	BlockAdminRepository::insert(cms.store.as_ref(), Block::new("basic", Region::Footer))
		.await
		.unwrap();
	let header = block(&cms, "header", "Logo", None).await;

	// Act
	let regions = cms.app.loader.load("", &cms.english(), false).await.unwrap();

	// Assert
	assert_eq!(regions.keys().copied().collect::<Vec<_>>(), vec![Region::Header]);
	assert_eq!(regions[&Region::Header][0].block.id, header.id);
}

#[rstest]
#[tokio::test]
async fn test_disabled_region_is_rejected_by_admin() {
	let settings = CmsSettings {
		block_regions: vec![Region::Header],
		..Default::default()
	};
	let cms = TestCms::with(|builder| builder.with_settings(settings));

	let result = cms
		.app
		.admin
		.create_block(CreateBlock::new("basic", "footer", "en", "Nope"))
		.await;

	match result {
		Err(CmsError::Validation(errors)) => assert!(errors.fields.contains_key("region")),
		other => panic!("expected validation error, got {:?}", other.map(|b| b.id)),
	}
}
