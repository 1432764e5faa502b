//! Content type handlers: plain pages and categories

use super::{ContentTypeHandler, FileView, HandlerContext, to_view_data};
use crate::context::{RenderedResponse, RequestContext};
use crate::error::CmsResult;
use crate::language::Language;
use crate::models::{Attachable, Content, ContentKind, ContentTranslation, FileKind};
use crate::pagination::Paginator;
use crate::render::{CATEGORY_TEMPLATE, CONTENT_TEMPLATE};
use crate::repository::ContentQuery;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// One step of the navigation trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
	/// Display title in the requested language
	pub title: String,
	/// Localized URL
	pub url: String,
}

/// Data a content page is rendered from
#[derive(Debug, Clone, Serialize)]
pub struct ContentView {
	/// The content node
	pub content: Content,
	/// Translation in the requested language, if any
	pub translation: Option<ContentTranslation>,
	/// Localized URL of the content
	pub url: String,
	/// Active image attachments
	pub images: Vec<FileView>,
	/// Active document attachments
	pub documents: Vec<FileView>,
	/// Home first, the content itself last
	pub breadcrumbs: Vec<Breadcrumb>,
}

/// Plain content page
pub struct ContentHandler {
	ctx: HandlerContext,
}

impl ContentHandler {
	/// Create a handler over the shared collaborators
	pub fn new(ctx: HandlerContext) -> Self {
		Self { ctx }
	}

	fn url_of(&self, content: &Content, language: &Language) -> String {
		let path = content.route.path(&language.code).unwrap_or_default();
		language.url(path, &self.ctx.settings.multilang)
	}

	/// Home entry, then one entry per ancestor, then `content`
	pub async fn breadcrumbs(
		&self,
		content: &Content,
		language: &Language,
	) -> CmsResult<Vec<Breadcrumb>> {
		let ancestors = self.ctx.contents.ancestors(content).await?;
		let mut trail = Vec::with_capacity(ancestors.len() + 2);
		trail.push(Breadcrumb {
			title: self.ctx.settings.home_label.clone(),
			url: language.url("", &self.ctx.settings.multilang),
		});
		for node in ancestors.iter().chain(std::iter::once(content)) {
			trail.push(Breadcrumb {
				title: node.title(&language.code).to_string(),
				url: self.url_of(node, language),
			});
		}
		Ok(trail)
	}

	/// Load everything a plain page needs
	pub async fn build_view(&self, content: &Content, language: &Language) -> CmsResult<ContentView> {
		let files = self
			.ctx
			.files
			.active_files(Attachable::Content(content.id))
			.await?;

		let mut images = Vec::new();
		let mut documents = Vec::new();
		for file in &files {
			match self.ctx.settings.file_kind(file) {
				Some(FileKind::Image) => images.push(FileView::new(file, &self.ctx.settings)),
				Some(FileKind::Document) => {
					documents.push(FileView::new(file, &self.ctx.settings))
				}
				_ => {}
			}
		}
		debug!(
			content_id = content.id,
			images = images.len(),
			documents = documents.len(),
			"Loaded content attachments"
		);

		Ok(ContentView {
			content: content.clone(),
			translation: content.translation(&language.code).cloned(),
			url: self.url_of(content, language),
			images,
			documents,
			breadcrumbs: self.breadcrumbs(content, language).await?,
		})
	}
}

#[async_trait]
impl ContentTypeHandler for ContentHandler {
	fn kind(&self) -> ContentKind {
		ContentKind::Content
	}

	async fn handle(
		&self,
		content: &Content,
		language: &Language,
		_request: &RequestContext,
	) -> CmsResult<RenderedResponse> {
		let view = self.build_view(content, language).await?;
		let data = to_view_data(&view)?;
		let body = self.ctx.renderer.render(CONTENT_TEMPLATE, &data)?;
		Ok(RenderedResponse::ok(CONTENT_TEMPLATE, body, data))
	}
}

/// Listing entry of a category child
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildView {
	/// Child id
	pub id: u64,
	/// Title in the requested language
	pub title: String,
	/// Teaser in the requested language
	pub teaser: Option<String>,
	/// Localized URL
	pub url: String,
	/// Promoted flag
	pub is_promoted: bool,
	/// Sticky flag
	pub is_sticky: bool,
}

/// Numbered pagination link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
	/// Page number
	pub page: u32,
	/// Link target
	pub url: String,
	/// Whether this is the page being shown
	pub current: bool,
}

#[derive(Serialize)]
struct CategoryView {
	#[serde(flatten)]
	page: ContentView,
	children: Paginator<ChildView>,
	page_links: Vec<PageLink>,
}

/// Content page followed by its paginated active children
pub struct CategoryHandler {
	page: ContentHandler,
}

impl CategoryHandler {
	/// Create a handler over the shared collaborators
	pub fn new(ctx: HandlerContext) -> Self {
		Self {
			page: ContentHandler::new(ctx),
		}
	}

	/// Active children of `content` for the page the request asks for
	pub async fn children(
		&self,
		content: &Content,
		language: &Language,
		request: &RequestContext,
	) -> CmsResult<Paginator<ChildView>> {
		let ctx = &self.page.ctx;
		let per_page = request.per_page(ctx.settings.default_page_size);
		let query = ContentQuery::active_children(content.id, per_page).page(request.page());
		let result = ctx.contents.query(&query).await?;
		debug!(
			content_id = content.id,
			page = query.page,
			total = result.total,
			"Loaded category children"
		);

		let mut paginator = Paginator::new(
			result.items,
			result.total,
			per_page,
			query.page,
			request.url.clone(),
		);
		if per_page != ctx.settings.default_page_size {
			paginator = paginator.keep_query("per_page", &per_page.to_string());
		}
		Ok(paginator.map(|child| {
			let translation = child.translation(&language.code);
			ChildView {
				id: child.id,
				title: translation.map(|t| t.title.clone()).unwrap_or_default(),
				teaser: translation.and_then(|t| t.teaser.clone()),
				url: self.page.url_of(&child, language),
				is_promoted: child.is_promoted,
				is_sticky: child.is_sticky,
			}
		}))
	}
}

#[async_trait]
impl ContentTypeHandler for CategoryHandler {
	fn kind(&self) -> ContentKind {
		ContentKind::Category
	}

	async fn handle(
		&self,
		content: &Content,
		language: &Language,
		request: &RequestContext,
	) -> CmsResult<RenderedResponse> {
		let page = self.page.build_view(content, language).await?;
		let children = self.children(content, language, request).await?;
		let page_links = (1..=children.last_page)
			.map(|number| PageLink {
				page: number,
				url: children.url(number),
				current: number == children.current_page,
			})
			.collect();

		let view = CategoryView {
			page,
			children,
			page_links,
		};
		let data = to_view_data(&view)?;
		let body = self.page.ctx.renderer.render(CATEGORY_TEMPLATE, &data)?;
		Ok(RenderedResponse::ok(CATEGORY_TEMPLATE, body, data))
	}
}
