//! Tera based view rendering
//!
//! Built-in templates are embedded at compile time. Projects override them
//! by registering a template under the same name.

use crate::error::CmsResult;
use serde::Serialize;
use tera::{Context, Tera};

/// Plain content page
pub const CONTENT_TEMPLATE: &str = "content.html";
/// Category page with its children
pub const CATEGORY_TEMPLATE: &str = "category.html";
/// Basic block
pub const BASIC_BLOCK_TEMPLATE: &str = "blocks/basic.html";
/// Menu block
pub const MENU_BLOCK_TEMPLATE: &str = "blocks/menu.html";
/// Slider block
pub const SLIDER_BLOCK_TEMPLATE: &str = "blocks/slider.html";
/// Widget block
pub const WIDGET_BLOCK_TEMPLATE: &str = "blocks/widget.html";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
	(CONTENT_TEMPLATE, include_str!("../templates/content.html")),
	(CATEGORY_TEMPLATE, include_str!("../templates/category.html")),
	(
		BASIC_BLOCK_TEMPLATE,
		include_str!("../templates/blocks/basic.html"),
	),
	(
		MENU_BLOCK_TEMPLATE,
		include_str!("../templates/blocks/menu.html"),
	),
	(
		SLIDER_BLOCK_TEMPLATE,
		include_str!("../templates/blocks/slider.html"),
	),
	(
		WIDGET_BLOCK_TEMPLATE,
		include_str!("../templates/blocks/widget.html"),
	),
];

/// Renders views from serializable data
pub struct ViewRenderer {
	tera: Tera,
}

impl ViewRenderer {
	/// Renderer with the built-in templates
	pub fn new() -> CmsResult<Self> {
		let mut tera = Tera::default();
		tera.add_raw_templates(BUILTIN_TEMPLATES.to_vec())?;
		Ok(Self { tera })
	}

	/// Register or override a template
	pub fn add_template(&mut self, name: &str, source: &str) -> CmsResult<()> {
		self.tera.add_raw_template(name, source)?;
		Ok(())
	}

	/// Whether a template is registered under `name`
	pub fn has_template(&self, name: &str) -> bool {
		self.tera.get_template_names().any(|n| n == name)
	}

	/// Render `name` with `data` as context
	///
	/// `data` must serialize to a map.
	pub fn render<T: Serialize>(&self, name: &str, data: &T) -> CmsResult<String> {
		let context = Context::from_serialize(data)?;
		Ok(self.tera.render(name, &context)?)
	}
}

impl std::fmt::Debug for ViewRenderer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut names: Vec<&str> = self.tera.get_template_names().collect();
		names.sort();
		f.debug_struct("ViewRenderer")
			.field("templates", &names)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_builtin_templates_are_registered() {
		let renderer = ViewRenderer::new().unwrap();
		for (name, _) in BUILTIN_TEMPLATES {
			assert!(renderer.has_template(name), "missing {}", name);
		}
	}

	#[rstest]
	fn test_basic_block_escapes_title_but_not_body() {
		// Arrange
		let renderer = ViewRenderer::new().unwrap();
		let data = json!({
			"block": {"id": 3},
			"translation": {"title": "<b>News</b>", "body": "<p>Body</p>"},
		});

		// Act
		let html = renderer.render(BASIC_BLOCK_TEMPLATE, &data).unwrap();

		// Assert
		assert!(html.contains("&lt;b&gt;News&lt;&#x2F;b&gt;"));
		assert!(html.contains("<p>Body</p>"));
		assert!(html.contains("block-3"));
	}

	#[rstest]
	fn test_override_template() {
		let mut renderer = ViewRenderer::new().unwrap();
		renderer
			.add_template(BASIC_BLOCK_TEMPLATE, "custom {{ block.id }}")
			.unwrap();

		let html = renderer
			.render(BASIC_BLOCK_TEMPLATE, &json!({"block": {"id": 1}}))
			.unwrap();

		assert_eq!(html, "custom 1");
	}

	#[rstest]
	fn test_missing_template_is_template_error() {
		let renderer = ViewRenderer::new().unwrap();
		let result = renderer.render("nope.html", &json!({}));
		assert!(matches!(result, Err(crate::error::CmsError::Template(_))));
	}
}
