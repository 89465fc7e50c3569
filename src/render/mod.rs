//! Renderers turning endpoint descriptors into a document body.
//!
//! Each [`DocFormat`] has one renderer:
//!
//! - [`json::JsonRenderer`] serializes the descriptor list verbatim
//! - [`markdown::MarkdownRenderer`] writes a prose document grouped by handler
//! - [`html::HtmlRenderer`] renders that Markdown document into an HTML page
//!
//! # Example
//!
//! ```
//! use apidoc_from_source::render::renderer_for;
//! use apidoc_from_source::settings::DocFormat;
//!
//! let renderer = renderer_for(DocFormat::Markdown, false);
//! assert_eq!(renderer.content_type(), "text/markdown");
//! let body = renderer.render(&[], "http://localhost").unwrap();
//! assert!(body.is_empty());
//! ```

pub mod html;
pub mod json;
pub mod markdown;

use crate::builder::EndpointDescriptor;
use crate::error::Result;
use crate::settings::DocFormat;

/// Trait for rendering a generated descriptor list.
pub trait DocRenderer: Send + Sync {
    /// MIME type of the rendered body
    fn content_type(&self) -> &'static str;

    /// Renders the endpoints.
    ///
    /// # Arguments
    ///
    /// * `endpoints` - Descriptors in discovery order
    /// * `base_url` - `scheme://host` prefixed to every route in prose formats
    fn render(&self, endpoints: &[EndpointDescriptor], base_url: &str) -> Result<String>;
}

/// Returns the renderer for a format. `pretty_json` only affects JSON output.
pub fn renderer_for(format: DocFormat, pretty_json: bool) -> Box<dyn DocRenderer> {
    match format {
        DocFormat::Json => Box::new(json::JsonRenderer::new(pretty_json)),
        DocFormat::Markdown => Box::new(markdown::MarkdownRenderer),
        DocFormat::Html => Box::new(html::HtmlRenderer::default()),
    }
}
