use super::markdown::MarkdownRenderer;
use super::DocRenderer;
use crate::builder::EndpointDescriptor;
use crate::error::Result;
use pulldown_cmark::{html, Event, Options, Parser};

/// Renders the Markdown document into a standalone HTML page
pub struct HtmlRenderer {
    title: String,
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new("API documentation")
    }
}

impl DocRenderer for HtmlRenderer {
    fn content_type(&self) -> &'static str {
        "text/html"
    }

    fn render(&self, endpoints: &[EndpointDescriptor], base_url: &str) -> Result<String> {
        let markdown = MarkdownRenderer.render(endpoints, base_url)?;
        // Names and payloads come from user source; raw HTML is shown as text
        let parser = Parser::new_ext(&markdown, Options::ENABLE_TABLES).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut body, parser);

        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            html_escape::encode_text(&self.title),
            body
        ))
    }
}
