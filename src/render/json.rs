use super::DocRenderer;
use crate::builder::EndpointDescriptor;
use crate::error::Result;
use log::debug;

/// Serializes the descriptor list as a JSON array
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl DocRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, endpoints: &[EndpointDescriptor], _base_url: &str) -> Result<String> {
        debug!("Serializing {} endpoints to JSON", endpoints.len());
        let body = if self.pretty {
            serde_json::to_string_pretty(endpoints)?
        } else {
            serde_json::to_string(endpoints)?
        };
        Ok(body)
    }
}
