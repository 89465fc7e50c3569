use crate::classifier::{Argument, ArgumentClassifier};
use crate::discovery::{Candidate, Discovery};
use crate::error::{Error, Result};
use crate::model::{self, HandlerSet, Marker};
use crate::settings::{DocSettings, FailurePolicy};
use crate::synthesizer::{InstanceMaker, SynthesisError};
use crate::types::TypeRegistry;
use log::{debug, info, warn};
use serde::Serialize;

/// Everything the renderers know about one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointDescriptor {
    pub controller_name: String,
    pub action_name: String,
    pub auth_required: bool,
    pub is_post: bool,
    pub arguments: Vec<Argument>,
    /// Compact JSON payloads: declared examples first, then the global ones
    pub possible_responses: Vec<String>,
    /// Never empty
    pub routes: Vec<String>,
}

/// Joins a type-level route prefix and a method-level template.
///
/// Slashes at the seam are trimmed and an empty side is dropped.
pub fn combine_route(prefix: Option<&str>, template: &str) -> String {
    let template = template.trim_matches('/');
    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        None => template.to_string(),
        Some(prefix) if template.is_empty() => prefix.to_string(),
        Some(prefix) => format!("{}/{}", prefix, template),
    }
}

/// Assembles one [`EndpointDescriptor`] per discovered candidate.
pub struct DescriptorBuilder<'a> {
    settings: &'a DocSettings,
    classifier: ArgumentClassifier<'a>,
    maker: InstanceMaker<'a>,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(settings: &'a DocSettings, types: &'a TypeRegistry) -> Self {
        Self {
            settings,
            classifier: ArgumentClassifier::new(types),
            maker: InstanceMaker::new(types).with_depth_limit(settings.example_depth_limit()),
        }
    }

    pub fn build(&self, candidate: Candidate<'_>) -> std::result::Result<EndpointDescriptor, SynthesisError> {
        let Candidate { handler, method } = candidate;
        debug!("Building descriptor for {}::{}", handler.name, method.name);

        Ok(EndpointDescriptor {
            controller_name: handler.name.clone(),
            action_name: method.name.clone(),
            auth_required: self.settings.requires_auth(method, handler),
            is_post: method.has_marker(&Marker::HttpPost),
            arguments: self.classifier.classify(&method.params),
            possible_responses: self.possible_responses(&method.markers)?,
            routes: self.routes(candidate),
        })
    }

    fn routes(&self, candidate: Candidate<'_>) -> Vec<String> {
        let Candidate { handler, method } = candidate;
        let prefix = handler.route_template();

        let routes: Vec<String> = model::route_templates(&method.markers)
            .map(|template| combine_route(prefix, template))
            .collect();
        if !routes.is_empty() {
            return routes;
        }

        let short_name = handler
            .name
            .strip_suffix(self.settings.handler_suffix())
            .unwrap_or(&handler.name);
        vec![format!("{}/{}", short_name, method.name)]
    }

    fn possible_responses(&self, markers: &[Marker]) -> std::result::Result<Vec<String>, SynthesisError> {
        let mut responses = Vec::new();
        for ty in model::produced_types(markers) {
            responses.push(self.maker.make(ty)?.to_string());
        }
        responses.extend(self.settings.global_responses().iter().cloned());
        Ok(responses)
    }
}

/// Runs one generation pass: discovery, then a descriptor per candidate.
///
/// A candidate whose examples cannot be synthesized is skipped with a warning, or fails the
/// whole pass under [`FailurePolicy::Abort`].
pub fn generate(settings: &DocSettings, set: &HandlerSet) -> Result<Vec<EndpointDescriptor>> {
    let candidates = Discovery::new(settings).discover(set);
    let builder = DescriptorBuilder::new(settings, set.types());
    let mut endpoints = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match builder.build(candidate) {
            Ok(endpoint) => endpoints.push(endpoint),
            Err(source) => match settings.on_failure() {
                FailurePolicy::Skip => {
                    warn!(
                        "Skipping {}::{}: {}",
                        candidate.handler.name, candidate.method.name, source
                    );
                }
                FailurePolicy::Abort => {
                    return Err(Error::Synthesis {
                        handler: candidate.handler.name.clone(),
                        action: candidate.method.name.clone(),
                        source,
                    });
                }
            },
        }
    }

    info!("Generated {} endpoint descriptors", endpoints.len());
    Ok(endpoints)
}
