//! Document settings.
//!
//! [`DocSettings`] is built once through [`DocSettingsBuilder`], which validates every invariant
//! up front, and is read-only afterwards. Settings can also be loaded from a YAML file:
//!
//! ```yaml
//! mount_path: /my-doc-markdown
//! format: markdown
//! documentable: generate_doc      # generate_doc | all | none | marker:<name>
//! requires_auth: authorize        # authorize | all | none | marker:<name>
//! on_failure: skip                # skip | abort
//! global_responses:
//!   - { code: -4, message: "Some error." }
//! ```

use crate::error::{Error, Result};
use crate::model::{HandlerMethod, HandlerType, Marker};
use crate::synthesizer::{DEFAULT_DEPTH_LIMIT, MAX_DEPTH_LIMIT};
use clap::ValueEnum;
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Decides something about a method given its handler type
pub type ActionPredicate = Arc<dyn Fn(&HandlerMethod, &HandlerType) -> bool + Send + Sync>;

const DEFAULT_MOUNT_PATH: &str = "doc";
const DEFAULT_HANDLER_SUFFIX: &str = "Controller";
const DEFAULT_HANDLER_TRAITS: [&str; 2] = ["Controller", "ControllerBase"];

/// Output format of a document instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// The descriptor list as JSON
    Json,
    /// Markdown grouped by handler
    Markdown,
    /// The Markdown document rendered to HTML
    Html,
}

impl DocFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            DocFormat::Json => "application/json",
            DocFormat::Markdown => "text/markdown",
            DocFormat::Html => "text/html",
        }
    }
}

impl FromStr for DocFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DocFormat::Json),
            "markdown" | "md" => Ok(DocFormat::Markdown),
            "html" => Ok(DocFormat::Html),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// What a generation pass does when one endpoint cannot be described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, leave the endpoint out and continue
    #[default]
    Skip,
    /// Fail the whole pass
    Abort,
}

/// A named predicate, as written in a settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateRule {
    /// True when the method or its handler type carries the marker
    Marker(Marker),
    All,
    None,
}

impl PredicateRule {
    pub fn parse(rule: &str) -> Result<PredicateRule> {
        let rule = rule.trim();
        match rule {
            "all" => Ok(PredicateRule::All),
            "none" => Ok(PredicateRule::None),
            "generate_doc" => Ok(PredicateRule::Marker(Marker::GenerateDoc)),
            "authorize" => Ok(PredicateRule::Marker(Marker::Authorize)),
            _ => match rule.strip_prefix("marker:") {
                Some(name) if !name.trim().is_empty() => {
                    Ok(PredicateRule::Marker(Marker::Custom(name.trim().to_string())))
                }
                _ => Err(Error::InvalidConfig(format!(
                    "unknown predicate rule '{}' (expected all, none, generate_doc, authorize or marker:<name>)",
                    rule
                ))),
            },
        }
    }

    pub fn into_predicate(self) -> ActionPredicate {
        match self {
            PredicateRule::Marker(marker) => Arc::new(move |method: &HandlerMethod, handler: &HandlerType| {
                method.has_marker(&marker) || handler.has_marker(&marker)
            }),
            PredicateRule::All => Arc::new(|_: &HandlerMethod, _: &HandlerType| true),
            PredicateRule::None => Arc::new(|_: &HandlerMethod, _: &HandlerType| false),
        }
    }
}

/// Trims whitespace and slashes and lower-cases a request or mount path.
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_lowercase()
}

/// Immutable settings of one document instance.
#[derive(Clone)]
pub struct DocSettings {
    mount_path: String,
    format: DocFormat,
    handler_suffix: String,
    handler_traits: Vec<String>,
    documentable: ActionPredicate,
    requires_auth: ActionPredicate,
    global_responses: Vec<String>,
    example_depth_limit: usize,
    on_failure: FailurePolicy,
    pretty_json: bool,
}

impl DocSettings {
    pub fn builder() -> DocSettingsBuilder {
        DocSettingsBuilder::default()
    }

    /// The normalized mount path
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Whether a request path addresses this document
    pub fn matches_path(&self, request_path: &str) -> bool {
        normalize_path(request_path) == self.mount_path
    }

    pub fn format(&self) -> DocFormat {
        self.format
    }

    pub fn handler_suffix(&self) -> &str {
        &self.handler_suffix
    }

    pub fn handler_traits(&self) -> &[String] {
        &self.handler_traits
    }

    pub fn is_documentable(&self, method: &HandlerMethod, handler: &HandlerType) -> bool {
        (self.documentable)(method, handler)
    }

    pub fn requires_auth(&self, method: &HandlerMethod, handler: &HandlerType) -> bool {
        (self.requires_auth)(method, handler)
    }

    /// Global example responses, already serialized
    pub fn global_responses(&self) -> &[String] {
        &self.global_responses
    }

    pub fn example_depth_limit(&self) -> usize {
        self.example_depth_limit
    }

    pub fn on_failure(&self) -> FailurePolicy {
        self.on_failure
    }

    pub fn pretty_json(&self) -> bool {
        self.pretty_json
    }
}

impl fmt::Debug for DocSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocSettings")
            .field("mount_path", &self.mount_path)
            .field("format", &self.format)
            .field("handler_suffix", &self.handler_suffix)
            .field("handler_traits", &self.handler_traits)
            .field("global_responses", &self.global_responses.len())
            .field("example_depth_limit", &self.example_depth_limit)
            .field("on_failure", &self.on_failure)
            .field("pretty_json", &self.pretty_json)
            .finish_non_exhaustive()
    }
}

/// Settings file layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    mount_path: Option<String>,
    format: Option<String>,
    handler_suffix: Option<String>,
    handler_traits: Option<Vec<String>>,
    documentable: Option<String>,
    requires_auth: Option<String>,
    #[serde(default)]
    global_responses: Vec<serde_json::Value>,
    example_depth_limit: Option<usize>,
    on_failure: Option<FailurePolicy>,
    pretty_json: Option<bool>,
}

/// Collects and validates settings.
#[derive(Clone)]
pub struct DocSettingsBuilder {
    mount_path: String,
    format: DocFormat,
    handler_suffix: String,
    handler_traits: Vec<String>,
    documentable: ActionPredicate,
    requires_auth: ActionPredicate,
    global_responses: Vec<serde_json::Value>,
    example_depth_limit: usize,
    on_failure: FailurePolicy,
    pretty_json: bool,
}

impl Default for DocSettingsBuilder {
    fn default() -> Self {
        Self {
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            format: DocFormat::Json,
            handler_suffix: DEFAULT_HANDLER_SUFFIX.to_string(),
            handler_traits: DEFAULT_HANDLER_TRAITS.iter().map(|t| t.to_string()).collect(),
            documentable: PredicateRule::Marker(Marker::GenerateDoc).into_predicate(),
            requires_auth: PredicateRule::Marker(Marker::Authorize).into_predicate(),
            global_responses: Vec::new(),
            example_depth_limit: DEFAULT_DEPTH_LIMIT,
            on_failure: FailurePolicy::Skip,
            pretty_json: false,
        }
    }
}

impl DocSettingsBuilder {
    /// Reads a YAML settings document on top of the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: SettingsFile = serde_yaml::from_str(content)?;
        let mut builder = Self::default();

        if let Some(mount_path) = file.mount_path {
            builder = builder.mount_path(mount_path);
        }
        if let Some(format) = file.format {
            builder = builder.format(format.parse()?);
        }
        if let Some(suffix) = file.handler_suffix {
            builder = builder.handler_suffix(suffix);
        }
        if let Some(traits) = file.handler_traits {
            builder = builder.handler_traits(traits);
        }
        if let Some(rule) = file.documentable {
            builder.documentable = PredicateRule::parse(&rule)?.into_predicate();
        }
        if let Some(rule) = file.requires_auth {
            builder.requires_auth = PredicateRule::parse(&rule)?.into_predicate();
        }
        if let Some(limit) = file.example_depth_limit {
            builder = builder.example_depth_limit(limit);
        }
        if let Some(policy) = file.on_failure {
            builder = builder.on_failure(policy);
        }
        if let Some(pretty) = file.pretty_json {
            builder = builder.pretty_json(pretty);
        }
        builder.global_responses = file.global_responses;

        Ok(builder)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn mount_path(mut self, path: impl Into<String>) -> Self {
        self.mount_path = path.into();
        self
    }

    pub fn format(mut self, format: DocFormat) -> Self {
        self.format = format;
        self
    }

    pub fn handler_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.handler_suffix = suffix.into();
        self
    }

    pub fn handler_traits(mut self, traits: Vec<String>) -> Self {
        self.handler_traits = traits;
        self
    }

    pub fn documentable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HandlerMethod, &HandlerType) -> bool + Send + Sync + 'static,
    {
        self.documentable = Arc::new(predicate);
        self
    }

    pub fn requires_auth<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HandlerMethod, &HandlerType) -> bool + Send + Sync + 'static,
    {
        self.requires_auth = Arc::new(predicate);
        self
    }

    pub fn global_response(mut self, response: serde_json::Value) -> Self {
        self.global_responses.push(response);
        self
    }

    pub fn example_depth_limit(mut self, limit: usize) -> Self {
        self.example_depth_limit = limit;
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Validates the settings and freezes them.
    pub fn build(self) -> Result<DocSettings> {
        let mount_path = normalize_path(&self.mount_path);
        if mount_path.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "mount path '{}' is empty after normalization",
                self.mount_path
            )));
        }

        let handler_suffix = self.handler_suffix.trim().to_string();
        if handler_suffix.is_empty() {
            return Err(Error::InvalidConfig("handler suffix must not be empty".to_string()));
        }

        let handler_traits: Vec<String> = self
            .handler_traits
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if handler_traits.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one handler trait is required".to_string(),
            ));
        }

        if !(1..=MAX_DEPTH_LIMIT).contains(&self.example_depth_limit) {
            return Err(Error::InvalidConfig(format!(
                "example depth limit must be between 1 and {}, got {}",
                MAX_DEPTH_LIMIT, self.example_depth_limit
            )));
        }

        let global_responses = self
            .global_responses
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Settings built: mount path '{}', format {:?}, {} global responses",
            mount_path,
            self.format,
            global_responses.len()
        );

        Ok(DocSettings {
            mount_path,
            format: self.format,
            handler_suffix,
            handler_traits,
            documentable: self.documentable,
            requires_auth: self.requires_auth,
            global_responses,
            example_depth_limit: self.example_depth_limit,
            on_failure: self.on_failure,
            pretty_json: self.pretty_json,
        })
    }
}
