//! Serving a generated document at its mount path.
//!
//! A [`DocService`] answers requests for exactly one normalized mount path and lets every other
//! request pass through, like a middleware that only ever short-circuits one route. Each request
//! runs its own generation pass over the shared, immutable settings and handler set, so one
//! service can be called from many threads at once.
//!
//! # Example
//!
//! ```
//! use apidoc_from_source::model::{HandlerMethod, HandlerSet, HandlerType, Marker};
//! use apidoc_from_source::service::DocService;
//! use apidoc_from_source::settings::{DocFormat, DocSettings};
//!
//! let handlers = HandlerSet::new().with_handler(
//!     HandlerType::new("HomeController")
//!         .implementing("Controller")
//!         .with_marker(Marker::GenerateDoc)
//!         .with_method(HandlerMethod::new("index")),
//! );
//! let settings = DocSettings::builder()
//!     .mount_path("/my-doc/")
//!     .format(DocFormat::Markdown)
//!     .build()
//!     .unwrap();
//! let service = DocService::new(settings, handlers);
//!
//! let request = http::Request::get("http://localhost:5000/My-Doc").body(()).unwrap();
//! let response = service.handle(&request).unwrap().unwrap();
//! assert!(response.body().contains("http://localhost:5000/Home/index"));
//!
//! let other = http::Request::get("/api/values").body(()).unwrap();
//! assert!(service.handle(&other).unwrap().is_none());
//! ```

use crate::builder::{self, EndpointDescriptor};
use crate::error::{Error, Result};
use crate::model::HandlerSet;
use crate::render::{self, DocRenderer};
use crate::settings::DocSettings;
use http::header::{CONTENT_TYPE, HOST};
use http::{HeaderValue, Request, Response, StatusCode};
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// One configured document instance
pub struct DocService {
    settings: Arc<DocSettings>,
    handlers: Arc<HandlerSet>,
    renderer: Box<dyn DocRenderer>,
}

impl DocService {
    pub fn new(settings: DocSettings, handlers: HandlerSet) -> Self {
        Self::from_shared(Arc::new(settings), Arc::new(handlers))
    }

    /// Builds a service over settings and handlers shared with other instances
    pub fn from_shared(settings: Arc<DocSettings>, handlers: Arc<HandlerSet>) -> Self {
        let renderer = render::renderer_for(settings.format(), settings.pretty_json());
        Self {
            settings,
            handlers,
            renderer,
        }
    }

    pub fn settings(&self) -> &DocSettings {
        &self.settings
    }

    pub fn content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// Runs one generation pass
    pub fn generate(&self) -> Result<Vec<EndpointDescriptor>> {
        builder::generate(&self.settings, &self.handlers)
    }

    /// Generates and renders the document for `base_url` (`scheme://host`)
    pub fn render(&self, base_url: &str) -> Result<String> {
        let endpoints = self.generate()?;
        self.renderer.render(&endpoints, base_url)
    }

    /// Answers a request for the mount path; returns `Ok(None)` for any other path.
    pub fn handle<B>(&self, request: &Request<B>) -> Result<Option<Response<String>>> {
        if !self.settings.matches_path(request.uri().path()) {
            return Ok(None);
        }

        info!("Serving document at /{}", self.settings.mount_path());
        let body = self.render(&base_url(request))?;

        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::OK;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type()));
        Ok(Some(response))
    }
}

/// `scheme://host` of a request.
///
/// Taken from the request URI when it is absolute, otherwise from the `X-Forwarded-Proto` and
/// `Host` headers, falling back to `http` and `localhost`.
pub fn base_url<B>(request: &Request<B>) -> String {
    let uri = request.uri();

    let scheme = uri
        .scheme_str()
        .map(str::to_string)
        .or_else(|| {
            header_str(request, FORWARDED_PROTO)
                .and_then(|value| value.split(',').next())
                .map(|proto| proto.trim().to_string())
                .filter(|proto| !proto.is_empty())
        })
        .unwrap_or_else(|| "http".to_string());

    let host = uri
        .authority()
        .map(|authority| match authority.port_u16() {
            Some(port) => format!("{}:{}", authority.host(), port),
            None => authority.host().to_string(),
        })
        .or_else(|| header_str(request, HOST.as_str()).map(|host| host.trim().to_string()))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "localhost".to_string());

    format!("{}://{}", scheme, host)
}

fn header_str<'r, B>(request: &'r Request<B>, name: &str) -> Option<&'r str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

/// Several document instances, each on its own mount path.
#[derive(Default)]
pub struct DocServices {
    services: Vec<DocService>,
    mount_paths: HashSet<String>,
}

impl DocServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance. Two instances may not share a mount path.
    pub fn add(&mut self, service: DocService) -> Result<()> {
        let mount_path = service.settings().mount_path().to_string();
        if !self.mount_paths.insert(mount_path.clone()) {
            return Err(Error::InvalidConfig(format!(
                "mount path '/{}' is already served by another document",
                mount_path
            )));
        }
        debug!("Registered document at /{}", mount_path);
        self.services.push(service);
        Ok(())
    }

    pub fn with(mut self, service: DocService) -> Result<Self> {
        self.add(service)?;
        Ok(self)
    }

    /// Lets the instance owning the request path answer; `Ok(None)` when none does.
    pub fn handle<B>(&self, request: &Request<B>) -> Result<Option<Response<String>>> {
        for service in &self.services {
            if let Some(response) = service.handle(request)? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HandlerMethod, HandlerType, Marker};
    use crate::settings::DocFormat;

    fn handlers() -> HandlerSet {
        HandlerSet::new().with_handler(
            HandlerType::new("HomeController")
                .implementing("ControllerBase")
                .with_marker(Marker::GenerateDoc)
                .with_method(HandlerMethod::new("index"))
                .with_method(HandlerMethod::new("no_action")),
        )
    }

    fn service(mount: &str, format: DocFormat) -> DocService {
        let settings = DocSettings::builder()
            .mount_path(mount)
            .format(format)
            .build()
            .unwrap();
        DocService::new(settings, handlers())
    }

    fn get(uri: &str) -> Request<()> {
        Request::get(uri).body(()).unwrap()
    }

    #[test]
    fn test_mount_path_is_normalized() {
        let service = service("/My-Doc-Json/", DocFormat::Json);

        for path in ["/my-doc-json", "/MY-DOC-JSON/", "/My-Doc-Json"] {
            let response = service.handle(&get(path)).unwrap().unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[test]
    fn test_other_paths_pass_through() {
        let service = service("my-doc-json", DocFormat::Json);

        assert!(service.handle(&get("/")).unwrap().is_none());
        assert!(service.handle(&get("/my-doc-json/extra")).unwrap().is_none());
        assert!(service.handle(&get("/api/values")).unwrap().is_none());
    }

    #[test]
    fn test_content_type_per_format() {
        for (format, expected) in [
            (DocFormat::Json, "application/json"),
            (DocFormat::Markdown, "text/markdown"),
            (DocFormat::Html, "text/html"),
        ] {
            let response = service("doc", format).handle(&get("/doc")).unwrap().unwrap();
            assert_eq!(response.headers()[CONTENT_TYPE], expected);
        }
    }

    #[test]
    fn test_json_body_lists_endpoints() {
        let response = service("doc", DocFormat::Json)
            .handle(&get("/doc"))
            .unwrap()
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["Routes"][0], "Home/no_action");
    }

    #[test]
    fn test_base_url_sources() {
        assert_eq!(base_url(&get("https://api.example.com:8443/doc")), "https://api.example.com:8443");

        let forwarded = Request::get("/doc")
            .header("Host", "docs.example.com")
            .header("X-Forwarded-Proto", "https, http")
            .body(())
            .unwrap();
        assert_eq!(base_url(&forwarded), "https://docs.example.com");

        assert_eq!(base_url(&get("/doc")), "http://localhost");
    }

    #[test]
    fn test_markdown_uses_request_host() {
        let request = Request::get("/doc")
            .header("Host", "localhost:5000")
            .body(())
            .unwrap();
        let response = service("doc", DocFormat::Markdown)
            .handle(&request)
            .unwrap()
            .unwrap();
        assert!(response.body().contains("`http://localhost:5000/Home/index`"));
    }

    #[test]
    fn test_services_route_by_mount_path() {
        let services = DocServices::new()
            .with(service("my-doc-json", DocFormat::Json))
            .unwrap()
            .with(service("my-doc-markdown", DocFormat::Markdown))
            .unwrap()
            .with(service("my-doc-html", DocFormat::Html))
            .unwrap();
        assert_eq!(services.len(), 3);

        let markdown = services.handle(&get("/my-doc-markdown")).unwrap().unwrap();
        assert_eq!(markdown.headers()[CONTENT_TYPE], "text/markdown");
        let html = services.handle(&get("/my-doc-html")).unwrap().unwrap();
        assert_eq!(html.headers()[CONTENT_TYPE], "text/html");
        assert!(services.handle(&get("/elsewhere")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_mount_path_rejected() {
        let result = DocServices::new()
            .with(service("doc", DocFormat::Json))
            .unwrap()
            .with(service("/DOC/", DocFormat::Markdown));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_service_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocService>();
        assert_send_sync::<DocServices>();

        let service = service("doc", DocFormat::Json);
        let bodies: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        service
                            .handle(&get("/doc"))
                            .unwrap()
                            .unwrap()
                            .into_body()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
