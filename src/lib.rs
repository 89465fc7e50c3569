//! Endpoint documentation with example payloads, generated from handler metadata.
//!
//! Handler types group related endpoints. Their metadata (methods, parameters, markers and the
//! composite types they mention) is either registered by hand in a [`model::HandlerSet`] or
//! extracted from Rust source. Each generation pass turns that metadata into a list of
//! [`builder::EndpointDescriptor`]s and renders it as JSON, Markdown or HTML.
//!
//! # Architecture
//!
//! 1. [`scanner`], [`parser`] and [`extractor`] - Read a project tree into a [`model::HandlerSet`]
//! 2. [`discovery`] - Selects the documentable handler methods
//! 3. [`classifier`] - Turns parameters into documented arguments
//! 4. [`synthesizer`] - Builds example values for response types
//! 5. [`builder`] - Assembles one descriptor per endpoint
//! 6. [`render`] - Formats the descriptor list
//! 7. [`service`] - Answers requests for a document's mount path
//!
//! [`settings`] holds the immutable configuration every step reads.
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_from_source::{
//!     builder,
//!     extractor::{HandlerExtractor, SourceExtractor},
//!     parser::AstParser,
//!     render,
//!     scanner::FileScanner,
//!     settings::{DocFormat, DocSettings},
//! };
//!
//! let scan_result = FileScanner::new("./my-service").scan().unwrap();
//! let batch = AstParser::parse_files(&scan_result.rust_files);
//! let handlers = SourceExtractor.extract_handlers(&batch.files);
//!
//! let settings = DocSettings::builder()
//!     .format(DocFormat::Markdown)
//!     .build()
//!     .unwrap();
//! let endpoints = builder::generate(&settings, &handlers).unwrap();
//! let markdown = render::renderer_for(settings.format(), false)
//!     .render(&endpoints, "http://localhost:5000")
//!     .unwrap();
//! println!("{}", markdown);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod types;
pub mod model;
pub mod settings;
pub mod discovery;
pub mod classifier;
pub mod synthesizer;
pub mod builder;
pub mod render;
pub mod service;
pub mod cli;
pub mod scanner;
pub mod parser;
pub mod extractor;
pub mod error;
