use crate::extractor::{HandlerExtractor, SourceExtractor};
use crate::model::HandlerSet;
use crate::parser::AstParser;
use crate::render;
use crate::scanner::FileScanner;
use crate::settings::{DocFormat, DocSettingsBuilder};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Generate endpoint documentation with example payloads from Rust handler sources
#[derive(Parser, Debug)]
#[command(name = "apidoc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format; overrides the settings file
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<DocFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Base URL that routes are shown under
    #[arg(short = 'b', long = "base-url", default_value = "http://localhost")]
    pub base_url: String,

    /// YAML settings file
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }
    if let Some(config) = &args.config_path {
        if !config.is_file() {
            anyhow::bail!("Settings file does not exist: {}", config.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Scans, parses and extracts the handler set of a project directory.
///
/// Files that cannot be read or parsed are logged and left out.
pub fn load_handlers(project_path: &Path) -> Result<HandlerSet> {
    let scan_result = FileScanner::new(project_path).scan()?;
    info!("Found {} Rust files", scan_result.rust_files.len());

    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in {}", project_path.display());
    }

    let batch = AstParser::parse_files(&scan_result.rust_files);
    info!("Successfully parsed {} files", batch.files.len());
    if !batch.failures.is_empty() {
        warn!("{} files could not be parsed", batch.failures.len());
    }

    Ok(SourceExtractor.extract_handlers(&batch.files))
}

/// Produces the rendered document for the given arguments without writing it anywhere
pub fn generate_document(args: &CliArgs) -> Result<String> {
    let mut builder = match &args.config_path {
        Some(path) => DocSettingsBuilder::from_yaml_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => DocSettingsBuilder::default(),
    };
    if let Some(format) = args.format {
        builder = builder.format(format);
    }
    let settings = builder.build().context("Invalid settings")?;
    info!("Output format: {:?}", settings.format());

    let handlers = load_handlers(&args.project_path)?;
    let endpoints = crate::builder::generate(&settings, &handlers)
        .context("Failed to build endpoint descriptors")?;
    if endpoints.is_empty() {
        warn!("No documentable endpoints found in the project");
    }

    let renderer = render::renderer_for(settings.format(), settings.pretty_json());
    let content = renderer
        .render(&endpoints, args.base_url.trim_end_matches('/'))
        .context("Failed to render document")?;
    Ok(content)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting document generation...");
    let content = generate_document(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// Writes `content` to `path`, creating parent directories as needed
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
