use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parses Rust sources into `syn` syntax trees for the extractor.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/controllers/home.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A parsed source file
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

/// Outcome of parsing a batch of files
#[derive(Debug, Default)]
pub struct ParseBatch {
    /// Successfully parsed files, in input order
    pub files: Vec<ParsedFile>,
    /// Files that could not be read or parsed, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl AstParser {
    /// Reads and parses one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::parse_source(path, &content)
    }

    /// Parses source text that was read elsewhere; `path` only labels the result.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses every file, logging and setting aside the ones that fail.
    pub fn parse_files(paths: &[PathBuf]) -> ParseBatch {
        let mut batch = ParseBatch::default();

        for path in paths {
            match Self::parse_file(path) {
                Ok(parsed) => batch.files.push(parsed),
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    batch.failures.push((path.clone(), format!("{:#}", e)));
                }
            }
        }

        debug!(
            "Parsing complete: {} succeeded, {} failed",
            batch.files.len(),
            batch.failures.len()
        );
        batch
    }
}
