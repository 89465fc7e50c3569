use anyhow::{bail, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
const SKIPPED_DIRS: [&str; 2] = ["target", "node_modules"];

/// Collects the Rust sources of a handler project.
///
/// The walk is sorted by file name, so the same tree always yields the same file order. That
/// order becomes the scan order of handlers and, in the end, the order of the generated document.
/// `target` and hidden directories are skipped.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::scanner::FileScanner;
///
/// let result = FileScanner::new("./my-service").scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Files found by a scan, plus the paths that could not be visited
pub struct ScanResult {
    pub rust_files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Walks the tree and collects every `.rs` file in sorted order.
    ///
    /// Inaccessible entries become warnings and the walk continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            bail!(
                "Project path is not a directory: {}",
                self.root_path.display()
            );
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped(e));

        for entry in walker {
            match entry {
                Ok(entry) if is_rust_file(&entry) => {
                    debug!("Found source file: {}", entry.path().display());
                    rust_files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} Rust files",
            self.root_path.display(),
            rust_files.len()
        );
        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref()))
}

fn is_rust_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && entry.path().extension().and_then(|s| s.to_str()) == Some("rs")
}
