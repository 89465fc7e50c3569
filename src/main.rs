//! Command-line tool that documents the handlers of a Rust project.
//!
//! # Usage
//!
//! ```bash
//! apidoc-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Print the JSON descriptor list:
//! ```bash
//! apidoc-from-source ./my-service
//! ```
//!
//! Write Markdown for a deployed host:
//! ```bash
//! apidoc-from-source ./my-service -f markdown -b https://api.example.com -o API.md
//! ```
//!
//! Use a settings file and enable verbose logging:
//! ```bash
//! apidoc-from-source ./my-service -c apidoc.yaml -v
//! ```

use anyhow::Result;
use apidoc_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("apidoc-from-source starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Document generation completed successfully");

    Ok(())
}
