//! # mdunpack Library
//!
//! Recreates files that are embedded in a Markdown document as
//! `## /path` headings followed by fenced code blocks.
//!
//! ## Usage
//!
//! ### To extract every file into a directory:
//!
//! ```rust,no_run
//! use mdunpack::extract_from_markdown;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let report = extract_from_markdown(Path::new("README.md"), Some(Path::new("out/"))).await?;
//!     for failure in report.failures() {
//!         eprintln!("{failure}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### To inspect the embedded files without writing anything:
//!
//! ```rust
//! use mdunpack::{scan, TrailingBlock};
//!
//! let doc = "## /hello.txt\n```text\nhello\n```\n";
//! let units: Vec<_> = scan(doc.as_bytes(), TrailingBlock::Discard)
//!     .collect::<std::io::Result<_>>()
//!     .unwrap();
//! assert_eq!(units[0].path, "/hello.txt");
//! assert_eq!(units[0].content, b"hello\n");
//! ```

pub mod cli;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod utils;
pub mod writer;

pub use cli::Config;
pub use error::{ExtractError, WriteError};
pub use extractor::{ExtractionReport, Extractor, extract_from_markdown, plan, plan_reader};
pub use scanner::{ExtractionUnit, Scanner, TrailingBlock, Units, scan};
pub use writer::{Written, materialize};

use anyhow::Result;
use log::info;

/// Runs one CLI invocation. Each file is reported on standard output as soon
/// as it is written or fails; problems with the input document are reported
/// the same way and end the run without an error status.
pub async fn run_mdunpack(config: Config) -> Result<()> {
    if config.dry_run {
        return dry_run(&config).await;
    }

    let extractor = Extractor::new(&config.output_root).trailing_block(config.trailing);
    let report = match extractor.run_with(&config.input_path, print_outcome).await {
        Ok(report) => report,
        Err(ExtractError::Open { source, .. }) => {
            println!("Error opening input file: {source}");
            return Ok(());
        }
        Err(ExtractError::Read { report, source }) => {
            print_summary(&report);
            println!("Error reading input file: {source}");
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    print_summary(&report);
    Ok(())
}

fn print_outcome(outcome: &std::result::Result<Written, WriteError>) {
    match outcome {
        Ok(written) => println!("wrote {}", written.path.display()),
        Err(e) => println!("Error writing file {}: {}", e.path().display(), e),
    }
}

fn print_summary(report: &ExtractionReport) {
    let written = report.written().count();
    let failed = report.failures().count();
    info!("{written} file(s) written, {failed} failed");
    println!("{written} file(s) written, {failed} failed");
}

async fn dry_run(config: &Config) -> Result<()> {
    let (units, read_error) = match plan(&config.input_path, config.trailing).await {
        Ok(units) => (units, None),
        Err(ExtractError::PlanRead { units, source }) => (units, Some(source)),
        Err(ExtractError::Open { source, .. }) => {
            println!("Error opening input file: {source}");
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    for unit in &units {
        println!(
            "would write {}",
            writer::resolve_target(&config.output_root, &unit.path).display()
        );
    }
    println!("{} file(s) found", units.len());
    if let Some(source) = read_error {
        println!("Error reading input file: {source}");
    }
    Ok(())
}
