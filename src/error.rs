//! Error types for the extraction pipeline.
//!
//! Per-file failures are reported as [`WriteError`] values inside an
//! [`ExtractionReport`](crate::extractor::ExtractionReport) and never stop a run.
//! Failures on the input document itself are [`ExtractError`]s and end the run.

use crate::extractor::ExtractionReport;
use crate::scanner::ExtractionUnit;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single unit could not be materialized.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    /// The filesystem path the failed operation was acting on.
    pub fn path(&self) -> &Path {
        match self {
            WriteError::CreateDir { path, .. } | WriteError::Write { path, .. } => path,
        }
    }
}

/// The input document could not be opened or read.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open input document {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading stopped partway through. Units emitted before the failure were
    /// already materialized and are listed in `report`.
    #[error("failed to read input document after {} unit(s): {source}", .report.len())]
    Read {
        report: ExtractionReport,
        #[source]
        source: io::Error,
    },

    /// Reading stopped partway through a dry run. `units` holds what was
    /// found before the failure.
    #[error("failed to read input document after {} unit(s): {source}", .units.len())]
    PlanRead {
        units: Vec<ExtractionUnit>,
        #[source]
        source: io::Error,
    },
}
