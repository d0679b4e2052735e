//! Drives the scanner over a document and materializes each unit as it is
//! emitted.

use crate::error::{ExtractError, WriteError};
use crate::scanner::{ExtractionUnit, Scanner, TrailingBlock};
use crate::utils::trim_line_end;
use crate::writer::{Written, materialize};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Outcome of every unit emitted during a run, in document order.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub outcomes: Vec<Result<Written, WriteError>>,
}

impl ExtractionReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn written(&self) -> impl Iterator<Item = &Written> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriteError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Extraction settings for one destination root.
#[derive(Debug, Clone)]
pub struct Extractor {
    root: PathBuf,
    trailing: TrailingBlock,
}

impl Extractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            trailing: TrailingBlock::default(),
        }
    }

    pub fn trailing_block(mut self, trailing: TrailingBlock) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extracts every file embedded in the document at `input`.
    pub async fn run(&self, input: &Path) -> Result<ExtractionReport, ExtractError> {
        self.run_with(input, |_| {}).await
    }

    /// Like [`run`](Self::run), but calls `on_outcome` right after each unit is
    /// written or fails, before the next line is read.
    pub async fn run_with<F>(
        &self,
        input: &Path,
        on_outcome: F,
    ) -> Result<ExtractionReport, ExtractError>
    where
        F: FnMut(&Result<Written, WriteError>),
    {
        let reader = open(input).await?;
        info!(
            "Extracting {} into {}",
            input.display(),
            self.root.display()
        );
        self.run_reader_with(reader, on_outcome).await
    }

    /// Extracts from any buffered source.
    pub async fn run_reader<R>(&self, reader: R) -> Result<ExtractionReport, ExtractError>
    where
        R: AsyncBufRead + Unpin,
    {
        self.run_reader_with(reader, |_| {}).await
    }

    pub async fn run_reader_with<R, F>(
        &self,
        reader: R,
        mut on_outcome: F,
    ) -> Result<ExtractionReport, ExtractError>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(&Result<Written, WriteError>),
    {
        let mut scanner = Scanner::with_trailing(self.trailing);
        let mut report = ExtractionReport::default();
        let mut lines = reader.split(b'\n');

        loop {
            let line = match lines.next_segment().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(source) => return Err(ExtractError::Read { report, source }),
            };
            if let Some(unit) = scanner.feed(trim_line_end(&line)) {
                self.record(&mut report, unit, &mut on_outcome).await;
            }
        }

        if let Some(unit) = scanner.finish() {
            self.record(&mut report, unit, &mut on_outcome).await;
        }

        debug!("Extraction finished with {} unit(s)", report.len());
        Ok(report)
    }

    async fn record<F>(&self, report: &mut ExtractionReport, unit: ExtractionUnit, on_outcome: &mut F)
    where
        F: FnMut(&Result<Written, WriteError>),
    {
        let outcome = materialize(&self.root, &unit).await;
        if let Err(e) = &outcome {
            error!("Skipping {}: {}", unit.path, e);
        }
        on_outcome(&outcome);
        report.outcomes.push(outcome);
    }
}

async fn open(input: &Path) -> Result<BufReader<File>, ExtractError> {
    let file = File::open(input).await.map_err(|source| ExtractError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Extracts files from a Markdown document into `output`, or into the current
/// directory when `output` is `None`.
pub async fn extract_from_markdown(
    input: &Path,
    output: Option<&Path>,
) -> Result<ExtractionReport, ExtractError> {
    let root = output.unwrap_or_else(|| Path::new("."));
    Extractor::new(root).run(input).await
}

/// Scans the document without touching the filesystem and returns the units
/// that an extraction would write.
pub async fn plan(input: &Path, trailing: TrailingBlock) -> Result<Vec<ExtractionUnit>, ExtractError> {
    plan_reader(open(input).await?, trailing).await
}

/// On a read error the units found so far come back in
/// [`ExtractError::PlanRead`].
pub async fn plan_reader<R>(
    reader: R,
    trailing: TrailingBlock,
) -> Result<Vec<ExtractionUnit>, ExtractError>
where
    R: AsyncBufRead + Unpin,
{
    let mut scanner = Scanner::with_trailing(trailing);
    let mut units = Vec::new();
    let mut lines = reader.split(b'\n');

    loop {
        match lines.next_segment().await {
            Ok(Some(line)) => units.extend(scanner.feed(trim_line_end(&line))),
            Ok(None) => break,
            Err(source) => return Err(ExtractError::PlanRead { units, source }),
        }
    }
    units.extend(scanner.finish());
    Ok(units)
}
