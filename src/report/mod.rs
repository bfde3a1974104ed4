//! Report generation: `results.json`, `progress.json` and `summary.md`

mod markdown;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io;
use std::path::Path;

use crate::errors::ReportWriteError;
use crate::models::{ProgressSnapshot, RunReport, TaskRecord};
use crate::output;

/// Rendered artifacts, ready to be written.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    /// Full-fidelity JSON: every result with its task metadata.
    pub json: String,
    pub markdown: String,
}

#[derive(Serialize)]
struct ReportView<'a> {
    timestamp: DateTime<Utc>,
    progress: &'a ProgressSnapshot,
    results: &'a [TaskRecord],
}

pub fn generate(
    progress: &ProgressSnapshot,
    results: &[TaskRecord],
) -> Result<GeneratedReport, serde_json::Error> {
    let timestamp = Utc::now();
    let json = serde_json::to_string_pretty(&ReportView {
        timestamp,
        progress,
        results,
    })?;
    Ok(GeneratedReport {
        json,
        markdown: markdown::render(progress, results, timestamp),
    })
}

/// Output locations for [`write_outputs`].
#[derive(Debug, Clone, Copy)]
pub struct OutputPaths<'a> {
    pub results: &'a Path,
    pub progress: &'a Path,
    pub summary: &'a Path,
}

/// Write all three artifacts. Each write is retried once.
pub fn write_outputs(report: &RunReport, paths: OutputPaths<'_>) -> Result<(), ReportWriteError> {
    let generated = generate(&report.progress, &report.results).map_err(|e| ReportWriteError {
        path: paths.results.to_path_buf(),
        source: io::Error::other(e),
    })?;

    output::write_with_retry(paths.results, &generated.json)?;
    output::write_json(paths.progress, &report.progress)?;
    write_summary(paths.summary, &generated.markdown)?;
    Ok(())
}

/// Write only the Markdown summary (used when re-rendering an old run).
pub fn write_summary(path: &Path, markdown: &str) -> Result<(), ReportWriteError> {
    output::write_with_retry(path, markdown)?;
    tracing::debug!(path = %path.display(), "summary written");
    Ok(())
}
