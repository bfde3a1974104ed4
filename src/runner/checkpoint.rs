//! Checkpoint persistence and validation for `--resume`

use std::io::ErrorKind;
use std::path::Path;

use crate::errors::{ReportWriteError, ResumeError};
use crate::models::{RunReport, Task};
use crate::output;

/// Flush the partial report and its snapshot.
pub fn write(
    report: &RunReport,
    results_path: &Path,
    progress_path: &Path,
) -> Result<(), ReportWriteError> {
    output::write_json(results_path, report)?;
    output::write_json(progress_path, &report.progress)?;
    tracing::info!(
        processed = report.progress.total,
        next_index = report.progress.next_index(),
        path = %results_path.display(),
        "checkpoint written"
    );
    Ok(())
}

/// Load a previous results file for resumption.
///
/// Returns `None` when there is nothing to resume from. Every recorded task
/// must sit at the same index with the same id in `tasks`; the snapshot is
/// rebuilt from the records rather than trusted.
pub fn load(path: &Path, tasks: &[Task]) -> Result<Option<RunReport>, ResumeError> {
    let content = match output::locked_read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ResumeError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let stored: RunReport = serde_json::from_str(&content).map_err(|source| ResumeError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(&stored, tasks)?;

    let mut report = RunReport::from_records(stored.results);
    report.timestamp = stored.timestamp;
    Ok(Some(report))
}

fn validate(report: &RunReport, tasks: &[Task]) -> Result<(), ResumeError> {
    for record in &report.results {
        let task = tasks.get(record.index).ok_or(ResumeError::OutOfRange {
            index: record.index,
            len: tasks.len(),
        })?;
        if task.id != record.id {
            return Err(ResumeError::IdMismatch {
                index: record.index,
                recorded: record.id.clone(),
                expected: task.id.clone(),
            });
        }
    }
    Ok(())
}
