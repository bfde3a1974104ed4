//! Error taxonomy for the task engine
//!
//! Only [`ManifestError`], [`ConfigError`], [`ResumeError`] and
//! [`ReportWriteError`] are allowed to end a run. [`CheckError`] is always
//! recovered at the dispatch boundary and recorded on the task.

use std::path::PathBuf;
use thiserror::Error;

/// The manifest could not be turned into a task list.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} must be a JSON object at the top level", path.display())]
    NotAnObject { path: PathBuf },

    #[error("manifest {} has no `tasks` key", path.display())]
    MissingTasks { path: PathBuf },

    #[error("manifest {}: `tasks` must be an array", path.display())]
    TasksNotArray { path: PathBuf },
}

/// An unexpected failure while evaluating a single task.
///
/// Expected negative outcomes (missing file, unparsable JSON, non-zero exit)
/// are not errors; they are `Failed` outcomes.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to inspect {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for command `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checker panicked: {0}")]
    Panicked(String),

    #[error("cancelled")]
    Cancelled,
}

impl CheckError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CheckError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Writing one of the run artifacts failed (after the single retry).
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct ReportWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// The optional configuration file is unreadable or malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// An existing checkpoint does not belong to the manifest being run.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("failed to read checkpoint {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint {} is not a valid results file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint records task `{recorded}` at index {index}, manifest has `{expected}`")]
    IdMismatch {
        index: usize,
        recorded: String,
        expected: String,
    },

    #[error("checkpoint records index {index}, manifest only has {len} tasks")]
    OutOfRange { index: usize, len: usize },
}

/// Anything that stops a run after the manifest was loaded.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error(transparent)]
    Write(#[from] ReportWriteError),
}
