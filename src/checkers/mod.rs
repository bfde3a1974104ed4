//! Checker library
//!
//! Independent, idempotent inspection primitives. Each checker returns
//! `Ok(CheckOutcome)` for every expected result, including negative ones
//! such as a missing file or an unparsable document. `Err(CheckError)` is
//! reserved for the unexpected (permission denied, I/O failure while reading)
//! and is turned into a `FAILED` result by the dispatch boundary.
//!
//! # Command execution
//!
//! Commands are run through `sh -c` (Unix) or `cmd /C` (Windows) in the base
//! directory, with a hard timeout. A timed-out or cancelled command is killed
//! together with its process group so no orphan is left behind.

mod command;
mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::DEFAULT_COMMAND_TIMEOUT;
use crate::models::{Details, TaskResult, TaskStatus};

pub use command::{
    check_command, run_shell_command, CommandOutcome, OUTPUT_PREVIEW_CHARS,
};
pub use file::{
    check_content, check_file_exists, check_file_readable, check_file_size, check_json,
    check_no_conflicts, check_sql, SQL_KEYWORDS,
};

/// Result of a checker that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Completed(Details),
    Failed(Details),
    /// Nothing could be decided automatically (manual or unknown shape).
    Pending(Details),
}

impl CheckOutcome {
    pub fn status(&self) -> TaskStatus {
        match self {
            CheckOutcome::Completed(_) => TaskStatus::Completed,
            CheckOutcome::Failed(_) => TaskStatus::Failed,
            CheckOutcome::Pending(_) => TaskStatus::Pending,
        }
    }

    /// `Completed` when `passed`, `Failed` otherwise.
    pub fn from_bool(passed: bool, details: Details) -> Self {
        if passed {
            CheckOutcome::Completed(details)
        } else {
            CheckOutcome::Failed(details)
        }
    }

    pub fn into_result(self) -> TaskResult {
        match self {
            CheckOutcome::Completed(details) => TaskResult::completed(details),
            CheckOutcome::Failed(details) => TaskResult::failed(details),
            CheckOutcome::Pending(details) => TaskResult::pending(details),
        }
    }
}

/// Everything a checker needs besides the task itself.
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Relative task paths are resolved against this directory; commands run in it.
    pub base_dir: PathBuf,
    pub command_timeout: Duration,
    pub cancel: CancelToken,
}

impl CheckContext {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Absolute paths are used as-is; anything else is joined onto `base_dir`.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir.join(candidate)
        }
    }
}

/// Build a details map from `(key, value)` pairs.
pub fn details<I, K, V>(pairs: I) -> Details
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
