//! Checker selection and the per-task error boundary

use serde_json::json;
use std::panic::{self, AssertUnwindSafe};

use crate::checkers::{self, CheckContext, CheckOutcome};
use crate::errors::CheckError;
use crate::models::{Task, TaskKind, TaskResult, TaskStatus};

pub const MANUAL_NOTE: &str = "Requires manual verification";
pub const UNKNOWN_NOTE: &str = "Automated verification not available";

/// The checker a task is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checker<'a> {
    ManualMarker,
    FileSize { path: &'a str },
    JsonValid { path: &'a str },
    SqlHeuristic { path: &'a str },
    NoConflictMarkers { path: &'a str },
    FileReadable { path: &'a str },
    ContentSearch { path: &'a str, needle: &'a str },
    FileExists { path: &'a str },
    Command { command: &'a str },
    Unknown { unsupported_check: Option<&'a str> },
}

/// Pick the checker for `task`.
///
/// `manual` always wins; everything else follows the order already encoded
/// in [`TaskKind`].
pub fn select_checker(task: &Task) -> Checker<'_> {
    if task.manual {
        return Checker::ManualMarker;
    }

    match &task.kind {
        TaskKind::FileSize { path } => Checker::FileSize { path },
        TaskKind::JsonValid { path } => Checker::JsonValid { path },
        TaskKind::SqlHeuristic { path } => Checker::SqlHeuristic { path },
        TaskKind::NoConflictMarkers { path } => Checker::NoConflictMarkers { path },
        TaskKind::FileReadable { path } => Checker::FileReadable { path },
        TaskKind::ContentSearch { path, needle } => Checker::ContentSearch { path, needle },
        TaskKind::FileExists { path } => Checker::FileExists { path },
        TaskKind::CommandRun { command } => Checker::Command { command },
        TaskKind::Unknown { unsupported_check } => Checker::Unknown {
            unsupported_check: unsupported_check.as_deref(),
        },
    }
}

impl Checker<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Checker::ManualMarker => "manual",
            Checker::FileSize { .. } => "file_size",
            Checker::JsonValid { .. } => "json_valid",
            Checker::SqlHeuristic { .. } => "sql_heuristic",
            Checker::NoConflictMarkers { .. } => "no_conflicts",
            Checker::FileReadable { .. } => "file_readable",
            Checker::ContentSearch { .. } => "content_search",
            Checker::FileExists { .. } => "file_exists",
            Checker::Command { .. } => "command",
            Checker::Unknown { .. } => "unknown",
        }
    }

    /// Spawns a subprocess (and so is subject to the command gate).
    pub fn is_command(&self) -> bool {
        matches!(self, Checker::Command { .. })
    }

    pub fn check(&self, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
        match *self {
            Checker::ManualMarker => Ok(CheckOutcome::Pending(checkers::details([(
                "note",
                json!(MANUAL_NOTE),
            )]))),
            Checker::FileSize { path } => checkers::check_file_size(path, ctx),
            Checker::JsonValid { path } => checkers::check_json(path, ctx),
            Checker::SqlHeuristic { path } => checkers::check_sql(path, ctx),
            Checker::NoConflictMarkers { path } => checkers::check_no_conflicts(path, ctx),
            Checker::FileReadable { path } => checkers::check_file_readable(path, ctx),
            Checker::ContentSearch { path, needle } => checkers::check_content(path, needle, ctx),
            Checker::FileExists { path } => checkers::check_file_exists(path, ctx),
            Checker::Command { command } => checkers::check_command(command, ctx),
            Checker::Unknown { unsupported_check } => {
                let note = match unsupported_check {
                    Some(check) => format!("{UNKNOWN_NOTE} (unsupported check `{check}`)"),
                    None => UNKNOWN_NOTE.to_string(),
                };
                Ok(CheckOutcome::Pending(checkers::details([(
                    "note",
                    json!(note),
                )])))
            }
        }
    }
}

/// Evaluate one task behind a single error boundary.
///
/// Checker errors and panics become `FAILED` with `details.error`. Returns
/// `None` only when the evaluation was cancelled; such a task is left
/// unrecorded.
pub fn evaluate(task: &Task, ctx: &CheckContext) -> Option<TaskResult> {
    let checker = select_checker(task);
    tracing::debug!(task = %task.id, kind = task.kind.label(), checker = checker.name(), "dispatching");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| checker.check(ctx)))
        .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(&*payload))));

    match outcome {
        Ok(outcome) => Some(outcome.into_result()),
        Err(CheckError::Cancelled) => {
            tracing::debug!(task = %task.id, "cancelled before completion");
            None
        }
        Err(e) => {
            tracing::warn!(task = %task.id, checker = checker.name(), error = %e, "checker error");
            Some(TaskResult::new(
                TaskStatus::Failed,
                checkers::details([("error", json!(e.to_string()))]),
            ))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
