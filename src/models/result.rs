use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::task::{Priority, Task};

/// Free-form diagnostics attached to a result.
///
/// Values stay typed (`"content_found": false`, `"file_size": 12`).
pub type Details = BTreeMap<String, serde_json::Value>;

/// Status of a task within a run.
///
/// A task is assigned exactly one status when it is evaluated. Manual and unknown-shape tasks stay `Pending`; that is a valid final
/// state for a run, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
    Skipped,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
            TaskStatus::Failed => write!(f, "FAILED"),
            TaskStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

impl TaskStatus {
    /// Statuses in report order.
    pub fn all() -> [TaskStatus; 4] {
        [
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Pending,
            TaskStatus::Skipped,
        ]
    }
}

/// Outcome of evaluating one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub status: TaskStatus,
    #[serde(default)]
    pub details: Details,
    pub timestamp: DateTime<Utc>,
}

impl TaskResult {
    pub fn new(status: TaskStatus, details: Details) -> Self {
        Self {
            status,
            details,
            timestamp: Utc::now(),
        }
    }

    pub fn completed(details: Details) -> Self {
        Self::new(TaskStatus::Completed, details)
    }

    pub fn failed(details: Details) -> Self {
        Self::new(TaskStatus::Failed, details)
    }

    pub fn pending(details: Details) -> Self {
        Self::new(TaskStatus::Pending, details)
    }

    /// Shorthand for a result carrying only a `note`.
    pub fn with_note(status: TaskStatus, note: impl Into<String>) -> Self {
        let mut details = Details::new();
        details.insert("note".to_string(), serde_json::Value::String(note.into()));
        Self::new(status, details)
    }

    pub fn note(&self) -> Option<&str> {
        self.details.get("note").and_then(|v| v.as_str())
    }
}

/// A result paired with the metadata of the task it belongs to.
///
/// Serialized flat, so a `results.json` entry reads
/// `{"index", "id", "category", "priority", "description", "status", "details", "timestamp"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Position in the manifest; resumption matches on (index, id).
    pub index: usize,
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub result: TaskResult,
}

impl TaskRecord {
    pub fn new(index: usize, task: &Task, result: TaskResult) -> Self {
        Self {
            index,
            id: task.id.clone(),
            category: task.category.clone(),
            priority: task.priority,
            description: task.description.clone(),
            result,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.result.status
    }
}
