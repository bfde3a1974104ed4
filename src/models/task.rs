use serde::{Deserialize, Serialize};

/// Category recorded when a manifest entry does not name one.
pub const DEFAULT_CATEGORY: &str = "unknown";

/// A single verification/execution unit loaded from the manifest.
///
/// Tasks are built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub category: String,
    pub priority: Priority,
    pub description: String,
    /// Requires a human; never resolves automatically.
    pub manual: bool,
    pub kind: TaskKind,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    #[default]
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => anyhow::bail!(
                "Invalid priority: {s}. Valid values: critical, high, medium, low"
            ),
        }
    }
}

/// The checkable shape of a task, resolved once at load time.
///
/// Variant order mirrors the dispatch tie-break order; see [`TaskKind::infer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    FileSize { path: String },
    JsonValid { path: String },
    SqlHeuristic { path: String },
    NoConflictMarkers { path: String },
    FileReadable { path: String },
    ContentSearch { path: String, needle: String },
    FileExists { path: String },
    CommandRun { command: String },
    Unknown {
        /// Set when a `file` task named a `check` we do not implement.
        unsupported_check: Option<String>,
    },
}

impl TaskKind {
    /// Resolve the kind from the optional manifest fields.
    ///
    /// First match wins:
    /// 1. `file` + `check = file_size | not_empty`
    /// 2. `file` + `check = json | json_valid`
    /// 3. `file` + `check = sql | sql_valid`
    /// 4. `file` + `check = no_conflicts`
    /// 5. `file` + `check = file_readable | readable`
    /// 6. `file` + `search`
    /// 7. `file` with no check, or `check = exists`
    /// 8. `file` with any other check → `Unknown`
    /// 9. `command`
    /// 10. `Unknown`
    ///
    /// The `manual` flag is not part of the kind; the dispatcher applies it
    /// ahead of everything here.
    pub fn infer(
        file: Option<&str>,
        check: Option<&str>,
        search: Option<&str>,
        command: Option<&str>,
    ) -> Self {
        if let Some(path) = file {
            let path = path.to_string();
            let check = check.map(|c| c.trim().to_lowercase());
            match check.as_deref() {
                Some("file_size") | Some("not_empty") => return TaskKind::FileSize { path },
                Some("json") | Some("json_valid") => return TaskKind::JsonValid { path },
                Some("sql") | Some("sql_valid") => return TaskKind::SqlHeuristic { path },
                Some("no_conflicts") => return TaskKind::NoConflictMarkers { path },
                Some("file_readable") | Some("readable") => {
                    return TaskKind::FileReadable { path }
                }
                _ => {}
            }
            if let Some(needle) = search {
                return TaskKind::ContentSearch {
                    path,
                    needle: needle.to_string(),
                };
            }
            return match check {
                None => TaskKind::FileExists { path },
                Some(c) if c.is_empty() || c == "exists" => TaskKind::FileExists { path },
                Some(other) => TaskKind::Unknown {
                    unsupported_check: Some(other),
                },
            };
        }

        if let Some(command) = command {
            return TaskKind::CommandRun {
                command: command.to_string(),
            };
        }

        TaskKind::Unknown {
            unsupported_check: None,
        }
    }

    /// Stable snake_case name used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::FileSize { .. } => "file_size",
            TaskKind::JsonValid { .. } => "json_valid",
            TaskKind::SqlHeuristic { .. } => "sql_heuristic",
            TaskKind::NoConflictMarkers { .. } => "no_conflicts",
            TaskKind::FileReadable { .. } => "file_readable",
            TaskKind::ContentSearch { .. } => "content_search",
            TaskKind::FileExists { .. } => "file_exists",
            TaskKind::CommandRun { .. } => "command",
            TaskKind::Unknown { .. } => "unknown",
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            TaskKind::FileSize { path }
            | TaskKind::JsonValid { path }
            | TaskKind::SqlHeuristic { path }
            | TaskKind::NoConflictMarkers { path }
            | TaskKind::FileReadable { path }
            | TaskKind::ContentSearch { path, .. }
            | TaskKind::FileExists { path } => Some(path),
            TaskKind::CommandRun { .. } | TaskKind::Unknown { .. } => None,
        }
    }
}
