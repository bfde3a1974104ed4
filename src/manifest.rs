//! Manifest loading
//!
//! A manifest is `{"tasks": [ {...}, ... ]}`. Each entry is read field by
//! field so that one badly-typed optional field degrades to "absent" instead
//! of rejecting the whole manifest.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::errors::ManifestError;
use crate::models::{Priority, Task, TaskKind, DEFAULT_CATEGORY};

/// Load and type every task in the manifest, preserving manifest order.
pub fn load(path: &Path) -> Result<Vec<Task>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path)
}

/// Parse manifest text; `path` is only used in error messages.
pub fn parse(content: &str, path: &Path) -> Result<Vec<Task>, ManifestError> {
    let root: Value = serde_json::from_str(content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Object(mut root) = root else {
        return Err(ManifestError::NotAnObject {
            path: path.to_path_buf(),
        });
    };

    // Take ownership of the array so entries are consumed, not cloned.
    let entries = match root.remove("tasks") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ManifestError::TasksNotArray {
                path: path.to_path_buf(),
            })
        }
        None => {
            return Err(ManifestError::MissingTasks {
                path: path.to_path_buf(),
            })
        }
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let task = match entry {
            Value::Object(fields) => task_from_fields(index, &fields),
            other => {
                tracing::warn!(index, "manifest entry is not an object: {other}");
                task_from_fields(index, &Map::new())
            }
        };
        if !seen.insert(task.id.clone()) {
            tracing::warn!(index, id = %task.id, "duplicate task id in manifest");
        }
        tasks.push(task);
    }

    tracing::debug!(count = tasks.len(), manifest = %path.display(), "loaded manifest");
    Ok(tasks)
}

/// Map one raw manifest entry to a [`Task`].
///
/// A missing id becomes `UNKNOWN_<index>`; the placeholder is stable across
/// runs of the same manifest, so resumption still addresses the same task.
pub fn task_from_fields(index: usize, fields: &Map<String, Value>) -> Task {
    let id = match fields.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("UNKNOWN_{index}"),
    };

    let category = str_field(fields, "category")
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    let priority = match str_field(fields, "priority") {
        Some(raw) => raw.parse::<Priority>().unwrap_or_else(|_| {
            tracing::debug!(id = %id, priority = raw, "unrecognized priority, using low");
            Priority::Low
        }),
        None => Priority::default(),
    };

    let description = str_field(fields, "description")
        .unwrap_or_default()
        .to_string();

    let manual = fields
        .get("manual")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let kind = TaskKind::infer(
        str_field(fields, "file"),
        str_field(fields, "check"),
        str_field(fields, "search"),
        str_field(fields, "command"),
    );

    Task {
        id,
        category,
        priority,
        description,
        manual,
        kind,
    }
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}
