//! Filesystem checkers

use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};
use std::fs;
use std::io::{ErrorKind, Read};
use std::sync::LazyLock;

use super::{CheckContext, CheckOutcome};
use crate::errors::CheckError;
use crate::models::Details;

/// Keywords that make a file look like SQL. Matched case-insensitively as
/// plain substrings.
pub const SQL_KEYWORDS: [&str; 6] = ["CREATE", "INSERT", "SELECT", "ALTER", "DROP", "GRANT"];

static SQL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(&SQL_KEYWORDS.join("|"))
        .case_insensitive(true)
        .build()
        .expect("SQL keyword alternation must compile")
});

const CONFLICT_MARKERS: [&str; 2] = ["<<<<<<<", ">>>>>>>"];

const READABLE_PROBE_BYTES: usize = 100;

/// `Completed` iff the resolved path exists.
pub fn check_file_exists(path: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let full_path = ctx.resolve(path);
    let exists = full_path
        .try_exists()
        .map_err(|e| CheckError::io(&full_path, e))?;

    Ok(CheckOutcome::from_bool(
        exists,
        file_details(path, [("file_exists", json!(exists))]),
    ))
}

/// `Completed` iff the file exists and is larger than zero bytes.
pub fn check_file_size(path: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let full_path = ctx.resolve(path);
    match fs::metadata(&full_path) {
        Ok(meta) => {
            let size = meta.len();
            Ok(CheckOutcome::from_bool(
                size > 0,
                file_details(
                    path,
                    [("file_exists", json!(true)), ("file_size", json!(size))],
                ),
            ))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(missing(path, [])),
        Err(e) => Err(CheckError::io(&full_path, e)),
    }
}

/// `Completed` iff `needle` occurs in the file's text.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the check.
pub fn check_content(
    path: &str,
    needle: &str,
    ctx: &CheckContext,
) -> Result<CheckOutcome, CheckError> {
    let Some(content) = read_text(path, ctx)? else {
        return Ok(missing(path, [("content_found", json!(false))]));
    };

    let found = content.contains(needle);
    Ok(CheckOutcome::from_bool(
        found,
        file_details(
            path,
            [("file_exists", json!(true)), ("content_found", json!(found))],
        ),
    ))
}

/// `Completed` iff the file parses as JSON.
pub fn check_json(path: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let full_path = ctx.resolve(path);
    let bytes = match fs::read(&full_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(missing(path, [("json_valid", json!(false))]))
        }
        Err(e) => return Err(CheckError::io(&full_path, e)),
    };

    // IgnoredAny validates the syntax without building a document tree.
    match serde_json::from_slice::<serde::de::IgnoredAny>(&bytes) {
        Ok(_) => Ok(CheckOutcome::Completed(file_details(
            path,
            [("file_exists", json!(true)), ("json_valid", json!(true))],
        ))),
        Err(e) => Ok(CheckOutcome::Failed(file_details(
            path,
            [
                ("file_exists", json!(true)),
                ("json_valid", json!(false)),
                ("json_error", json!(e.to_string())),
            ],
        ))),
    }
}

/// `Completed` iff the file mentions at least one of [`SQL_KEYWORDS`].
pub fn check_sql(path: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let Some(content) = read_text(path, ctx)? else {
        return Ok(missing(path, [("sql_keywords_found", json!([]))]));
    };

    let mut found: Vec<String> = SQL_PATTERN
        .find_iter(&content)
        .map(|m| m.as_str().to_uppercase())
        .collect();
    found.sort();
    found.dedup();

    Ok(CheckOutcome::from_bool(
        !found.is_empty(),
        file_details(
            path,
            [
                ("file_exists", json!(true)),
                ("sql_keywords_found", json!(found)),
            ],
        ),
    ))
}

/// `Completed` iff the file exists and carries no merge conflict markers.
pub fn check_no_conflicts(path: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let Some(content) = read_text(path, ctx)? else {
        return Ok(missing(path, []));
    };

    let has_markers = CONFLICT_MARKERS.iter().any(|m| content.contains(m));
    Ok(CheckOutcome::from_bool(
        !has_markers,
        file_details(
            path,
            [
                ("file_exists", json!(true)),
                ("conflict_markers", json!(has_markers)),
            ],
        ),
    ))
}

/// `Completed` iff the file can be opened and its first bytes read.
pub fn check_file_readable(path: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let full_path = ctx.resolve(path);
    let mut head = [0u8; READABLE_PROBE_BYTES];
    let readable = fs::File::open(&full_path).and_then(|mut file| file.read(&mut head));

    match readable {
        Ok(_) => Ok(CheckOutcome::Completed(file_details(
            path,
            [("file_exists", json!(true)), ("file_readable", json!(true))],
        ))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Ok(missing(path, [("file_readable", json!(false))]))
        }
        Err(e) => {
            let exists = full_path.exists();
            Ok(CheckOutcome::Failed(file_details(
                path,
                [
                    ("file_exists", json!(exists)),
                    ("file_readable", json!(false)),
                    ("read_error", json!(e.to_string())),
                ],
            )))
        }
    }
}

/// Read a file as lossy UTF-8; `None` when it does not exist.
fn read_text(path: &str, ctx: &CheckContext) -> Result<Option<String>, CheckError> {
    let full_path = ctx.resolve(path);
    match fs::read(&full_path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CheckError::io(&full_path, e)),
    }
}

fn file_details<const N: usize>(path: &str, extra: [(&str, Value); N]) -> Details {
    let mut details = Details::new();
    details.insert("file_path".to_string(), json!(path));
    for (key, value) in extra {
        details.insert(key.to_string(), value);
    }
    details
}

fn missing<const N: usize>(path: &str, extra: [(&str, Value); N]) -> CheckOutcome {
    let mut details = file_details(path, extra);
    details.insert("file_exists".to_string(), json!(false));
    CheckOutcome::Failed(details)
}
