//! Test helper functions for E2E tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use taskcheck::models::RunReport;
use tempfile::TempDir;

/// Creates a temporary workspace holding `files`.
///
/// Returns a TempDir that must be kept in scope for the lifetime of the test
pub fn create_workspace(files: &[(&str, &str)]) -> Result<TempDir> {
    let temp = TempDir::new().context("Failed to create temp directory")?;
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(temp)
}

/// Writes `tasks.json` into `dir` and returns its path.
pub fn write_manifest(dir: &Path, content: &str) -> Result<PathBuf> {
    let path = dir.join("tasks.json");
    std::fs::write(&path, content).context("Failed to write manifest")?;
    Ok(path)
}

/// Runs the taskcheck binary in `dir`.
pub fn run_taskcheck(dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_taskcheck"))
        .args(args)
        .current_dir(dir)
        .env_remove("TASKCHECK_LOG")
        .env_remove("RUST_LOG")
        .output()
        .context("Failed to run taskcheck")
}

/// Reads a results file written by a run.
pub fn read_report(path: &Path) -> Result<RunReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse results file")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
