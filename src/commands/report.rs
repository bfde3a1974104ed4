//! `taskcheck report`: re-render the Markdown summary of an earlier run

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_SUMMARY_FILE;
use crate::models::RunReport;
use crate::output;
use crate::report;

use super::{print_breakdown, print_totals};

/// Execute the report command
pub fn execute(results_path: &Path, summary_path: Option<&Path>) -> Result<()> {
    let stored = load_results(results_path)?;
    let summary_path = summary_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_summary_path(results_path));

    // Counters are rebuilt from the records so a hand-edited file still adds up.
    let rebuilt = RunReport::from_records(stored.results);
    let generated = report::generate(&rebuilt.progress, &rebuilt.results)
        .context("Failed to render report")?;
    report::write_summary(&summary_path, &generated.markdown)?;

    println!(
        "{} Rendered {} results from {}\n",
        "→".cyan().bold(),
        rebuilt.results.len(),
        results_path.display()
    );
    print_totals(&rebuilt.progress);
    if !rebuilt.progress.by_category.is_empty() {
        println!("\n{}", "By category:".bold());
        print_breakdown(&rebuilt.progress);
    }
    println!(
        "\n{} Summary written to {}",
        "✓".green().bold(),
        summary_path.display()
    );
    Ok(())
}

pub fn load_results(path: &Path) -> Result<RunReport> {
    let content = output::locked_read(path)
        .with_context(|| format!("Failed to read results file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse results file: {}", path.display()))
}

fn default_summary_path(results_path: &Path) -> PathBuf {
    results_path
        .parent()
        .map(|dir| dir.join(DEFAULT_SUMMARY_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SUMMARY_FILE))
}
