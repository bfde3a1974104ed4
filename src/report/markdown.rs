//! `summary.md` rendering

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::{ProgressSnapshot, TaskRecord, TaskStatus};

/// Items listed per (status, category) group before eliding the rest.
const ITEMS_PER_GROUP: usize = 10;

const DESCRIPTION_CHARS: usize = 60;

pub fn render(
    progress: &ProgressSnapshot,
    results: &[TaskRecord],
    generated: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Task Verification Summary\n");
    let _ = writeln!(
        out,
        "**Generated:** {}\n",
        generated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(last) = progress.last_processed_index {
        let _ = writeln!(out, "**Last processed index:** {last}\n");
    }

    out.push_str("## Statistics\n\n");
    let _ = writeln!(out, "- **Total Tasks:** {}", progress.total);
    for status in TaskStatus::all() {
        let _ = writeln!(
            out,
            "- **{}:** {} ({:.1}%)",
            status_title(status),
            progress.count(status),
            progress.pct(status)
        );
    }
    out.push('\n');

    render_categories(&mut out, progress);

    for status in TaskStatus::all() {
        render_status_group(&mut out, status, progress.count(status), results);
    }

    out
}

fn render_categories(out: &mut String, progress: &ProgressSnapshot) {
    out.push_str("## Category Breakdown\n\n");
    if progress.by_category.is_empty() {
        out.push_str("_No tasks processed._\n\n");
        return;
    }

    out.push_str("| Category | Total | Completed | Failed | Pending | Skipped | Completed % | Failed % |\n");
    out.push_str("|---|---:|---:|---:|---:|---:|---:|---:|\n");
    for (category, counts) in &progress.by_category {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {:.1}% | {:.1}% |",
            category,
            counts.total,
            counts.completed,
            counts.failed,
            counts.pending,
            counts.skipped,
            counts.completed_pct(),
            counts.failed_pct()
        );
    }
    out.push('\n');
}

fn render_status_group(out: &mut String, status: TaskStatus, count: usize, results: &[TaskRecord]) {
    let _ = writeln!(out, "## {} Tasks ({})\n", status_title(status), count);

    let mut by_category: BTreeMap<&str, Vec<&TaskRecord>> = BTreeMap::new();
    for record in results.iter().filter(|r| r.status() == status) {
        by_category
            .entry(record.category.as_str())
            .or_default()
            .push(record);
    }

    if by_category.is_empty() {
        out.push_str("- None\n\n");
        return;
    }

    for (category, records) in by_category {
        let _ = writeln!(
            out,
            "### {} ({} tasks)\n",
            category_title(category),
            records.len()
        );
        for record in records.iter().take(ITEMS_PER_GROUP) {
            let _ = writeln!(out, "{}", item_line(status, record));
        }
        if records.len() > ITEMS_PER_GROUP {
            let _ = writeln!(out, "- ... and {} more", records.len() - ITEMS_PER_GROUP);
        }
        out.push('\n');
    }
}

fn item_line(status: TaskStatus, record: &TaskRecord) -> String {
    let mut line = format!("- {} `{}`", status_marker(status), record.id);
    let description = truncate(&record.description, DESCRIPTION_CHARS);
    if !description.is_empty() {
        let _ = write!(line, ": {description}");
    }

    if status == TaskStatus::Failed {
        let reason = record
            .result
            .details
            .get("error")
            .or_else(|| record.result.details.get("note"))
            .and_then(|v| v.as_str());
        if let Some(reason) = reason {
            let _ = write!(line, " ({reason})");
        }
    }
    line
}

fn status_title(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "Completed",
        TaskStatus::Failed => "Failed",
        TaskStatus::Pending => "Pending",
        TaskStatus::Skipped => "Skipped",
    }
}

fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "✓",
        TaskStatus::Failed => "✗",
        TaskStatus::Pending => "⏳",
        TaskStatus::Skipped => "→",
    }
}

/// `build_tasks` → `Build Tasks`.
fn category_title(category: &str) -> String {
    category
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}
