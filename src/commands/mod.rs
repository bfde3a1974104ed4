pub mod inspect;
pub mod report;
pub mod run;

use colored::Colorize;

use crate::models::{ProgressSnapshot, TaskStatus};

/// Print the status totals with percentages.
fn print_totals(progress: &ProgressSnapshot) {
    println!("  Total:     {}", progress.total);
    for status in TaskStatus::all() {
        // Pad before colouring; escape codes would throw off the width.
        let label = match status {
            TaskStatus::Completed => format!("{:<11}", "Completed:").green(),
            TaskStatus::Failed => format!("{:<11}", "Failed:").red(),
            TaskStatus::Pending => format!("{:<11}", "Pending:").yellow(),
            TaskStatus::Skipped => format!("{:<11}", "Skipped:").dimmed(),
        };
        println!(
            "  {}{} ({:.1}%)",
            label,
            progress.count(status),
            progress.pct(status)
        );
    }
}

/// Print `total/completed/failed/pending` per category.
fn print_breakdown(progress: &ProgressSnapshot) {
    for (category, counts) in &progress.by_category {
        println!(
            "  {:<24} {:>5} total  {} {:>5}  {} {:>5}  {} {:>5}",
            category,
            counts.total,
            "✓".green(),
            counts.completed,
            "✗".red(),
            counts.failed,
            "⏳".yellow(),
            counts.pending
        );
    }
}
