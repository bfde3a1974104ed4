//! `taskcheck inspect`: show how a manifest would be routed without running it

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::dispatch::{select_checker, Checker};
use crate::manifest;
use crate::models::Task;

/// Execute the inspect command
pub fn execute(manifest_path: &Path, verbose: bool) -> Result<()> {
    let tasks = manifest::load(manifest_path)?;
    let summary = InspectSummary::from_tasks(&tasks);

    println!(
        "{} {} tasks in {}\n",
        "→".cyan().bold(),
        tasks.len(),
        manifest_path.display()
    );

    println!("{}", "By checker:".bold());
    for (checker, count) in &summary.by_checker {
        println!("  {checker:<16} {count:>6}");
    }

    println!("\n{}", "By category:".bold());
    for (category, count) in &summary.by_category {
        println!("  {category:<24} {count:>6}");
    }

    if verbose {
        println!("\n{}", "Tasks:".bold());
        for (index, task) in tasks.iter().enumerate() {
            println!("  {}", describe(index, task));
        }
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct InspectSummary {
    pub by_checker: BTreeMap<&'static str, usize>,
    pub by_category: BTreeMap<String, usize>,
}

impl InspectSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut summary = Self::default();
        for task in tasks {
            *summary
                .by_checker
                .entry(select_checker(task).name())
                .or_default() += 1;
            *summary
                .by_category
                .entry(task.category.clone())
                .or_default() += 1;
        }
        summary
    }
}

fn describe(index: usize, task: &Task) -> String {
    let checker = select_checker(task);
    let target = match checker {
        Checker::Command { command } => format!(" `{command}`"),
        Checker::ContentSearch { path, needle } => format!(" {path} ∋ {needle:?}"),
        Checker::Unknown {
            unsupported_check: Some(check),
        } => format!(" (check `{check}`)"),
        _ => task
            .kind
            .path()
            .filter(|_| !task.manual)
            .map(|p| format!(" {p}"))
            .unwrap_or_default(),
    };
    format!(
        "{:>5} {} [{}/{}] → {}{}",
        index,
        task.id,
        task.category,
        task.priority,
        checker.name().cyan(),
        target
    )
}
