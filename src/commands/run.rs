//! `taskcheck run`

use anyhow::{Context, Result};
use colored::Colorize;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::cancel::{install_interrupt_handler, CancelToken};
use crate::config::{CliOverrides, FileConfig, RunConfig};
use crate::manifest;
use crate::models::{percentage, RunReport};
use crate::report::{self, OutputPaths};
use crate::runner::{RunObserver, RunOptions, RunOutcome, Runner};

use super::{print_breakdown, print_totals};

pub struct RunArgs {
    pub manifest: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: CliOverrides,
    pub options: RunOptions,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Finished,
    Interrupted,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<RunStatus> {
    let file_config = FileConfig::discover(args.config.as_deref(), Path::new("."))
        .context("Failed to load configuration")?;
    let config = RunConfig::resolve(&args.manifest, file_config, args.overrides);

    let tasks = manifest::load(&args.manifest)?;

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel)?;

    println!(
        "{} Loaded {} tasks from {}",
        "→".cyan().bold(),
        tasks.len(),
        args.manifest.display()
    );
    tracing::debug!(?config, "resolved run configuration");

    let mut console = Console {
        quiet: args.quiet,
        window_len: 0,
    };
    let outcome = Runner::new(&tasks, &config)
        .with_cancel(cancel)
        .run(args.options, &mut console)
        .context("Run aborted")?;

    report::write_outputs(
        &outcome.report,
        OutputPaths {
            results: &config.results_path,
            progress: &config.progress_path,
            summary: &config.summary_path,
        },
    )?;

    print_summary(&outcome, &config);

    if outcome.interrupted {
        println!(
            "\n{} Interrupted after {} tasks; resume with {}",
            "✗".yellow().bold(),
            outcome.processed,
            "--resume".bold()
        );
        return Ok(RunStatus::Interrupted);
    }
    Ok(RunStatus::Finished)
}

struct Console {
    quiet: bool,
    window_len: usize,
}

impl RunObserver for Console {
    fn on_start(&mut self, window: &Range<usize>, to_run: usize, resumed_at: Option<usize>) {
        let start = resumed_at.unwrap_or(window.start).min(window.end);
        self.window_len = to_run;
        if let Some(at) = resumed_at {
            println!("{} Resuming at task {}", "→".cyan().bold(), at);
        }
        println!(
            "{} Processing tasks {}..{} ({} tasks)\n",
            "→".cyan().bold(),
            start,
            window.end,
            self.window_len
        );
    }

    fn on_checkpoint(&mut self, report: &RunReport, processed: usize, _remaining: usize) {
        if self.quiet {
            return;
        }
        let p = &report.progress;
        println!(
            "  Progress: {}/{} ({:.1}%)  {} {}  {} {}  {} {}",
            processed,
            self.window_len,
            percentage(processed, self.window_len),
            "✓".green(),
            p.completed,
            "✗".red(),
            p.failed,
            "⏳".yellow(),
            p.pending
        );
    }
}

fn print_summary(outcome: &RunOutcome, config: &RunConfig) {
    let progress = &outcome.report.progress;

    println!("\n{}", "Summary:".bold());
    print_totals(progress);

    if !progress.by_category.is_empty() {
        println!("\n{}", "By category:".bold());
        print_breakdown(progress);
    }

    println!("\n{}", "Files:".bold());
    for path in [
        &config.results_path,
        &config.progress_path,
        &config.summary_path,
    ] {
        println!("  {} {}", "→".cyan(), path.display());
    }

    println!();
    if progress.failed == 0 && progress.pending == 0 {
        println!("{} All processed tasks passed", "✓".green().bold());
    } else {
        println!(
            "{} {} failed, {} pending; see {}",
            "✗".red().bold(),
            progress.failed,
            progress.pending,
            config.summary_path.display()
        );
    }
}
