use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use taskcheck::commands::{inspect, report, run};
use taskcheck::config::CliOverrides;
use taskcheck::logging;
use taskcheck::models::Priority;
use taskcheck::runner::RunOptions;

/// Interrupted by Ctrl+C (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "taskcheck")]
#[command(about = "Verify and execute declarative task manifests", long_about = None)]
#[command(version)]
struct Cli {
    /// Debug logging on stderr (overrides TASKCHECK_LOG / RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the tasks of a manifest and write results, progress and summary
    Run {
        /// Path to the manifest JSON file
        #[arg(short, long)]
        manifest: PathBuf,

        /// First manifest index to process
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Maximum number of tasks to process
        #[arg(long)]
        limit: Option<usize>,

        /// Results file (also the checkpoint read by --resume)
        #[arg(long)]
        results: Option<PathBuf>,

        /// Progress snapshot file
        #[arg(long)]
        progress: Option<PathBuf>,

        /// Markdown summary file
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Command timeout in seconds (default: 10)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Directory relative task paths resolve against (default: manifest's directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Worker threads; 0 picks min(CPUs, 8) (default: 1)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Tasks between progress lines and checkpoints (default: 50)
        #[arg(long)]
        checkpoint_every: Option<usize>,

        /// Only evaluate tasks in this category (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Only evaluate tasks with this priority (repeatable)
        #[arg(long = "priority", value_parser = Priority::from_str)]
        priorities: Vec<Priority>,

        /// Continue after the last task recorded in the results file
        #[arg(long)]
        resume: bool,

        /// Config file (default: ./taskcheck.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suppress progress lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show how a manifest would be dispatched, without running anything
    Inspect {
        /// Path to the manifest JSON file
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Re-render summary.md from an existing results file
    Report {
        /// Path to results.json
        #[arg(short, long)]
        results: PathBuf,

        /// Where to write the summary (default: next to the results file)
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "✗ Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run {
            manifest,
            start,
            limit,
            results,
            progress,
            summary,
            timeout_secs,
            base_dir,
            jobs,
            checkpoint_every,
            categories,
            priorities,
            resume,
            config,
            quiet,
        } => {
            let status = run::execute(run::RunArgs {
                manifest,
                config,
                overrides: CliOverrides {
                    base_dir,
                    timeout_secs,
                    checkpoint_every,
                    jobs,
                    results,
                    progress,
                    summary,
                    categories,
                    priorities,
                },
                options: RunOptions {
                    start,
                    limit,
                    resume,
                },
                quiet,
            })?;
            Ok(match status {
                run::RunStatus::Finished => ExitCode::SUCCESS,
                run::RunStatus::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
            })
        }
        Commands::Inspect { manifest } => {
            inspect::execute(&manifest, cli.verbose)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Report { results, summary } => {
            report::execute(&results, summary.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
