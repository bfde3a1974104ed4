//! Run configuration: built-in defaults, optional `taskcheck.toml`, CLI overrides

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::models::Priority;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CHECKPOINT_EVERY: usize = 50;
pub const DEFAULT_CONFIG_FILE: &str = "taskcheck.toml";
pub const DEFAULT_RESULTS_FILE: &str = "results.json";
pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";
pub const DEFAULT_SUMMARY_FILE: &str = "summary.md";

/// Upper bound for `jobs = 0` (auto).
pub const MAX_AUTO_JOBS: usize = 8;

/// Contents of `taskcheck.toml`. Every key is optional.
///
/// ```toml
/// base_dir = "site"
/// timeout_secs = 30
/// checkpoint_every = 100
/// jobs = 4
/// results = "out/results.json"
/// categories = ["seo", "pages"]
/// priorities = ["critical", "high"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub checkpoint_every: Option<usize>,
    pub jobs: Option<usize>,
    pub results: Option<PathBuf>,
    pub progress: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `taskcheck.toml` in `dir` if it exists.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub checkpoint_every: Option<usize>,
    pub jobs: Option<usize>,
    pub results: Option<PathBuf>,
    pub progress: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub categories: Vec<String>,
    pub priorities: Vec<Priority>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Relative task paths resolve here; commands run here.
    pub base_dir: PathBuf,
    pub command_timeout: Duration,
    /// Progress line and checkpoint cadence, in tasks.
    pub checkpoint_every: usize,
    /// `0` = auto, `1` = sequential.
    pub jobs: usize,
    pub results_path: PathBuf,
    pub progress_path: PathBuf,
    pub summary_path: PathBuf,
    pub categories: Vec<String>,
    pub priorities: Vec<Priority>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            jobs: 1,
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
            progress_path: PathBuf::from(DEFAULT_PROGRESS_FILE),
            summary_path: PathBuf::from(DEFAULT_SUMMARY_FILE),
            categories: Vec::new(),
            priorities: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Layer CLI over file over defaults.
    ///
    /// The base directory defaults to the manifest's parent directory.
    pub fn resolve(manifest: &Path, file: FileConfig, cli: CliOverrides) -> Self {
        let defaults = Self::default();
        let manifest_dir = manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| defaults.base_dir.clone());

        let timeout_secs = cli.timeout_secs.or(file.timeout_secs);

        Self {
            base_dir: cli.base_dir.or(file.base_dir).unwrap_or(manifest_dir),
            command_timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.command_timeout),
            checkpoint_every: cli
                .checkpoint_every
                .or(file.checkpoint_every)
                .unwrap_or(defaults.checkpoint_every)
                .max(1),
            jobs: cli.jobs.or(file.jobs).unwrap_or(defaults.jobs),
            results_path: cli
                .results
                .or(file.results)
                .unwrap_or(defaults.results_path),
            progress_path: cli
                .progress
                .or(file.progress)
                .unwrap_or(defaults.progress_path),
            summary_path: cli
                .summary
                .or(file.summary)
                .unwrap_or(defaults.summary_path),
            categories: if cli.categories.is_empty() {
                file.categories
            } else {
                cli.categories
            },
            priorities: if cli.priorities.is_empty() {
                file.priorities
            } else {
                cli.priorities
            },
        }
    }

    /// Worker threads to use: `jobs`, or `min(available_parallelism, 8)` for `0`.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(MAX_AUTO_JOBS)
        } else {
            self.jobs
        }
    }
}
