//! Run loop: dispatch → record → checkpoint
//!
//! The manifest window `[start, start + limit)` is processed in batches of
//! `checkpoint_every` tasks. On resume only the indices of the window that the
//! checkpoint has no record for are evaluated. After each batch the results are folded into the
//! snapshot on this thread and a checkpoint is flushed, so the status counts
//! always add up and an interrupted run loses at most the batch in flight.

mod checkpoint;
mod filter;
mod pool;

use std::collections::HashSet;
use std::ops::Range;
use std::sync::{Mutex, PoisonError};

use crate::cancel::CancelToken;
use crate::checkers::CheckContext;
use crate::config::RunConfig;
use crate::dispatch::{self, select_checker};
use crate::errors::{ResumeError, RunError};
use crate::models::{RunReport, Task, TaskRecord, TaskResult, TaskStatus};

pub use filter::{TaskFilter, SKIP_NOTE};

/// Which part of the manifest to process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub start: usize,
    pub limit: Option<usize>,
    /// Continue from the checkpoint at the results path if there is one.
    pub resume: bool,
}

impl RunOptions {
    /// Clamp the requested window to a manifest of `len` tasks.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = self.start.min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(len),
            None => len,
        };
        start..end
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Includes the records of a resumed checkpoint.
    pub report: RunReport,
    /// The window that was requested (after clamping).
    pub window: Range<usize>,
    /// First index evaluated by this invocation; `window.end` when the
    /// checkpoint already covered the whole window.
    pub started_at: usize,
    /// Tasks evaluated by this invocation.
    pub processed: usize,
    pub interrupted: bool,
}

/// Hooks for operator-facing output.
pub trait RunObserver {
    /// `to_run` counts the tasks this invocation will evaluate.
    fn on_start(&mut self, _window: &Range<usize>, _to_run: usize, _resumed_at: Option<usize>) {}

    /// Called after every flushed checkpoint.
    fn on_checkpoint(&mut self, _report: &RunReport, _processed: usize, _remaining: usize) {}
}

/// Observer that prints nothing.
pub struct Silent;

impl RunObserver for Silent {}

pub struct Runner<'a> {
    tasks: &'a [Task],
    config: &'a RunConfig,
    filter: TaskFilter,
    cancel: CancelToken,
}

impl<'a> Runner<'a> {
    pub fn new(tasks: &'a [Task], config: &'a RunConfig) -> Self {
        Self {
            tasks,
            config,
            filter: TaskFilter::new(config.categories.clone(), config.priorities.clone()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run(
        &self,
        options: RunOptions,
        observer: &mut dyn RunObserver,
    ) -> Result<RunOutcome, RunError> {
        let window = options.window(self.tasks.len());
        let (mut report, todo, resumed_at) = self.initial_state(&options, &window)?;
        let started_at = todo.first().copied().unwrap_or(window.end);

        if !self.filter.is_empty() {
            tracing::info!(
                categories = ?self.filter.categories,
                priorities = ?self.filter.priorities,
                "tasks outside the filter will be skipped"
            );
        }
        observer.on_start(&window, todo.len(), resumed_at);

        let ctx = CheckContext::new(&self.config.base_dir)
            .with_timeout(self.config.command_timeout)
            .with_cancel(self.cancel.clone());
        let jobs = self.config.effective_jobs();
        let batch_size = self.config.checkpoint_every.max(1);

        let mut processed = 0;
        let mut interrupted = false;

        for batch in todo.chunks(batch_size) {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            let records = self.run_batch(batch, &ctx, jobs);
            let done = records.len();
            report.extend(records);
            processed += done;

            checkpoint::write(
                &report,
                &self.config.results_path,
                &self.config.progress_path,
            )?;
            observer.on_checkpoint(&report, processed, todo.len() - processed);

            if done < batch.len() {
                interrupted = true;
                break;
            }
        }

        if self.cancel.is_cancelled() && processed < todo.len() {
            interrupted = true;
        }

        Ok(RunOutcome {
            report,
            window,
            started_at,
            processed,
            interrupted,
        })
    }

    fn initial_state(
        &self,
        options: &RunOptions,
        window: &Range<usize>,
    ) -> Result<(RunReport, Vec<usize>, Option<usize>), ResumeError> {
        if !options.resume {
            return Ok((RunReport::new(), window.clone().collect(), None));
        }

        match checkpoint::load(&self.config.results_path, self.tasks)? {
            Some(previous) => {
                let recorded: HashSet<usize> = previous.results.iter().map(|r| r.index).collect();
                let todo: Vec<usize> = window.clone().filter(|i| !recorded.contains(i)).collect();
                let resumed_at = todo.first().copied().unwrap_or(window.end);
                tracing::info!(
                    recorded = recorded.len(),
                    remaining = todo.len(),
                    resumed_at,
                    "resuming from checkpoint"
                );
                Ok((previous, todo, Some(resumed_at)))
            }
            None => {
                tracing::info!(
                    path = %self.config.results_path.display(),
                    "no checkpoint found, starting fresh"
                );
                Ok((RunReport::new(), window.clone().collect(), None))
            }
        }
    }

    /// Evaluate the tasks at `indices` and return the contiguous prefix of
    /// finished records.
    fn run_batch(&self, indices: &[usize], ctx: &CheckContext, jobs: usize) -> Vec<TaskRecord> {
        let gate = Mutex::new(());

        let slots = pool::run_batch(indices.len(), jobs, &self.cancel, |offset| {
            let task = &self.tasks[indices[offset]];
            if !self.filter.matches(task) {
                return Some(TaskResult::with_note(TaskStatus::Skipped, SKIP_NOTE));
            }
            if select_checker(task).is_command() {
                let _serialized = gate.lock().unwrap_or_else(PoisonError::into_inner);
                dispatch::evaluate(task, ctx)
            } else {
                dispatch::evaluate(task, ctx)
            }
        });

        indices
            .iter()
            .zip(slots)
            .map_while(|(&index, slot)| {
                slot.map(|result| TaskRecord::new(index, &self.tasks[index], result))
            })
            .collect()
    }
}
