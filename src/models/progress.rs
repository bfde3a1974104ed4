use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::result::{TaskRecord, TaskStatus};

/// Per-category subtotals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    #[serde(default)]
    pub skipped: usize,
}

impl CategoryCounts {
    fn bump(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Skipped => self.skipped += 1,
        }
    }

    fn add(&mut self, other: &CategoryCounts) {
        self.total += other.total;
        self.completed += other.completed;
        self.failed += other.failed;
        self.pending += other.pending;
        self.skipped += other.skipped;
    }

    pub fn completed_pct(&self) -> f64 {
        percentage(self.completed, self.total)
    }

    pub fn failed_pct(&self) -> f64 {
        percentage(self.failed, self.total)
    }
}

/// Aggregate state of a run (or of a window of one).
///
/// `total` counts the tasks folded in so far, so
/// `completed + failed + pending + skipped == total` holds at every step and
/// snapshots of adjacent windows can be merged by addition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
    #[serde(default)]
    pub by_category: BTreeMap<String, CategoryCounts>,
    /// Manifest index of the last task folded in; `None` before the first.
    #[serde(default)]
    pub last_processed_index: Option<usize>,
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TaskRecord>,
    {
        let mut snapshot = Self::new();
        for record in records {
            snapshot.record(record);
        }
        snapshot
    }

    /// Fold one result into the counters.
    pub fn record(&mut self, record: &TaskRecord) {
        let status = record.status();
        self.total += 1;
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Skipped => self.skipped += 1,
        }
        self.by_category
            .entry(record.category.clone())
            .or_default()
            .bump(status);
        self.last_processed_index = Some(
            self.last_processed_index
                .map_or(record.index, |last| last.max(record.index)),
        );
    }

    /// Combine with the snapshot of a disjoint window.
    pub fn merge(&mut self, other: &ProgressSnapshot) {
        self.total += other.total;
        self.completed += other.completed;
        self.failed += other.failed;
        self.pending += other.pending;
        self.skipped += other.skipped;
        for (category, counts) in &other.by_category {
            self.by_category
                .entry(category.clone())
                .or_default()
                .add(counts);
        }
        self.last_processed_index = match (self.last_processed_index, other.last_processed_index) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    /// True when the status counts add up to `total`.
    pub fn is_consistent(&self) -> bool {
        self.completed + self.failed + self.pending + self.skipped == self.total
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Completed => self.completed,
            TaskStatus::Failed => self.failed,
            TaskStatus::Pending => self.pending,
            TaskStatus::Skipped => self.skipped,
        }
    }

    pub fn pct(&self, status: TaskStatus) -> f64 {
        percentage(self.count(status), self.total)
    }

    /// Manifest index the next window should start at.
    pub fn next_index(&self) -> usize {
        self.last_processed_index.map_or(0, |i| i + 1)
    }
}

/// `part / total * 100`, or `0.0` when `total` is zero.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
