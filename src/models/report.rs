use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::progress::ProgressSnapshot;
use super::result::TaskRecord;

/// The `results.json` document: written as a checkpoint while running and
/// once more, complete, at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub progress: ProgressSnapshot,
    /// Manifest order.
    pub results: Vec<TaskRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            ..Default::default()
        }
    }

    /// Build a report whose snapshot is derived from `results`.
    pub fn from_records(results: Vec<TaskRecord>) -> Self {
        Self {
            timestamp: Utc::now(),
            progress: ProgressSnapshot::from_records(&results),
            results,
        }
    }

    /// Fold records into the snapshot. `results` stays in manifest order even
    /// when the new records fill a gap before existing ones.
    pub fn extend(&mut self, records: impl IntoIterator<Item = TaskRecord>) {
        let mut out_of_order = false;
        for record in records {
            self.progress.record(&record);
            out_of_order |= self
                .results
                .last()
                .is_some_and(|last| last.index > record.index);
            self.results.push(record);
        }
        if out_of_order {
            self.results.sort_by_key(|r| r.index);
        }
        self.timestamp = Utc::now();
    }

    /// Combine with the report of the window that follows this one.
    pub fn merge(&mut self, other: RunReport) {
        self.progress.merge(&other.progress);
        self.results.extend(other.results);
        self.timestamp = self.timestamp.max(other.timestamp);
    }
}
