pub mod progress;
pub mod report;
pub mod result;
pub mod task;

pub use progress::{percentage, CategoryCounts, ProgressSnapshot};
pub use report::RunReport;
pub use result::{Details, TaskRecord, TaskResult, TaskStatus};
pub use task::{Priority, Task, TaskKind, DEFAULT_CATEGORY};
