use crate::models::{Priority, Task};

pub const SKIP_NOTE: &str = "excluded by filter";

/// Category/priority selection. An empty list accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub categories: Vec<String>,
    pub priorities: Vec<Priority>,
}

impl TaskFilter {
    pub fn new(categories: Vec<String>, priorities: Vec<Priority>) -> Self {
        Self {
            categories,
            priorities,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.priorities.is_empty()
    }

    /// Categories compare case-insensitively.
    pub fn matches(&self, task: &Task) -> bool {
        let category_ok = self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&task.category));
        let priority_ok = self.priorities.is_empty() || self.priorities.contains(&task.priority);
        category_ok && priority_ok
    }
}
