// SPDX-License-Identifier: MIT
//! Test builders shared across crates (feature `test-support`).

use crate::task::Task;
use crate::id::TaskId;

/// A `Task` builder with sane defaults, for tests that only care about one
/// or two fields.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Task::new(TaskId::new(id), 5, 0.0),
        }
    }

    pub fn max_iterations(mut self, n: u32) -> Self {
        self.task.max_iterations = n;
        self
    }

    pub fn state(mut self, state: crate::state::TaskState) -> Self {
        self.task.state = state;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
