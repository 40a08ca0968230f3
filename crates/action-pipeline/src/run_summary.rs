use orbit_task_runner::{TaskResult, TaskStatus};
use serde::Serialize;
use std::time::Duration;

/// Outcome of a run. Results are listed in the order tasks completed.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub results: Vec<TaskResult>,
    pub cache_warnings: Vec<String>,
    pub notifier_errors: Vec<String>,
    pub duration: Duration,
}

impl RunSummary {
    /// Whether every task passed, including replayed ones.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|result| result.is_success())
    }

    pub fn get_result(&self, task_id: &str) -> Option<&TaskResult> {
        self.results.iter().find(|result| result.task_id == task_id)
    }

    pub fn get_failed(&self) -> Vec<&TaskResult> {
        self.results
            .iter()
            .filter(|result| !result.is_success() && result.status != TaskStatus::Skipped)
            .collect()
    }

    pub fn get_skipped(&self) -> Vec<&TaskResult> {
        self.results
            .iter()
            .filter(|result| result.status == TaskStatus::Skipped)
            .collect()
    }

    pub fn count_cached(&self) -> usize {
        self.results.iter().filter(|result| result.cached).count()
    }
}
