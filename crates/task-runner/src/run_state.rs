use orbit_task::Target;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Passed,
    Failed,
    TimedOut,
    Cancelled,
    /// Not started because a dependency did not pass.
    Skipped,
}

impl TaskStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Passed => "passed",
                Self::Failed => "failed",
                Self::TimedOut => "timed out",
                Self::Cancelled => "cancelled",
                Self::Skipped => "skipped",
            }
        )
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub target: Target,
    pub status: TaskStatus,

    /// Exit code of the process, or the recorded one on a cache hit.
    pub code: Option<i32>,

    /// Whether the result was replayed from the local or remote cache.
    pub cached: bool,

    pub hash: Option<String>,

    #[serde(skip)]
    pub terminal_output: String,

    pub duration: Duration,

    /// Cache I/O problems that were demoted to a miss or a skipped write.
    #[serde(skip)]
    pub cache_warnings: Vec<String>,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, target: Target, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            target,
            status,
            code: None,
            cached: false,
            hash: None,
            terminal_output: String::new(),
            duration: Duration::ZERO,
            cache_warnings: vec![],
        }
    }

    pub fn skipped(task_id: impl Into<String>, target: Target) -> Self {
        Self::new(task_id, target, TaskStatus::Skipped)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
