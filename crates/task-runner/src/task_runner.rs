use crate::command_builder::TaskPlan;
use crate::command_executor::{ChildExit, CommandExecutor};
use crate::output_archiver::OutputArchiver;
use crate::output_hydrater::OutputHydrater;
use crate::run_state::{TaskResult, TaskStatus};
use orbit_cache::{RemoteCache, TaskCache};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Runs a single task through the cache protocol: local lookup, remote
/// lookup, execution, then recording. Cheap to clone into spawned jobs.
#[derive(Clone)]
pub struct TaskRunner {
    cache: Arc<TaskCache>,
    remote: Option<Arc<dyn RemoteCache>>,
    cancel_token: CancellationToken,
    grace_period: Duration,
}

impl TaskRunner {
    pub fn new(cache: Arc<TaskCache>) -> Self {
        Self {
            cache,
            remote: None,
            cancel_token: CancellationToken::new(),
            grace_period: Duration::ZERO,
        }
    }

    pub fn with_remote(mut self, remote: Option<Arc<dyn RemoteCache>>) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    #[instrument(skip_all, fields(task_target = plan.task.id.as_str()))]
    pub async fn run(&self, plan: &TaskPlan) -> miette::Result<TaskResult> {
        let started = Instant::now();
        let mut result = TaskResult::new(&plan.task.id, plan.task.target.clone(), TaskStatus::Failed);
        result.hash = plan.hash.clone();

        if let Some(hash) = &plan.hash {
            let mut hydrater = OutputHydrater::new(&self.cache, self.remote.as_deref(), plan);
            let hydrated = hydrater.hydrate(hash).await;

            result.cache_warnings.extend(hydrater.warnings);

            if let Some((cached, from)) = hydrated {
                debug!(
                    task_target = plan.task.id.as_str(),
                    hash = hash.as_str(),
                    from = ?from,
                    code = cached.code,
                    "Replaying cached result"
                );

                result.status = status_from_code(cached.code);
                result.code = Some(cached.code);
                result.terminal_output = cached.terminal_output;
                result.cached = true;
                result.duration = started.elapsed();

                return Ok(result);
            }
        }

        let output = CommandExecutor::new(plan, self.cancel_token.clone())
            .with_grace_period(self.grace_period)
            .execute()
            .await?;

        result.terminal_output = output.get_terminal_output();
        result.code = output.code();
        result.status = match output.exit {
            ChildExit::Completed(code) => status_from_code(code),
            ChildExit::Signaled => TaskStatus::Failed,
            ChildExit::Cancelled => TaskStatus::Cancelled,
            ChildExit::TimedOut => TaskStatus::TimedOut,
        };

        // Killed processes may have written partial outputs, never record them
        if let (Some(hash), ChildExit::Completed(code)) = (&plan.hash, output.exit) {
            let mut archiver = OutputArchiver::new(&self.cache, self.remote.as_deref(), plan);
            archiver
                .archive(hash, &result.terminal_output, code)
                .await;

            result.cache_warnings.extend(archiver.warnings);
        }

        result.duration = started.elapsed();

        Ok(result)
    }
}

fn status_from_code(code: i32) -> TaskStatus {
    if code == 0 {
        TaskStatus::Passed
    } else {
        TaskStatus::Failed
    }
}
