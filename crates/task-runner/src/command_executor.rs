use crate::command_builder::{TaskPlan, create_shell_command};
use crate::task_runner_error::TaskRunnerError;
use std::future;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// How long to wait for output pipes after killing a process. Grandchildren
/// of the shell may still hold them open.
const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChildExit {
    Completed(i32),

    /// Terminated by a signal we didn't send, like a ctrl+c reaching the
    /// process group. The output may be partial.
    Signaled,

    Cancelled,
    TimedOut,
}

impl ChildExit {
    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Completed(code),
            None => Self::Signaled,
        }
    }

    pub fn was_killed(&self) -> bool {
        !matches!(self, Self::Completed(_))
    }
}

#[derive(Debug)]
pub struct ExecutionOutput {
    pub exit: ChildExit,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
}

impl ExecutionOutput {
    pub fn code(&self) -> Option<i32> {
        match self.exit {
            ChildExit::Completed(code) => Some(code),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        self.code() == Some(0)
    }

    /// Captured stdout followed by stderr.
    pub fn get_terminal_output(&self) -> String {
        let mut output = String::from_utf8_lossy(&self.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&self.stderr));
        output
    }
}

enum Interruption {
    Cancelled,
    TimedOut,
}

/// Run a task's command as a child process and capture its output. The
/// process is killed when its timeout elapses, or when the run is cancelled
/// and it does not finish within the grace period.
pub struct CommandExecutor<'task> {
    plan: &'task TaskPlan,
    cancel_token: CancellationToken,
    grace_period: Duration,
}

impl<'task> CommandExecutor<'task> {
    pub fn new(plan: &'task TaskPlan, cancel_token: CancellationToken) -> Self {
        Self {
            plan,
            cancel_token,
            grace_period: Duration::ZERO,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> miette::Result<ExecutionOutput> {
        let target = self.plan.task.id.as_str();
        let started = tokio::time::Instant::now();

        debug!(
            task_target = target,
            command = self.plan.command_line.as_str(),
            "Running task"
        );

        let mut child = create_shell_command(self.plan)
            .spawn()
            .map_err(|error| TaskRunnerError::Spawn {
                target: target.to_owned(),
                command: self.plan.command_line.clone(),
                error: Box::new(error),
            })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let deadline = async {
            match self.plan.timeout {
                Some(duration) => sleep(duration).await,
                None => future::pending().await,
            }
        };

        let result = tokio::select! {
            status = child.wait() => Ok(status),
            _ = deadline => Err(Interruption::TimedOut),
            _ = self.cancel_token.cancelled() => Err(Interruption::Cancelled),
        };

        let capture_error = |error: io::Error| TaskRunnerError::Capture {
            target: target.to_owned(),
            error: Box::new(error),
        };

        let exit = match result {
            Ok(status) => ChildExit::from_status(status.map_err(capture_error)?),
            Err(Interruption::TimedOut) => {
                warn!(
                    task_target = target,
                    timeout = ?self.plan.timeout,
                    "Task exceeded its timeout, killing process"
                );

                child.kill().await.map_err(capture_error)?;
                ChildExit::TimedOut
            }
            Err(Interruption::Cancelled) => {
                debug!(
                    task_target = target,
                    grace_period = ?self.grace_period,
                    "Run was cancelled, waiting for process to finish"
                );

                match timeout(self.grace_period, child.wait()).await {
                    Ok(status) => ChildExit::from_status(status.map_err(capture_error)?),
                    Err(_) => {
                        debug!(task_target = target, "Grace period elapsed, killing process");

                        child.kill().await.map_err(capture_error)?;
                        ChildExit::Cancelled
                    }
                }
            }
        };

        let drain_timeout = exit.was_killed().then_some(PIPE_DRAIN_TIMEOUT);

        let output = ExecutionOutput {
            stdout: collect_output(stdout, drain_timeout).await,
            stderr: collect_output(stderr, drain_timeout).await,
            duration: started.elapsed(),
            exit,
        };

        debug!(
            task_target = target,
            exit = ?output.exit,
            duration = ?output.duration,
            "Ran task"
        );

        Ok(output)
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = vec![];

        if let Some(mut pipe) = pipe {
            // Partial output is still useful when reading fails midway
            let _ = pipe.read_to_end(&mut buffer).await;
        }

        buffer
    })
}

async fn collect_output(handle: JoinHandle<Vec<u8>>, limit: Option<Duration>) -> Vec<u8> {
    let Some(limit) = limit else {
        return handle.await.unwrap_or_default();
    };

    let abort = handle.abort_handle();

    match timeout(limit, handle).await {
        Ok(result) => result.unwrap_or_default(),
        Err(_) => {
            abort.abort();
            vec![]
        }
    }
}
