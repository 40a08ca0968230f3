use crate::event_emitter::{Event, EventEmitter, Subscriber};
use crate::run_summary::RunSummary;
use crate::subscribers::NotifierSubscriber;
use crate::task_graph::TaskGraph;
use orbit_cache::{RemoteCache, TaskCache};
use orbit_notifier::{EmptyNotifier, Notifier};
use orbit_task_runner::{TaskResult, TaskRunner, TaskStatus};
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq)]
enum JobState {
    Pending,
    Running,
    Passed,

    // Failed, timed out, cancelled, or skipped
    Unsuccessful,
}

pub struct ActionPipeline {
    cache: Arc<TaskCache>,
    cancel_token: CancellationToken,
    emitter: EventEmitter,
    notifier: Arc<dyn Notifier>,
    remote: Option<Arc<dyn RemoteCache>>,

    /// Maximum number of tasks running at once.
    pub concurrency: usize,

    /// How long running tasks may continue after a cancellation.
    pub grace_period: Duration,
}

impl ActionPipeline {
    pub fn new(cache: Arc<TaskCache>) -> Self {
        Self {
            cache,
            cancel_token: CancellationToken::new(),
            emitter: EventEmitter::default(),
            notifier: Arc::new(EmptyNotifier),
            remote: None,
            concurrency: 3,
            grace_period: Duration::ZERO,
        }
    }

    pub fn with_remote(mut self, remote: Option<Arc<dyn RemoteCache>>) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.emitter
            .subscribe(NotifierSubscriber::new(Arc::clone(&notifier)));
        self.notifier = notifier;
        self
    }

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) {
        self.emitter.subscribe(subscriber);
    }

    /// Cancelling this token stops new tasks from starting, and kills
    /// running ones after the grace period.
    pub fn get_cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    #[instrument(skip_all)]
    pub async fn run(&mut self, task_graph: TaskGraph) -> miette::Result<RunSummary> {
        let started = Instant::now();
        let order = task_graph.sort_topological()?;
        let concurrency = self.concurrency.max(1);

        let runner = TaskRunner::new(Arc::clone(&self.cache))
            .with_remote(self.remote.clone())
            .with_cancel_token(self.cancel_token.clone())
            .with_grace_period(self.grace_period);

        // Jobs send their result back to this loop once completed
        let (sender, mut receiver) = mpsc::channel::<(NodeIndex, TaskResult)>(order.len().max(1));
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut states = order
            .iter()
            .map(|index| (*index, JobState::Pending))
            .collect::<FxHashMap<_, _>>();
        let mut summary = RunSummary::default();
        let mut running = 0;

        let signal_handle = self.monitor_signals();

        debug!(tasks = order.len(), concurrency, "Running tasks");

        self.emitter
            .emit(Event::PipelineStarted {
                concurrency,
                task_ids: task_graph.get_task_ids(),
            })
            .await?;

        for index in &order {
            if let Some(plan) = task_graph.get_plan(*index) {
                self.emitter
                    .emit(Event::TaskQueued { task: &plan.task })
                    .await?;
            }
        }

        loop {
            // Dispatch everything that's ready. Dependencies come first in
            // the order, so a failure cascades to its dependents in one pass.
            for index in &order {
                if states[index] != JobState::Pending {
                    continue;
                }

                let Some(plan) = task_graph.get_plan(*index) else {
                    continue;
                };

                if self.cancel_token.is_cancelled() {
                    let result = TaskResult::new(
                        &plan.task.id,
                        plan.task.target.clone(),
                        TaskStatus::Cancelled,
                    );

                    self.complete_job(&mut states, &mut summary, *index, result)
                        .await?;

                    continue;
                }

                let deps = task_graph.get_dependencies(*index);

                if deps
                    .iter()
                    .any(|dep| states[dep] == JobState::Unsuccessful)
                {
                    debug!(
                        task_target = plan.task.id.as_str(),
                        "Skipping task as a dependency did not pass"
                    );

                    let result = TaskResult::skipped(&plan.task.id, plan.task.target.clone());

                    self.complete_job(&mut states, &mut summary, *index, result)
                        .await?;

                    continue;
                }

                if !deps.iter().all(|dep| states[dep] == JobState::Passed) {
                    continue;
                }

                let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                    trace!("No permits available, waiting for running tasks");
                    break;
                };

                states.insert(*index, JobState::Running);
                running += 1;

                self.emitter
                    .emit(Event::TaskStarted {
                        hash: plan.hash.as_deref(),
                        task: &plan.task,
                    })
                    .await?;

                let job_runner = runner.clone();
                let job_plan = plan.clone();
                let job_sender = sender.clone();
                let job_index = *index;

                tokio::spawn(async move {
                    let result = match job_runner.run(&job_plan).await {
                        Ok(result) => result,
                        Err(report) => {
                            error!(
                                task_target = job_plan.task.id.as_str(),
                                "Failed to run task: {report}"
                            );

                            let mut result = TaskResult::new(
                                &job_plan.task.id,
                                job_plan.task.target.clone(),
                                TaskStatus::Failed,
                            );
                            result.terminal_output = report.to_string();
                            result
                        }
                    };

                    // Release before reporting, so the loop can dispatch
                    // as soon as it receives the result
                    drop(permit);

                    let _ = job_sender.send((job_index, result)).await;
                });
            }

            if running == 0 {
                break;
            }

            let Some((index, result)) = receiver.recv().await else {
                break;
            };

            running -= 1;

            self.complete_job(&mut states, &mut summary, index, result)
                .await?;
        }

        signal_handle.abort();

        summary.duration = started.elapsed();

        self.emitter
            .emit(Event::PipelineFinished { summary: &summary })
            .await?;

        summary.notifier_errors = self.notifier.flush().await;

        if !summary.notifier_errors.is_empty() {
            warn!(
                errors = summary.notifier_errors.len(),
                "Failed to deliver some notifications"
            );
        }

        debug!(
            success = summary.is_success(),
            duration = ?summary.duration,
            "Finished running tasks"
        );

        Ok(summary)
    }

    async fn complete_job(
        &mut self,
        states: &mut FxHashMap<NodeIndex, JobState>,
        summary: &mut RunSummary,
        index: NodeIndex,
        mut result: TaskResult,
    ) -> miette::Result<()> {
        states.insert(
            index,
            if result.is_success() {
                JobState::Passed
            } else {
                JobState::Unsuccessful
            },
        );

        summary
            .cache_warnings
            .extend(std::mem::take(&mut result.cache_warnings));

        self.emitter
            .emit(Event::TaskFinished { result: &result })
            .await?;

        summary.results.push(result);

        Ok(())
    }

    fn monitor_signals(&self) -> JoinHandle<()> {
        let cancel_token = self.cancel_token.clone();

        tokio::spawn(async move {
            debug!("Listening for ctrl+c signal");

            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Received ctrl+c signal, shutting down!");

                cancel_token.cancel();
            }
        })
    }
}
