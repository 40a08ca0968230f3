use crate::run_summary::RunSummary;
use async_trait::async_trait;
use orbit_task::Task;
use orbit_task_runner::TaskResult;
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
#[serde(untagged, rename_all = "camelCase")]
pub enum Event<'data> {
    #[serde(rename_all = "camelCase")]
    PipelineStarted {
        concurrency: usize,
        task_ids: Vec<&'data str>,
    },
    PipelineFinished {
        summary: &'data RunSummary,
    },

    TaskQueued {
        task: &'data Task,
    },
    TaskStarted {
        hash: Option<&'data str>,
        task: &'data Task,
    },
    TaskFinished {
        result: &'data TaskResult,
    },
}

impl Event<'_> {
    pub fn get_type(&self) -> &str {
        match self {
            Event::PipelineStarted { .. } => "pipeline.started",
            Event::PipelineFinished { .. } => "pipeline.finished",
            Event::TaskQueued { .. } => "task.queued",
            Event::TaskStarted { .. } => "task.started",
            Event::TaskFinished { .. } => "task.finished",
        }
    }
}

#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn on_emit<'data>(&mut self, event: &Event<'data>) -> miette::Result<()>;
}

/// Delivers events to subscribers in emission order.
#[derive(Default)]
pub struct EventEmitter {
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl EventEmitter {
    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    #[instrument(skip_all)]
    pub async fn emit<'data>(&mut self, event: Event<'data>) -> miette::Result<()> {
        for subscriber in self.subscribers.iter_mut() {
            subscriber.on_emit(&event).await?;
        }

        Ok(())
    }
}
