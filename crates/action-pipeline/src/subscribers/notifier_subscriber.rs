use crate::event_emitter::{Event, Subscriber};
use async_trait::async_trait;
use orbit_notifier::{Notifier, NotifierEvent};
use std::sync::Arc;
use tracing::warn;

/// Relays run progress to a notifier. Notifiers queue events without
/// waiting, so this never holds up the pipeline.
pub struct NotifierSubscriber {
    notifier: Arc<dyn Notifier>,
}

impl NotifierSubscriber {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Subscriber for NotifierSubscriber {
    async fn on_emit<'data>(&mut self, event: &Event<'data>) -> miette::Result<()> {
        let type_of = match event {
            Event::PipelineStarted { .. } => "command.started",
            Event::TaskFinished { .. } => "task.finished",
            Event::PipelineFinished { .. } => "command.finished",
            _ => return Ok(()),
        };

        match serde_json::to_value(event) {
            Ok(payload) => {
                self.notifier
                    .notify(NotifierEvent::new(type_of, payload))
                    .await;
            }
            Err(error) => {
                warn!(event = type_of, "Failed to serialize notifier event: {error}");
            }
        }

        Ok(())
    }
}
