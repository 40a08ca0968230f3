use crate::webhooks::WebhookNotifier;
use async_trait::async_trait;
use orbit_config::NotifierConfig;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// An event relayed to an external service, such as `task.finished`.
#[derive(Clone, Debug, PartialEq)]
pub struct NotifierEvent {
    pub type_of: String,
    pub payload: Value,
}

impl NotifierEvent {
    pub fn new(type_of: impl Into<String>, payload: Value) -> Self {
        Self {
            type_of: type_of.into(),
            payload,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Queue an event. Never waits on the external service.
    async fn notify(&self, event: NotifierEvent);

    /// Wait for queued events to be delivered, and return the errors that
    /// occurred while delivering them.
    async fn flush(&self) -> Vec<String>;
}

/// Used when no external service is configured.
pub struct EmptyNotifier;

#[async_trait]
impl Notifier for EmptyNotifier {
    async fn notify(&self, _event: NotifierEvent) {}

    async fn flush(&self) -> Vec<String> {
        vec![]
    }
}

pub fn create_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config.webhook_url.as_deref() {
        Some(url) if !url.is_empty() => {
            debug!(url, "Sending run events to webhook");

            Arc::new(WebhookNotifier::new(url))
        }
        _ => Arc::new(EmptyNotifier),
    }
}
