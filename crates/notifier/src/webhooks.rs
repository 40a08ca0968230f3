use crate::notifier::{Notifier, NotifierEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orbit_common::color;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload<'event> {
    pub created_at: DateTime<Utc>,

    pub payload: &'event Value,

    #[serde(rename = "type")]
    pub type_of: &'event str,
}

pub async fn notify_webhook(
    client: &reqwest::Client,
    url: &str,
    body: String,
) -> Result<(), String> {
    let response = client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|error| error.to_string())?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("webhook responded with status {}", response.status()))
    }
}

/// Posts events to a URL, in order, from a background task so that
/// callers never wait on the network. When the first request fails, all
/// subsequent events are dropped.
pub struct WebhookNotifier {
    sender: Mutex<Option<UnboundedSender<NotifierEvent>>>,
    worker: Mutex<Option<JoinHandle<Vec<String>>>>,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(tokio::spawn(deliver_events(
                url.to_owned(),
                receiver,
            )))),
        }
    }
}

async fn deliver_events(url: String, mut receiver: UnboundedReceiver<NotifierEvent>) -> Vec<String> {
    let client = reqwest::Client::new();
    let mut errors = vec![];
    let mut first = true;

    while let Some(event) = receiver.recv().await {
        let body = match serde_json::to_string(&WebhookPayload {
            created_at: Utc::now(),
            payload: &event.payload,
            type_of: &event.type_of,
        }) {
            Ok(body) => body,
            Err(error) => {
                errors.push(format!("{}: {error}", event.type_of));
                continue;
            }
        };

        trace!(url = url.as_str(), event = event.type_of.as_str(), "Sending webhook");

        if let Err(error) = notify_webhook(&client, &url, body).await {
            errors.push(format!("{}: {error}", event.type_of));

            if first {
                warn!(
                    "Failed to send webhook event to {}, subsequent events will not be sent: {}",
                    color::url(&url),
                    color::muted_light(&error),
                );

                // Drain and drop the rest
                receiver.close();
                while receiver.recv().await.is_some() {}

                break;
            }

            debug!(event = event.type_of.as_str(), "Failed to send webhook event: {error}");
        }

        first = false;
    }

    errors
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: NotifierEvent) {
        if let Some(sender) = self.sender.lock().await.as_ref() {
            // Errors only when the worker has stopped after a failure
            let _ = sender.send(event);
        }
    }

    async fn flush(&self) -> Vec<String> {
        // Closing the channel lets the worker finish once delivered
        self.sender.lock().await.take();

        match self.worker.lock().await.take() {
            Some(handle) => handle
                .await
                .unwrap_or_else(|error| vec![error.to_string()]),
            None => vec![],
        }
    }
}
