//! Chat webhook notifications
//!
//! Messages are posted as a single colored attachment:
//! `{"attachments": [{"color": "#EBB424", "text": "..."}]}`.

use crate::error::{Result, StackNagError};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Cost reports
pub const YELLOW: &str = "#EBB424";
/// Build events
pub const GREEN: &str = "#49C39E";

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, url: &str, text: &str, color: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    color: &'a str,
    text: &'a str,
}

/// Retries timeouts and refused connections; a non-2xx reply is final.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    retry: ExponentialBackoffPolicy,
}

impl WebhookNotifier {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            retry: ExponentialBackoffPolicy::default_policy(),
        })
    }

    pub fn with_retry(mut self, retry: ExponentialBackoffPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn post(&self, url: &str, text: &str, color: &str) -> Result<()> {
        let message = WebhookMessage {
            attachments: vec![Attachment { color, text }],
        };
        let message = &message;
        let client = &self.client;
        info!("posting message: {}", text);

        let resp = self
            .retry
            .execute_with_retry(|| async move { Ok(client.post(url).json(message).send().await?) })
            .await?;
        let status = resp.status();
        info!("Notify url status code: {}", status);

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StackNagError::Notification(format!(
                "webhook returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}
