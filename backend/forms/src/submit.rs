//! Delivery of the rendered form to the forms webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use vozform_core::VozError;

/// Body posted to the forms webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub id: String,
    pub html: String,
}

#[async_trait]
pub trait FormSink: Send + Sync {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), VozError>;
}

/// Posts `{"id": ..., "html": ...}`; any 2xx is success.
pub struct WebhookFormSink {
    url: String,
    client: Client,
}

impl WebhookFormSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, VozError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VozError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl FormSink for WebhookFormSink {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), VozError> {
        info!(url = %self.url, bytes = submission.html.len(), "[Forms/Webhook] Posting form");
        let resp = self
            .client
            .post(&self.url)
            .json(submission)
            .send()
            .await
            .map_err(|e| VozError::network(format!("form request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "[Forms/Webhook] Endpoint rejected form");
            return Err(VozError::http_status(
                status.as_u16(),
                format!(
                    "{} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            ));
        }
        Ok(())
    }
}
