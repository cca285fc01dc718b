/// TTS provider trait and the webhook-backed implementation.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vozform_core::VozError;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A TTS request. The text is sent as-is; callers trim it first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsRequest {
    pub text: String,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Validated reply from a TTS endpoint.
///
/// Only successful replies become a `WebhookResponse`; anything else is a
/// [`VozError::NetworkFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status: u16,
    /// Base64-encoded MPEG audio, when the endpoint produced any.
    pub audio_base64: Option<String>,
}

impl WebhookResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait TtsProvider: Send + Sync {
    async fn synthesize(&self, req: TtsRequest) -> Result<WebhookResponse, VozError>;
}

// ---------------------------------------------------------------------------
// Webhook TTS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WebhookBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookReply {
    #[serde(default)]
    audio_base64: Option<String>,
}

/// Posts `{"text": ...}` to an HTTP endpoint that answers with
/// `{"audioBase64": ...}`.
pub struct WebhookTts {
    url: String,
    client: Client,
}

impl WebhookTts {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    /// Build a client whose requests give up after `timeout`.
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

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TtsProvider for WebhookTts {
    async fn synthesize(&self, req: TtsRequest) -> Result<WebhookResponse, VozError> {
        info!(url = %self.url, chars = req.text.chars().count(), "[TTS/Webhook] Sending text");
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookBody { text: &req.text })
            .send()
            .await
            .map_err(|e| VozError::network(format!("TTS request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "[TTS/Webhook] Endpoint rejected text");
            return Err(VozError::http_status(
                status.as_u16(),
                format!(
                    "TTS webhook answered {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            ));
        }

        let reply: WebhookReply = resp
            .json()
            .await
            .map_err(|e| VozError::network(format!("TTS response was not valid JSON: {e}")))?;

        let audio_base64 = reply.audio_base64.filter(|a| !a.is_empty());
        debug!(has_audio = audio_base64.is_some(), "[TTS/Webhook] Reply decoded");

        Ok(WebhookResponse {
            status: status.as_u16(),
            audio_base64,
        })
    }
}
