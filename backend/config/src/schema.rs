//! VozForm runtime configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and the
//! accessor methods below fall back to the same defaults.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BIND, DEFAULT_FORMS_WEBHOOK, DEFAULT_LOG_LEVEL, DEFAULT_MAX_SESSIONS, DEFAULT_PORT,
    DEFAULT_SESSION_IDLE_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_TTS_WEBHOOK,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for VozForm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VozformConfig {
    /// Remote endpoints the components post to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<WebhooksConfig>,

    /// Keyboard component behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<KeyboardConfig>,

    /// Form wizard behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard: Option<WizardConfig>,

    /// HTTP server settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhooksConfig {
    /// Text-to-speech endpoint, receives `{"text": ...}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts: Option<String>,

    /// Form endpoint, receives `{"id": ..., "html": ...}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forms: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardConfig {
    /// Clear the text buffer once the TTS endpoint accepted it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_after_send: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardConfig {
    /// Refuse to leave field selection with nothing selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_selection: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Live keyboard and wizard sessions kept per kind; the least recently
    /// used one is evicted to make room
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sessions: Option<usize>,

    /// Sessions untouched for this long are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_idle_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// "trace" | "debug" | "info" | "warn" | "error", or any EnvFilter directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling NDJSON logs; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl VozformConfig {
    pub fn tts_webhook(&self) -> &str {
        self.webhooks
            .as_ref()
            .and_then(|w| w.tts.as_deref())
            .unwrap_or(DEFAULT_TTS_WEBHOOK)
    }

    pub fn forms_webhook(&self) -> &str {
        self.webhooks
            .as_ref()
            .and_then(|w| w.forms.as_deref())
            .unwrap_or(DEFAULT_FORMS_WEBHOOK)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.webhooks
            .as_ref()
            .and_then(|w| w.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn clear_after_send(&self) -> bool {
        self.keyboard
            .as_ref()
            .and_then(|k| k.clear_after_send)
            .unwrap_or(false)
    }

    pub fn require_selection(&self) -> bool {
        self.wizard
            .as_ref()
            .and_then(|w| w.require_selection)
            .unwrap_or(false)
    }

    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn max_sessions(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_sessions)
            .unwrap_or(DEFAULT_MAX_SESSIONS)
    }

    pub fn session_idle_secs(&self) -> u64 {
        self.server
            .as_ref()
            .and_then(|s| s.session_idle_secs)
            .unwrap_or(DEFAULT_SESSION_IDLE_SECS)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}
