//! Session Event Logger
//!
//! Structured events (text submissions, speech captures, form submissions,
//! failures) emitted through `tracing` so they land in the NDJSON file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    TextSubmitted {
        text: String,
        has_audio: bool,
    },
    SpeechCaptured {
        transcript: String,
    },
    FormSubmitted {
        field_count: usize,
        html_bytes: usize,
    },
    Failure {
        kind: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact user-supplied strings in `event` and wrap it in a timestamped entry.
    pub fn entry(session_id: &str, mut event: SessionEvent) -> EventLogEntry {
        match &mut event {
            SessionEvent::TextSubmitted { text, .. } => {
                *text = redact_sensitive_data(text);
            }
            SessionEvent::SpeechCaptured { transcript } => {
                *transcript = redact_sensitive_data(transcript);
            }
            SessionEvent::Failure { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            SessionEvent::FormSubmitted { .. } => {}
        }

        EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Logs a session event, redacted, through the tracing system.
    pub fn log_event(session_id: &str, event: SessionEvent) {
        let entry = Self::entry(session_id, event);
        info!(target: "session_events", event = ?entry, "Session event");
    }
}
