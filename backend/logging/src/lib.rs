//! Telemetry and structured logging components for VozForm.
//!
//! Handles log redaction, JSON output generation, file rotation, and session event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, SessionEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
