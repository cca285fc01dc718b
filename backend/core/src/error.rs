use thiserror::Error;

/// Top-level error type for the VozForm components.
///
/// The first four kinds are user-facing: they are reported through a
/// [`Notifier`](crate::Notifier) and leave the component interactive. The
/// remaining kinds signal misuse of the API by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VozError {
    #[error("capability unavailable: {0}")]
    UnsupportedCapability(String),

    #[error("network failure: {message}")]
    NetworkFailure {
        status: Option<u16>,
        message: String,
    },

    #[error("audio playback failed: {0}")]
    PlaybackFailure(String),

    #[error("missing submission data: {0}")]
    MissingSubmissionData(String),

    #[error("{0} already in progress")]
    Busy(String),

    #[error("cannot {action} during the {stage} stage")]
    InvalidTransition { stage: String, action: String },

    #[error("field index {index} out of range (field count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid value for {attribute}: {value:?}")]
    InvalidStyle { attribute: String, value: String },

    #[error("no fields selected")]
    EmptySelection,
}

impl VozError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedCapability(_) => "unsupported_capability",
            Self::NetworkFailure { .. } => "network_failure",
            Self::PlaybackFailure(_) => "playback_failure",
            Self::MissingSubmissionData(_) => "missing_submission_data",
            Self::Busy(_) => "busy",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::InvalidStyle { .. } => "invalid_style",
            Self::EmptySelection => "empty_selection",
        }
    }

    /// Whether the error is one the end user is told about, as opposed to a
    /// caller bug.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCapability(_)
                | Self::NetworkFailure { .. }
                | Self::PlaybackFailure(_)
                | Self::MissingSubmissionData(_)
        )
    }
}
