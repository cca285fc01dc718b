use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::VozError;
use crate::types::{Notice, RecognitionOptions, SpeechResult};

/// Single-utterance speech capture.
///
/// `Ok(None)` means the session ended without a recognized result.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, options: &RecognitionOptions)
        -> Result<Option<SpeechResult>, VozError>;
}

/// Surface used to tell the user about outcomes (an `alert()` in a browser).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Speech capture for hosts without a microphone pipeline.
pub struct NoSpeech;

#[async_trait]
impl SpeechRecognizer for NoSpeech {
    async fn recognize(
        &self,
        _options: &RecognitionOptions,
    ) -> Result<Option<SpeechResult>, VozError> {
        Err(VozError::UnsupportedCapability(
            "speech recognition is not supported on this host".into(),
        ))
    }
}

/// Writes notices to the tracing log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Info(message) => info!(%message, "notice"),
            Notice::Error(message) => error!(%message, "notice"),
        }
    }
}

/// Collects notices in memory so they can be handed back to a remote caller.
#[derive(Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every notice recorded so far.
    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        TracingNotifier.notify(notice.clone());
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
