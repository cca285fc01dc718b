pub mod error;
pub mod phase;
pub mod traits;
pub mod types;

pub use error::VozError;
pub use phase::{PhaseCell, PhaseGuard, PhaseTag};
pub use traits::{MemoryNotifier, NoSpeech, Notifier, SpeechRecognizer, TracingNotifier};
pub use types::{Notice, RecognitionOptions, SpeechResult, DEFAULT_LOCALE};
