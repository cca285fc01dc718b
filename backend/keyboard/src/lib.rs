//! On-screen keyboard that accumulates text and speaks it through a TTS
//! webhook, or fills itself from a single speech capture.

pub mod buffer;
pub mod keyboard;
pub mod layout;

pub use buffer::TextBuffer;
pub use keyboard::{KeyboardInput, KeyboardOptions, KeyboardPhase, Playback, SubmitOutcome, VoiceOutcome};
