pub mod audio;
pub mod engine;

pub use audio::{AudioClip, AudioFormat, AudioPlayer, ClipRecorder, FileAudioPlayer};
pub use engine::{TtsProvider, TtsRequest, WebhookResponse, WebhookTts};
