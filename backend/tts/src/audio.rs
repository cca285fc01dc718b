//! Audio clips returned by the TTS endpoint and the players that consume them.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use tracing::info;
use vozform_core::VozError;

/// Audio format for TTS output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioFormat {
    #[default]
    Mpeg,
    Opus,
    Wav,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mpeg => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Wav => "audio/wav",
        }
    }
}

/// A decoded clip that still remembers its base64 form for data URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub format: AudioFormat,
    pub bytes: Vec<u8>,
    payload: String,
}

impl AudioClip {
    /// Decode a base64 payload. Undecodable payloads cannot be played.
    pub fn from_base64(payload: &str, format: AudioFormat) -> Result<Self, VozError> {
        let payload = payload.trim();
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| VozError::PlaybackFailure(format!("audio payload is not valid base64: {e}")))?;
        Ok(Self {
            format,
            bytes,
            payload: payload.to_string(),
        })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// `data:<mime>;base64,<payload>`, playable by an HTML audio element.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.payload)
    }
}

/// Plays a clip. Returning an error means playback was rejected.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, clip: &AudioClip) -> Result<(), VozError>;
}

/// "Plays" by writing the decoded audio to a file.
pub struct FileAudioPlayer {
    path: PathBuf,
}

impl FileAudioPlayer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AudioPlayer for FileAudioPlayer {
    async fn play(&self, clip: &AudioClip) -> Result<(), VozError> {
        tokio::fs::write(&self.path, &clip.bytes)
            .await
            .map_err(|e| VozError::PlaybackFailure(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), bytes = clip.bytes.len(), "Audio written");
        Ok(())
    }
}

/// Keeps the last clip so a remote client can play it itself.
#[derive(Default)]
pub struct ClipRecorder {
    last: Mutex<Option<AudioClip>>,
}

impl ClipRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the most recent clip, if any.
    pub fn take(&self) -> Option<AudioClip> {
        match self.last.lock() {
            Ok(mut last) => last.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

#[async_trait]
impl AudioPlayer for ClipRecorder {
    async fn play(&self, clip: &AudioClip) -> Result<(), VozError> {
        let mut last = self
            .last
            .lock()
            .map_err(|_| VozError::PlaybackFailure("clip recorder poisoned".into()))?;
        *last = Some(clip.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_keeps_payload() {
        let clip = AudioClip::from_base64("SUQzBAA=", AudioFormat::Mpeg).unwrap();
        assert_eq!(clip.data_uri(), "data:audio/mpeg;base64,SUQzBAA=");
        assert_eq!(clip.bytes, b"ID3\x04\x00");
    }

    #[test]
    fn invalid_base64_is_playback_failure() {
        let err = AudioClip::from_base64("***", AudioFormat::Mpeg).unwrap_err();
        assert_eq!(err.kind(), "playback_failure");
    }

    #[tokio::test]
    async fn recorder_hands_back_last_clip_once() {
        let recorder = ClipRecorder::new();
        let clip = AudioClip::from_base64("AAAA", AudioFormat::Mpeg).unwrap();
        recorder.play(&clip).await.unwrap();
        assert_eq!(recorder.take(), Some(clip));
        assert_eq!(recorder.take(), None);
    }
}
