//! Keyboard Input component.
//!
//! Holds the text buffer and drives the `idle → listening → idle` and
//! `idle → sending → idle` cycles. Listening and sending share one phase cell,
//! so at most one of them runs at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use logging::{EventLogger, SessionEvent};
use serde::Serialize;
use tracing::{debug, info, warn};
use vozform_core::{
    NoSpeech, Notice, Notifier, PhaseCell, PhaseTag, RecognitionOptions, SpeechRecognizer,
    VozError,
};
use vozform_tts::{AudioClip, AudioFormat, AudioPlayer, TtsProvider, TtsRequest};

use crate::buffer::TextBuffer;

pub const MSG_SEND_FAILED: &str = "Erro ao enviar o texto para conversão em voz.";
pub const MSG_PLAYBACK_FAILED: &str = "Erro ao reproduzir o áudio.";
pub const MSG_SPEECH_UNSUPPORTED: &str = "Speech recognition is not supported in this browser.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardPhase {
    Idle,
    Listening,
    Sending,
}

impl PhaseTag for KeyboardPhase {
    const IDLE: Self = KeyboardPhase::Idle;

    fn to_raw(self) -> u8 {
        self as u8
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => KeyboardPhase::Listening,
            2 => KeyboardPhase::Sending,
            _ => KeyboardPhase::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardOptions {
    /// Label used for structured session events.
    pub session: String,
    /// Clear the buffer after the TTS endpoint accepted it. Off by default, so
    /// pressing the voice key again resends the same text.
    pub clear_after_send: bool,
}

impl Default for KeyboardOptions {
    fn default() -> Self {
        Self {
            session: "keyboard".to_string(),
            clear_after_send: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Playback {
    NoAudio,
    Played,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Nothing but whitespace in the buffer; no request was made.
    Skipped,
    Sent { text: String, playback: Playback },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum VoiceOutcome {
    Submitted(SubmitOutcome),
    Transcribed { transcript: String },
    NothingHeard,
}

pub struct KeyboardInput {
    buffer: Mutex<TextBuffer>,
    phase: PhaseCell<KeyboardPhase>,
    tts: Arc<dyn TtsProvider>,
    speech: Arc<dyn SpeechRecognizer>,
    player: Arc<dyn AudioPlayer>,
    notifier: Arc<dyn Notifier>,
    options: KeyboardOptions,
}

impl KeyboardInput {
    /// A keyboard without speech capture; see [`KeyboardInput::with_speech`].
    pub fn new(
        tts: Arc<dyn TtsProvider>,
        player: Arc<dyn AudioPlayer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            buffer: Mutex::new(TextBuffer::new()),
            phase: PhaseCell::new(),
            tts,
            speech: Arc::new(NoSpeech),
            player,
            notifier,
            options: KeyboardOptions::default(),
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechRecognizer>) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_options(mut self, options: KeyboardOptions) -> Self {
        self.options = options;
        self
    }

    fn buffer(&self) -> MutexGuard<'_, TextBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn text(&self) -> String {
        self.buffer().as_str().to_string()
    }

    pub fn phase(&self) -> KeyboardPhase {
        self.phase.current()
    }

    pub fn press_key(&self, key: char) {
        self.buffer().push_key(key);
    }

    pub fn press_space(&self) {
        self.buffer().push_space();
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    /// The voice key: speaks the buffer when it has text, otherwise listens
    /// for one utterance and appends it.
    pub async fn activate_voice(&self) -> Result<VoiceOutcome, VozError> {
        if !self.buffer().is_blank() {
            return self.submit_text().await.map(VoiceOutcome::Submitted);
        }
        self.listen().await
    }

    async fn listen(&self) -> Result<VoiceOutcome, VozError> {
        let _listening = self.phase.try_enter(KeyboardPhase::Listening)?;
        let options = RecognitionOptions::default();
        debug!(locale = %options.locale, "Speech capture started");

        match self.speech.recognize(&options).await {
            Ok(Some(result)) => {
                self.buffer().push_transcript(&result.transcript);
                EventLogger::log_event(
                    &self.options.session,
                    SessionEvent::SpeechCaptured {
                        transcript: result.transcript.clone(),
                    },
                );
                Ok(VoiceOutcome::Transcribed {
                    transcript: result.transcript,
                })
            }
            Ok(None) => {
                debug!("Speech capture ended without a result");
                Ok(VoiceOutcome::NothingHeard)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Send the trimmed buffer to the TTS endpoint and play what comes back.
    pub async fn submit_text(&self) -> Result<SubmitOutcome, VozError> {
        let text = self.buffer().trimmed().to_string();
        if text.is_empty() {
            return Ok(SubmitOutcome::Skipped);
        }

        let _sending = self.phase.try_enter(KeyboardPhase::Sending)?;
        info!(session = %self.options.session, "Submitting text for speech synthesis");

        let reply = match self.tts.synthesize(TtsRequest::new(text.clone())).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "TTS submission failed");
                self.report(&e);
                return Err(e);
            }
        };

        let playback = match reply.audio_base64.as_deref() {
            Some(payload) => self.play(payload).await,
            None => Playback::NoAudio,
        };

        if self.options.clear_after_send {
            self.buffer().clear();
        }

        EventLogger::log_event(
            &self.options.session,
            SessionEvent::TextSubmitted {
                text: text.clone(),
                has_audio: reply.audio_base64.is_some(),
            },
        );
        Ok(SubmitOutcome::Sent { text, playback })
    }

    async fn play(&self, payload: &str) -> Playback {
        let result = match AudioClip::from_base64(payload, AudioFormat::Mpeg) {
            Ok(clip) => self.player.play(&clip).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Playback::Played,
            Err(e) => {
                warn!(error = %e, "Audio playback failed");
                self.report(&e);
                Playback::Failed(e.to_string())
            }
        }
    }

    fn report(&self, error: &VozError) {
        let message = match error {
            VozError::UnsupportedCapability(_) => MSG_SPEECH_UNSUPPORTED.to_string(),
            VozError::NetworkFailure { .. } => MSG_SEND_FAILED.to_string(),
            VozError::PlaybackFailure(_) => MSG_PLAYBACK_FAILED.to_string(),
            other if other.is_user_facing() => other.to_string(),
            _ => return,
        };
        EventLogger::log_event(
            &self.options.session,
            SessionEvent::Failure {
                kind: error.kind().to_string(),
                error_msg: error.to_string(),
            },
        );
        self.notifier.notify(Notice::Error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;
    use vozform_core::{MemoryNotifier, SpeechResult};
    use vozform_tts::{ClipRecorder, WebhookResponse, WebhookTts};
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct FakeTts {
        requests: Mutex<Vec<String>>,
        audio: Option<String>,
        fail: bool,
    }

    #[async_trait]
    impl TtsProvider for FakeTts {
        async fn synthesize(&self, req: TtsRequest) -> Result<WebhookResponse, VozError> {
            self.requests.lock().unwrap().push(req.text);
            if self.fail {
                return Err(VozError::http_status(502, "bad gateway"));
            }
            Ok(WebhookResponse {
                status: 200,
                audio_base64: self.audio.clone(),
            })
        }
    }

    /// Blocks inside `synthesize` until released.
    struct GatedTts {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl TtsProvider for GatedTts {
        async fn synthesize(&self, _req: TtsRequest) -> Result<WebhookResponse, VozError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(WebhookResponse {
                status: 200,
                audio_base64: None,
            })
        }
    }

    struct FixedSpeech(Option<&'static str>);

    #[async_trait]
    impl SpeechRecognizer for FixedSpeech {
        async fn recognize(
            &self,
            options: &RecognitionOptions,
        ) -> Result<Option<SpeechResult>, VozError> {
            assert_eq!(options.locale, "pt-BR");
            assert!(!options.continuous);
            assert!(!options.interim_results);
            Ok(self.0.map(|t| SpeechResult {
                transcript: t.to_string(),
            }))
        }
    }

    /// Blocks inside `recognize` until released, then hears `transcript`.
    struct GatedSpeech {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SpeechRecognizer for GatedSpeech {
        async fn recognize(
            &self,
            _options: &RecognitionOptions,
        ) -> Result<Option<SpeechResult>, VozError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Some(SpeechResult {
                transcript: "oi".to_string(),
            }))
        }
    }

    struct RejectingPlayer;

    #[async_trait]
    impl AudioPlayer for RejectingPlayer {
        async fn play(&self, _clip: &AudioClip) -> Result<(), VozError> {
            Err(VozError::PlaybackFailure("autoplay blocked".into()))
        }
    }

    fn keyboard(tts: Arc<dyn TtsProvider>) -> (KeyboardInput, Arc<ClipRecorder>, Arc<MemoryNotifier>) {
        let player = Arc::new(ClipRecorder::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let kb = KeyboardInput::new(tts, player.clone(), notifier.clone());
        (kb, player, notifier)
    }

    #[test]
    fn keys_and_spaces_concatenate() {
        let (kb, _, _) = keyboard(Arc::new(FakeTts::default()));
        kb.press_key('O');
        kb.press_key('I');
        kb.press_space();
        kb.press_key('A');
        assert_eq!(kb.text(), "OI A");
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
    }

    #[tokio::test]
    async fn voice_key_with_text_submits_trimmed_buffer() {
        let tts = Arc::new(FakeTts {
            audio: Some("SUQz".into()),
            ..Default::default()
        });
        let (kb, player, notifier) = keyboard(tts.clone());
        kb.press_space();
        kb.press_key('O');
        kb.press_key('I');
        kb.press_space();

        let outcome = kb.activate_voice().await.unwrap();
        assert_eq!(
            outcome,
            VoiceOutcome::Submitted(SubmitOutcome::Sent {
                text: "OI".into(),
                playback: Playback::Played,
            })
        );
        assert_eq!(*tts.requests.lock().unwrap(), vec!["OI".to_string()]);
        assert_eq!(player.take().unwrap().data_uri(), "data:audio/mpeg;base64,SUQz");
        assert!(notifier.drain().is_empty());
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
    }

    #[tokio::test]
    async fn buffer_survives_send_by_default() {
        let tts = Arc::new(FakeTts::default());
        let (kb, _, _) = keyboard(tts.clone());
        kb.press_key('A');
        kb.submit_text().await.unwrap();
        kb.submit_text().await.unwrap();
        assert_eq!(kb.text(), "A");
        assert_eq!(tts.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clear_after_send_empties_buffer() {
        let (kb, _, _) = keyboard(Arc::new(FakeTts::default()));
        let kb = kb.with_options(KeyboardOptions {
            clear_after_send: true,
            ..Default::default()
        });
        kb.press_key('A');
        kb.submit_text().await.unwrap();
        assert_eq!(kb.text(), "");
    }

    #[tokio::test]
    async fn blank_buffer_is_not_sent() {
        let tts = Arc::new(FakeTts::default());
        let (kb, _, _) = keyboard(tts.clone());
        kb.press_space();
        assert_eq!(kb.submit_text().await.unwrap(), SubmitOutcome::Skipped);
        assert!(tts.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn network_failure_is_reported_and_phase_resets() {
        let (kb, _, notifier) = keyboard(Arc::new(FakeTts {
            fail: true,
            ..Default::default()
        }));
        kb.press_key('X');
        let err = kb.submit_text().await.unwrap_err();
        assert_eq!(err.kind(), "network_failure");
        assert_eq!(notifier.drain(), vec![Notice::Error(MSG_SEND_FAILED.into())]);
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
        assert_eq!(kb.text(), "X");
    }

    #[tokio::test]
    async fn playback_failure_does_not_fail_submit() {
        let notifier = Arc::new(MemoryNotifier::new());
        let kb = KeyboardInput::new(
            Arc::new(FakeTts {
                audio: Some("SUQz".into()),
                ..Default::default()
            }),
            Arc::new(RejectingPlayer),
            notifier.clone(),
        );
        kb.press_key('A');
        match kb.submit_text().await.unwrap() {
            SubmitOutcome::Sent {
                playback: Playback::Failed(_),
                ..
            } => {}
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(notifier.drain(), vec![Notice::Error(MSG_PLAYBACK_FAILED.into())]);
    }

    #[tokio::test]
    async fn second_submit_while_sending_is_rejected() {
        let tts = Arc::new(GatedTts {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (kb, _, _) = keyboard(tts.clone());
        let kb = Arc::new(kb);
        kb.press_key('A');

        let first = tokio::spawn({
            let kb = kb.clone();
            async move { kb.submit_text().await }
        });
        tts.entered.notified().await;
        assert_eq!(kb.phase(), KeyboardPhase::Sending);

        let err = kb.activate_voice().await.unwrap_err();
        assert!(matches!(err, VozError::Busy(ref what) if what == "sending"));

        tts.release.notify_one();
        assert!(matches!(first.await.unwrap(), Ok(SubmitOutcome::Sent { .. })));
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
    }

    #[tokio::test]
    async fn empty_buffer_listens_and_appends_transcript() {
        let (kb, _, _) = keyboard(Arc::new(FakeTts::default()));
        let kb = kb.with_speech(Arc::new(FixedSpeech(Some("bom dia"))));

        let outcome = kb.activate_voice().await.unwrap();
        assert_eq!(
            outcome,
            VoiceOutcome::Transcribed {
                transcript: "bom dia".into()
            }
        );
        assert_eq!(kb.text(), " bom dia");
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
    }

    #[tokio::test]
    async fn second_listen_while_listening_is_rejected() {
        let speech = Arc::new(GatedSpeech {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (kb, _, _) = keyboard(Arc::new(FakeTts::default()));
        let kb = Arc::new(kb.with_speech(speech.clone()));

        let first = tokio::spawn({
            let kb = kb.clone();
            async move { kb.activate_voice().await }
        });
        speech.entered.notified().await;
        assert_eq!(kb.phase(), KeyboardPhase::Listening);

        let err = kb.activate_voice().await.unwrap_err();
        assert_eq!(err, VozError::Busy("listening".into()));

        speech.release.notify_one();
        assert_eq!(
            first.await.unwrap().unwrap(),
            VoiceOutcome::Transcribed {
                transcript: "oi".into()
            }
        );
        assert_eq!(kb.text(), " oi");
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
    }

    #[tokio::test]
    async fn silence_leaves_buffer_alone() {
        let (kb, _, _) = keyboard(Arc::new(FakeTts::default()));
        let kb = kb.with_speech(Arc::new(FixedSpeech(None)));
        assert_eq!(kb.activate_voice().await.unwrap(), VoiceOutcome::NothingHeard);
        assert_eq!(kb.text(), "");
    }

    #[tokio::test]
    async fn missing_speech_capability_is_reported() {
        let (kb, _, notifier) = keyboard(Arc::new(FakeTts::default()));
        let err = kb.activate_voice().await.unwrap_err();
        assert!(matches!(err, VozError::UnsupportedCapability(_)));
        assert_eq!(
            notifier.drain(),
            vec![Notice::Error(MSG_SPEECH_UNSUPPORTED.into())]
        );
        assert_eq!(kb.phase(), KeyboardPhase::Idle);
    }

    #[tokio::test]
    async fn webhook_audio_is_played_as_mpeg_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "text": "Olá" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "audioBase64": "SUQzBAA=" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (kb, player, _) = keyboard(Arc::new(WebhookTts::new(server.uri())));
        for key in "Olá".chars() {
            kb.press_key(key);
        }
        kb.submit_text().await.unwrap();

        let clip = player.take().unwrap();
        assert_eq!(clip.data_uri(), "data:audio/mpeg;base64,SUQzBAA=");
    }
}
