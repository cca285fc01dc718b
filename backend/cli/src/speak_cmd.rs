//! CLI Speak Command
//!
//! Types text on a keyboard and presses the voice key. Audio returned by the
//! TTS webhook is written to a file instead of played.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use vozform_config::VozformConfig;
use vozform_core::MemoryNotifier;
use vozform_keyboard::{KeyboardInput, KeyboardOptions, Playback, SubmitOutcome};
use vozform_tts::{FileAudioPlayer, WebhookTts};

use crate::output::{note_warn, print_notice};

pub async fn run(config: &VozformConfig, text: &str, out: PathBuf) -> Result<()> {
    let tts = WebhookTts::with_timeout(
        config.tts_webhook(),
        Duration::from_secs(config.timeout_secs()),
    )
    .context("Failed to build the TTS client")?;
    let notifier = Arc::new(MemoryNotifier::default());
    let keyboard = KeyboardInput::new(
        Arc::new(tts),
        Arc::new(FileAudioPlayer::new(&out)),
        notifier.clone(),
    )
    .with_options(KeyboardOptions {
        session: "cli".to_string(),
        clear_after_send: config.clear_after_send(),
    });

    for key in text.chars() {
        if key == ' ' {
            keyboard.press_space();
        } else {
            keyboard.press_key(key);
        }
    }

    let outcome = keyboard.submit_text().await;
    for notice in notifier.drain() {
        print_notice(&notice);
    }

    match outcome? {
        SubmitOutcome::Skipped => note_warn("Nothing to say: the text is blank."),
        SubmitOutcome::Sent { playback, .. } => match playback {
            Playback::Played => println!("Audio written to {}", out.display()),
            Playback::NoAudio => note_warn("The TTS webhook returned no audio."),
            Playback::Failed(_) => {}
        },
    }
    Ok(())
}
