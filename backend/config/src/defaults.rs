//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{
    KeyboardConfig, LoggingConfig, ServerConfig, VozformConfig, WebhooksConfig, WizardConfig,
};

pub const DEFAULT_TTS_WEBHOOK: &str = "http://localhost:5678/webhook/texto-pra-voz";
pub const DEFAULT_FORMS_WEBHOOK: &str = "http://localhost:5678/webhook/get-form";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_SESSIONS: usize = 256;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: VozformConfig) -> VozformConfig {
    let config = apply_webhook_defaults(config);
    let config = apply_keyboard_defaults(config);
    let config = apply_wizard_defaults(config);
    let config = apply_server_defaults(config);
    apply_logging_defaults(config)
}

fn apply_webhook_defaults(mut config: VozformConfig) -> VozformConfig {
    let webhooks = config.webhooks.get_or_insert_with(WebhooksConfig::default);
    webhooks.tts.get_or_insert_with(|| DEFAULT_TTS_WEBHOOK.to_string());
    webhooks.forms.get_or_insert_with(|| DEFAULT_FORMS_WEBHOOK.to_string());
    webhooks.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_keyboard_defaults(mut config: VozformConfig) -> VozformConfig {
    let keyboard = config.keyboard.get_or_insert_with(KeyboardConfig::default);
    keyboard.clear_after_send.get_or_insert(false);
    config
}

fn apply_wizard_defaults(mut config: VozformConfig) -> VozformConfig {
    let wizard = config.wizard.get_or_insert_with(WizardConfig::default);
    wizard.require_selection.get_or_insert(false);
    config
}

fn apply_server_defaults(mut config: VozformConfig) -> VozformConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_sessions.get_or_insert(DEFAULT_MAX_SESSIONS);
    server.session_idle_secs.get_or_insert(DEFAULT_SESSION_IDLE_SECS);
    config
}

fn apply_logging_defaults(mut config: VozformConfig) -> VozformConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}
