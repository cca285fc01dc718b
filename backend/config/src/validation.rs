//! Config validation: schema checks with user-friendly error messages.

use crate::schema::VozformConfig;
use thiserror::Error;
use url::Url;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &VozformConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_webhooks(config, &mut report);
    validate_server(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_webhook_url(path: &str, raw: &str, report: &mut ValidationReport) {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if url.scheme() == "http" && url.host_str().is_some_and(|h| h != "localhost" && h != "127.0.0.1") {
                report.warn(path, "Webhook is not using https");
            }
        }
        Ok(url) => report.error(path, format!("Unsupported URL scheme '{}'", url.scheme())),
        Err(e) => report.error(path, format!("Invalid URL '{raw}': {e}")),
    }
}

fn validate_webhooks(config: &VozformConfig, report: &mut ValidationReport) {
    validate_webhook_url("webhooks.tts", config.tts_webhook(), report);
    validate_webhook_url("webhooks.forms", config.forms_webhook(), report);
    if config.timeout_secs() == 0 {
        report.error("webhooks.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_server(config: &VozformConfig, report: &mut ValidationReport) {
    let port = config.port();
    if port == 0 {
        report.error("server.port", "Port cannot be 0");
    } else if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
    if config.bind().trim().is_empty() {
        report.error("server.bind", "Bind address cannot be empty");
    }
    if config.max_sessions() == 0 {
        report.error("server.maxSessions", "maxSessions must be > 0");
    }
    if config.session_idle_secs() == 0 {
        report.error("server.sessionIdleSecs", "sessionIdleSecs must be > 0");
    }
}

fn validate_logging(config: &VozformConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    if !level.contains('=') && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'"));
    }
}
