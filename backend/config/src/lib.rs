//! `vozform-config`: VozForm runtime configuration management.
//!
//! Provides:
//! - Typed config schema (webhooks, keyboard, wizard, server, logging)
//! - YAML read/write
//! - `${ENV_VAR}` substitution and `VOZFORM_*` overrides
//! - Default value application
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::VozformConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// A config that passed validation, with the warnings validation raised.
///
/// Warnings are returned rather than logged so callers can report them once
/// their subscriber is installed.
#[derive(Debug)]
pub struct PreparedConfig {
    pub config: VozformConfig,
    pub warnings: Vec<ConfigValidationError>,
}

/// Load a config file, substitute env vars, apply overrides and defaults, and
/// validate it.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<PreparedConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let raw = io::load_raw(path).await?;
    prepare(raw, &env)
}

/// The pure part of [`load_and_prepare`].
pub fn prepare(raw: serde_json::Value, env: &HashMap<String, String>) -> Result<PreparedConfig> {
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: VozformConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(apply_env_overrides(config, env));

    let report = validate(&config);
    if !report.is_valid() {
        let details: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!(
            "Invalid configuration ({} error(s)): {}",
            details.len(),
            details.join("; ")
        );
    }

    Ok(PreparedConfig {
        config,
        warnings: report.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepare_runs_the_whole_pipeline() {
        let raw = json!({
            "webhooks": { "forms": "https://${HOOK_HOST}/webhook/get-form" },
            "keyboard": { "clearAfterSend": true }
        });
        let env = HashMap::from([
            ("HOOK_HOST".to_string(), "n8n.example.com".to_string()),
            ("VOZFORM_PORT".to_string(), "7000".to_string()),
        ]);

        let prepared = prepare(raw, &env).unwrap();
        assert!(prepared.warnings.is_empty());
        let config = prepared.config;
        assert_eq!(config.forms_webhook(), "https://n8n.example.com/webhook/get-form");
        assert!(config.clear_after_send());
        assert_eq!(config.port(), 7000);
        assert!(!config.require_selection());
    }

    #[test]
    fn prepare_rejects_invalid_config() {
        let raw = json!({ "webhooks": { "tts": "nope" } });
        let err = prepare(raw, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("webhooks.tts"));
    }

    #[test]
    fn prepare_hands_back_warnings() {
        let raw = json!({ "webhooks": { "tts": "http://n8n.example.com/webhook/tts" } });
        let prepared = prepare(raw, &HashMap::new()).unwrap();
        assert_eq!(prepared.warnings.len(), 1);
        assert_eq!(prepared.warnings[0].path, "webhooks.tts");
        assert_eq!(prepared.warnings[0].message, "Webhook is not using https");
    }
}
