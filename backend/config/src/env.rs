//! Environment variable substitution and overrides for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{LoggingConfig, ServerConfig, VozformConfig, WebhooksConfig};

/// `${VAR}` with an optional leading `$` that marks an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_TTS_WEBHOOK: &str = "VOZFORM_TTS_WEBHOOK";
pub const ENV_FORMS_WEBHOOK: &str = "VOZFORM_FORMS_WEBHOOK";
pub const ENV_BIND: &str = "VOZFORM_BIND";
pub const ENV_PORT: &str = "VOZFORM_PORT";
pub const ENV_LOG_DIR: &str = "VOZFORM_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree using the
/// process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
///
/// Walks the whole tree; only string leaves are rewritten. Fails if a
/// referenced variable is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_VAR_PATTERN.captures_iter(s) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        if whole.as_str().starts_with("$$") {
            out.push_str(&whole.as_str()[1..]);
        } else {
            match env.get(name.as_str()) {
                Some(val) if !val.is_empty() => out.push_str(val),
                _ => {
                    return Err(MissingEnvVarError {
                        var_name: name.as_str().to_string(),
                        config_path: path.to_string(),
                    }
                    .into())
                }
            }
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Apply `VOZFORM_*` overrides on top of the file config.
pub fn apply_env_overrides(mut config: VozformConfig, env: &HashMap<String, String>) -> VozformConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(url) = get(ENV_TTS_WEBHOOK) {
        config.webhooks.get_or_insert_with(WebhooksConfig::default).tts = Some(url);
    }
    if let Some(url) = get(ENV_FORMS_WEBHOOK) {
        config.webhooks.get_or_insert_with(WebhooksConfig::default).forms = Some(url);
    }
    if let Some(bind) = get(ENV_BIND) {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind);
    }
    match get(ENV_PORT).map(|p| p.parse::<u16>()) {
        Some(Ok(port)) => config.server.get_or_insert_with(ServerConfig::default).port = Some(port),
        Some(Err(e)) => tracing::warn!(error = %e, var = ENV_PORT, "Ignoring unparsable port"),
        None => {}
    }
    if let Some(dir) = get(ENV_LOG_DIR) {
        config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(dir);
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"webhooks": {"tts": "https://${N8N_HOST}/webhook/tts"}});
        let env = env(&[("N8N_HOST", "n8n.local")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["webhooks"]["tts"], "https://n8n.local/webhook/tts");
    }

    #[test]
    fn error_on_missing_var_names_path() {
        let v = json!({"webhooks": {"forms": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("webhooks.forms"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"key": "$${NOT_A_VAR} and ${A}"});
        let result = resolve_env_vars_with(&v, &env(&[("A", "1")])).unwrap();
        assert_eq!(result["key"], "${NOT_A_VAR} and 1");
    }

    #[test]
    fn passthrough_non_var_values() {
        let v = json!({"key": "plain $ string", "n": 3, "list": ["x"]});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = apply_env_overrides(
            VozformConfig::default(),
            &env(&[
                (ENV_TTS_WEBHOOK, "https://tts.example/hook"),
                (ENV_PORT, "9090"),
                (ENV_BIND, ""),
            ]),
        );
        assert_eq!(config.tts_webhook(), "https://tts.example/hook");
        assert_eq!(config.port(), 9090);
        assert!(config.server.as_ref().and_then(|s| s.bind.as_ref()).is_none());
    }
}
