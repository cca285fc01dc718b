//! Config file read/write.

use crate::schema::VozformConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the VozForm config directory.
/// Priority: `VOZFORM_CONFIG_DIR` env > `~/.vozform/` > `./.vozform`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VOZFORM_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".vozform"),
        None => PathBuf::from(".vozform"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the raw YAML of a config file as a JSON value tree.
///
/// Returns an empty object if the file doesn't exist (first run).
pub async fn load_raw(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let mut value: serde_json::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;
    if value.is_null() {
        // A file holding only comments.
        value = serde_json::Value::Object(Default::default());
    }

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Load and parse the config from disk without env processing.
pub async fn load_config(path: &Path) -> Result<VozformConfig> {
    let value = load_raw(path).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Config at {} does not match the schema", path.display()))
}

/// Write config to disk atomically (write to temp file, rename).
pub async fn write_config(config: &VozformConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vozform-config-{name}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_is_default() {
        let path = scratch_dir("missing").join("nope.yaml");
        let config = load_config(&path).await.unwrap();
        assert_eq!(config, VozformConfig::default());
    }

    #[tokio::test]
    async fn write_then_load() {
        let dir = scratch_dir("roundtrip");
        let path = config_file_path(&dir);
        let config = apply_all_defaults(VozformConfig::default());

        write_config(&config, &path).await.unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn empty_file_is_default() {
        let dir = scratch_dir("empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, "").unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config, VozformConfig::default());

        let _ = std::fs::remove_dir_all(dir);
    }
}
