//! CLI Config Command
//!
//! Prints the effective configuration, or writes a starter config file.

use std::path::Path;

use anyhow::{bail, Result};
use vozform_config::{apply_all_defaults, write_config, VozformConfig};

use crate::output::note_success;

pub fn show(config: &VozformConfig) -> Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

/// Write a config holding every default to `path`.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = apply_all_defaults(VozformConfig::default());
    write_config(&config, path).await?;
    note_success(&format!("Wrote {}", path.display()));
    Ok(())
}
