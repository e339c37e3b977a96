//! XML configuration support (quick_xml).
//!
//! Search order: `$PARTITION_MOVE_CONFIG` (explicit), else the
//! OS-appropriate default path. A missing file just means defaults; the
//! config file is optional by design so scheduled jobs never stall on a
//! first-run template. Unknown XML fields fail hard to surface
//! misconfigurations early.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};

pub const CONFIG_ENV_VAR: &str = "PARTITION_MOVE_CONFIG";

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    workers: Option<usize>,
    checkpoint_file: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    /// Repeated element: one leaf name per tag.
    #[serde(rename = "exclude_name", default)]
    exclude_names: Vec<String>,
    /// Repeated element: one parent directory name per tag.
    #[serde(rename = "exclude_parent", default)]
    exclude_parents: Vec<String>,
}

fn apply(parsed: XmlConfig, cfg: &mut Config) {
    if let Some(workers) = parsed.workers
        && workers >= 1
    {
        cfg.workers = workers;
    }
    if let Some(s) = parsed.checkpoint_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.checkpoint_file = PathBuf::from(trimmed);
        }
    }
    if let Some(level) = parsed.log_level.as_deref().and_then(LogLevel::parse) {
        cfg.log_level = level;
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }
    cfg.exclude_names.extend(
        parsed
            .exclude_names
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    );
    cfg.exclude_parents.extend(
        parsed
            .exclude_parents
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    );
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    let mut cfg = Config::default();
    apply(parsed, &mut cfg);
    Ok(cfg)
}

/// Resolve the effective base Config: `$PARTITION_MOVE_CONFIG` if set (a
/// broken explicit file is an error), else the default path if a file
/// exists there, else plain defaults.
pub fn load_config() -> Result<Config> {
    if let Some(p) = env::var_os(CONFIG_ENV_VAR) {
        let path = PathBuf::from(p);
        let cfg = load_config_from_xml_path(&path)?;
        debug!(path = %path.display(), "Loaded explicit config file");
        return Ok(cfg);
    }
    if let Some(path) = default_config_path()
        && path.exists()
    {
        let cfg = load_config_from_xml_path(&path)?;
        debug!(path = %path.display(), "Loaded default config file");
        return Ok(cfg);
    }
    Ok(Config::default())
}
