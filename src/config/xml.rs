//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - Unknown XML fields are an error so typos surface instead of being ignored.
//! - A missing file is not an error: defaults apply.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{ARCHIVE_EXTENSION_DEFAULT, PLAYER_DEFAULT, SOURCE_EXTENSION_DEFAULT};

use crate::platform::{set_dir_mode_0700, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    archive_extension: Option<String>,
    source_extension: Option<String>,
    #[serde(default, deserialize_with = "de_i32_trimmed_opt")]
    compression_level: Option<i32>,
    verify_magic: Option<bool>,
    parallel: Option<bool>,
    interactive: Option<bool>,
    player: Option<String>,
}

// Trims surrounding whitespace; an empty element means "unset".
fn de_i32_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<i32>().map(Some).map_err(serde::de::Error::custom),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Overlay parsed values onto defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.log_level) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = non_empty(parsed.log_file).map(PathBuf::from);
    if let Some(ext) = non_empty(parsed.archive_extension) {
        cfg.archive_extension = ext;
    }
    if let Some(ext) = non_empty(parsed.source_extension) {
        cfg.source_extension = ext;
    }
    cfg.compression_level = parsed.compression_level;
    cfg.verify_magic = parsed.verify_magic.unwrap_or(false);
    cfg.parallel = parsed.parallel.unwrap_or(false);
    cfg.interactive = parsed.interactive.unwrap_or(false);
    if let Some(player) = non_empty(parsed.player) {
        cfg.player = player;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed)
}

/// Load the config file at the resolved location, if there is one.
/// Returns the config together with the path it came from.
pub fn load_config() -> Result<Option<(Config, PathBuf)>> {
    let path = default_config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok(Some((cfg, path)))
}

/// Write a commented template config to `path`. Refuses to overwrite or to
/// write beneath a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    let content = format!(
        "<!--\n  folder_ops configuration (XML)\n\n    log_level          -> quiet | normal | info | debug\n    log_file           -> path to a log file (optional; console output is kept)\n    archive_extension  -> extension for packed folders and relabelled archives\n    source_extension   -> extension of archives that `pack` relabels\n    compression_level  -> deflate level 0-9 (empty = library default)\n    verify_magic       -> only relabel files that start with a ZIP signature\n    parallel           -> process targets in different parent folders concurrently\n    interactive        -> wait for Enter before exiting\n    player             -> media player used by `play`\n\n  CLI flags override these values.\n-->\n<config>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <archive_extension>{}</archive_extension>\n  <source_extension>{}</source_extension>\n  <compression_level></compression_level>\n  <verify_magic>false</verify_magic>\n  <parallel>false</parallel>\n  <interactive>false</interactive>\n  <player>{}</player>\n</config>\n",
        ARCHIVE_EXTENSION_DEFAULT, SOURCE_EXTENSION_DEFAULT, PLAYER_DEFAULT
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    info!("Created template config at {}", path.display());
    Ok(())
}
