//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ARCHIVE_EXTENSION_DEFAULT, PLAYER_DEFAULT, SOURCE_EXTENSION_DEFAULT};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration shared by every transform.
#[derive(Debug, Clone)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, report planned changes but do not modify the filesystem
    pub dry_run: bool,
    /// If true, wait for Enter before exiting (launched from a file manager)
    pub interactive: bool,
    /// If true, targets with different parent directories run concurrently
    pub parallel: bool,
    /// Extension given to packed directories and relabelled archives
    pub archive_extension: String,
    /// Extension of existing archives that get relabelled
    pub source_extension: String,
    /// Deflate level 0-9; None uses the library default
    pub compression_level: Option<i32>,
    /// If true, relabel only files that start with a ZIP signature
    pub verify_magic: bool,
    /// Executable used by `play`
    pub player: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            interactive: false,
            parallel: false,
            archive_extension: ARCHIVE_EXTENSION_DEFAULT.to_string(),
            source_extension: SOURCE_EXTENSION_DEFAULT.to_string(),
            compression_level: None,
            verify_magic: false,
            player: PLAYER_DEFAULT.to_string(),
        }
    }
}
