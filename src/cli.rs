//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Every subcommand accepts paths exactly as a file manager passes them;
//!   stray quotes from shell/PowerShell quoting are stripped.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueHint};
use std::path::{Path, PathBuf};

use crate::config::types::{Config, LogLevel};
use crate::transform::Tool;

/// CLI wrapper for the folder_ops library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Batch folder tools: flatten into parent, pack into CBZ, play with mpv"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Dry-run: report planned changes but do not modify the filesystem.
    #[arg(
        long,
        global = true,
        help = "Show what would be done, but do not modify files/directories"
    )]
    pub dry_run: bool,

    /// Wait for Enter before exiting (for file-manager launches).
    #[arg(long, global = true, help = "Wait for Enter before exiting")]
    pub interactive: bool,

    /// Process targets in different parent directories concurrently.
    #[arg(long, global = true, help = "Process targets in different parent directories concurrently")]
    pub parallel: bool,

    /// Only relabel files that start with a ZIP signature.
    #[arg(long, global = true, help = "Only relabel archives whose content starts with a ZIP signature")]
    pub verify_magic: bool,

    /// Print where folder_ops will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by folder_ops and exit")]
    pub print_config: bool,

    /// Write a template config at the default location, then exit.
    #[arg(long, help = "Write a template config file and exit")]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move each folder's contents into its parent and remove the folder.
    Flatten {
        #[arg(value_name = "FOLDER", value_hint = ValueHint::DirPath)]
        targets: Vec<PathBuf>,
    },
    /// Pack each folder into an archive; relabel existing ZIP archives.
    Pack {
        #[arg(value_name = "TARGET", value_hint = ValueHint::AnyPath)]
        targets: Vec<PathBuf>,
    },
    /// Open every entry of a folder in the configured player.
    Play {
        #[arg(value_name = "FOLDER", value_hint = ValueHint::DirPath)]
        folder: Option<PathBuf>,
    },
}

impl Args {
    /// Batch tool and its sanitized targets, when the command is a batch command.
    pub fn batch(&self) -> Option<(Tool, Vec<PathBuf>)> {
        let (tool, targets) = match &self.command {
            Some(Command::Flatten { targets }) => (Tool::Flatten, targets),
            Some(Command::Pack { targets }) => (Tool::Pack, targets),
            _ => return None,
        };
        Some((tool, targets.iter().map(|p| sanitize_path(p)).collect()))
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.interactive {
            cfg.interactive = true;
        }
        if self.parallel {
            cfg.parallel = true;
        }
        if self.verify_magic {
            cfg.verify_magic = true;
        }
    }
}

/// Drop one pair of matching surrounding quotes left behind by Windows shells,
/// then one trailing separator. Whitespace and unpaired quotes are part of the name.
pub fn sanitize_path(p: &Path) -> PathBuf {
    let Some(s) = p.to_str() else {
        // Non-UTF-8 paths cannot carry shell quoting artifacts we know how to strip.
        return p.to_path_buf();
    };
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)))
        .unwrap_or(s);

    let mut inner = unquoted.to_string();
    if (inner.ends_with('\\') || inner.ends_with('/')) && inner.len() > 1 {
        inner.pop();
    }
    PathBuf::from(inner)
}

pub fn parse() -> Args {
    Args::parse()
}
