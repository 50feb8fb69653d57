//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FOLDER_OPS_CONFIG";

pub const ARCHIVE_EXTENSION_DEFAULT: &str = "cbz";
pub const SOURCE_EXTENSION_DEFAULT: &str = "zip";
pub const PLAYER_DEFAULT: &str = "mpv";
