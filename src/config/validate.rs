//! Config validation logic.

use anyhow::{bail, Result};
use tracing::debug;

use super::types::Config;

impl Config {
    /// Reject settings that would make transforms ambiguous or unsafe.
    pub fn validate(&self) -> Result<()> {
        check_extension(&self.archive_extension, "archive_extension")?;
        check_extension(&self.source_extension, "source_extension")?;
        if self
            .archive_extension
            .eq_ignore_ascii_case(&self.source_extension)
        {
            bail!(
                "archive_extension and source_extension must differ (both '{}')",
                self.archive_extension
            );
        }
        if let Some(level) = self.compression_level
            && !(0..=9).contains(&level)
        {
            bail!("compression_level must be between 0 and 9, got {level}");
        }
        if self.player.trim().is_empty() {
            bail!("player must not be empty");
        }
        debug!(
            archive_extension = %self.archive_extension,
            source_extension = %self.source_extension,
            dry_run = self.dry_run,
            parallel = self.parallel,
            "Config validated"
        );
        Ok(())
    }
}

fn check_extension(ext: &str, name: &str) -> Result<()> {
    if ext.is_empty() {
        bail!("{name} must not be empty");
    }
    if ext.contains(['.', '/', '\\']) || ext.chars().any(char::is_whitespace) {
        bail!("{name} must be a bare extension without dots, separators or spaces: '{ext}'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn dotted_extension_rejected() {
        let cfg = Config {
            archive_extension: ".cbz".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn same_extensions_rejected_case_insensitively() {
        let cfg = Config {
            archive_extension: "ZIP".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn compression_level_range_checked() {
        let cfg = Config {
            compression_level: Some(10),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = Config {
            compression_level: Some(0),
            ..Config::default()
        };
        cfg.validate().unwrap();
    }
}
