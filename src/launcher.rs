//! External program launching for `play`.
//!
//! The media player is reached only through the [`Launcher`] capability so the
//! rest of the crate never depends on a specific executable, and tests can
//! substitute a recorder.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::info;

pub trait Launcher {
    /// Run `command` with `args` from `cwd`, wait for it, and return its exit code.
    fn launch(&self, command: &str, args: &[OsString], cwd: &Path) -> Result<i32>;
}

/// Spawns a real child process with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &str, args: &[OsString], cwd: &Path) -> Result<i32> {
        let status = match Command::new(command).args(args).current_dir(cwd).status() {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                bail!("'{command}' was not found on PATH; install it or set <player> in the config")
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to start '{command}'"));
            }
        };
        // Killed by a signal: no code to report.
        Ok(status.code().unwrap_or(-1))
    }
}

/// Non-hidden direct entries of `folder`, sorted by name.
pub fn playlist(folder: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(folder).with_context(|| format!("read folder '{}'", folder.display()))? {
        let name = entry
            .with_context(|| format!("read entry in '{}'", folder.display()))?
            .file_name();
        if !name.to_string_lossy().starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Hand every entry of `folder` to `player`, running from inside the folder.
pub fn play_folder(launcher: &dyn Launcher, player: &str, folder: &Path) -> Result<i32> {
    if !folder.is_dir() {
        bail!("Not a directory: {}", folder.display());
    }
    let entries = playlist(folder)?;
    if entries.is_empty() {
        bail!("Nothing to play in {}", folder.display());
    }
    info!(folder = %folder.display(), player, count = entries.len(), "Launching player");
    launcher.launch(player, &entries, folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, Vec<OsString>, PathBuf)>>,
    }

    impl Launcher for Recorder {
        fn launch(&self, command: &str, args: &[OsString], cwd: &Path) -> Result<i32> {
            self.calls
                .borrow_mut()
                .push((command.to_string(), args.to_vec(), cwd.to_path_buf()));
            Ok(3)
        }
    }

    #[test]
    fn passes_sorted_visible_entries() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("b.mkv").touch().unwrap();
        dir.child("a.mkv").touch().unwrap();
        dir.child(".hidden").touch().unwrap();
        dir.child("extras").create_dir_all().unwrap();

        let rec = Recorder::default();
        let code = play_folder(&rec, "mpv", dir.path()).unwrap();

        assert_eq!(code, 3);
        let calls = rec.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (cmd, args, cwd) = &calls[0];
        assert_eq!(cmd, "mpv");
        assert_eq!(
            args,
            &vec![OsString::from("a.mkv"), OsString::from("b.mkv"), OsString::from("extras")]
        );
        assert_eq!(cwd, dir.path());
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let rec = Recorder::default();
        assert!(play_folder(&rec, "mpv", dir.path()).is_err());
        assert!(rec.calls.borrow().is_empty());
    }

    #[test]
    fn missing_player_is_reported() {
        let dir = assert_fs::TempDir::new().unwrap();
        let err = ProcessLauncher
            .launch("folder-ops-no-such-player", &[], dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("not found on PATH"), "{err}");
    }
}
