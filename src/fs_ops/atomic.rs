//! Atomic publish helpers.
//! - `rename_noreplace` never clobbers an existing destination.
//! - `publish` commits a staging artifact and deletes it if the commit fails.
//! - `relabel` is the same rename for a caller-owned file (never deleted).
//! - `StagingArtifact` is an RAII guard: dropped before publish, it removes the file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{TransformError, TransformResult};

use super::helpers::{io_error_with_help, move_error_with_help};
use super::util::{entry_exists, fsync_dir, staging_path_for};

/// Rename `src` to `dst`, failing with `AlreadyExists` instead of replacing `dst`.
///
/// Linux/glibc uses `renameat2(RENAME_NOREPLACE)`, which closes the window between
/// the existence check and the rename. Other platforms (and filesystems that reject
/// the flag) check for an entry immediately before a plain rename.
pub fn rename_noreplace(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    {
        match renameat2_noreplace(src, dst) {
            Ok(()) => return Ok(()),
            Err(e) if matches!(e.raw_os_error(), Some(libc::EINVAL) | Some(libc::ENOSYS)) => {
                debug!(error = %e, "renameat2 unsupported here; falling back to checked rename");
            }
            Err(e) => return Err(e),
        }
    }

    if entry_exists(dst) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination exists: {}", dst.display()),
        ));
    }
    fs::rename(src, dst)
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn renameat2_noreplace(src: &Path, dst: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let to_c = |p: &Path| {
        CString::new(p.as_os_str().as_bytes())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))
    };
    let c_src = to_c(src)?;
    let c_dst = to_c(dst)?;
    // SAFETY: both pointers come from live CStrings; AT_FDCWD resolves relative paths
    // against the working directory exactly like rename(2).
    let rc = unsafe {
        libc::renameat2(
            libc::AT_FDCWD,
            c_src.as_ptr(),
            libc::AT_FDCWD,
            c_dst.as_ptr(),
            libc::RENAME_NOREPLACE,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Commit `staging` as `final_path` with a single rename.
/// On failure the staging file is deleted before the error is returned.
pub fn publish(staging: &Path, final_path: &Path) -> TransformResult<()> {
    if let Err(e) = rename_noreplace(staging, final_path) {
        let err = move_error_with_help(staging, final_path)(e);
        if let Err(rm) = fs::remove_file(staging)
            && rm.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %staging.display(), error = %rm, "failed to discard staging artifact");
        }
        return Err(err);
    }

    #[cfg(unix)]
    if let Some(parent) = final_path.parent() {
        // A failed directory fsync must not turn a visible rename into a failure.
        let _ = fsync_dir(parent);
    }

    info!(staging = %staging.display(), dest = %final_path.display(), "Published artifact");
    Ok(())
}

/// Rename a complete, caller-owned file to `final_path`. The source is left alone on failure.
pub fn relabel(src: &Path, final_path: &Path) -> TransformResult<()> {
    rename_noreplace(src, final_path).map_err(move_error_with_help(src, final_path))?;
    #[cfg(unix)]
    if let Some(parent) = final_path.parent() {
        let _ = fsync_dir(parent);
    }
    Ok(())
}

/// A file written under a temporary sibling name until it is published.
#[derive(Debug)]
pub struct StagingArtifact {
    path: PathBuf,
    final_path: PathBuf,
    settled: bool,
}

impl StagingArtifact {
    /// Exclusively create the staging file for `final_path` and hand back its writer.
    pub fn create(final_path: &Path) -> TransformResult<(Self, File)> {
        let path = staging_path_for(final_path);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(io_error_with_help("create staging file", &path))?;
        debug!(staging = %path.display(), dest = %final_path.display(), "created staging artifact");
        Ok((
            Self {
                path,
                final_path: final_path.to_path_buf(),
                settled: false,
            },
            file,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Rename into place. Either way the staging name is gone afterwards.
    pub fn publish(mut self) -> TransformResult<PathBuf> {
        self.settled = true;
        publish(&self.path, &self.final_path)?;
        Ok(self.final_path.clone())
    }
}

impl Drop for StagingArtifact {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(staging = %self.path.display(), "discarded staging artifact"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(staging = %self.path.display(), error = %e, "failed to discard staging artifact"),
        }
    }
}

/// `DestinationExists` when anything already occupies `path`.
pub(crate) fn ensure_vacant(path: &Path) -> TransformResult<()> {
    if entry_exists(path) {
        Err(TransformError::DestinationExists(path.to_path_buf()))
    } else {
        Ok(())
    }
}
