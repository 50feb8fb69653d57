//! Target classification.
//! Kinds are discovered from the filesystem at dispatch time, never trusted from
//! argument parsing, and symlinks are not followed.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{TransformError, TransformResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Directory,
    /// Regular file carrying the source archive extension.
    ArchiveFile,
    Neither,
}

/// A path plus the kind it had when it was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTarget {
    path: PathBuf,
    kind: TargetKind,
}

impl TransformTarget {
    pub fn classify(path: &Path, source_extension: &str) -> Self {
        let path = normalize(path);
        let kind = match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_dir() => TargetKind::Directory,
            Ok(meta) if meta.file_type().is_file() && has_extension(&path, source_extension) => {
                TargetKind::ArchiveFile
            }
            _ => TargetKind::Neither,
        };
        debug!(path = %path.display(), ?kind, "classified target");
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }
}

/// Give paths like `.` or `a/..` a real final component so they have a name and parent.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    if path.file_name().is_some() {
        return path.to_path_buf();
    }
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Case-insensitive extension match.
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// The directory a target's results land in, and the target's own name.
pub(crate) fn parent_and_name(path: &Path) -> TransformResult<(PathBuf, OsString)> {
    let name = path.file_name().ok_or_else(|| TransformError::InvalidTarget {
        path: path.to_path_buf(),
        reason: "path has no final component",
    })?;
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
        Some(p) => p.to_path_buf(),
        None => {
            return Err(TransformError::InvalidTarget {
                path: path.to_path_buf(),
                reason: "path has no parent directory",
            });
        }
    };
    Ok((parent, name.to_os_string()))
}

/// True when `path` is a directory itself, not a symlink to one.
pub(crate) fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_dir())
}
