//! Typed error definitions for folder_ops.
//! Every per-target failure mode is one variant; the batch runner turns them
//! into Skipped/Failed outcomes instead of propagating them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::fs_ops::io_hint;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Not an archive file: {}", .0.display())]
    NotAnArchiveFile(PathBuf),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Invalid target {}: {reason}", .path.display())]
    InvalidTarget { path: PathBuf, reason: &'static str },

    #[error("Destination name already taken: {}", .0.display())]
    NameCollision(PathBuf),

    #[error("Permission denied on {}: {context}", .path.display())]
    PermissionDenied { path: PathBuf, context: String },

    #[error("Cannot move across filesystems: '{}' -> '{}'", .from.display(), .to.display())]
    CrossVolumeMove { from: PathBuf, to: PathBuf },

    #[error("{op} '{}': {source}{}", .path.display(), io_hint(.source))]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("{op} '{}': {source}", .path.display())]
    Archive {
        op: &'static str,
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Cannot store {} in an archive: {kind}; source left in place", .path.display())]
    UnarchivableEntry { path: PathBuf, kind: &'static str },

    #[error("Partially flattened {}: {moved} moved, {remaining} left in place ({source})", .dir.display())]
    PartialFlatten {
        dir: PathBuf,
        moved: usize,
        remaining: usize,
        source: Box<TransformError>,
    },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl TransformError {
    /// Stable identifier used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::NotADirectory(_) => "not_a_directory",
            TransformError::NotAnArchiveFile(_) => "not_an_archive_file",
            TransformError::DestinationExists(_) => "destination_exists",
            TransformError::InvalidTarget { .. } => "invalid_target",
            TransformError::NameCollision(_) => "name_collision",
            TransformError::PermissionDenied { .. } => "permission_denied",
            TransformError::CrossVolumeMove { .. } => "cross_volume_move",
            TransformError::Io { .. } | TransformError::Archive { .. } => "io_failure",
            TransformError::UnarchivableEntry { .. } => "unarchivable_entry",
            TransformError::PartialFlatten { .. } => "partial_flatten",
            TransformError::Interrupted => "interrupted",
        }
    }

    /// True for rejections raised before any filesystem change was attempted.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            TransformError::NotADirectory(_)
                | TransformError::NotAnArchiveFile(_)
                | TransformError::DestinationExists(_)
                | TransformError::InvalidTarget { .. }
        )
    }

    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        TransformError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(
        op: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        TransformError::Archive {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type TransformResult<T> = Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_skips() {
        assert!(TransformError::NotADirectory("/x".into()).is_skip());
        assert!(TransformError::DestinationExists("/x.cbz".into()).is_skip());
        assert!(!TransformError::NameCollision("/x".into()).is_skip());
        assert!(!TransformError::Interrupted.is_skip());
        assert!(!TransformError::UnarchivableEntry {
            path: "/x/link".into(),
            kind: "dangling symlink"
        }
        .is_skip());
    }

    #[test]
    fn partial_flatten_message_names_counts_and_cause() {
        let err = TransformError::PartialFlatten {
            dir: "/tmp/d".into(),
            moved: 2,
            remaining: 1,
            source: Box::new(TransformError::NameCollision("/tmp/d_a".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("2 moved"), "{msg}");
        assert!(msg.contains("1 left"), "{msg}");
        assert!(msg.contains("/tmp/d_a"), "{msg}");
        assert_eq!(err.code(), "partial_flatten");
    }
}
