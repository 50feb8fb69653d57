//! Structural transforms applied to a single target.
//!
//! Each transform validates first, then commits, and reports what it did
//! through [`Applied`]. Errors are returned as [`TransformError`](crate::errors::TransformError)
//! so the batch runner can record them without aborting.

mod archive;
mod entry;
mod flatten;
mod rebrand;
mod target;

pub use archive::{archive_path_for, pack_dir};
pub use entry::apply_target;
pub use flatten::flatten_dir;
pub use rebrand::{rebrand_archive, rebranded_path};
pub use target::{TargetKind, TransformTarget};

pub(crate) use target::normalize;

use std::path::PathBuf;

/// Which tool a batch runs; decides what directories are turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Move a directory's children into its parent, then remove it.
    Flatten,
    /// Pack directories into archives and relabel existing source archives.
    Pack,
}

/// One child moved (or planned to move) out of a flattened directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Result of a transform that committed (or, in dry-run, would commit).
#[derive(Debug, Clone, Default)]
pub struct Applied {
    /// Final artifact path, or the parent directory for a flatten.
    pub destination: PathBuf,
    /// Moves in the order they were performed (flatten only).
    pub moves: Vec<PlannedMove>,
    /// Secondary problems that did not undo the transform.
    pub warnings: Vec<String>,
}

impl Applied {
    pub(crate) fn at(destination: PathBuf) -> Self {
        Self {
            destination,
            ..Self::default()
        }
    }
}
