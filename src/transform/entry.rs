use std::fs;
use tracing::debug;

use crate::config::Config;
use crate::errors::{TransformError, TransformResult};

use super::archive::pack_dir;
use super::flatten::flatten_dir;
use super::rebrand::rebrand_archive;
use super::target::{TargetKind, TransformTarget};
use super::{Applied, Tool};

/// Top-level dispatcher for one classified target.
/// - Flatten: directories only.
/// - Pack: directories are packed, source archives are relabelled.
pub fn apply_target(config: &Config, tool: Tool, target: &TransformTarget) -> TransformResult<Applied> {
    let path = target.path();
    debug!(path = %path.display(), ?tool, kind = ?target.kind(), "dispatch target");

    match (tool, target.kind()) {
        (Tool::Flatten, TargetKind::Directory) => flatten_dir(config, path),
        (Tool::Flatten, _) => Err(TransformError::NotADirectory(path.to_path_buf())),
        (Tool::Pack, TargetKind::Directory) => pack_dir(config, path),
        (Tool::Pack, TargetKind::ArchiveFile) => rebrand_archive(config, path),
        (Tool::Pack, TargetKind::Neither) => {
            let is_file = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_file());
            if is_file {
                Err(TransformError::NotAnArchiveFile(path.to_path_buf()))
            } else {
                Err(TransformError::NotADirectory(path.to_path_buf()))
            }
        }
    }
}
