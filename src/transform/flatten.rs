//! Flatten: move every direct child of a directory into its parent, then
//! remove the emptied directory.
//!
//! Each child is committed with its own no-replace rename. The directory as a
//! whole is not transactional: a failure mid-loop leaves already-moved
//! children in the parent and the source directory in place. Remaining work is
//! always re-derived from disk, so running again after fixing the cause
//! finishes the job.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{TransformError, TransformResult};
use crate::fs_ops::{io_error_with_help, move_error_with_help, rename_noreplace, resolve_name};
use crate::shutdown;

use super::target::{is_real_dir, parent_and_name};
use super::{Applied, PlannedMove};

pub fn flatten_dir(config: &Config, dir: &Path) -> TransformResult<Applied> {
    if !is_real_dir(dir) {
        return Err(TransformError::NotADirectory(dir.to_path_buf()));
    }
    let (parent, label) = parent_and_name(dir)?;
    let children = list_children(dir)?;

    if children.is_empty() {
        if config.dry_run {
            info!(dir = %dir.display(), "dry-run: would remove empty directory");
        } else {
            fs::remove_dir(dir).map_err(io_error_with_help("remove empty directory", dir))?;
            info!(dir = %dir.display(), "Removed empty directory");
        }
        return Ok(Applied::at(parent));
    }

    let total = children.len();
    let mut moves = Vec::with_capacity(total);
    for name in &children {
        if shutdown::is_requested() {
            return Err(stopped(dir, moves.len(), total, TransformError::Interrupted));
        }

        let final_name = resolve_name(&parent, name, &label);
        let from = dir.join(name);
        let to = parent.join(&final_name);

        if config.dry_run {
            info!(from = %from.display(), to = %to.display(), "dry-run: would move");
            moves.push(PlannedMove { from, to });
            continue;
        }

        if let Err(e) = rename_noreplace(&from, &to).map_err(move_error_with_help(&from, &to)) {
            warn!(from = %from.display(), to = %to.display(), error = %e, "move failed; stopping flatten");
            return Err(stopped(dir, moves.len(), total, e));
        }
        debug!(from = %from.display(), to = %to.display(), "moved");
        moves.push(PlannedMove { from, to });
    }

    if !config.dry_run {
        remove_emptied(dir)?;
        info!(dir = %dir.display(), moved = moves.len(), "Flattened directory");
    }

    Ok(Applied {
        destination: parent,
        moves,
        warnings: Vec::new(),
    })
}

/// Direct children, sorted by name so the move order is reproducible.
fn list_children(dir: &Path) -> TransformResult<Vec<OsString>> {
    let mut names = fs::read_dir(dir)
        .map_err(io_error_with_help("read directory", dir))?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error_with_help("read directory entry", dir))?;
    names.sort();
    Ok(names)
}

/// Last step: the children are all in the parent, so the directory should be empty.
/// Anything that appeared meanwhile makes this fail; a re-run moves it and retries.
fn remove_emptied(dir: &Path) -> TransformResult<()> {
    fs::remove_dir(dir).map_err(io_error_with_help("remove flattened directory", dir))
}

fn stopped(dir: &Path, moved: usize, total: usize, cause: TransformError) -> TransformError {
    if moved == 0 {
        cause
    } else {
        TransformError::PartialFlatten {
            dir: dir.to_path_buf(),
            moved,
            remaining: total - moved,
            source: Box::new(cause),
        }
    }
}
