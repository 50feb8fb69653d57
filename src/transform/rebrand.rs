//! Rebrand: give an existing archive the archive extension with a single
//! rename. Contents are never read beyond the optional signature check and
//! never re-encoded.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::errors::{TransformError, TransformResult};
use crate::fs_ops::{ensure_vacant, io_error_with_help, relabel};

use super::target::has_extension;
use super::Applied;

/// Local header, empty archive, and spanned archive markers.
const ZIP_SIGNATURES: [[u8; 4]; 3] = [*b"PK\x03\x04", *b"PK\x05\x06", *b"PK\x07\x08"];

/// Same stem, archive extension.
pub fn rebranded_path(src: &Path, archive_extension: &str) -> PathBuf {
    src.with_extension(archive_extension)
}

pub fn rebrand_archive(config: &Config, src: &Path) -> TransformResult<Applied> {
    let is_file = std::fs::symlink_metadata(src).is_ok_and(|m| m.file_type().is_file());
    if !is_file || !has_extension(src, &config.source_extension) {
        return Err(TransformError::NotAnArchiveFile(src.to_path_buf()));
    }
    if config.verify_magic && !has_zip_signature(src)? {
        return Err(TransformError::NotAnArchiveFile(src.to_path_buf()));
    }

    let dest = rebranded_path(src, &config.archive_extension);
    ensure_vacant(&dest)?;

    if config.dry_run {
        info!(src = %src.display(), dest = %dest.display(), "dry-run: would relabel archive");
        return Ok(Applied::at(dest));
    }

    relabel(src, &dest)?;
    info!(src = %src.display(), dest = %dest.display(), "Relabelled archive");
    Ok(Applied::at(dest))
}

fn has_zip_signature(path: &Path) -> TransformResult<bool> {
    let mut head = Vec::with_capacity(4);
    File::open(path)
        .and_then(|f| f.take(4).read_to_end(&mut head))
        .map_err(io_error_with_help("read archive signature", path))?;
    Ok(ZIP_SIGNATURES.iter().any(|sig| head == sig))
}
