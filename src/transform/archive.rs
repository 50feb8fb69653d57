//! Pack: write a directory tree into a ZIP container next to it, publish it
//! under its final name, then delete the source tree.
//!
//! The container is written to a hidden staging sibling first. Nothing is
//! visible under the final name until the single rename in `publish`, and the
//! source is only removed after that rename succeeded.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::Config;
use crate::errors::{TransformError, TransformResult};
use crate::fs_ops::{ensure_vacant, io_error_with_help, StagingArtifact};
use crate::shutdown;

use super::target::{is_real_dir, parent_and_name};
use super::Applied;

/// `<parent>/<name>.<ext>`; the extension is appended so dotted folder names keep their full name.
pub fn archive_path_for(parent: &Path, name: &OsStr, ext: &str) -> PathBuf {
    let mut file_name = name.to_os_string();
    file_name.push(".");
    file_name.push(ext);
    parent.join(file_name)
}

pub fn pack_dir(config: &Config, dir: &Path) -> TransformResult<Applied> {
    if !is_real_dir(dir) {
        return Err(TransformError::NotADirectory(dir.to_path_buf()));
    }
    let (parent, name) = parent_and_name(dir)?;
    let final_path = archive_path_for(&parent, &name, &config.archive_extension);
    ensure_vacant(&final_path)?;

    if config.dry_run {
        info!(src = %dir.display(), dest = %final_path.display(), "dry-run: would pack directory");
        return Ok(Applied::at(final_path));
    }

    let (staging, file) = StagingArtifact::create(&final_path)?;
    let entries = write_archive(config, dir, file, staging.path())?;
    let final_path = staging.publish()?;
    info!(src = %dir.display(), dest = %final_path.display(), entries, "Packed directory");

    let mut warnings = Vec::new();
    if let Err(e) = fs::remove_dir_all(dir) {
        let msg = format!(
            "archive published but source directory '{}' could not be removed: {e}",
            dir.display()
        );
        warn!(src = %dir.display(), error = %e, "source directory left behind");
        warnings.push(msg);
    }

    Ok(Applied {
        destination: final_path,
        moves: Vec::new(),
        warnings,
    })
}

/// Stream every file under `root` into a deflate ZIP on `file`.
/// Symlinks to regular files are stored by content; any entry the archive cannot
/// hold fails the whole pack so the source is never removed with it.
/// Returns the number of entries written; the file is synced before returning.
fn write_archive(
    config: &Config,
    root: &Path,
    file: File,
    staging_path: &Path,
) -> TransformResult<usize> {
    let mut zip = ZipWriter::new(file);
    let base = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(config.compression_level);
    let mut entries = 0usize;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        if shutdown::is_requested() {
            return Err(TransformError::Interrupted);
        }
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let path = entry.path();
        let rel = path.strip_prefix(root).map_err(|_| {
            TransformError::io(
                "compute entry name",
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "entry outside the packed directory"),
            )
        })?;
        let name = entry_name(rel).ok_or_else(|| {
            TransformError::io(
                "compute entry name",
                path,
                io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
            )
        })?;

        if entry.file_type().is_dir() {
            if dir_is_empty(path)? {
                zip.add_directory(name, base)
                    .map_err(|e| TransformError::archive("add directory entry", path, e))?;
                entries += 1;
            }
            continue;
        }

        let meta = file_to_store(&entry)?;
        zip.start_file(name, entry_options(base, &meta))
            .map_err(|e| TransformError::archive("start archive entry", path, e))?;
        let mut src = File::open(path).map_err(io_error_with_help("open source file", path))?;
        io::copy(&mut src, &mut zip).map_err(io_error_with_help("copy file into archive", path))?;
        debug!(entry = %rel.display(), bytes = meta.len(), "added");
        entries += 1;
    }

    let file = zip
        .finish()
        .map_err(|e| TransformError::archive("finish archive", staging_path, e))?;
    file.sync_all()
        .map_err(io_error_with_help("sync staging file", staging_path))?;
    Ok(entries)
}

/// Metadata of the regular file behind a non-directory entry.
fn file_to_store(entry: &walkdir::DirEntry) -> TransformResult<fs::Metadata> {
    let path = entry.path();
    let ftype = entry.file_type();
    if ftype.is_file() {
        return entry.metadata().map_err(|e| walk_error(path, e));
    }
    if !ftype.is_symlink() {
        return Err(unarchivable(path, "special file"));
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            debug!(path = %path.display(), "storing symlink target content");
            Ok(meta)
        }
        Ok(meta) if meta.is_dir() => Err(unarchivable(path, "symlink to a directory")),
        Ok(_) => Err(unarchivable(path, "symlink to a special file")),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(unarchivable(path, "dangling symlink")),
        Err(e) => Err(io_error_with_help("resolve symlink", path)(e)),
    }
}

fn unarchivable(path: &Path, kind: &'static str) -> TransformError {
    warn!(path = %path.display(), kind, "entry cannot be archived; keeping source");
    TransformError::UnarchivableEntry {
        path: path.to_path_buf(),
        kind,
    }
}

/// zip refuses to grow an entry past 4 GiB unless it was started as ZIP64.
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

fn entry_options(base: FileOptions, meta: &fs::Metadata) -> FileOptions {
    with_source_permissions(base.large_file(needs_zip64(meta.len())), meta)
}

/// Relative path joined with `/`, as ZIP readers expect on every platform.
fn entry_name(rel: &Path) -> Option<String> {
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn dir_is_empty(dir: &Path) -> TransformResult<bool> {
    let mut it = fs::read_dir(dir).map_err(io_error_with_help("read directory", dir))?;
    Ok(it.next().is_none())
}

#[cfg(unix)]
fn with_source_permissions(options: FileOptions, meta: &fs::Metadata) -> FileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn with_source_permissions(options: FileOptions, _meta: &fs::Metadata) -> FileOptions {
    options
}

fn walk_error(root: &Path, e: walkdir::Error) -> TransformError {
    let path = e.path().unwrap_or(root).to_path_buf();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    io_error_with_help("walk directory", &path)(source)
}
