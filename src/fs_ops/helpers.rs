//! I/O helper utilities.
//!
//! Turns raw io::Error values into `TransformError`s with actionable hints.
//!
//! Usage:
//!   fs::remove_dir(dir).map_err(io_error_with_help("remove directory", dir))?;
//!   fs::rename(a, b).map_err(move_error_with_help(a, b))?;

use std::io;
use std::path::Path;

use crate::errors::TransformError;

use super::util::is_cross_device;

/// Platform-aware hint appended to io error messages (empty when nothing useful applies).
pub fn io_hint(e: &io::Error) -> String {
    let hint: Option<&str> = match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
            libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
            libc::EBUSY => Some("resource busy; ensure no other process is using it"),
            libc::ENOENT => Some("path not found; verify it exists"),
            libc::EEXIST => Some("already exists; remove or rename the existing entry"),
            libc::ENOTEMPTY => Some("directory not empty; new entries appeared while processing"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem; cannot write here"),
            libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments"),
            libc::EMFILE | libc::ENFILE => Some("too many open files"),
            _ => None,
        },
        #[cfg(windows)]
        Some(code) => match code {
            5 => Some("access denied; check permissions"),
            17 => Some("not same device; cross-filesystem move"),
            32 => Some("sharing violation; file is in use"),
            2 | 3 => Some("path not found; verify it exists"),
            80 | 183 => Some("already exists; remove or rename the existing entry"),
            112 => Some("insufficient disk space"),
            145 => Some("directory not empty; new entries appeared while processing"),
            206 => Some("filename or path too long"),
            _ => None,
        },
        #[cfg(not(any(unix, windows)))]
        Some(_) => None,
        None => match e.kind() {
            io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
            io::ErrorKind::NotFound => Some("path not found; verify it exists"),
            io::ErrorKind::AlreadyExists => Some("already exists; remove or rename the existing entry"),
            _ => None,
        },
    };
    hint.map(|h| format!(" ({h})")).unwrap_or_default()
}

/// Map an io::Error from a single-path operation into the error taxonomy.
pub(crate) fn classify_io(op: &'static str, path: &Path, e: io::Error) -> TransformError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => TransformError::PermissionDenied {
            path: path.to_path_buf(),
            context: format!("{op}: {e}"),
        },
        _ => TransformError::io(op, path, e),
    }
}

/// Adapter for `.map_err(...)` on single-path operations.
pub(crate) fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> TransformError + 'a {
    move |e| classify_io(op, path, e)
}

/// Adapter for `.map_err(...)` on renames; distinguishes collisions and EXDEV.
pub(crate) fn move_error_with_help<'a>(
    from: &'a Path,
    to: &'a Path,
) -> impl FnOnce(io::Error) -> TransformError + 'a {
    move |e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            TransformError::NameCollision(to.to_path_buf())
        } else if is_cross_device(&e) {
            TransformError::CrossVolumeMove {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            }
        } else {
            classify_io("rename", from, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_maps_to_name_collision() {
        let e = io::Error::from(io::ErrorKind::AlreadyExists);
        let err = move_error_with_help(Path::new("/a"), Path::new("/b"))(e);
        assert!(matches!(err, TransformError::NameCollision(p) if p == Path::new("/b")));
    }

    #[test]
    fn permission_maps_to_permission_denied() {
        let e = io::Error::from(io::ErrorKind::PermissionDenied);
        let err = io_error_with_help("remove directory", Path::new("/a"))(e);
        assert_eq!(err.code(), "permission_denied");
    }

    #[cfg(unix)]
    #[test]
    fn exdev_maps_to_cross_volume() {
        let e = io::Error::from_raw_os_error(libc::EXDEV);
        let err = move_error_with_help(Path::new("/a"), Path::new("/mnt/b"))(e);
        assert_eq!(err.code(), "cross_volume_move");
        assert!(io_hint(&io::Error::from_raw_os_error(libc::EXDEV)).contains("cross-filesystem"));
    }
}
