//! Conflict resolution for entries moved into a shared directory.
//!
//! Policy: keep the natural name when it is free, otherwise prefix it with the
//! label of the directory it came from (`<label>_<name>`). There is exactly one
//! level of disambiguation; a collision on the prefixed name is left for the
//! no-replace rename to refuse.
//!
//! Notes:
//! - The decision reflects filesystem state at call time only. Callers that
//!   share a destination directory must not resolve concurrently.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::debug;

use super::util::entry_exists;

/// Pick the name `name` should take inside `dest_dir`.
pub fn resolve_name(dest_dir: &Path, name: &OsStr, source_label: &OsStr) -> OsString {
    if !entry_exists(&dest_dir.join(name)) {
        return name.to_os_string();
    }
    let mut prefixed = OsString::with_capacity(source_label.len() + 1 + name.len());
    prefixed.push(source_label);
    prefixed.push("_");
    prefixed.push(name);
    debug!(
        dir = %dest_dir.display(),
        name = ?name,
        renamed = ?prefixed,
        "name taken; prefixing with source label"
    );
    prefixed
}
