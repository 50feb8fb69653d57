//! Filesystem primitives shared by the transforms.

mod atomic;
mod helpers;
mod resolve;
mod util;

pub use atomic::{StagingArtifact, publish, relabel, rename_noreplace};
pub use helpers::io_hint;
pub use resolve::resolve_name;
pub use util::STAGING_SUFFIX;

pub(crate) use atomic::ensure_vacant;
pub(crate) use helpers::{io_error_with_help, move_error_with_help};
