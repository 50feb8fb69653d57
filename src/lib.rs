//! Core library for `folder_ops`.
//!
//! Batch structural transforms over user-selected paths: flatten a directory
//! into its parent, pack a directory into a ZIP container, and relabel existing
//! ZIP archives. Each target is processed independently; a failure is recorded
//! and the batch moves on.

pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod launcher;
pub mod output;
pub mod platform;
pub mod shutdown;
pub mod transform;

pub use batch::{BatchReport, BatchRunner, OperationResult, Outcome};
pub use config::{default_config_path, default_log_path, path_has_symlink_ancestor, Config, LogLevel};
pub use errors::{TransformError, TransformResult};
pub use transform::Tool;
