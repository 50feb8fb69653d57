#![cfg(unix)]

use assert_fs::prelude::*;
use folder_ops::fs_ops::STAGING_SUFFIX;
use folder_ops::{BatchRunner, Config, Outcome, Tool, TransformError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

fn set_mode(p: &Path, mode: u32) {
    fs::set_permissions(p, fs::Permissions::from_mode(mode)).unwrap();
}

#[test]
fn unwritable_parent_fails_without_leftovers() {
    if running_as_root() {
        eprintln!("skipping: root ignores directory permissions");
        return;
    }
    let root = assert_fs::TempDir::new().unwrap();
    let parent = root.child("locked");
    parent.child("book/01.png").write_binary(&[9, 9]).unwrap();
    set_mode(parent.path(), 0o555);

    let config = Config::default();
    let report = BatchRunner::new(&config, Tool::Pack).run(&[parent.path().join("book")]);

    let entries: Vec<String> = fs::read_dir(parent.path())
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    set_mode(parent.path(), 0o755);

    assert!(matches!(
        report.results()[0].outcome,
        Outcome::Failed(TransformError::PermissionDenied { .. })
    ));
    assert_eq!(entries, vec!["book".to_string()]);
    assert!(!entries.iter().any(|n| n.ends_with(STAGING_SUFFIX)));
    assert_eq!(fs::read(parent.path().join("book/01.png")).unwrap(), vec![9, 9]);
}

#[test]
fn undeletable_source_is_a_warning_not_a_failure() {
    if running_as_root() {
        eprintln!("skipping: root ignores directory permissions");
        return;
    }
    let root = assert_fs::TempDir::new().unwrap();
    let book = root.child("book");
    book.child("sealed/page.png").write_str("p").unwrap();
    set_mode(book.child("sealed").path(), 0o555);

    let config = Config::default();
    let report = BatchRunner::new(&config, Tool::Pack).run(&[book.path().to_path_buf()]);
    set_mode(book.child("sealed").path(), 0o755);

    let result = &report.results()[0];
    assert!(result.is_success(), "{:?}", result.outcome);
    assert_eq!(result.warnings.len(), 1);
    assert!(root.path().join("book.cbz").is_file());
}
