#![cfg(unix)]

use assert_fs::prelude::*;
use folder_ops::fs_ops::STAGING_SUFFIX;
use folder_ops::{BatchRunner, Config, Outcome, Tool, TransformError};
use std::fs::{self, File};
use std::io::Read;
use std::os::unix::fs::symlink;
use std::path::Path;

fn archive_names(archive: &Path) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    (0..zip.len()).map(|i| zip.by_index(i).unwrap().name().to_string()).collect()
}

fn dir_names(root: &Path) -> Vec<String> {
    fs::read_dir(root)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn symlinked_file_is_stored_by_content() {
    let root = assert_fs::TempDir::new().unwrap();
    root.child("outside.txt").write_str("shared text").unwrap();
    let book = root.child("book");
    book.child("01.png").write_binary(&[1]).unwrap();
    symlink("../outside.txt", book.child("link.txt").path()).unwrap();

    let config = Config::default();
    let report = BatchRunner::new(&config, Tool::Pack).run(&[book.path().to_path_buf()]);

    let result = &report.results()[0];
    assert!(result.is_success(), "{:?}", result.outcome);
    let archive = root.path().join("book.cbz");
    assert_eq!(archive_names(&archive), vec!["01.png", "link.txt"]);
    let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    let mut stored = String::new();
    zip.by_name("link.txt").unwrap().read_to_string(&mut stored).unwrap();
    assert_eq!(stored, "shared text");
    assert!(!book.path().exists());
    assert_eq!(fs::read_to_string(root.path().join("outside.txt")).unwrap(), "shared text");
}

#[test]
fn directory_symlink_keeps_the_source() {
    let root = assert_fs::TempDir::new().unwrap();
    root.child("elsewhere/x.png").write_binary(&[2]).unwrap();
    let book = root.child("book");
    book.child("01.png").write_binary(&[1]).unwrap();
    symlink("../elsewhere", book.child("more").path()).unwrap();

    let config = Config::default();
    let report = BatchRunner::new(&config, Tool::Pack).run(&[book.path().to_path_buf()]);

    match &report.results()[0].outcome {
        Outcome::Failed(TransformError::UnarchivableEntry { path, .. }) => {
            assert_eq!(path, &book.path().join("more"));
        }
        other => panic!("expected unarchivable entry failure, got {other:?}"),
    }
    assert_eq!(report.exit_code(), 1);
    assert!(book.child("01.png").path().exists());
    assert!(fs::symlink_metadata(book.child("more").path()).is_ok());
    assert!(!root.path().join("book.cbz").exists());
    assert!(!dir_names(root.path()).iter().any(|n| n.ends_with(STAGING_SUFFIX)));
}

#[test]
fn dangling_symlink_keeps_the_source() {
    let root = assert_fs::TempDir::new().unwrap();
    let book = root.child("book");
    book.child("01.png").write_binary(&[1]).unwrap();
    symlink("gone.png", book.child("02.png").path()).unwrap();

    let config = Config::default();
    let report = BatchRunner::new(&config, Tool::Pack).run(&[book.path().to_path_buf()]);

    assert!(matches!(
        report.results()[0].outcome,
        Outcome::Failed(TransformError::UnarchivableEntry { kind: "dangling symlink", .. })
    ));
    assert!(book.child("01.png").path().exists());
    assert!(fs::symlink_metadata(book.child("02.png").path()).is_ok());
    assert_eq!(dir_names(root.path()), vec!["book".to_string()]);
}
