// Separate test binary: the shutdown flag is process-wide and every test here sets it.

use assert_fs::prelude::*;
use folder_ops::{shutdown, BatchRunner, Config, Outcome, Tool, TransformError};

#[test]
fn interrupt_stops_before_any_target_starts() {
    let root = assert_fs::TempDir::new().unwrap();
    root.child("a/1.txt").write_str("1").unwrap();
    root.child("b/2.txt").write_str("2").unwrap();
    let targets = vec![root.path().join("a"), root.path().join("b")];

    shutdown::request();
    let config = Config::default();
    let report = BatchRunner::new(&config, Tool::Pack).run(&targets);

    assert_eq!(report.results().len(), 2);
    assert!(report.results().iter().all(|r| matches!(
        r.outcome,
        Outcome::Skipped(TransformError::Interrupted)
    )));
    assert_eq!(report.exit_code(), 1);
    assert!(root.child("a/1.txt").path().exists());
    assert!(root.child("b/2.txt").path().exists());
    assert!(!root.path().join("a.cbz").exists());
}

#[test]
fn interrupted_pack_discards_its_staging_file() {
    let root = assert_fs::TempDir::new().unwrap();
    let book = root.child("book");
    book.child("01.png").write_str("p").unwrap();

    shutdown::request();
    let err = folder_ops::transform::pack_dir(&Config::default(), book.path()).unwrap_err();

    assert!(matches!(err, TransformError::Interrupted));
    assert!(!err.is_skip());
    let names: Vec<_> = std::fs::read_dir(root.path())
        .unwrap()
        .flatten()
        .map(|e| e.file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("book")]);
    assert!(book.child("01.png").path().exists());
}
