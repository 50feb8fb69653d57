use clap::Parser;
use folder_ops::cli::{Args, Command};
use folder_ops::config::types::{Config, LogLevel};
use folder_ops::Tool;
use std::path::PathBuf;

#[test]
fn pack_collects_every_target_in_order() {
    let args = Args::parse_from(["folder_ops", "pack", "/b/one", "/b/two.zip", "/b/three"]);
    let (tool, targets) = args.batch().unwrap();
    assert_eq!(tool, Tool::Pack);
    assert_eq!(
        targets,
        vec![PathBuf::from("/b/one"), PathBuf::from("/b/two.zip"), PathBuf::from("/b/three")]
    );
}

#[test]
fn flatten_strips_shell_quotes() {
    let args = Args::parse_from(["folder_ops", "flatten", "'/srv/My Folder/'"]);
    let (tool, targets) = args.batch().unwrap();
    assert_eq!(tool, Tool::Flatten);
    assert_eq!(targets, vec![PathBuf::from("/srv/My Folder")]);
}

#[test]
fn flatten_without_targets_parses_to_empty_list() {
    let args = Args::parse_from(["folder_ops", "flatten"]);
    let (_, targets) = args.batch().unwrap();
    assert!(targets.is_empty());
}

#[test]
fn play_folder_is_optional() {
    let args = Args::parse_from(["folder_ops", "play"]);
    assert!(matches!(args.command, Some(Command::Play { folder: None })));
}

#[test]
fn effective_log_level_precedence() {
    let args = Args::parse_from(["folder_ops", "--debug", "--log-level", "quiet"]);
    assert_eq!(args.effective_log_level().unwrap(), LogLevel::Debug);

    let args = Args::parse_from(["folder_ops", "--log-level", "info"]);
    assert_eq!(args.effective_log_level().unwrap(), LogLevel::Info);
}

#[test]
fn global_flags_apply_after_subcommand() {
    let args = Args::parse_from([
        "folder_ops",
        "pack",
        "/x",
        "--dry-run",
        "--parallel",
        "--verify-magic",
        "--interactive",
    ]);
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);
    assert!(cfg.dry_run);
    assert!(cfg.parallel);
    assert!(cfg.verify_magic);
    assert!(cfg.interactive);
}

#[test]
fn unset_flags_leave_config_alone() {
    let args = Args::parse_from(["folder_ops", "pack", "/x"]);
    let mut cfg = Config {
        parallel: true,
        log_level: LogLevel::Quiet,
        ..Config::default()
    };
    args.apply_overrides(&mut cfg);
    assert!(cfg.parallel);
    assert_eq!(cfg.log_level, LogLevel::Quiet);
}

#[test]
fn trailing_space_in_target_name_is_preserved() {
    let args = Args::parse_from(["folder_ops", "flatten", "/srv/Vol 1 "]);
    let (_, targets) = args.batch().unwrap();
    assert_eq!(targets, vec![PathBuf::from("/srv/Vol 1 ")]);
}
