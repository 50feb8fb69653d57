//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the interrupt handler,
//! then runs the selected batch (or `play`) and reports per-target outcomes.

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use folder_ops::cli::{sanitize_path, Args, Command};
use folder_ops::config::{create_template_config, load_config, CONFIG_ENV};
use folder_ops::launcher::{play_folder, ProcessLauncher};
use folder_ops::output as out;
use folder_ops::{default_config_path, shutdown, BatchRunner, Config};

use crate::logging::init_tracing;

/// Run the CLI application and return the process exit code.
pub fn run(args: Args) -> Result<i32> {
    // Config housekeeping happens before logging init
    if args.print_config {
        print_config_location();
        return Ok(0);
    }
    if args.init_config {
        let path = default_config_path()?;
        create_template_config(&path)?;
        out::print_success(&format!("A template folder_ops config was written to: {}", path.display()));
        out::print_info(&format!("Edit it, or point {CONFIG_ENV} at another file."));
        return Ok(0);
    }

    // Setup errors still honour the pause so a file-manager window stays readable.
    let mut interactive = args.interactive;
    let setup = effective_config(&args, &mut interactive).and_then(|cfg| {
        let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
            .context("Failed to initialize logging")?;
        Ok((cfg, guard))
    });
    let (cfg, guard_opt) = match setup {
        Ok(ready) => ready,
        Err(e) if interactive => {
            out::print_error(&format!("{e:#}"));
            out::pause_for_enter();
            return Ok(1);
        }
        Err(e) => return Err(e),
    };

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        if let Err(e) = ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing the current step and stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        }) {
            error!(error = %e, "failed to install interrupt handler");
        }
    }

    debug!(?args, "Starting folder_ops");

    let code = match &args.command {
        Some(Command::Play { folder }) => run_play(&cfg, folder.as_deref()),
        _ => run_batch(&cfg, &args),
    };

    if cfg.interactive {
        out::pause_for_enter();
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    Ok(code)
}

/// Defaults, then the config file, then CLI flags; validated.
fn effective_config(args: &Args, interactive: &mut bool) -> Result<Config> {
    let mut cfg = match load_config()? {
        Some((cfg, _path)) => cfg,
        None => Config::default(),
    };
    args.apply_overrides(&mut cfg);
    *interactive = cfg.interactive;
    cfg.validate()?;
    Ok(cfg)
}

fn run_batch(cfg: &Config, args: &Args) -> i32 {
    let Some((tool, targets)) = args.batch().filter(|(_, t)| !t.is_empty()) else {
        out::print_error("No targets given. Usage: folder_ops <flatten|pack> <PATH>...");
        return 1;
    };

    if cfg.dry_run {
        out::print_info("Dry-run: nothing will be changed");
    }
    let report = BatchRunner::new(cfg, tool).run_with_progress(&targets, out::print_result);
    out::print_summary(&report);
    report.exit_code()
}

fn run_play(cfg: &Config, folder: Option<&std::path::Path>) -> i32 {
    let folder = match folder {
        Some(f) => sanitize_path(f),
        None => match std::env::current_dir() {
            Ok(d) => d,
            Err(e) => {
                out::print_error(&format!("Cannot determine the current directory: {e}"));
                return 1;
            }
        },
    };
    match play_folder(&ProcessLauncher, &cfg.player, &folder) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            1
        }
    }
}

fn print_config_location() {
    if let Some(cfg_env) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit):\n  {}\n",
            std::path::Path::new(&cfg_env).display()
        ));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default folder_ops config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}
