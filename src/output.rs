use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

use crate::batch::{BatchReport, OperationResult, Outcome};

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix). Use this for primary outputs
/// that users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// One status line per target, plus its secondary warnings.
pub fn print_result(result: &OperationResult) {
    let target = result.target.display();
    match &result.outcome {
        Outcome::Success => {
            let verb = if result.dry_run { "would produce" } else { "->" };
            match &result.destination {
                Some(dest) => print_success(&format!("{target} {verb} {}", dest.display())),
                None => print_success(&target.to_string()),
            }
            for m in &result.moves {
                if result.dry_run || m.from.file_name() != m.to.file_name() {
                    print_user(&format!("  {} -> {}", m.from.display(), m.to.display()));
                }
            }
        }
        Outcome::Skipped(e) => print_warn(&format!("skipped {target}: {e}")),
        Outcome::Failed(e) => print_error(&format!("failed {target}: {e}")),
    }
    for w in &result.warnings {
        print_warn(w);
    }
}

/// Final two-number tally.
pub fn print_summary(report: &BatchReport) {
    print_user(&format!(
        "\nDone: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    ));
}

/// Block until the user presses Enter (used when launched from a file manager).
pub fn pause_for_enter() {
    print!("Press Enter to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
