//! Colored progress lines, warnings, and summary formatting.
//!
//! Progress goes to stdout, one line per phase, so the external tools'
//! own output interleaves with it in order. Warnings and fatal diagnostics
//! go to stderr.

use crate::config::Config;
use crate::constants::DRY_RUN_PREFIX;
use crate::error::Error;
use crate::repo::{Phase, Repository, SyncCallbacks, SyncReport};
use colored::Colorize;
use std::fmt;
use std::io::IsTerminal;
use std::path::Path;

/// No-op callbacks for when progress output is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl SyncCallbacks for NoOpCallbacks {}

/// Prints each phase as it starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleCallbacks;

impl SyncCallbacks for ConsoleCallbacks {
    fn on_phase(&self, repo: &Repository, phase: Phase, config: &Config) {
        if config.is_quiet() {
            return;
        }
        println!("{}", colored_phase_line(repo, phase, config.dry_run));
    }

    fn on_phase_error(&self, repo: &Repository, phase: Phase, error: &Error) {
        eprintln!(
            "{} {} {}: {}",
            "warning:".yellow().bold(),
            phase_verb(phase).to_lowercase(),
            repo.display_name(),
            error
        );
    }
}

/// Uncolored progress line for a phase.
pub fn format_phase_line(repo: &Repository, phase: Phase, dry_run: bool) -> String {
    let prefix: &dyn fmt::Display = &DRY_RUN_PREFIX;
    compose_line(dry_run.then_some(prefix), &phase_verb(phase), &repo.display_name())
}

fn colored_phase_line(repo: &Repository, phase: Phase, dry_run: bool) -> String {
    let prefix = DRY_RUN_PREFIX.yellow();
    let verb = match phase {
        Phase::Fetch => phase_verb(phase).cyan().bold(),
        Phase::Update => phase_verb(phase).green().bold(),
    };
    let name = repo.display_name().white().bold();
    compose_line(dry_run.then_some(&prefix as &dyn fmt::Display), &verb, &name)
}

fn compose_line(
    prefix: Option<&dyn fmt::Display>,
    verb: &dyn fmt::Display,
    name: &dyn fmt::Display,
) -> String {
    match prefix {
        Some(prefix) => format!("{} {} {}", prefix, verb, name),
        None => format!("{} {}", verb, name),
    }
}

fn phase_verb(phase: Phase) -> &'static str {
    match phase {
        Phase::Fetch => "Fetching",
        Phase::Update => "Pulling",
    }
}

/// Disables colors unless stdout is an interactive terminal.
pub fn init_colors() {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

pub fn print_config_path(path: &Path, config: &Config) {
    if !config.is_verbose() {
        return;
    }
    println!(
        "{} {}",
        "Configuration:".cyan(),
        path.display().to_string().white().bold()
    );
}

/// Reports entries that were dropped because their path is missing.
pub fn print_skipped(skipped: &[Error]) {
    for err in skipped {
        eprintln!("{} skipping entry: {}", "warning:".yellow().bold(), err);
    }
}

/// Prints a fatal diagnostic with its whole context chain on one line.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), err);
}

pub fn print_summary(report: &SyncReport, config: &Config) {
    if config.is_quiet() {
        return;
    }
    if report.repositories == 0 {
        println!("{}", "No repositories configured".yellow().bold());
        return;
    }
    println!("{}", format_summary(report, config).dimmed());
}

fn format_summary(report: &SyncReport, config: &Config) -> String {
    let noun = if report.repositories == 1 {
        "repository"
    } else {
        "repositories"
    };
    let mut summary = format!("{} {} processed", report.repositories, noun);
    if config.dry_run {
        summary.push_str(" (dry run, no commands executed)");
    } else {
        summary.push_str(&format!(", {} commands run", report.commands_run));
    }
    if report.phase_errors > 0 {
        summary.push_str(&format!(", {} phases failed to start", report.phase_errors));
    }
    summary
}
