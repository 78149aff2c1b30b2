//! Test infrastructure for repo-sync integration tests.

#![allow(dead_code)]

use anyhow::Result;
use repo_sync::command::{CommandLine, CommandRunner};
use repo_sync::config::Config;
use repo_sync::condition::Environment;
use repo_sync::error::Error;
use repo_sync::repo::{Phase, Repository, SyncCallbacks};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary home directory holding working-copy directories.
/// Automatically cleaned up when dropped.
pub struct TestHome {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestHome {
    /// Creates a home with one empty directory per name.
    pub fn with_dirs(names: &[&str]) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().canonicalize()?;
        for name in names {
            std::fs::create_dir_all(path.join(name))?;
        }
        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    /// Writes the configuration file at its default location.
    pub fn write_config(&self, text: &str) -> Result<PathBuf> {
        let config = self.path.join(".repos.toml");
        std::fs::write(&config, text)?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Records every command together with the directory it ran in.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: RefCell<Vec<(PathBuf, String)>>,
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandLine) {
        let cwd = std::env::current_dir()
            .and_then(|p| p.canonicalize())
            .unwrap_or_default();
        self.calls.borrow_mut().push((cwd, command.to_string()));
    }
}

impl RecordingRunner {
    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(_, c)| c.clone()).collect()
    }
}

/// Records announced phases as plain progress lines.
#[derive(Default)]
pub struct RecordingCallbacks {
    pub lines: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
}

impl SyncCallbacks for RecordingCallbacks {
    fn on_phase(&self, repo: &Repository, phase: Phase, config: &Config) {
        self.lines
            .borrow_mut()
            .push(repo_sync::output::format_phase_line(repo, phase, config.dry_run));
    }

    fn on_phase_error(&self, repo: &Repository, phase: Phase, error: &Error) {
        self.errors
            .borrow_mut()
            .push(format!("{:?} {}: {}", phase, repo.display_name(), error));
    }
}

/// Environment with fixed facts, independent of the machine running tests.
pub struct FixedEnvironment {
    pub hostname: &'static str,
}

impl Environment for FixedEnvironment {
    fn hostname(&self) -> Option<String> {
        Some(self.hostname.to_string())
    }

    fn os(&self) -> &str {
        "linux"
    }

    fn var(&self, _name: &str) -> Option<String> {
        None
    }

    fn has_command(&self, name: &str) -> bool {
        name == "git"
    }
}

pub fn cwd() -> PathBuf {
    std::env::current_dir().unwrap().canonicalize().unwrap()
}
