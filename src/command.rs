//! External version-control command execution.
//!
//! Commands run in the process working directory with stdout and stderr
//! inherited, so the tools report their own progress and failures. The exit
//! status is logged and otherwise ignored: one unreachable remote must not
//! stop the remaining repositories.

use std::fmt;
use std::process::Command;

/// A program and its fixed argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl CommandLine {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Executes external commands on behalf of the sync loop.
pub trait CommandRunner {
    fn run(&self, command: &CommandLine);
}

/// Runs commands as child processes of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine) {
        log::debug!("running `{}`", command);

        match Command::new(command.program).args(command.args).status() {
            Ok(status) if status.success() => {
                log::debug!("`{}` finished", command);
            }
            Ok(status) => {
                log::debug!("`{}` exited with {}", command, status);
            }
            Err(err) => {
                log::warn!("failed to execute `{}`: {}", command, err);
            }
        }
    }
}
