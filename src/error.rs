//! Error types for configuration loading and repository synchronization.
//!
//! Every fatal condition maps to a distinct process exit code through
//! [`Error::exit_code`]. Failures of the external version-control commands
//! are deliberately absent: they are reported by the tools themselves and
//! never stop the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a normal run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when the configuration file does not exist.
pub const EXIT_CONFIG_MISSING: i32 = 1;
/// Exit code when the configuration file cannot be read or parsed.
pub const EXIT_CONFIG_LOAD: i32 = 2;
/// Exit code when a configuration list holds a malformed entry.
pub const EXIT_CONFIG_ENTRY: i32 = 3;
/// Exit code for environment problems outside the configuration.
pub const EXIT_ENVIRONMENT: i32 = 4;
/// Exit code for invalid command-line usage (sysexits `EX_USAGE`), kept
/// apart from clap's default 2 which would collide with `EXIT_CONFIG_LOAD`.
pub const EXIT_USAGE: i32 = 64;

/// Main error type for repo-sync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file is absent.
    #[error("configuration file {} does not exist", path.display())]
    ConfigFileMissing { path: PathBuf },

    /// The configuration file exists but could not be read or parsed.
    #[error("failed to load configuration file {}: {message}", path.display())]
    ConfigLoad { path: PathBuf, message: String },

    /// An element of a named list has the wrong shape or its condition failed.
    #[error("invalid entry in list '{list}': {}", non_empty(message, kind))]
    ConfigEntry {
        list: String,
        kind: &'static str,
        message: String,
    },

    /// A configured repository path does not exist on disk.
    #[error("repository path {} does not exist", path.display())]
    PathNotFound { path: PathBuf },

    /// A condition could not be parsed or evaluated.
    #[error("condition '{condition}': {message}")]
    Condition { condition: String, message: String },

    /// The home directory could not be determined.
    #[error("could not determine the home directory")]
    HomeDirUnknown,

    /// Entering or leaving a working directory failed.
    #[error("cannot change directory to {}: {source}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit code for this error when it ends the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigFileMissing { .. } => EXIT_CONFIG_MISSING,
            Error::ConfigLoad { .. } => EXIT_CONFIG_LOAD,
            Error::ConfigEntry { .. } | Error::Condition { .. } => EXIT_CONFIG_ENTRY,
            Error::PathNotFound { .. }
            | Error::HomeDirUnknown
            | Error::WorkDir { .. }
            | Error::Io(_) => EXIT_ENVIRONMENT,
        }
    }
}

/// Exit code for an error chain built in the binary.
///
/// Context layers are looked through; anything that is not an [`Error`]
/// counts as an environment failure.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>()
        .map_or(EXIT_ENVIRONMENT, Error::exit_code)
}

fn non_empty<'a>(message: &'a str, kind: &'a str) -> &'a str {
    if message.trim().is_empty() { kind } else { message }
}
