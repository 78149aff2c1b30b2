//! Application-wide constants.
//!
//! Centralized values for file locations, list names and the fixed remote
//! used by plain git repositories.

use std::path::PathBuf;

/// Name of the configuration file, relative to the home directory.
pub const CONFIG_FILE_NAME: &str = ".repos.toml";

/// Environment variable that overrides the configuration file location.
///
/// Example: `REPO_SYNC_CONFIG=/tmp/repos.toml repo-sync --dry-run`
pub const CONFIG_ENV_VAR: &str = "REPO_SYNC_CONFIG";

/// Remote and branch that plain git repositories rebase onto.
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "master";

/// Configuration list names, one per repository variant.
pub const GIT_LIST: &str = "git";
pub const GIT_SVN_LIST: &str = "git_svn";
pub const SVN_LIST: &str = "svn";

/// Prefix printed before progress lines when nothing is executed.
pub const DRY_RUN_PREFIX: &str = "[dry-run]";

/// Returns the configuration file path.
///
/// `REPO_SYNC_CONFIG` wins when set and non-empty, otherwise the file lives
/// directly under `home`.
pub fn config_path(home: &std::path::Path) -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(CONFIG_FILE_NAME))
}
