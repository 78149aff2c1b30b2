// Repository descriptors, variant command sets, and the two-phase sync loop

use crate::command::{CommandLine, CommandRunner};
use crate::config::Config;
use crate::constants::{DEFAULT_BRANCH, DEFAULT_REMOTE, GIT_LIST, GIT_SVN_LIST, SVN_LIST};
use crate::error::{Error, Result};
use crate::workdir::with_dir;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of working copy, which decides the commands each phase runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Plain git repository.
    Git,
    /// git mirror of a Subversion repository, driven through `git svn`.
    GitSvn,
    /// Subversion working copy.
    Svn,
}

/// The two phases of a repository sync, always run in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Retrieve remote changes without touching the working copy.
    Fetch,
    /// Integrate remote changes into the working copy.
    Update,
}

const GIT_REMOTE_UPDATE: CommandLine = CommandLine::new("git", &["remote", "update"]);
const GIT_PULL_REBASE: CommandLine =
    CommandLine::new("git", &["pull", "--rebase", DEFAULT_REMOTE, DEFAULT_BRANCH]);
const GIT_SVN_FETCH: CommandLine = CommandLine::new("git", &["svn", "fetch"]);
const GIT_SVN_REBASE: CommandLine = CommandLine::new("git", &["svn", "rebase"]);
const SVN_UPDATE: CommandLine = CommandLine::new("svn", &["update"]);

impl Variant {
    /// Variants in the order their lists are loaded and synced.
    pub const ALL: [Variant; 3] = [Variant::Git, Variant::GitSvn, Variant::Svn];

    /// Command for `phase`, or `None` when the variant has no such step.
    pub fn command(self, phase: Phase) -> Option<CommandLine> {
        match (self, phase) {
            (Variant::Git, Phase::Fetch) => Some(GIT_REMOTE_UPDATE),
            (Variant::Git, Phase::Update) => Some(GIT_PULL_REBASE),
            (Variant::GitSvn, Phase::Fetch) => Some(GIT_SVN_FETCH),
            (Variant::GitSvn, Phase::Update) => Some(GIT_SVN_REBASE),
            (Variant::Svn, Phase::Fetch) => None,
            (Variant::Svn, Phase::Update) => Some(SVN_UPDATE),
        }
    }

    /// Name of the configuration list holding repositories of this variant.
    pub fn list_name(self) -> &'static str {
        match self {
            Variant::Git => GIT_LIST,
            Variant::GitSvn => GIT_SVN_LIST,
            Variant::Svn => SVN_LIST,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Git => "git",
            Variant::GitSvn => "git-svn",
            Variant::Svn => "svn",
        })
    }
}

/// A validated repository location. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    path: PathBuf,
    variant: Variant,
}

impl Repository {
    /// Resolves `entry` against `home_root` and checks that it exists.
    ///
    /// Absolute entries replace the home root, following `Path::join`.
    pub fn new(home_root: &Path, entry: impl AsRef<Path>, variant: Variant) -> Result<Self> {
        let path = home_root.join(entry);
        if !path.exists() {
            return Err(Error::PathNotFound { path });
        }
        Ok(Self { path, variant })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Identifies the repository in user-facing output.
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Hooks invoked while repositories are synced.
///
/// All methods have empty defaults so implementors pick what they need.
pub trait SyncCallbacks {
    /// A phase is about to run (or would run, in dry-run mode).
    fn on_phase(&self, _repo: &Repository, _phase: Phase, _config: &Config) {}

    /// A phase could not start, e.g. the directory vanished after loading.
    fn on_phase_error(&self, _repo: &Repository, _phase: Phase, _error: &Error) {}
}

/// What a sync run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub repositories: usize,
    pub commands_run: usize,
    pub phase_errors: usize,
}

/// Runs the fetch phase for `repo`. Returns whether a command was executed.
pub fn fetch_changes(
    repo: &Repository,
    config: &Config,
    runner: &dyn CommandRunner,
    callbacks: &dyn SyncCallbacks,
) -> Result<bool> {
    run_phase(repo, Phase::Fetch, config, runner, callbacks)
}

/// Runs the update phase for `repo`, unless the run is fetch-only.
pub fn pull_changes(
    repo: &Repository,
    config: &Config,
    runner: &dyn CommandRunner,
    callbacks: &dyn SyncCallbacks,
) -> Result<bool> {
    if config.fetch_only {
        return Ok(false);
    }
    run_phase(repo, Phase::Update, config, runner, callbacks)
}

fn run_phase(
    repo: &Repository,
    phase: Phase,
    config: &Config,
    runner: &dyn CommandRunner,
    callbacks: &dyn SyncCallbacks,
) -> Result<bool> {
    with_dir(repo.path(), || {
        callbacks.on_phase(repo, phase, config);

        if config.dry_run {
            return false;
        }

        match repo.variant().command(phase) {
            Some(command) => {
                runner.run(&command);
                true
            }
            None => {
                log::debug!("{}: no {:?} step for {}", repo.display_name(), phase, repo.variant());
                false
            }
        }
    })
}

/// Syncs one repository: fetch, then update.
///
/// A phase that cannot start is reported and does not stop the other phase
/// or other repositories.
pub fn sync_repository(
    repo: &Repository,
    config: &Config,
    runner: &dyn CommandRunner,
    callbacks: &dyn SyncCallbacks,
) -> SyncReport {
    let mut report = SyncReport {
        repositories: 1,
        ..SyncReport::default()
    };

    let fetched = fetch_changes(repo, config, runner, callbacks);
    report.record(repo, Phase::Fetch, fetched, callbacks);

    let pulled = pull_changes(repo, config, runner, callbacks);
    report.record(repo, Phase::Update, pulled, callbacks);

    report
}

impl SyncReport {
    fn record(
        &mut self,
        repo: &Repository,
        phase: Phase,
        outcome: Result<bool>,
        callbacks: &dyn SyncCallbacks,
    ) {
        match outcome {
            Ok(true) => self.commands_run += 1,
            Ok(false) => {}
            Err(err) => {
                self.phase_errors += 1;
                callbacks.on_phase_error(repo, phase, &err);
            }
        }
    }
}

/// Syncs every repository in order, one at a time.
pub fn sync_all(
    repos: &[Repository],
    config: &Config,
    runner: &dyn CommandRunner,
    callbacks: &dyn SyncCallbacks,
) -> SyncReport {
    repos
        .iter()
        .map(|repo| sync_repository(repo, config, runner, callbacks))
        .fold(SyncReport::default(), |acc, r| SyncReport {
            repositories: acc.repositories + r.repositories,
            commands_run: acc.commands_run + r.commands_run,
            phase_errors: acc.phase_errors + r.phase_errors,
        })
}
