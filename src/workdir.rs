//! Scoped working-directory changes.
//!
//! The process working directory is the one piece of global state the sync
//! loop mutates. [`DirGuard`] enters a directory and puts the previous one
//! back when dropped, so the process never stays in a repository after a
//! phase returns, fails or unwinds.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Restores the previous working directory on drop.
#[derive(Debug)]
pub struct DirGuard {
    previous: PathBuf,
    changed: bool,
}

impl DirGuard {
    /// Changes the working directory to `target`.
    ///
    /// No directory change happens when `target` already is the current
    /// directory.
    pub fn enter(target: &Path) -> Result<Self> {
        let previous = std::env::current_dir()?;
        let changed = !same_dir(&previous, target);

        if changed {
            std::env::set_current_dir(target).map_err(|source| Error::WorkDir {
                path: target.to_path_buf(),
                source,
            })?;
            log::trace!("entered {}", target.display());
        }

        Ok(Self { previous, changed })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if !self.changed {
            return;
        }
        if let Err(err) = std::env::set_current_dir(&self.previous) {
            log::warn!(
                "failed to restore working directory {}: {}",
                self.previous.display(),
                err
            );
        }
    }
}

/// Runs `body` with `target` as the working directory.
pub fn with_dir<T, F>(target: &Path, body: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    let _guard = DirGuard::enter(target)?;
    Ok(body())
}

fn same_dir(current: &Path, target: &Path) -> bool {
    match (current.canonicalize(), target.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => current == target,
    }
}
