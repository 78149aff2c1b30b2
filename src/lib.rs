//! Batch synchronization of version-controlled working copies.
//!
//! This crate loads a list of repositories from `~/.repos.toml` and, for
//! each one in order:
//! - Fetches remote changes (`git remote update`, `git svn fetch`)
//! - Integrates them into the working copy (`git pull --rebase`,
//!   `git svn rebase`, `svn update`)
//!
//! Entries can be gated on host conditions, and runs can be limited to
//! announcing (dry run) or to the fetch phase.

pub mod command;
pub mod condition;
pub mod config;
pub mod constants;
pub mod error;
pub mod manifest;
pub mod output;
pub mod repo;
pub mod workdir;

pub use error::{Error, Result};
