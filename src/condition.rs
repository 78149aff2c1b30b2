//! Conditions that gate configuration entries.
//!
//! A conditional entry carries one or more condition strings such as
//! `host:workstation` or `not:env:CI`. The vocabulary is closed: anything
//! outside it is rejected when the configuration is loaded.
//!
//! | Condition       | Holds when                                  |
//! |-----------------|---------------------------------------------|
//! | `always`        | always                                      |
//! | `never`         | never                                       |
//! | `host:NAME`     | hostname equals `NAME`, ignoring case       |
//! | `os:NAME`       | `std::env::consts::OS` equals `NAME`        |
//! | `env:VAR`       | `VAR` is set and non-empty                  |
//! | `env:VAR=VALUE` | `VAR` equals `VALUE`                        |
//! | `exists:PATH`   | `PATH`, relative to the home root, exists   |
//! | `command:NAME`  | an executable `NAME` is on `PATH`           |
//! | `not:COND`      | `COND` does not hold                        |

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    Never,
    Host(String),
    Os(String),
    EnvSet(String),
    EnvEquals { name: String, value: String },
    Exists(PathBuf),
    Command(String),
    Not(Box<Condition>),
}

/// Host facts that conditions are evaluated against.
pub trait Environment {
    fn hostname(&self) -> Option<String>;
    fn os(&self) -> &str;
    fn var(&self, name: &str) -> Option<String>;
    fn has_command(&self, name: &str) -> bool;

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

const HOSTNAME_FILES: &[&str] = &["/proc/sys/kernel/hostname", "/etc/hostname"];

impl Environment for SystemEnvironment {
    fn hostname(&self) -> Option<String> {
        HOSTNAME_FILES
            .iter()
            .filter_map(|file| std::fs::read_to_string(file).ok())
            .chain(["HOSTNAME", "COMPUTERNAME"].iter().filter_map(|v| std::env::var(v).ok()))
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
    }

    fn os(&self) -> &str {
        std::env::consts::OS
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn has_command(&self, name: &str) -> bool {
        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(name)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

impl Condition {
    /// Evaluates the condition. `home_root` anchors relative `exists:` paths.
    pub fn evaluate(&self, env: &dyn Environment, home_root: &Path) -> Result<bool> {
        let holds = match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Host(expected) => {
                let actual = env.hostname().ok_or_else(|| Error::Condition {
                    condition: self.to_string(),
                    message: "hostname is unavailable".to_string(),
                })?;
                actual.eq_ignore_ascii_case(expected)
            }
            Condition::Os(expected) => env.os() == expected,
            Condition::EnvSet(name) => env.var(name).is_some_and(|v| !v.is_empty()),
            Condition::EnvEquals { name, value } => env.var(name).as_deref() == Some(value),
            Condition::Exists(path) => env.path_exists(&home_root.join(path)),
            Condition::Command(name) => env.has_command(name),
            Condition::Not(inner) => !inner.evaluate(env, home_root)?,
        };
        Ok(holds)
    }
}

/// Evaluates every condition; all must hold. An empty slice holds.
pub fn all_hold(conditions: &[Condition], env: &dyn Environment, home_root: &Path) -> Result<bool> {
    for condition in conditions {
        if !condition.evaluate(env, home_root)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_nested(s, 0)
    }
}

/// Deepest `not:` chain accepted in a single condition.
const MAX_NOT_DEPTH: usize = 8;

fn parse_nested(s: &str, depth: usize) -> Result<Condition> {
    let invalid = |message: &str| Error::Condition {
        condition: s.to_string(),
        message: message.to_string(),
    };

    let s = s.trim();
    match s {
        "always" => return Ok(Condition::Always),
        "never" => return Ok(Condition::Never),
        _ => {}
    }

    let (kind, arg) = s
        .split_once(':')
        .ok_or_else(|| invalid("unknown condition"))?;
    if arg.trim().is_empty() {
        return Err(invalid("missing argument"));
    }
    let arg = arg.trim();

    match kind {
        "host" => Ok(Condition::Host(arg.to_string())),
        "os" => Ok(Condition::Os(arg.to_string())),
        "env" => match arg.split_once('=') {
            Some((name, _)) if name.is_empty() => Err(invalid("missing variable name")),
            Some((name, value)) => Ok(Condition::EnvEquals {
                name: name.to_string(),
                value: value.to_string(),
            }),
            None => Ok(Condition::EnvSet(arg.to_string())),
        },
        "exists" => Ok(Condition::Exists(PathBuf::from(arg))),
        "command" => Ok(Condition::Command(arg.to_string())),
        "not" if depth >= MAX_NOT_DEPTH => Err(invalid("nesting too deep")),
        "not" => Ok(Condition::Not(Box::new(parse_nested(arg, depth + 1)?))),
        _ => Err(invalid("unknown condition")),
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => write!(f, "always"),
            Condition::Never => write!(f, "never"),
            Condition::Host(name) => write!(f, "host:{}", name),
            Condition::Os(name) => write!(f, "os:{}", name),
            Condition::EnvSet(name) => write!(f, "env:{}", name),
            Condition::EnvEquals { name, value } => write!(f, "env:{}={}", name, value),
            Condition::Exists(path) => write!(f, "exists:{}", path.display()),
            Condition::Command(name) => write!(f, "command:{}", name),
            Condition::Not(inner) => write!(f, "not:{}", inner),
        }
    }
}
