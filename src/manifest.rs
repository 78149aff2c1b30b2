//! Loading the repository list from the configuration file.
//!
//! The file is TOML with one array per repository variant:
//!
//! ```toml
//! git = [
//!     "src/proj-a",
//!     ["host:workstation", "src/proj-b"],
//!     { path = "src/proj-c", when = ["env:WORK", "not:os:macos"] },
//! ]
//! git_svn = ["mirrors/tools"]
//! svn = []
//! ```
//!
//! A string is always included. A `[condition, path]` pair or a
//! `{ path, when }` table is included only when its conditions hold at load
//! time. Lists are read in variant order and entries keep their listed order.

use crate::condition::{self, Condition, Environment};
use crate::error::{Error, Result};
use crate::repo::{Repository, Variant};
use serde::Deserialize;
use std::path::Path;
use toml::{Table, Value};

const SHAPE_ERROR: &str = "ShapeError";
const CONDITION_ERROR: &str = "ConditionError";

/// Repositories resolved from a configuration file.
#[derive(Debug, Default)]
pub struct Manifest {
    /// Repositories to sync, in configuration order.
    pub repositories: Vec<Repository>,
    /// Entries whose path did not exist, one `PathNotFound` each.
    pub skipped: Vec<Error>,
}

/// One raw list element after shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Path(String),
    Conditional {
        conditions: Vec<Condition>,
        path: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionalTable {
    path: String,
    when: When,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum When {
    One(String),
    All(Vec<String>),
}

impl When {
    fn into_vec(self) -> Vec<String> {
        match self {
            When::One(condition) => vec![condition],
            When::All(conditions) => conditions,
        }
    }
}

/// Reads and resolves every variant list in `config_path`.
pub fn load(config_path: &Path, home_root: &Path, env: &dyn Environment) -> Result<Manifest> {
    let table = load_table(config_path)?;
    resolve(&table, home_root, env)
}

/// Same as [`load`] for configuration text already in memory.
pub fn parse(text: &str, source: &Path, home_root: &Path, env: &dyn Environment) -> Result<Manifest> {
    let table = parse_table(text, source)?;
    resolve(&table, home_root, env)
}

/// Reads the configuration file into a TOML table.
pub fn load_table(config_path: &Path) -> Result<Table> {
    if !config_path.exists() {
        return Err(Error::ConfigFileMissing {
            path: config_path.to_path_buf(),
        });
    }
    log::debug!("loading configuration from {}", config_path.display());

    let text = std::fs::read_to_string(config_path).map_err(|err| Error::ConfigLoad {
        path: config_path.to_path_buf(),
        message: err.to_string(),
    })?;
    parse_table(&text, config_path)
}

fn parse_table(text: &str, source: &Path) -> Result<Table> {
    text.parse::<Table>().map_err(|err| {
        let message = match err.span() {
            Some(span) => format!("{} at line {}", err.message(), line_of(text, span.start)),
            None => err.message().to_string(),
        };
        Error::ConfigLoad {
            path: source.to_path_buf(),
            message,
        }
    })
}

fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()
        .iter()
        .take(offset)
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn resolve(table: &Table, home_root: &Path, env: &dyn Environment) -> Result<Manifest> {
    for key in table.keys() {
        if !Variant::ALL.iter().any(|v| v.list_name() == key) {
            log::warn!("ignoring unknown configuration key '{}'", key);
        }
    }

    let mut manifest = Manifest::default();
    for variant in Variant::ALL {
        for accepted in resolve_list(table, variant, env, home_root)? {
            match Repository::new(home_root, &accepted, variant) {
                Ok(repo) => manifest.repositories.push(repo),
                Err(err) => {
                    log::debug!("skipping {} entry '{}': {}", variant, accepted, err);
                    manifest.skipped.push(err);
                }
            }
        }
    }
    Ok(manifest)
}

/// Returns the accepted paths of one variant's list, in listed order.
///
/// A missing list is empty. Excluded conditional entries are dropped
/// silently; malformed elements and failing conditions abort the list.
pub fn resolve_list(
    table: &Table,
    variant: Variant,
    env: &dyn Environment,
    home_root: &Path,
) -> Result<Vec<String>> {
    let list = variant.list_name();
    let Some(value) = table.get(list) else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        return Err(entry_error(
            list,
            SHAPE_ERROR,
            format!("expected an array, found {}", value.type_str()),
        ));
    };

    let mut accepted = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let entry = parse_entry(item)
            .map_err(|message| entry_error(list, SHAPE_ERROR, format!("element {index}: {message}")))?;

        match entry {
            Entry::Path(path) => accepted.push(path),
            Entry::Conditional { conditions, path } => {
                let holds = condition::all_hold(&conditions, env, home_root).map_err(|err| {
                    entry_error(list, CONDITION_ERROR, format!("element {index}: {err}"))
                })?;
                if holds {
                    accepted.push(path);
                } else {
                    log::debug!("{} entry '{}' excluded by its conditions", list, path);
                }
            }
        }
    }
    Ok(accepted)
}

/// Validates the shape of a single list element.
pub fn parse_entry(value: &Value) -> std::result::Result<Entry, String> {
    match value {
        Value::String(path) => Ok(Entry::Path(path.clone())),
        Value::Array(pair) if pair.len() == 2 => {
            let conditions = match &pair[0] {
                Value::String(condition) => vec![condition.clone()],
                Value::Array(list) => list
                    .iter()
                    .map(|c| match c {
                        Value::String(s) => Ok(s.clone()),
                        other => Err(format!("condition must be a string, found {}", other.type_str())),
                    })
                    .collect::<std::result::Result<_, _>>()?,
                other => {
                    return Err(format!(
                        "condition must be a string, found {}",
                        other.type_str()
                    ));
                }
            };
            let Value::String(path) = &pair[1] else {
                return Err(format!("path must be a string, found {}", pair[1].type_str()));
            };
            conditional(conditions, path.clone())
        }
        Value::Array(other) => Err(format!(
            "expected a (condition, path) pair, found an array of length {}",
            other.len()
        )),
        Value::Table(_) => {
            let table: ConditionalTable = value
                .clone()
                .try_into()
                .map_err(|err: toml::de::Error| {
                    format!(
                        "expected a {{ path, when }} table, found table: {}",
                        err.message()
                    )
                })?;
            conditional(table.when.into_vec(), table.path)
        }
        other => Err(format!(
            "expected a path string or a (condition, path) pair, found {}",
            other.type_str()
        )),
    }
}

fn conditional(conditions: Vec<String>, path: String) -> std::result::Result<Entry, String> {
    let conditions = conditions
        .iter()
        .map(|c| c.parse::<Condition>().map_err(|err| err.to_string()))
        .collect::<std::result::Result<_, _>>()?;
    Ok(Entry::Conditional { conditions, path })
}

fn entry_error(list: &str, kind: &'static str, message: String) -> Error {
    Error::ConfigEntry {
        list: list.to_string(),
        kind,
        message,
    }
}
