//! Config-file front-end
//!
//! Reads a YAML document, flattens nested mappings into dotted keys
//! (`server.port`) and assigns each leaf to the entry registered under that
//! key.

use super::{collect_missing, finish};
use crate::cell::{parse_bool, Cell, FromValue};
use crate::error::{ArgwalkError, ConversionError, ParseError, ParseFailure, RegistrationResult};
use crate::parser::{assign_key_flag_value, assign_key_value, assign_list_key_value, split_list};
use crate::registry::{Arity, Entry, EntryId, Registry};
use serde_yaml::Value as Yaml;
use std::fs;
use std::path::Path;

/// Fills cells from a YAML values document
#[derive(Debug, Clone)]
pub struct ConfigParser {
    registry: Registry,
    ignore_unknown: bool,
    list_delimiter: char,
    errors: Vec<ParseError>,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    pub fn new() -> Self {
        ConfigParser {
            registry: Registry::new(),
            ignore_unknown: false,
            list_delimiter: ',',
            errors: Vec::new(),
        }
    }

    /// Skip keys with no registered entry
    pub fn with_ignore_unknown(mut self, ignore: bool) -> Self {
        self.ignore_unknown = ignore;
        self
    }

    pub fn with_list_delimiter(mut self, delimiter: char) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    /// Register an entry under one or more flat keys
    pub fn add_setting<K: Into<String>>(
        &mut self,
        cell: Cell,
        name: impl Into<String>,
        keys: impl IntoIterator<Item = K>,
        help: impl Into<String>,
        nargs: i32,
        required: bool,
    ) -> RegistrationResult<EntryId> {
        self.registry.add_key(cell, name, keys, help, nargs, required)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parse_file(&mut self, path: &Path) -> crate::error::Result<usize> {
        let contents = fs::read_to_string(path)?;
        self.parse_str(&contents)
    }

    pub fn parse_str(&mut self, yaml: &str) -> crate::error::Result<usize> {
        let document: Yaml = serde_yaml::from_str(yaml)?;
        self.parse_value(&document).map_err(ArgwalkError::from)
    }

    /// Assign every leaf of `document`. Returns the number of entries assigned.
    pub fn parse_value(&mut self, document: &Yaml) -> Result<usize, ParseFailure> {
        self.registry.clear_found();
        let mut leaves = Vec::new();
        flatten("", document, &mut leaves);

        let mut errors = Vec::new();
        let mut assigned = 0;
        for (key, value) in leaves {
            let Some(id) = self.registry.find_matching_arg(&key) else {
                if self.ignore_unknown {
                    log::debug!("config: ignoring unknown key '{}'", key);
                } else {
                    errors.push(ParseError::UnknownArgument(key));
                }
                continue;
            };
            let delimiter = self.list_delimiter;
            let Some(entry) = self.registry.get_mut(id) else {
                continue;
            };
            log::debug!("config: {} -> '{}'", key, entry.name());
            let was_found = entry.is_found();
            match assign_leaf(entry, &key, value, delimiter) {
                Ok(()) if entry.is_found() && !was_found => assigned += 1,
                Ok(()) => {}
                Err(error) => errors.push(error),
            }
        }

        collect_missing(&self.registry, &mut errors);
        finish(&mut self.errors, errors, assigned)
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn value<T: FromValue>(&self, name: &str) -> Option<T> {
        self.registry.value(name)
    }

    pub fn values<T: FromValue>(&self, name: &str) -> Vec<T> {
        self.registry.values(name)
    }

    pub fn is_found(&self, name: &str) -> bool {
        self.registry.is_found(name)
    }

    pub fn reset(&mut self) {
        self.registry.reset();
        self.errors.clear();
    }
}

fn assign_leaf(entry: &mut Entry, key: &str, value: &Yaml, delimiter: char) -> Result<(), ParseError> {
    let invalid = |text: String| ParseError::AssignmentFailed {
        key: key.to_string(),
        value: text,
        reason: ConversionError::InvalidInput,
    };

    if let Yaml::Sequence(items) = value {
        let texts = items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| invalid(format!("{:?}", item))))
            .collect::<Result<Vec<_>, _>>()?;
        return assign_list_key_value(entry, key, &texts);
    }

    let text = scalar_text(value).ok_or_else(|| invalid(format!("{:?}", value)))?;
    match entry.arity() {
        Arity::Flag if entry.cell().is_counter() => assign_key_value(entry, key, &text),
        Arity::Flag => match parse_bool(&text) {
            Ok(true) => assign_key_flag_value(entry, key),
            Ok(false) => Ok(()),
            Err(_) => Err(invalid(text)),
        },
        arity if arity.is_list() => assign_list_key_value(entry, key, &split_list(&text, delimiter)),
        _ => assign_key_value(entry, key, &text),
    }
}

/// Collect `(dotted key, leaf)` pairs; nulls are dropped
fn flatten<'a>(prefix: &str, value: &'a Yaml, out: &mut Vec<(String, &'a Yaml)>) {
    match value {
        Yaml::Mapping(map) => {
            for (k, v) in map {
                let Some(name) = scalar_text(k) else {
                    continue;
                };
                let key = if prefix.is_empty() {
                    name
                } else {
                    format!("{}.{}", prefix, name)
                };
                flatten(&key, v, out);
            }
        }
        Yaml::Null => {}
        Yaml::Tagged(tagged) => flatten(prefix, &tagged.value, out),
        leaf => out.push((prefix.to_string(), leaf)),
    }
}

fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
