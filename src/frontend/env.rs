//! Environment variable front-end

use super::{collect_missing, finish};
use crate::cell::{parse_bool, Cell, FromValue};
use crate::error::{ParseError, ParseFailure, RegistrationResult};
use crate::parser::{assign_key_flag_value, assign_key_value, assign_list_key_value, split_list};
use crate::registry::{Arity, EntryId, Registry};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Where variable values come from
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<H: BuildHasher> EnvSource for HashMap<String, String, H> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Fills cells from named environment variables
#[derive(Debug, Clone)]
pub struct EnvParser {
    registry: Registry,
    prefix: String,
    list_delimiter: char,
    errors: Vec<ParseError>,
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvParser {
    pub fn new() -> Self {
        EnvParser {
            registry: Registry::new(),
            prefix: String::new(),
            list_delimiter: ',',
            errors: Vec::new(),
        }
    }

    /// Prepend `prefix` to every variable name at lookup
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_list_delimiter(mut self, delimiter: char) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    /// Register an entry read from the first of `vars` that is set
    pub fn add_variable<K: Into<String>>(
        &mut self,
        cell: Cell,
        name: impl Into<String>,
        vars: impl IntoIterator<Item = K>,
        help: impl Into<String>,
        nargs: i32,
        required: bool,
    ) -> RegistrationResult<EntryId> {
        self.registry.add_key(cell, name, vars, help, nargs, required)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Read the process environment
    pub fn parse(&mut self) -> Result<usize, ParseFailure> {
        self.parse_from(&ProcessEnv)
    }

    /// Read `source`. Returns the number of entries assigned.
    pub fn parse_from<E: EnvSource + ?Sized>(&mut self, source: &E) -> Result<usize, ParseFailure> {
        self.registry.clear_found();
        let mut errors = Vec::new();
        let mut assigned = 0;

        let ids: Vec<EntryId> = self.registry.ids().collect();
        for id in ids {
            let Some(entry) = self.registry.get(id) else {
                continue;
            };
            let hit = entry.keys().iter().find_map(|var| {
                let full = format!("{}{}", self.prefix, var);
                source.var(&full).map(|text| (full, text))
            });
            let Some((var, text)) = hit else {
                continue;
            };
            log::debug!("env {} -> '{}'", var, entry.name());

            let delimiter = self.list_delimiter;
            let Some(entry) = self.registry.get_mut(id) else {
                continue;
            };
            let result = match entry.arity() {
                Arity::Flag if entry.cell().is_counter() => assign_key_value(entry, &var, &text),
                Arity::Flag => match parse_bool(&text) {
                    Ok(true) => assign_key_flag_value(entry, &var),
                    Ok(false) => Ok(()),
                    Err(reason) => Err(ParseError::AssignmentFailed {
                        key: var.clone(),
                        value: text.clone(),
                        reason,
                    }),
                },
                arity if arity.is_list() => {
                    assign_list_key_value(entry, &var, &split_list(&text, delimiter))
                }
                _ => assign_key_value(entry, &var, &text),
            };
            match result {
                Ok(()) if entry.is_found() => assigned += 1,
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
