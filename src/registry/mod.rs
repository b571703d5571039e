//! Argument registry
//!
//! The registry owns every declared [`Entry`], keeps them in declaration order
//! for help display, and maps each match key to its entry for constant-time
//! lookup. Key collisions are rejected when an argument is added.

pub mod entry;

pub use entry::{Arity, Entry};

use crate::cell::{Cell, FromValue};
use crate::error::{RegistrationError, RegistrationResult};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Handle to a registered entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Declared arguments of one parser
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
    keys: HashMap<String, EntryId>,
    positionals: Vec<EntryId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an argument matched by any of `keys`
    pub fn add_key<K: Into<String>>(
        &mut self,
        cell: Cell,
        name: impl Into<String>,
        keys: impl IntoIterator<Item = K>,
        help: impl Into<String>,
        nargs: i32,
        required: bool,
    ) -> RegistrationResult<EntryId> {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let entry = Entry::new(cell, name, keys, help, Arity::from_nargs(nargs), required);
        if entry.keys.is_empty() {
            return Err(RegistrationError::NoKeys(entry.name));
        }
        self.insert(entry)
    }

    /// Register the next positional slot
    pub fn add_positional(
        &mut self,
        cell: Cell,
        name: impl Into<String>,
        help: impl Into<String>,
        nargs: i32,
        required: bool,
    ) -> RegistrationResult<EntryId> {
        let mut entry = Entry::new(cell, name, Vec::new(), help, Arity::from_nargs(nargs), required);
        entry.position = self.positionals.len() + 1;
        let id = self.insert(entry)?;
        self.positionals.push(id);
        Ok(id)
    }

    fn insert(&mut self, entry: Entry) -> RegistrationResult<EntryId> {
        if self.entries.contains_key(&entry.name) {
            return Err(RegistrationError::DuplicateName(entry.name));
        }
        for (i, key) in entry.keys.iter().enumerate() {
            if self.keys.contains_key(key) || entry.keys[..i].contains(key) {
                return Err(RegistrationError::DuplicateKey {
                    key: key.clone(),
                    name: entry.name.clone(),
                });
            }
        }
        entry.validate()?;

        let id = EntryId(self.entries.len());
        for key in &entry.keys {
            self.keys.insert(key.clone(), id);
        }
        log::debug!("registered '{}' keys={:?} nargs={}", entry.name, entry.keys, entry.arity);
        self.entries.insert(entry.name.clone(), entry);
        Ok(id)
    }

    /// Replace the match keys of a registered entry. On a collision the old
    /// keys stay in place.
    pub(crate) fn rekey(&mut self, id: EntryId, keys: Vec<String>) -> RegistrationResult<()> {
        let Some(entry) = self.get(id) else {
            return Ok(());
        };
        let name = entry.name.clone();
        for (i, key) in keys.iter().enumerate() {
            let taken = self.keys.get(key).is_some_and(|owner| *owner != id);
            if taken || keys[..i].contains(key) {
                return Err(RegistrationError::DuplicateKey {
                    key: key.clone(),
                    name,
                });
            }
        }
        self.keys.retain(|_, owner| *owner != id);
        for key in &keys {
            self.keys.insert(key.clone(), id);
        }
        if let Some(entry) = self.get_mut(id) {
            entry.keys = keys;
        }
        Ok(())
    }

    /// Exact match of `key` against every registered key
    pub fn find_matching_arg(&self, key: &str) -> Option<EntryId> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get_index(id.0).map(|(_, entry)| entry)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_index_mut(id.0).map(|(_, entry)| entry)
    }

    pub fn by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub(crate) fn by_name_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(name)
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> {
        (0..self.entries.len()).map(EntryId)
    }

    /// Key entries in declaration order
    pub fn options(&self) -> impl Iterator<Item = &Entry> {
        self.entries().filter(|e| !e.is_positional())
    }

    /// Positional entries in slot order
    pub fn positionals(&self) -> impl Iterator<Item = &Entry> {
        self.positionals.iter().filter_map(|id| self.get(*id))
    }

    /// Entry occupying positional slot `position` (from 1)
    pub fn positional_at(&self, position: usize) -> Option<EntryId> {
        position
            .checked_sub(1)
            .and_then(|i| self.positionals.get(i))
            .copied()
    }

    pub fn positional_count(&self) -> usize {
        self.positionals.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn value<T: FromValue>(&self, name: &str) -> Option<T> {
        self.by_name(name).and_then(|e| e.cell.get())
    }

    pub fn values<T: FromValue>(&self, name: &str) -> Vec<T> {
        self.by_name(name)
            .map(|e| e.cell.get_all())
            .unwrap_or_default()
    }

    pub fn is_found(&self, name: &str) -> bool {
        self.by_name(name).is_some_and(Entry::is_found)
    }

    /// Required entries not matched in the last pass
    pub fn missing_required(&self) -> impl Iterator<Item = &Entry> {
        self.entries().filter(|e| e.required && !e.found)
    }

    pub(crate) fn clear_found(&mut self) {
        for entry in self.entries.values_mut() {
            entry.found = false;
        }
    }

    /// Restore every cell to its defaults and clear found flags
    pub fn reset(&mut self) {
        for entry in self.entries.values_mut() {
            entry.found = false;
            entry.cell.reset();
        }
    }
}
