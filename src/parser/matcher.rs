//! Token walk
//!
//! Classifies each token as a key-switch or a positional value, resolves keys
//! (exact, inline `key=value`, inline `key,values`, short clusters) and draws
//! trailing value tokens according to the matched entry's arity.

use super::assign::{assign_key_flag_value, assign_key_value, assign_list_key_value, split_list};
use super::session::{Session, State};
use super::settings::Settings;
use crate::error::{AssignResult, ParseError};
use crate::registry::{Arity, Entry, EntryId, Registry};

pub(crate) struct Matcher<'a, S> {
    registry: &'a mut Registry,
    settings: &'a Settings,
    help: Option<EntryId>,
    tokens: &'a [S],
}

impl<'a, S: AsRef<str>> Matcher<'a, S> {
    pub fn new(
        registry: &'a mut Registry,
        settings: &'a Settings,
        help: Option<EntryId>,
        tokens: &'a [S],
    ) -> Self {
        Matcher {
            registry,
            settings,
            help,
            tokens,
        }
    }

    pub fn walk(&mut self, session: &mut Session) {
        while session.is_running() {
            let tokens: &'a [S] = self.tokens;
            let token = tokens[session.index].as_ref();
            log::trace!("token {}: {:?}", session.index, token);
            session.index += 1;
            if self.is_key_switch(token) {
                self.match_key_switch(token, session);
            } else {
                self.match_positional(token, session);
            }
        }
        session.finish();
    }

    /// Prefixed tokens are keys, except a bare prefix and unregistered
    /// negative numbers
    fn is_key_switch(&self, token: &str) -> bool {
        let prefix = self.settings.key_prefix.as_str();
        let Some(rest) = token.strip_prefix(prefix) else {
            return false;
        };
        if rest.is_empty() {
            return false;
        }
        !(looks_numeric(rest, prefix, self.settings.list_delimiter)
            && self.registry.find_matching_arg(token).is_none())
    }

    fn match_key_switch(&mut self, token: &str, session: &mut Session) {
        let settings = self.settings;

        if let Some((key, value)) = token.split_once(settings.assignment_delimiter) {
            match self.registry.find_matching_arg(key) {
                Some(id) => self.assign(id, key, Some(value), session),
                None => self.unknown(key, session),
            }
            return;
        }

        if let Some(id) = self.registry.find_matching_arg(token) {
            self.assign(id, token, None, session);
            return;
        }

        if let Some((key, values)) = token.split_once(settings.list_delimiter) {
            if let Some(id) = self.registry.find_matching_arg(key) {
                let result = match self.registry.get(id).map(|e| e.arity()) {
                    Some(arity) if arity.is_list() => Ok(()),
                    _ => Err(ParseError::NotListType(key.to_string())),
                };
                match result {
                    Ok(()) => self.assign(id, key, Some(values), session),
                    Err(error) => session.record(error),
                }
                return;
            }
        }

        if let Some(cluster) = self.cluster(token) {
            log::debug!("expanding cluster {:?} into {} keys", token, cluster.len());
            for (id, key) in cluster {
                if session.state == State::Done {
                    break;
                }
                self.assign(id, &key, None, session);
            }
            return;
        }

        self.unknown(token, session);
    }

    /// Resolve `-fcc` into single-character keys. Every key but the last must
    /// be a flag.
    fn cluster(&self, token: &str) -> Option<Vec<(EntryId, String)>> {
        let prefix = self.settings.key_prefix.as_str();
        if !self.settings.cluster_short_keys {
            return None;
        }
        let rest = token.strip_prefix(prefix)?;
        if rest.chars().count() < 2 || rest.starts_with(prefix) {
            return None;
        }

        let mut resolved = Vec::new();
        let count = rest.chars().count();
        for (i, c) in rest.chars().enumerate() {
            let key = format!("{}{}", prefix, c);
            let id = self.registry.find_matching_arg(&key)?;
            let arity = self.registry.get(id)?.arity();
            if i + 1 < count && arity != Arity::Flag {
                return None;
            }
            resolved.push((id, key));
        }
        Some(resolved)
    }

    fn unknown(&mut self, key: &str, session: &mut Session) {
        if self.settings.ignore_unknown_key {
            log::debug!("ignoring unknown key {:?}", key);
        } else {
            session.record(ParseError::UnknownArgument(key.to_string()));
        }
    }

    fn match_positional(&mut self, token: &str, session: &mut Session) {
        let Some(id) = self.registry.positional_at(session.next_position) else {
            session.record(ParseError::UnexpectedPositional(token.to_string()));
            return;
        };
        session.next_position += 1;

        let Some((name, arity)) = self
            .registry
            .get(id)
            .map(|e| (e.name().to_string(), e.arity()))
        else {
            return;
        };
        log::debug!("positional slot {} '{}' <- {:?}", session.next_position - 1, name, token);

        if self.settings.stop_positional.as_deref() == Some(name.as_str()) {
            let result = self.entry_assign(id, |entry| assign_key_value(entry, &name, token));
            if let Err(error) = result {
                session.record(error);
            }
            log::debug!("stopped on positional '{}' at token {}", name, session.index);
            session.state = State::StoppedOnPositionalName;
            return;
        }

        let result = if arity.is_list() {
            let first = split_list(token, self.settings.list_delimiter);
            let values = self.take_values(arity.max(), first, session);
            self.entry_assign(id, |entry| assign_list_key_value(entry, &name, &values))
        } else {
            self.entry_assign(id, |entry| assign_key_value(entry, &name, token))
        };
        if let Err(error) = result {
            session.record(error);
        }
    }

    /// Dispatch a matched key to the assignment engine
    fn assign(&mut self, id: EntryId, key: &str, inline: Option<&str>, session: &mut Session) {
        if Some(id) == self.help {
            if let Some(entry) = self.registry.get_mut(id) {
                entry.found = true;
            }
            log::debug!("help requested by {:?}", key);
            session.request_help();
            return;
        }

        let Some(arity) = self.registry.get(id).map(|e| e.arity()) else {
            return;
        };
        log::debug!("matched key {:?} (nargs {})", key, arity);
        let delimiter = self.settings.list_delimiter;

        let result = match (arity, inline) {
            (Arity::Flag, Some(value)) => Err(ParseError::InvalidAssignment {
                key: key.to_string(),
                value: value.to_string(),
            }),
            (Arity::Flag, None) => self.entry_assign(id, |entry| assign_key_flag_value(entry, key)),
            (arity, Some(value)) if arity.is_list() => {
                let values = split_list(value, delimiter);
                self.entry_assign(id, |entry| assign_list_key_value(entry, key, &values))
            }
            (_, Some(value)) => self.entry_assign(id, |entry| assign_key_value(entry, key, value)),
            (arity, None) if arity.is_list() => {
                let values = self.take_values(arity.max(), Vec::new(), session);
                self.entry_assign(id, |entry| assign_list_key_value(entry, key, &values))
            }
            (_, None) => match self.take_value(session) {
                Some(value) => self.entry_assign(id, |entry| assign_key_value(entry, key, value)),
                None => Err(ParseError::MissingAssignment(key.to_string())),
            },
        };
        if let Err(error) = result {
            session.record(error);
        }
    }

    fn entry_assign<F>(&mut self, id: EntryId, f: F) -> AssignResult<()>
    where
        F: FnOnce(&mut Entry) -> AssignResult<()>,
    {
        match self.registry.get_mut(id) {
            Some(entry) => f(entry),
            None => Ok(()),
        }
    }

    /// Next token, when it is a value rather than a key
    fn take_value(&self, session: &mut Session) -> Option<&'a str> {
        if session.index >= session.end {
            return None;
        }
        let tokens: &'a [S] = self.tokens;
        let token = tokens.get(session.index)?.as_ref();
        if self.is_key_switch(token) {
            return None;
        }
        session.index += 1;
        Some(token)
    }

    /// Draw value tokens, splitting each on the list delimiter, until `max`
    /// values are collected or a key-switch is reached
    fn take_values(&self, max: usize, mut values: Vec<String>, session: &mut Session) -> Vec<String> {
        session.state = State::ConsumingListValues;
        while session.state == State::ConsumingListValues {
            let next = if values.len() < max { self.take_value(session) } else { None };
            match next {
                Some(token) => values.extend(split_list(token, self.settings.list_delimiter)),
                None => session.state = State::ExpectKeyOrPositional,
            }
        }
        values
    }
}

/// Whether `text`, already stripped of its leading prefix, is a number or a
/// delimited list of numbers. Pieces after the first may carry their own sign.
fn looks_numeric(text: &str, prefix: &str, list_delimiter: char) -> bool {
    text.split(list_delimiter).enumerate().all(|(i, part)| {
        let digits = match part.strip_prefix(prefix) {
            Some(unsigned) if i > 0 => unsigned,
            _ => part,
        };
        digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') && part.parse::<f64>().is_ok()
    })
}
