//! Per-pass walk state

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    ExpectKeyOrPositional,
    ConsumingListValues,
    StoppedOnPositionalName,
    Done,
}

/// Transient state of one parse call
#[derive(Debug)]
pub(crate) struct Session {
    /// Next token to look at
    pub index: usize,
    pub end: usize,
    pub abort_on_error: bool,
    /// Next positional slot to fill (from 1)
    pub next_position: usize,
    pub state: State,
    pub errors: Vec<ParseError>,
    /// Set when the walk stopped early on an error or a help key
    pub aborted: bool,
    pub help: bool,
}

impl Session {
    pub fn new(start: usize, end: usize, abort_on_error: bool) -> Self {
        Session {
            index: start,
            end,
            abort_on_error,
            next_position: 1,
            state: State::ExpectKeyOrPositional,
            errors: Vec::new(),
            aborted: false,
            help: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.index < self.end
            && matches!(
                self.state,
                State::ExpectKeyOrPositional | State::ConsumingListValues
            )
    }

    pub fn record(&mut self, error: ParseError) {
        log::debug!("parse error: {}", error);
        self.errors.push(error);
        if self.abort_on_error {
            self.abort();
        }
    }

    /// Help key matched: stop regardless of policy
    pub fn request_help(&mut self) {
        self.help = true;
        self.errors.push(ParseError::HelpRequested);
        self.abort();
    }

    pub fn abort(&mut self) {
        self.aborted = true;
        self.state = State::Done;
    }

    pub fn finish(&mut self) {
        if self.state != State::StoppedOnPositionalName {
            self.state = State::Done;
        }
    }

    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}
