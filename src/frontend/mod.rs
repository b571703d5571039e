//! Non command-line front-ends
//!
//! Both front-ends own a [`Registry`] of their own and feed values through the
//! same assignment engine as [`crate::parser::ArgParser`].

pub mod config;
pub mod env;

pub use config::ConfigParser;
pub use env::{EnvParser, EnvSource, ProcessEnv};

use crate::error::{ParseError, ParseFailure};
use crate::registry::Registry;

fn collect_missing(registry: &Registry, errors: &mut Vec<ParseError>) {
    errors.extend(
        registry
            .missing_required()
            .map(|e| ParseError::MissingArgument(e.name().to_string())),
    );
}

fn finish(
    store: &mut Vec<ParseError>,
    errors: Vec<ParseError>,
    assigned: usize,
) -> Result<usize, ParseFailure> {
    store.clone_from(&errors);
    if errors.is_empty() {
        Ok(assigned)
    } else {
        Err(ParseFailure {
            errors,
            help_displayed: false,
        })
    }
}
