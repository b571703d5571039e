//! Error types for argwalk

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for argwalk operations
pub type Result<T> = std::result::Result<T, ArgwalkError>;

/// Main error type for argwalk
#[derive(Error, Debug)]
pub enum ArgwalkError {
    /// Argument declaration errors
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// A parse pass that recorded one or more errors
    #[error("Parse failed: {0}")]
    Parse(#[from] ParseFailure),

    /// Argument schema errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while declaring arguments. Always reported at add-time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Key '{key}' of argument '{name}' is already registered")]
    DuplicateKey { key: String, name: String },

    #[error("Argument '{0}' is already registered")]
    DuplicateName(String),

    #[error("Argument '{0}' must have at least one key")]
    NoKeys(String),

    #[error("Key '{key}' of argument '{name}' does not start with '{prefix}'")]
    MissingPrefix {
        key: String,
        name: String,
        prefix: String,
    },

    #[error("Flag argument '{0}' cannot hold a list")]
    FlagList(String),

    #[error("Flag argument '{0}' has no value to store when present")]
    FlagWithoutValue(String),

    #[error("Argument '{name}' takes nargs {nargs} but its cell is not a list")]
    NotListType { name: String, nargs: i32 },

    #[error("Positional argument '{0}' cannot be a flag")]
    PositionalFlag(String),
}

/// Conversion failures reported by a typed cell
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionError {
    #[error("invalid input")]
    InvalidInput,

    #[error("value is below the minimum")]
    BoundaryLow,

    #[error("value is above the maximum")]
    BoundaryHigh,
}

/// Errors recorded while walking input tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("Unexpected positional value '{0}'")]
    UnexpectedPositional(String),

    #[error("Argument '{key}' does not take a value (got '{value}')")]
    InvalidAssignment { key: String, value: String },

    #[error("Failed to assign '{value}' to '{key}': {reason}")]
    AssignmentFailed {
        key: String,
        value: String,
        reason: ConversionError,
    },

    #[error("Argument '{0}' requires a value")]
    MissingAssignment(String),

    #[error("Argument '{key}' expects {expected} value(s), found {found}")]
    MissingListAssignment {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("Argument '{key}' accepts at most {expected} value(s), found {found}")]
    TooManyAssignment {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("Required argument '{0}' is missing")]
    MissingArgument(String),

    #[error("Argument '{0}' does not hold a list")]
    NotListType(String),

    #[error("Help requested")]
    HelpRequested,
}

/// Outcome of a failed parse pass: every error it recorded, in order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} error(s): {}", .errors.len(), summarize(.errors))]
pub struct ParseFailure {
    pub errors: Vec<ParseError>,
    /// Whether help text was written to the error sink
    pub help_displayed: bool,
}

impl ParseFailure {
    /// True when the pass stopped because a help key was matched
    pub fn help_requested(&self) -> bool {
        self.errors.contains(&ParseError::HelpRequested)
    }
}

fn summarize(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Argument schema loading and validation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to find schema file (searched: {0})")]
    NotFound(String),

    #[error("Invalid schema: {0}")]
    Invalid(String),

    #[error("Unknown value type '{kind}' for argument '{name}'")]
    UnknownType { name: String, kind: String },

    #[error("Command '{0}' is not defined")]
    CommandNotFound(String),

    #[error("Failed to read schema '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Specialized result type for registration operations
pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;

/// Specialized result type for cell conversions
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

/// Specialized result type for a single assignment
pub type AssignResult<T> = std::result::Result<T, ParseError>;

/// Specialized result type for schema operations
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
