//! Argwalk - typed argument parsing for command lines, environments and config files
//!
//! Arguments are declared once with a typed, range-checked [`Cell`] each and
//! parsed from argv-style tokens by an [`ArgParser`]. The same cells can be
//! filled from environment variables ([`EnvParser`]) or a YAML document
//! ([`ConfigParser`]).

// Public modules
pub mod cell;
pub mod cli;
pub mod config;
pub mod error;
pub mod frontend;
pub mod help;
pub mod i18n;
pub mod parser;
pub mod registry;

// Re-export commonly used types
pub use cell::{Cell, Value};
pub use error::{ArgwalkError, ParseError, ParseFailure, RegistrationError, Result};
pub use frontend::{ConfigParser, EnvParser};
pub use help::HelpLayout;
pub use i18n::{Locale, Messages};
pub use parser::{ArgParser, Settings};
pub use registry::{Arity, Entry, EntryId, Registry};

/// Current version of Argwalk
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
