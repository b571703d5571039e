//! Argument schema parsing and validation
//!
//! This module handles parsing of argwalk.yml schema files and building
//! parsers from them.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
