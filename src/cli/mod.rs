//! CLI interface
//!
//! This module handles the companion binary's command-line parsing and
//! dispatch to the schema-driven parsers.

pub mod app;

// Re-export main types
pub use app::*;
