//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema with global options, positionals and two sub-commands
pub const TOOL_SCHEMA: &str = r#"
prog: tool
description: Builds and tests things.
env-prefix: TOOL_
arguments:
  - name: verbose
    keys: [-v, --verbose]
    type: count
    help: Increase verbosity
  - name: jobs
    keys: [-j, --jobs]
    type: u8
    min: 1
    max: 64
    default: 4
    env: [JOBS]
    config-key: build.jobs
    help: Parallel jobs
  - name: levels
    keys: [-l, --levels]
    type: i32
    nargs: -3
    help: Up to three levels
commands:
  build:
    description: Compile the project.
    arguments:
      - name: release
        keys: [--release]
        type: flag
      - name: target
        help: Target to build
  test:
    arguments:
      - name: filter
        required: true
"#;

/// Create a temporary directory with an argwalk.yml file
pub fn create_test_schema(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let schema_path = temp_dir.path().join("argwalk.yml");
    fs::write(&schema_path, content).unwrap();
    (temp_dir, schema_path)
}

/// Create a test schema with an empty subdirectory beside it
pub fn create_test_schema_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let schema_path = temp_dir.path().join("argwalk.yml");
    let sub_dir = temp_dir.path().join("subdir");

    fs::write(&schema_path, content).unwrap();
    fs::create_dir(&sub_dir).unwrap();

    (temp_dir, schema_path, sub_dir)
}

/// Write `content` to `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Parse `tokens` with discarded output; returns the result and the error text
pub fn parse_quietly(
    parser: &mut argwalk::ArgParser,
    tokens: &[&str],
) -> (Result<usize, argwalk::ParseFailure>, String) {
    let mut err = Vec::new();
    let result = parser.parse_with(tokens, 0..tokens.len(), &mut std::io::sink(), &mut err);
    (result, String::from_utf8(err).unwrap())
}
