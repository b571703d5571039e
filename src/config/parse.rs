//! Schema file parsing and discovery

use crate::config::types::Schema;
use crate::error::{ArgwalkError, SchemaError, SchemaResult};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default schema file names to search for
const SCHEMA_FILE_NAMES: &[&str] = &["argwalk.yml", "argwalk.yaml"];

/// Find the schema file by searching the current and parent directories,
/// then the per-user config directory
pub fn find_schema_file() -> SchemaResult<PathBuf> {
    let start = env::current_dir().map_err(|e| {
        SchemaError::Invalid(format!("Failed to get current directory: {}", e))
    })?;
    match find_schema_file_from(start) {
        Ok(path) => Ok(path),
        Err(SchemaError::NotFound(searched)) => match user_schema_file() {
            Some(path) => Ok(path),
            None => Err(SchemaError::NotFound(searched)),
        },
        Err(e) => Err(e),
    }
}

/// Find the schema file starting from a specific directory
pub fn find_schema_file_from(start_dir: PathBuf) -> SchemaResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in SCHEMA_FILE_NAMES {
            let schema_path = current_dir.join(file_name);
            searched_paths.push(schema_path.display().to_string());

            if schema_path.is_file() {
                log::debug!("found schema {}", schema_path.display());
                return Ok(schema_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(SchemaError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// `argwalk.yml` in the per-user config directory, if present
fn user_schema_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "argwalk")?;
    SCHEMA_FILE_NAMES
        .iter()
        .map(|name| dirs.config_dir().join(name))
        .find(|path| path.is_file())
}

/// Parse a schema file from a path
pub fn parse_schema_file(path: &Path) -> Result<Schema, ArgwalkError> {
    let contents = fs::read_to_string(path).map_err(|e| SchemaError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_schema(&contents)
}

/// Parse a schema from a string
pub fn parse_schema(yaml: &str) -> Result<Schema, ArgwalkError> {
    let schema: Schema = serde_yaml::from_str(yaml)?;
    Ok(schema)
}

/// Parse the schema with automatic file discovery
pub fn parse_schema_auto() -> Result<(Schema, PathBuf), ArgwalkError> {
    let schema_path = find_schema_file()?;
    let schema = parse_schema_file(&schema_path)?;
    Ok((schema, schema_path))
}
