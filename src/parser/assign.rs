//! Assignment engine
//!
//! Applies raw value text to a matched entry: validates the value count
//! against the entry's arity, converts through the entry's cell and marks the
//! entry found on success. Shared by the command-line, environment and config
//! front-ends.

use crate::error::{AssignResult, ParseError};
use crate::registry::{Arity, Entry};

/// Apply a bare flag occurrence
pub(crate) fn assign_key_flag_value(entry: &mut Entry, key: &str) -> AssignResult<()> {
    entry
        .cell
        .set_value_flag()
        .map_err(|reason| ParseError::AssignmentFailed {
            key: key.to_string(),
            value: String::new(),
            reason,
        })?;
    entry.found = true;
    Ok(())
}

/// Apply one value; the previous value survives a failed conversion
pub(crate) fn assign_key_value(entry: &mut Entry, key: &str, value: &str) -> AssignResult<()> {
    entry
        .cell
        .set_value(value)
        .map_err(|reason| ParseError::AssignmentFailed {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        })?;
    entry.found = true;
    Ok(())
}

/// Apply several values to a list entry.
///
/// The count is checked before any conversion, so a count violation leaves the
/// cell untouched. Values are then appended in order; the first one that fails
/// to convert is reported and the ones before it stay in the cell.
pub(crate) fn assign_list_key_value(
    entry: &mut Entry,
    key: &str,
    values: &[String],
) -> AssignResult<()> {
    if !entry.cell.is_list() {
        return Err(ParseError::NotListType(key.to_string()));
    }
    check_count(entry.arity, key, values.len())?;
    for value in values {
        entry
            .cell
            .set_value(value)
            .map_err(|reason| ParseError::AssignmentFailed {
                key: key.to_string(),
                value: value.clone(),
                reason,
            })?;
    }
    entry.found = true;
    Ok(())
}

fn check_count(arity: Arity, key: &str, found: usize) -> AssignResult<()> {
    if found < arity.min() {
        return Err(ParseError::MissingListAssignment {
            key: key.to_string(),
            expected: arity.min(),
            found,
        });
    }
    if found > arity.max() {
        return Err(ParseError::TooManyAssignment {
            key: key.to_string(),
            expected: arity.max(),
            found,
        });
    }
    Ok(())
}

/// Split one list token on `delimiter`
pub(crate) fn split_list(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter).map(str::to_string).collect()
}
