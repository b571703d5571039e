//! Registry entries and their arity

use crate::cell::Cell;
use crate::error::{RegistrationError, RegistrationResult};
use std::fmt;

/// Number of value tokens an argument consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value: a switch or counter
    Flag,
    /// Exactly N values
    Exactly(usize),
    /// Between 1 and N values
    UpTo(usize),
}

impl Arity {
    /// Interpret a signed `nargs`: 0 is a flag, N > 0 exactly N, N < 0 up to |N|
    pub fn from_nargs(nargs: i32) -> Self {
        match nargs {
            0 => Arity::Flag,
            n if n > 0 => Arity::Exactly(n as usize),
            n => Arity::UpTo(n.unsigned_abs() as usize),
        }
    }

    /// Signed form of the arity, saturating at `i32::MAX` values
    pub fn nargs(self) -> i32 {
        match self {
            Arity::Flag => 0,
            Arity::Exactly(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Arity::UpTo(n) => -i32::try_from(n).unwrap_or(i32::MAX),
        }
    }

    /// Whether more than one value may be supplied
    pub fn is_list(self) -> bool {
        match self {
            Arity::Flag => false,
            Arity::Exactly(n) => n > 1,
            Arity::UpTo(_) => true,
        }
    }

    pub fn min(self) -> usize {
        match self {
            Arity::Flag => 0,
            Arity::Exactly(n) => n,
            Arity::UpTo(_) => 1,
        }
    }

    pub fn max(self) -> usize {
        match self {
            Arity::Flag => 0,
            Arity::Exactly(n) | Arity::UpTo(n) => n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nargs())
    }
}

/// One declared argument
#[derive(Debug, Clone)]
pub struct Entry {
    pub(crate) name: String,
    pub(crate) keys: Vec<String>,
    pub(crate) help: String,
    pub(crate) arity: Arity,
    pub(crate) required: bool,
    /// 0 for key entries, slot order (from 1) for positionals
    pub(crate) position: usize,
    pub(crate) found: bool,
    pub(crate) cell: Cell,
}

impl Entry {
    pub(crate) fn new(
        cell: Cell,
        name: impl Into<String>,
        keys: Vec<String>,
        help: impl Into<String>,
        arity: Arity,
        required: bool,
    ) -> Self {
        Entry {
            name: name.into(),
            keys,
            help: help.into(),
            arity,
            required,
            position: 0,
            found: false,
            cell,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_positional(&self) -> bool {
        self.position > 0
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub(crate) fn cell_mut(&mut self) -> &mut Cell {
        &mut self.cell
    }

    /// Placeholder shown for the entry's values in help text
    pub fn metavar(&self) -> String {
        self.name.to_uppercase().replace('-', "_")
    }

    /// Key used to name the entry in diagnostics
    pub fn display_key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or(&self.name)
    }

    /// Reject cell/arity pairings the assignment engine cannot honour
    pub(crate) fn validate(&self) -> RegistrationResult<()> {
        match self.arity {
            Arity::Flag if self.is_positional() => {
                Err(RegistrationError::PositionalFlag(self.name.clone()))
            }
            Arity::Flag if self.cell.is_list() => {
                Err(RegistrationError::FlagList(self.name.clone()))
            }
            Arity::Flag if !self.cell.accepts_flag() => {
                Err(RegistrationError::FlagWithoutValue(self.name.clone()))
            }
            arity if arity.is_list() && !self.cell.is_list() => {
                Err(RegistrationError::NotListType {
                    name: self.name.clone(),
                    nargs: arity.nargs(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cell: Cell, nargs: i32) -> Entry {
        Entry::new(cell, "value", vec!["-v".to_string()], "", Arity::from_nargs(nargs), false)
    }

    #[test]
    fn test_arity_from_nargs() {
        assert_eq!(Arity::from_nargs(0), Arity::Flag);
        assert_eq!(Arity::from_nargs(1), Arity::Exactly(1));
        assert_eq!(Arity::from_nargs(-3), Arity::UpTo(3));
        assert_eq!(Arity::from_nargs(-3).nargs(), -3);
        assert!(!Arity::Exactly(1).is_list());
        assert!(Arity::Exactly(2).is_list());
        assert_eq!(Arity::UpTo(4).min(), 1);
    }

    #[test]
    fn test_extreme_nargs_saturate() {
        let widest = Arity::from_nargs(i32::MIN);
        assert_eq!(widest, Arity::UpTo(1 << 31));
        assert_eq!(widest.nargs(), -i32::MAX);
        assert_eq!(widest.to_string(), i32::MIN.saturating_add(1).to_string());
        assert_eq!(Arity::from_nargs(i32::MAX).nargs(), i32::MAX);
    }

    #[test]
    fn test_validate_flag_pairings() {
        assert!(entry(Cell::flag(), 0).validate().is_ok());
        assert!(entry(Cell::counter(), 0).validate().is_ok());
        assert_eq!(
            entry(Cell::string_list(), 0).validate(),
            Err(RegistrationError::FlagList("value".to_string()))
        );
        assert_eq!(
            entry(Cell::string(""), 0).validate(),
            Err(RegistrationError::FlagWithoutValue("value".to_string()))
        );
    }

    #[test]
    fn test_validate_list_pairings() {
        assert!(entry(Cell::number_list::<u8>(vec![]), -3).validate().is_ok());
        assert!(entry(Cell::number_list::<u8>(vec![]), 1).validate().is_ok());
        assert!(matches!(
            entry(Cell::number(0u8), 2).validate(),
            Err(RegistrationError::NotListType { nargs: 2, .. })
        ));
        assert!(matches!(
            entry(Cell::number(0u8), -1).validate(),
            Err(RegistrationError::NotListType { nargs: -1, .. })
        ));
    }

    #[test]
    fn test_metavar() {
        let e = Entry::new(Cell::string(""), "out-dir", vec![], "", Arity::Exactly(1), false);
        assert_eq!(e.metavar(), "OUT_DIR");
        assert_eq!(e.display_key(), "out-dir");
    }
}
