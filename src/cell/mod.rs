//! Typed value cells
//!
//! A [`Cell`] is the storage and conversion unit behind one registered
//! argument. It holds either one value or an ordered list of values of a single
//! [`Kind`], converts raw tokens through that kind, and leaves its contents
//! untouched when a conversion fails.

mod convert;
mod value;

pub use convert::{parse_bool, Kind, Numeric};
pub use value::{FromValue, Value};

use crate::error::{ConversionError, ConversionResult};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// Storage and conversion unit of one argument
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    kind: Kind,
    store: Store,
}

#[derive(Debug, Clone, PartialEq)]
enum Store {
    Scalar {
        value: Value,
        default: Value,
        /// Value stored when the argument appears as a bare flag
        when_present: Option<Value>,
    },
    List {
        values: Vec<Value>,
        defaults: Vec<Value>,
    },
}

impl Cell {
    fn scalar(kind: Kind, default: Value) -> Self {
        Cell {
            kind,
            store: Store::Scalar {
                value: default.clone(),
                default,
                when_present: None,
            },
        }
    }

    fn list(kind: Kind, defaults: Vec<Value>) -> Self {
        Cell {
            kind,
            store: Store::List {
                values: defaults.clone(),
                defaults,
            },
        }
    }

    /// Numeric scalar accepting the full range of `T`
    pub fn number<T: Numeric>(default: T) -> Self {
        Self::ranged(default, T::MIN, T::MAX)
    }

    /// Numeric scalar restricted to `[min, max]`
    pub fn ranged<T: Numeric>(default: T, min: T, max: T) -> Self {
        Self::scalar(T::kind(min, max), default.into())
    }

    /// Numeric list accepting the full range of `T`
    pub fn number_list<T: Numeric>(defaults: Vec<T>) -> Self {
        Self::ranged_list(defaults, T::MIN, T::MAX)
    }

    /// Numeric list whose elements are restricted to `[min, max]`
    pub fn ranged_list<T: Numeric>(defaults: Vec<T>, min: T, max: T) -> Self {
        Self::list(
            T::kind(min, max),
            defaults.into_iter().map(Into::into).collect(),
        )
    }

    /// Boolean switch: `false` until the flag is seen
    pub fn flag() -> Self {
        Self::boolean(false)
    }

    /// Boolean scalar; a bare flag stores the opposite of `default`
    pub fn boolean(default: bool) -> Self {
        Self::scalar(Kind::Bool, Value::Bool(default)).when_present(!default)
    }

    pub fn bool_list() -> Self {
        Self::list(Kind::Bool, Vec::new())
    }

    pub fn character(default: char) -> Self {
        Self::scalar(Kind::Char, Value::Char(default))
    }

    pub fn char_list() -> Self {
        Self::list(Kind::Char, Vec::new())
    }

    pub fn string(default: impl Into<String>) -> Self {
        Self::scalar(Kind::Str, Value::Str(default.into()))
    }

    pub fn string_list() -> Self {
        Self::list(Kind::Str, Vec::new())
    }

    /// Scalar restricted to the names of `choices`
    pub fn choice<S: Into<String>>(choices: impl IntoIterator<Item = (S, i64)>, default: i64) -> Self {
        Self::scalar(Kind::Enum(collect_choices(choices)), Value::Enum(default))
    }

    /// List whose elements are restricted to the names of `choices`
    pub fn choice_list<S: Into<String>>(choices: impl IntoIterator<Item = (S, i64)>) -> Self {
        Self::list(Kind::Enum(collect_choices(choices)), Vec::new())
    }

    /// Occurrence counter, incremented each time its flag is seen
    pub fn counter() -> Self {
        Self::scalar(Kind::Counter, Value::Unsigned(0))
    }

    /// Scalar of `kind` holding the kind's zero value
    pub fn of_kind(kind: Kind, list: bool) -> Self {
        if list {
            Self::list(kind, Vec::new())
        } else {
            let zero = kind.zero();
            Self::scalar(kind, zero)
        }
    }

    /// Set the value stored when the argument appears without a value.
    /// Has no effect on list cells.
    pub fn when_present(mut self, value: impl Into<Value>) -> Self {
        if let Store::Scalar { when_present, .. } = &mut self.store {
            *when_present = Some(value.into());
        }
        self
    }

    /// Convert `raw` and store it. Scalars replace their value, lists append,
    /// counters take `raw` as the new count. On failure nothing changes.
    pub fn set_value(&mut self, raw: &str) -> ConversionResult<()> {
        let converted = self.kind.convert(raw)?;
        match &mut self.store {
            Store::Scalar { value, .. } => *value = converted,
            Store::List { values, .. } => values.push(converted),
        }
        Ok(())
    }

    /// Apply a bare flag occurrence
    pub fn set_value_flag(&mut self) -> ConversionResult<()> {
        match (&self.kind, &mut self.store) {
            (Kind::Counter, Store::Scalar { value, .. }) => {
                if let Value::Unsigned(count) = value {
                    *count = count.saturating_add(1);
                }
                Ok(())
            }
            (
                _,
                Store::Scalar {
                    value,
                    when_present: Some(present),
                    ..
                },
            ) => {
                *value = present.clone();
                Ok(())
            }
            _ => Err(ConversionError::InvalidInput),
        }
    }

    /// Whether a bare flag occurrence can be applied
    pub fn accepts_flag(&self) -> bool {
        match &self.store {
            Store::Scalar { when_present, .. } => {
                when_present.is_some() || self.kind == Kind::Counter
            }
            Store::List { .. } => false,
        }
    }

    /// Lists with no elements and empty strings are empty
    pub fn is_empty(&self) -> bool {
        match &self.store {
            Store::Scalar { value, .. } => matches!(value, Value::Str(s) if s.is_empty()),
            Store::List { values, .. } => values.is_empty(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.store, Store::List { .. })
    }

    pub fn is_counter(&self) -> bool {
        self.kind == Kind::Counter
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Number of stored values (always 1 for scalars)
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Restore the defaults the cell was built with
    pub fn reset(&mut self) {
        match &mut self.store {
            Store::Scalar { value, default, .. } => *value = default.clone(),
            Store::List { values, defaults } => *values = defaults.clone(),
        }
    }

    /// Make the current contents the defaults that [`Cell::reset`] restores
    pub fn commit_defaults(&mut self) {
        match &mut self.store {
            Store::Scalar { value, default, .. } => *default = value.clone(),
            Store::List { values, defaults } => *defaults = values.clone(),
        }
    }

    /// Current scalar value, or the first list element
    pub fn value(&self) -> Option<&Value> {
        self.values().first()
    }

    /// All stored values in insertion order
    pub fn values(&self) -> &[Value] {
        match &self.store {
            Store::Scalar { value, .. } => std::slice::from_ref(value),
            Store::List { values, .. } => values,
        }
    }

    pub fn get<T: FromValue>(&self) -> Option<T> {
        self.value().and_then(T::from_value)
    }

    /// Every stored value readable as `T`
    pub fn get_all<T: FromValue>(&self) -> Vec<T> {
        self.values().iter().filter_map(T::from_value).collect()
    }

    /// Names of the choices of an enum cell
    pub fn choices(&self) -> Vec<&str> {
        match &self.kind {
            Kind::Enum(choices) => choices.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

fn collect_choices<S: Into<String>>(choices: impl IntoIterator<Item = (S, i64)>) -> IndexMap<String, i64> {
    choices
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect()
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.values().iter().map(|v| self.kind.render(v)).collect();
        f.write_str(&rendered.join(","))
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let render = |v: &Value| match v {
            Value::Enum(_) => Value::Str(self.kind.render(v)),
            other => other.clone(),
        };
        match &self.store {
            Store::Scalar { value, .. } => render(value).serialize(serializer),
            Store::List { values, .. } => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for v in values {
                    seq.serialize_element(&render(v))?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cell_boundaries_leave_value_unchanged() {
        let mut cell = Cell::ranged(5i32, -10, 10);

        assert_eq!(cell.set_value("-11"), Err(ConversionError::BoundaryLow));
        assert_eq!(cell.get::<i32>(), Some(5));
        assert_eq!(cell.set_value("11"), Err(ConversionError::BoundaryHigh));
        assert_eq!(cell.get::<i32>(), Some(5));

        cell.set_value("-10").unwrap();
        assert_eq!(cell.get::<i32>(), Some(-10));
        cell.set_value("10").unwrap();
        assert_eq!(cell.get::<i32>(), Some(10));
    }

    #[test]
    fn test_full_width_boundaries() {
        let mut cell = Cell::number(0u8);
        cell.set_value("255").unwrap();
        assert_eq!(cell.get::<u8>(), Some(255));
        assert_eq!(cell.set_value("256"), Err(ConversionError::BoundaryHigh));
        assert_eq!(cell.set_value("-1"), Err(ConversionError::BoundaryLow));
        assert_eq!(cell.get::<u8>(), Some(255));

        let mut cell = Cell::number(0i64);
        assert_eq!(
            cell.set_value("9223372036854775808"),
            Err(ConversionError::BoundaryHigh)
        );
        assert_eq!(
            cell.set_value("-9223372036854775809"),
            Err(ConversionError::BoundaryLow)
        );
        assert_eq!(cell.get::<i64>(), Some(0));
    }

    #[test]
    fn test_bool_list_stays_empty_on_invalid() {
        let mut cell = Cell::bool_list();
        assert_eq!(cell.set_value("yes"), Err(ConversionError::InvalidInput));
        assert!(cell.is_empty());

        cell.set_value("T").unwrap();
        cell.set_value("0").unwrap();
        assert_eq!(cell.get_all::<bool>(), vec![true, false]);
    }

    #[test]
    fn test_flag_and_counter() {
        let mut flag = Cell::flag();
        assert_eq!(flag.get::<bool>(), Some(false));
        flag.set_value_flag().unwrap();
        assert_eq!(flag.get::<bool>(), Some(true));

        let mut counter = Cell::counter();
        for _ in 0..3 {
            counter.set_value_flag().unwrap();
        }
        assert_eq!(counter.get::<u32>(), Some(3));
        counter.set_value("7").unwrap();
        assert_eq!(counter.get::<u32>(), Some(7));
    }

    #[test]
    fn test_when_present_alternate() {
        let mut cell = Cell::number(0u16).when_present(8080u16);
        assert!(cell.accepts_flag());
        cell.set_value_flag().unwrap();
        assert_eq!(cell.get::<u16>(), Some(8080));

        let mut plain = Cell::string("x");
        assert!(!plain.accepts_flag());
        assert_eq!(plain.set_value_flag(), Err(ConversionError::InvalidInput));
    }

    #[test]
    fn test_reset_and_commit_defaults() {
        let mut cell = Cell::number_list(vec![1u32, 2]);
        cell.set_value("3").unwrap();
        assert_eq!(cell.get_all::<u32>(), vec![1, 2, 3]);
        cell.reset();
        assert_eq!(cell.get_all::<u32>(), vec![1, 2]);

        let mut cell = Cell::string("");
        cell.set_value("kept").unwrap();
        cell.commit_defaults();
        cell.set_value("other").unwrap();
        cell.reset();
        assert_eq!(cell.get::<String>(), Some("kept".to_string()));
    }

    #[test]
    fn test_display_round_trip() {
        let mut cell = Cell::choice_list([("low", 1), ("high", 9)]);
        cell.set_value("high").unwrap();
        cell.set_value("low").unwrap();
        assert_eq!(cell.to_string(), "high,low");
        assert_eq!(cell.get_all::<i64>(), vec![9, 1]);

        let mut cell = Cell::number(0.0f64);
        cell.set_value("2.5").unwrap();
        let text = cell.to_string();
        let mut copy = Cell::number(0.0f64);
        copy.set_value(&text).unwrap();
        assert_eq!(copy, cell);
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(Cell::number(0i16).type_name(), "i16");
        assert_eq!(Cell::string_list().type_name(), "string");
        assert!(Cell::string_list().is_list());
        assert!(!Cell::flag().is_list());
        assert!(Cell::counter().is_counter());
    }

    #[test]
    fn test_serialize_enum_by_name() {
        let cell = Cell::choice([("fast", 1), ("slow", 2)], 2);
        let yaml = serde_yaml::to_string(&cell).unwrap();
        assert_eq!(yaml.trim(), "slow");
    }
}
