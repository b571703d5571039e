//! Text to value conversion
//!
//! Every cell owns a [`Kind`] that turns one raw token into a [`Value`].
//! Numeric kinds carry a closed `[min, max]` range; a token that parses but
//! falls outside it is reported as a boundary failure rather than invalid input.

use crate::cell::Value;
use crate::error::{ConversionError, ConversionResult};
use indexmap::IndexMap;

/// Element type of a cell, with its conversion constraints
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Signed {
        min: i64,
        max: i64,
        name: &'static str,
    },
    Unsigned {
        min: u64,
        max: u64,
        name: &'static str,
    },
    Float {
        min: f64,
        max: f64,
        name: &'static str,
    },
    Bool,
    Char,
    Str,
    /// Named choices mapped to their numeric values
    Enum(IndexMap<String, i64>),
    /// Incrementing occurrence counter
    Counter,
}

impl Kind {
    /// Convert a raw token into a value of this kind
    pub fn convert(&self, raw: &str) -> ConversionResult<Value> {
        match self {
            Kind::Signed { min, max, .. } => {
                let v = parse_integer(raw)?;
                check_bounds(v, i128::from(*min), i128::from(*max))?;
                // Bounds fit in i64, so the narrowing is lossless
                Ok(Value::Signed(v as i64))
            }
            Kind::Unsigned { min, max, .. } => {
                let v = parse_integer(raw)?;
                check_bounds(v, i128::from(*min), i128::from(*max))?;
                Ok(Value::Unsigned(v as u64))
            }
            Kind::Counter => {
                let v = parse_integer(raw)?;
                check_bounds(v, 0, i128::from(u64::MAX))?;
                Ok(Value::Unsigned(v as u64))
            }
            Kind::Float { min, max, .. } => {
                let v: f64 = raw.parse().map_err(|_| ConversionError::InvalidInput)?;
                if v.is_nan() {
                    return Err(ConversionError::InvalidInput);
                }
                check_bounds(v, *min, *max)?;
                Ok(Value::Float(v))
            }
            Kind::Bool => parse_bool(raw).map(Value::Bool),
            Kind::Char => parse_char(raw).map(Value::Char),
            Kind::Str => Ok(Value::Str(raw.to_string())),
            Kind::Enum(choices) => choices
                .get(raw)
                .map(|v| Value::Enum(*v))
                .ok_or(ConversionError::InvalidInput),
        }
    }

    /// Short type name used in help and diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::Signed { name, .. } | Kind::Unsigned { name, .. } | Kind::Float { name, .. } => {
                name
            }
            Kind::Bool => "bool",
            Kind::Char => "char",
            Kind::Str => "string",
            Kind::Enum(_) => "enum",
            Kind::Counter => "count",
        }
    }

    /// Render a stored value back to its textual form
    pub fn render(&self, value: &Value) -> String {
        if let (Kind::Enum(choices), Value::Enum(v)) = (self, value) {
            if let Some((name, _)) = choices.iter().find(|(_, n)| *n == v) {
                return name.clone();
            }
        }
        value.to_string()
    }

    /// The zero value used when a cell is built without an explicit default
    pub fn zero(&self) -> Value {
        match self {
            Kind::Signed { .. } => Value::Signed(0),
            Kind::Unsigned { .. } | Kind::Counter => Value::Unsigned(0),
            Kind::Float { .. } => Value::Float(0.0),
            Kind::Bool => Value::Bool(false),
            Kind::Char => Value::Char('\0'),
            Kind::Str => Value::Str(String::new()),
            Kind::Enum(choices) => Value::Enum(choices.values().next().copied().unwrap_or(0)),
        }
    }
}

/// Parse a boolean token: `t`, `true`, `1`, `f`, `false`, `0`, any case
pub fn parse_bool(raw: &str) -> ConversionResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "t" | "true" | "1" => Ok(true),
        "f" | "false" | "0" => Ok(false),
        _ => Err(ConversionError::InvalidInput),
    }
}

fn parse_char(raw: &str) -> ConversionResult<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConversionError::InvalidInput),
    }
}

// Wider than any supported width, so one past a 64-bit limit is still a
// number and gets reported as a boundary failure.
fn parse_integer(raw: &str) -> ConversionResult<i128> {
    raw.parse::<i128>().map_err(|_| ConversionError::InvalidInput)
}

fn check_bounds<T: PartialOrd>(v: T, min: T, max: T) -> ConversionResult<()> {
    if v < min {
        Err(ConversionError::BoundaryLow)
    } else if v > max {
        Err(ConversionError::BoundaryHigh)
    } else {
        Ok(())
    }
}

/// Numeric widths a cell can be built for
pub trait Numeric: Copy + Into<Value> {
    const MIN: Self;
    const MAX: Self;

    /// Kind restricted to `[min, max]`
    fn kind(min: Self, max: Self) -> Kind;
}

macro_rules! numeric {
    ($variant:ident, $wide:ty: $($t:ty),*) => {
        $(
            impl Numeric for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                fn kind(min: Self, max: Self) -> Kind {
                    Kind::$variant {
                        min: <$wide>::from(min),
                        max: <$wide>::from(max),
                        name: stringify!($t),
                    }
                }
            }
        )*
    };
}

numeric!(Signed, i64: i8, i16, i32, i64);
numeric!(Unsigned, u64: u8, u16, u32, u64);
numeric!(Float, f64: f32, f64);
