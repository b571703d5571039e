//! Core schema types
//!
//! This module defines the data structures that represent an argwalk.yml
//! argument schema.

use crate::help::HelpLayout;
use crate::parser::Settings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level schema structure; sub-commands nest the same structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Schema {
    /// Program name shown in usage (defaults to the binary name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prog: Option<String>,

    /// Usage line replacing the generated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilog: Option<String>,

    /// Message language tag such as `de` or `en_US`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Prefix prepended to every `env` variable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_prefix: Option<String>,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub layout: HelpLayout,

    /// Arguments in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSpec>,

    /// Sub-commands selected by the first positional token
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub commands: IndexMap<String, Schema>,
}

/// One declared argument
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentSpec {
    pub name: String,

    /// Match keys; an argument without keys is positional
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    #[serde(default)]
    pub help: String,

    /// Value type: `i8`..`i64`, `u8`..`u64`, `int`, `uint`, `f32`, `f64`,
    /// `float`, `bool`, `flag`, `char`, `string`, `choice`, `count`
    #[serde(rename = "type", default = "default_type")]
    pub value_type: String,

    /// 0 flag, N exactly N values, -N up to N values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<i32>,

    /// Store values in a list even when `nargs` is 1
    #[serde(default)]
    pub list: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Scalar>,

    /// Allowed names of a `choice` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Choices>,

    /// Value stored when the argument appears without a value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_value: Option<Scalar>,

    /// Environment variables read by `argwalk env`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,

    /// Dotted key read by `argwalk config` (defaults to the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_key: Option<String>,
}

fn default_type() -> String {
    "string".to_string()
}

impl ArgumentSpec {
    pub fn is_positional(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the type takes no value by default
    pub fn is_switch_type(&self) -> bool {
        matches!(self.value_type.as_str(), "bool" | "flag" | "count" | "counter")
    }

    /// Declared `nargs`, or 0 for switch types and 1 otherwise
    pub fn effective_nargs(&self) -> i32 {
        self.nargs
            .unwrap_or(if self.is_switch_type() { 0 } else { 1 })
    }

    pub fn config_key(&self) -> &str {
        self.config_key.as_deref().unwrap_or(&self.name)
    }
}

/// A YAML scalar kept as text for conversion by a cell
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::UInt(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// A default given as one scalar or a list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl DefaultValue {
    /// Default values as text, in order
    pub fn texts(&self) -> Vec<String> {
        match self {
            DefaultValue::One(s) => vec![s.to_string()],
            DefaultValue::Many(items) => items.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Choice names, optionally with explicit numeric values
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Choices {
    Names(Vec<String>),
    Values(IndexMap<String, i64>),
}

impl Choices {
    /// Name to value map; bare names are numbered from 0
    pub fn to_map(&self) -> IndexMap<String, i64> {
        match self {
            Choices::Names(names) => names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i as i64))
                .collect(),
            Choices::Values(map) => map.clone(),
        }
    }
}
