//! Schema validation and parser construction
//!
//! Turns a [`Schema`] into ready-to-use parsers: an [`ArgParser`] for
//! command-line tokens, an [`EnvParser`] for the arguments that declare
//! environment variables, and a [`ConfigParser`] keyed by config keys.

use crate::cell::{parse_bool, Cell, Numeric};
use crate::config::types::{ArgumentSpec, Scalar, Schema};
use crate::error::{ArgwalkError, SchemaError, SchemaResult};
use crate::frontend::{ConfigParser, EnvParser};
use crate::i18n::Messages;
use crate::parser::ArgParser;
use crate::registry::Arity;
use std::collections::HashSet;
use std::str::FromStr;

/// Name of the positional injected for schemas with sub-commands
pub const COMMAND_POSITIONAL: &str = "command";

/// Validate a complete schema, sub-commands included
pub fn validate_schema(schema: &Schema) -> SchemaResult<()> {
    let mut names = HashSet::new();
    for spec in &schema.arguments {
        if !names.insert(spec.name.as_str()) {
            return Err(SchemaError::Invalid(format!(
                "argument '{}' is declared twice",
                spec.name
            )));
        }
        build_cell(spec)?;
    }

    if !schema.commands.is_empty() {
        if schema.settings.stop_positional.is_none() && names.contains(COMMAND_POSITIONAL) {
            return Err(SchemaError::Invalid(format!(
                "argument name '{}' is reserved when commands are declared",
                COMMAND_POSITIONAL
            )));
        }
        if let Some(stop) = &schema.settings.stop_positional {
            if !schema.arguments.iter().any(|a| &a.name == stop && a.is_positional()) {
                return Err(SchemaError::Invalid(format!(
                    "stop positional '{}' is not a declared positional",
                    stop
                )));
            }
        }
    }

    for (name, command) in &schema.commands {
        validate_schema(command).map_err(|e| match e {
            SchemaError::Invalid(msg) => SchemaError::Invalid(format!("{}: {}", name, msg)),
            other => other,
        })?;
    }
    Ok(())
}

/// Build the cell an argument stores its values in
pub fn build_cell(spec: &ArgumentSpec) -> SchemaResult<Cell> {
    let arity = Arity::from_nargs(spec.effective_nargs());
    let list = spec.list || arity.is_list();

    let mut cell = match spec.value_type.as_str() {
        "i8" => ranged::<i8>(spec, list)?,
        "i16" => ranged::<i16>(spec, list)?,
        "i32" => ranged::<i32>(spec, list)?,
        "i64" | "int" | "integer" => ranged::<i64>(spec, list)?,
        "u8" => ranged::<u8>(spec, list)?,
        "u16" => ranged::<u16>(spec, list)?,
        "u32" => ranged::<u32>(spec, list)?,
        "u64" | "uint" => ranged::<u64>(spec, list)?,
        "f32" => ranged::<f32>(spec, list)?,
        "f64" | "float" => ranged::<f64>(spec, list)?,
        "bool" | "boolean" | "flag" if list => Cell::bool_list(),
        "bool" | "boolean" | "flag" => {
            // Bare flag stores the opposite of the default
            let default = match spec.default.as_ref().map(|d| d.texts()) {
                Some(texts) => texts
                    .first()
                    .map(|t| parse_bool(t))
                    .transpose()
                    .map_err(|_| invalid_default(spec, &texts.join(",")))?
                    .unwrap_or(false),
                None => false,
            };
            return with_flag_value(Cell::boolean(default), spec);
        }
        "char" if list => Cell::char_list(),
        "char" => Cell::character('\0'),
        "string" | "str" if list => Cell::string_list(),
        "string" | "str" => Cell::string(""),
        "choice" | "enum" => {
            let choices = spec
                .choices
                .as_ref()
                .map(|c| c.to_map())
                .filter(|m| !m.is_empty())
                .ok_or_else(|| {
                    SchemaError::Invalid(format!("choice argument '{}' has no choices", spec.name))
                })?;
            if list {
                Cell::choice_list(choices)
            } else {
                let first = choices.values().next().copied().unwrap_or(0);
                Cell::choice(choices, first)
            }
        }
        "count" | "counter" => Cell::counter(),
        other => {
            return Err(SchemaError::UnknownType {
                name: spec.name.clone(),
                kind: other.to_string(),
            })
        }
    };

    if let Some(default) = &spec.default {
        for text in default.texts() {
            cell.set_value(&text)
                .map_err(|_| invalid_default(spec, &text))?;
        }
        cell.commit_defaults();
    }
    with_flag_value(cell, spec)
}

fn with_flag_value(cell: Cell, spec: &ArgumentSpec) -> SchemaResult<Cell> {
    let Some(flag_value) = &spec.flag_value else {
        return Ok(cell);
    };
    let text = flag_value.to_string();
    let value = cell
        .kind()
        .convert(&text)
        .map_err(|e| SchemaError::Invalid(format!("argument '{}': flag-value '{}': {}", spec.name, text, e)))?;
    Ok(cell.when_present(value))
}

fn invalid_default(spec: &ArgumentSpec, text: &str) -> SchemaError {
    SchemaError::Invalid(format!(
        "argument '{}': default '{}' is not a valid {}",
        spec.name, text, spec.value_type
    ))
}

fn ranged<T>(spec: &ArgumentSpec, list: bool) -> SchemaResult<Cell>
where
    T: Numeric + FromStr + PartialOrd + Default,
{
    let min = bound(spec, spec.min.as_ref(), T::MIN)?;
    let max = bound(spec, spec.max.as_ref(), T::MAX)?;
    if min > max {
        return Err(SchemaError::Invalid(format!(
            "argument '{}': min is greater than max",
            spec.name
        )));
    }
    if list {
        return Ok(Cell::ranged_list(Vec::new(), min, max));
    }
    let zero = T::default();
    let start = if zero < min {
        min
    } else if zero > max {
        max
    } else {
        zero
    };
    Ok(Cell::ranged(start, min, max))
}

fn bound<T: FromStr>(spec: &ArgumentSpec, scalar: Option<&Scalar>, fallback: T) -> SchemaResult<T> {
    match scalar {
        None => Ok(fallback),
        Some(s) => s.to_string().parse().map_err(|_| {
            SchemaError::Invalid(format!(
                "argument '{}': bound '{}' is not a valid {}",
                spec.name, s, spec.value_type
            ))
        }),
    }
}

/// Build the command-line parser for one schema level
pub fn build_parser(schema: &Schema, prog: &str, messages: Messages) -> Result<ArgParser, ArgwalkError> {
    validate_schema(schema)?;

    let mut settings = schema.settings.clone();
    if !schema.commands.is_empty() && settings.stop_positional.is_none() {
        settings.stop_positional = Some(COMMAND_POSITIONAL.to_string());
    }

    let mut parser = ArgParser::new(prog)
        .with_settings(settings)
        .with_messages(messages)
        .with_layout(schema.layout.clone());
    if let Some(usage) = &schema.usage {
        parser = parser.with_usage(usage.clone());
    }
    if let Some(description) = &schema.description {
        parser = parser.with_description(description.clone());
    }
    if let Some(epilog) = &schema.epilog {
        parser = parser.with_epilog(epilog.clone());
    }

    for spec in &schema.arguments {
        let cell = build_cell(spec)?;
        let nargs = spec.effective_nargs();
        if spec.is_positional() {
            parser.add_positional_argument(cell, &spec.name, &spec.help, nargs, spec.required)?;
        } else {
            parser.add_key_argument(cell, &spec.name, &spec.keys, &spec.help, nargs, spec.required)?;
        }
    }

    if !schema.commands.is_empty() && schema.settings.stop_positional.is_none() {
        let choices = schema
            .commands
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as i64));
        let names: Vec<&str> = schema.commands.keys().map(String::as_str).collect();
        let help = format!("{{{}}}", names.join(","));
        parser.add_positional_argument(Cell::choice(choices, 0), COMMAND_POSITIONAL, help, 1, true)?;
    }

    Ok(parser)
}

/// Build the environment parser over the arguments that declare `env`
pub fn build_env_parser(schema: &Schema) -> Result<EnvParser, ArgwalkError> {
    validate_schema(schema)?;
    let mut parser = EnvParser::new()
        .with_prefix(schema.env_prefix.clone().unwrap_or_default())
        .with_list_delimiter(schema.settings.list_delimiter);
    for spec in schema.arguments.iter().filter(|s| !s.env.is_empty()) {
        let cell = build_cell(spec)?;
        parser.add_variable(cell, &spec.name, &spec.env, &spec.help, spec.effective_nargs(), spec.required)?;
    }
    Ok(parser)
}

/// Build the config-file parser keyed by each argument's config key
pub fn build_config_parser(schema: &Schema, ignore_unknown: bool) -> Result<ConfigParser, ArgwalkError> {
    validate_schema(schema)?;
    let mut parser = ConfigParser::new()
        .with_ignore_unknown(ignore_unknown)
        .with_list_delimiter(schema.settings.list_delimiter);
    for spec in &schema.arguments {
        let cell = build_cell(spec)?;
        parser.add_setting(
            cell,
            &spec.name,
            [spec.config_key()],
            &spec.help,
            spec.effective_nargs(),
            spec.required,
        )?;
    }
    Ok(parser)
}

/// Schema of the sub-command `name`
pub fn command_schema<'a>(schema: &'a Schema, name: &str) -> SchemaResult<&'a Schema> {
    schema
        .commands
        .get(name)
        .ok_or_else(|| SchemaError::CommandNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_schema;
    use crate::error::ParseError;
    use std::io;

    fn spec(yaml: &str) -> ArgumentSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_numeric_bounds_and_default() {
        let cell = build_cell(&spec("name: port\ntype: u16\nmin: 1\nmax: 1024\ndefault: 80\n")).unwrap();
        assert_eq!(cell.get::<u16>(), Some(80));
        let mut cell = cell;
        assert!(cell.set_value("0").is_err());
        assert!(cell.set_value("1025").is_err());
        cell.set_value("1").unwrap();
        cell.reset();
        assert_eq!(cell.get::<u16>(), Some(80));
    }

    #[test]
    fn test_scalar_start_inside_range() {
        let cell = build_cell(&spec("name: level\ntype: i8\nmin: 3\nmax: 9\n")).unwrap();
        assert_eq!(cell.get::<i8>(), Some(3));
    }

    #[test]
    fn test_invalid_specs() {
        assert!(matches!(
            build_cell(&spec("name: x\ntype: decimal\n")),
            Err(SchemaError::UnknownType { .. })
        ));
        assert!(matches!(
            build_cell(&spec("name: x\ntype: u8\ndefault: 300\n")),
            Err(SchemaError::Invalid(_))
        ));
        assert!(matches!(
            build_cell(&spec("name: x\ntype: u8\nmin: 5\nmax: 1\n")),
            Err(SchemaError::Invalid(_))
        ));
        assert!(matches!(
            build_cell(&spec("name: x\ntype: choice\n")),
            Err(SchemaError::Invalid(_))
        ));
    }

    #[test]
    fn test_bool_default_inverts_flag() {
        let mut cell = build_cell(&spec("name: color\ntype: bool\ndefault: true\n")).unwrap();
        assert_eq!(cell.get::<bool>(), Some(true));
        cell.set_value_flag().unwrap();
        assert_eq!(cell.get::<bool>(), Some(false));
    }

    #[test]
    fn test_flag_value_for_string() {
        let mut cell = build_cell(&spec(
            "name: color\ntype: string\nnargs: 0\ndefault: never\nflag-value: auto\n",
        ))
        .unwrap();
        cell.set_value_flag().unwrap();
        assert_eq!(cell.get::<String>().as_deref(), Some("auto"));
    }

    #[test]
    fn test_list_defaults() {
        let cell = build_cell(&spec("name: l\ntype: i32\nnargs: -3\ndefault: [1, 2]\n")).unwrap();
        assert_eq!(cell.get_all::<i32>(), vec![1, 2]);
    }

    #[test]
    fn test_build_parser_with_commands() {
        let schema = parse_schema(
            r#"
prog: tool
arguments:
  - name: verbose
    keys: [-v]
    type: flag
commands:
  build:
    arguments:
      - name: release
        keys: [--release]
        type: flag
  test: {}
"#,
        )
        .unwrap();
        let mut parser = build_parser(&schema, "tool", Messages::default()).unwrap();
        let tokens = ["-v", "build", "--release"];
        let index = parser
            .parse_with(&tokens, 0..3, &mut io::sink(), &mut io::sink())
            .unwrap();
        assert_eq!(index, 2);
        assert_eq!(parser.value::<String>(COMMAND_POSITIONAL).as_deref(), Some("build"));

        let build = command_schema(&schema, "build").unwrap();
        let mut child = build_parser(build, "tool build", Messages::default()).unwrap();
        assert_eq!(child.parse_with(&tokens, index..3, &mut io::sink(), &mut io::sink()), Ok(3));
        assert!(child.is_found("release"));

        let failure = parser
            .parse_with(&["deploy"], 0..1, &mut io::sink(), &mut io::sink())
            .unwrap_err();
        assert!(matches!(failure.errors[0], ParseError::AssignmentFailed { .. }));
        assert!(matches!(
            command_schema(&schema, "deploy"),
            Err(SchemaError::CommandNotFound(_))
        ));
    }

    #[test]
    fn test_reserved_command_name() {
        let schema = parse_schema(
            "arguments:\n  - name: command\ncommands:\n  run: {}\n",
        )
        .unwrap();
        assert!(matches!(validate_schema(&schema), Err(SchemaError::Invalid(_))));
    }

    #[test]
    fn test_env_and_config_parsers() {
        let schema = parse_schema(
            r#"
env-prefix: APP_
arguments:
  - name: port
    keys: [-p]
    type: u16
    env: [PORT]
    config-key: server.port
  - name: name
    keys: [-n]
"#,
        )
        .unwrap();
        let env = build_env_parser(&schema).unwrap();
        assert_eq!(env.registry().len(), 1);

        let mut config = build_config_parser(&schema, false).unwrap();
        config.parse_str("server:\n  port: 81\nname: x\n").unwrap();
        assert_eq!(config.value::<u16>("port"), Some(81));
        assert_eq!(config.value::<String>("name").as_deref(), Some("x"));
    }
}
