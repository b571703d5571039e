//! Main CLI application

use crate::config::{
    build_config_parser, build_env_parser, build_parser, command_schema, parse_schema_auto,
    parse_schema_file, Schema,
};
use crate::error::{ArgwalkError, ParseFailure};
use crate::i18n::{Locale, Messages};
use crate::registry::Registry;
use anyhow::Context as _;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use serde_yaml::{Mapping, Value};
use std::io::{self, Write};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
    Trace = 4,
}

impl Verbosity {
    /// Log level installed for this verbosity
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::Off,
            Verbosity::Quiet => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Verbose => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// CLI application
pub struct App {
    /// Loaded schema
    schema: Schema,
    /// Schema file path
    schema_path: PathBuf,
    messages: Messages,
    verbosity: Verbosity,
}

impl App {
    /// Create a new app from the discovered schema file
    pub fn new() -> Result<Self, ArgwalkError> {
        let (schema, schema_path) = parse_schema_auto()?;
        Ok(Self::from_schema(schema, schema_path))
    }

    /// Create app with a specific schema file
    pub fn with_schema_file(path: PathBuf) -> Result<Self, ArgwalkError> {
        let schema = parse_schema_file(&path)?;
        Ok(Self::from_schema(schema, path))
    }

    fn from_schema(schema: Schema, schema_path: PathBuf) -> Self {
        let messages = Messages::select(|| Locale::from_tag(&locale_tag(None, &schema)));
        App {
            schema,
            schema_path,
            messages,
            verbosity: Verbosity::Normal,
        }
    }

    /// Override the schema's message language
    pub fn with_locale(mut self, tag: &str) -> Self {
        self.messages = Messages::new(Locale::from_tag(tag));
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    fn prog(&self) -> String {
        self.schema.prog.clone().unwrap_or_else(|| "app".to_string())
    }

    /// Run the subcommand selected in `matches`. Returns the exit code.
    pub fn run(self, matches: &ArgMatches) -> anyhow::Result<i32> {
        log::debug!("using schema {}", self.schema_path.display());
        match matches.subcommand() {
            Some(("parse", sub)) => self.run_parse(sub),
            Some(("env", sub)) => self.run_env(sub),
            Some(("config", sub)) => self.run_config(sub),
            Some(("help", sub)) => self.run_help(sub),
            _ => {
                build_command().print_help()?;
                println!();
                Ok(0)
            }
        }
    }

    fn run_parse(&self, matches: &ArgMatches) -> anyhow::Result<i32> {
        let tokens: Vec<String> = matches
            .get_many::<String>("tokens")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let overrides = Overrides {
            abort_on_error: matches.get_flag("abort-on-error"),
            ignore_unknown: matches.get_flag("ignore-unknown"),
        };

        let mut report = Mapping::new();
        let ok = self.parse_level(&self.schema, self.prog(), &tokens, 0, overrides, &mut report)?;
        if !ok {
            return Ok(1);
        }
        print_yaml(report)?;
        Ok(0)
    }

    /// Parse one schema level, then descend into the matched sub-command
    fn parse_level(
        &self,
        schema: &Schema,
        prog: String,
        tokens: &[String],
        start: usize,
        overrides: Overrides,
        report: &mut Mapping,
    ) -> anyhow::Result<bool> {
        let mut schema = schema.clone();
        schema.settings.abort_on_error |= overrides.abort_on_error;
        schema.settings.ignore_unknown_key |= overrides.ignore_unknown;

        let mut parser = build_parser(&schema, &prog, self.messages)?;
        let mut out = io::stdout();
        let mut err = self.error_sink();
        let index = match parser.parse_with(tokens, start..tokens.len(), &mut out, &mut err) {
            Ok(index) => index,
            Err(failure) => {
                log::debug!("{}: {}", prog, failure);
                return Ok(false);
            }
        };
        collect_found(parser.registry(), report)?;

        let stop = match &parser.settings().stop_positional {
            Some(stop) if !schema.commands.is_empty() => stop.clone(),
            _ => return Ok(true),
        };
        let Some(entry) = parser.registry().by_name(&stop).filter(|e| e.is_found()) else {
            return Ok(true);
        };
        let command = entry.cell().to_string();
        let sub = command_schema(&schema, &command)?;

        let mut child = Mapping::new();
        let ok = self.parse_level(sub, format!("{} {}", prog, command), tokens, index, overrides, &mut child)?;
        report.insert(Value::String(command), Value::Mapping(child));
        Ok(ok)
    }

    fn run_env(&self, matches: &ArgMatches) -> anyhow::Result<i32> {
        match matches.get_one::<PathBuf>("env-file") {
            Some(path) => {
                dotenvy::from_path(path)
                    .with_context(|| format!("Failed to load env file {}", path.display()))?;
            }
            None => {
                if let Ok(path) = dotenvy::dotenv() {
                    log::debug!("loaded {}", path.display());
                }
            }
        }

        let mut parser = build_env_parser(&self.schema)?;
        match parser.parse() {
            Ok(assigned) => {
                log::info!("{} variable(s) assigned", assigned);
                let mut report = Mapping::new();
                collect_found(parser.registry(), &mut report)?;
                print_yaml(report)?;
                Ok(0)
            }
            Err(failure) => {
                self.report_errors(&failure);
                Ok(1)
            }
        }
    }

    fn run_config(&self, matches: &ArgMatches) -> anyhow::Result<i32> {
        let path = matches
            .get_one::<PathBuf>("values")
            .context("No values file given")?;
        let ignore_unknown = matches.get_flag("ignore-unknown");

        let mut parser = build_config_parser(&self.schema, ignore_unknown)?;
        match parser.parse_file(path) {
            Ok(_) => {
                let mut report = Mapping::new();
                collect_found(parser.registry(), &mut report)?;
                print_yaml(report)?;
                Ok(0)
            }
            Err(ArgwalkError::Parse(failure)) => {
                self.report_errors(&failure);
                Ok(1)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read values from {}", path.display())),
        }
    }

    fn run_help(&self, matches: &ArgMatches) -> anyhow::Result<i32> {
        let (schema, prog) = match matches.get_one::<String>("command") {
            Some(name) => (command_schema(&self.schema, name)?, format!("{} {}", self.prog(), name)),
            None => (&self.schema, self.prog()),
        };
        let mut parser = build_parser(schema, &prog, self.messages)?;
        parser.print_help(&mut io::stdout());
        Ok(0)
    }

    fn error_sink(&self) -> Box<dyn Write> {
        if self.verbosity == Verbosity::Silent {
            Box::new(io::sink())
        } else {
            Box::new(io::stderr())
        }
    }

    fn report_errors(&self, failure: &ParseFailure) {
        let mut err = self.error_sink();
        for error in &failure.errors {
            if let Err(e) = writeln!(err, "{}", self.messages.error_line(error)) {
                log::warn!("failed to write error: {}", e);
            }
        }
    }
}

/// Policy switches from the `parse` subcommand
#[derive(Debug, Clone, Copy)]
struct Overrides {
    abort_on_error: bool,
    ignore_unknown: bool,
}

/// Add every found entry except help to `report`
fn collect_found(registry: &Registry, report: &mut Mapping) -> anyhow::Result<()> {
    for entry in registry.entries().filter(|e| e.is_found() && e.name() != "help") {
        let value = serde_yaml::to_value(entry.cell())?;
        report.insert(Value::String(entry.name().to_string()), value);
    }
    Ok(())
}

fn print_yaml(report: Mapping) -> anyhow::Result<()> {
    let text = serde_yaml::to_string(&Value::Mapping(report))?;
    print!("{}", text);
    Ok(())
}

/// Language tag: explicit, then schema, then `LC_ALL`/`LANG`
fn locale_tag(explicit: Option<&str>, schema: &Schema) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| schema.locale.clone())
        .or_else(|| std::env::var("LC_ALL").ok())
        .or_else(|| std::env::var("LANG").ok())
        .unwrap_or_default()
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("argwalk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse arguments, environment variables and config files against a YAML schema")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to argwalk.yml schema file")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print results and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print results only")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output (repeat for more)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .value_name("TAG")
                .help("Message language, e.g. en or de")
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse tokens against the schema and print the found values")
                .arg(
                    Arg::new("abort-on-error")
                        .long("abort-on-error")
                        .help("Stop at the first error")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("ignore-unknown")
                        .long("ignore-unknown")
                        .help("Skip unknown keys")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("tokens")
                        .value_name("TOKENS")
                        .num_args(0..)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true)
                        .help("Tokens to parse (put them after --)"),
                ),
        )
        .subcommand(
            Command::new("env")
                .about("Read the schema's environment variables")
                .arg(
                    Arg::new("env-file")
                        .long("env-file")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Load variables from this file instead of .env"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Read values from a YAML file")
                .arg(
                    Arg::new("values")
                        .value_name("VALUES")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML file with values keyed by config key"),
                )
                .arg(
                    Arg::new("ignore-unknown")
                        .long("ignore-unknown")
                        .help("Skip keys the schema does not declare")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("help")
                .about("Print the rendered help of the schema or a sub-command")
                .arg(Arg::new("command").value_name("COMMAND")),
        )
        .disable_help_subcommand(true)
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else {
        match matches.get_count("verbose") {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let result = env_logger::Builder::new()
        .filter_level(verbosity.level_filter())
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
    if result.is_err() {
        log::debug!("logger already installed");
    }
}

/// Run the CLI application. Returns the process exit code.
pub fn run() -> anyhow::Result<i32> {
    let matches = build_command().get_matches();
    let verbosity = get_verbosity(&matches);
    init_logging(verbosity);

    let mut app = match matches.get_one::<PathBuf>("file") {
        Some(path) => App::with_schema_file(path.clone())?,
        None => App::new()?,
    }
    .with_verbosity(verbosity);
    if let Some(tag) = matches.get_one::<String>("locale") {
        app = app.with_locale(tag);
    }

    app.run(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_consistent() {
        build_command().debug_assert();
    }

    #[test]
    fn test_get_verbosity_normal() {
        let matches = build_command().get_matches_from(vec!["argwalk"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_get_verbosity_levels() {
        let matches = build_command().get_matches_from(vec!["argwalk", "-vv", "help"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Trace);
        let matches = build_command().get_matches_from(vec!["argwalk", "-q", "-v"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Quiet);
        assert_eq!(Verbosity::Silent.level_filter(), LevelFilter::Off);
    }

    #[test]
    fn test_parse_tokens_keep_hyphens() {
        let matches = build_command().get_matches_from(vec![
            "argwalk", "parse", "--abort-on-error", "--", "-v", "--input=8",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("abort-on-error"));
        let tokens: Vec<&String> = sub.get_many::<String>("tokens").unwrap().collect();
        assert_eq!(tokens, vec!["-v", "--input=8"]);
    }

    #[test]
    fn test_locale_tag_precedence() {
        let schema = Schema {
            locale: Some("de".to_string()),
            ..Schema::default()
        };
        assert_eq!(locale_tag(Some("en"), &schema), "en");
        assert_eq!(locale_tag(None, &schema), "de");
    }
}
