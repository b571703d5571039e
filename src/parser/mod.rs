//! Command-line parser
//!
//! [`ArgParser`] owns a [`Registry`], the message table and the help layout of
//! one program (or sub-command). A parse pass walks a range of tokens, writes
//! converted values into the registered cells, and reports every recorded
//! error through injected output sinks.
//!
//! Sub-commands are composed: the parent names a stop positional, and the
//! caller hands the tokens after the returned index to a child parser.

mod assign;
mod matcher;
mod session;
mod settings;

pub(crate) use assign::{assign_key_flag_value, assign_key_value, assign_list_key_value, split_list};
pub use settings::Settings;

use crate::cell::{Cell, FromValue};
use crate::error::{ParseError, ParseFailure, RegistrationError, RegistrationResult};
use crate::help::{HelpLayout, HelpRenderer, HelpText};
use crate::i18n::{MessageKind, Messages};
use crate::registry::{Entry, EntryId, Registry};
use matcher::Matcher;
use session::Session;
use std::io::{self, Write};
use std::ops::Range;

/// Declared arguments plus everything needed to parse and explain them
#[derive(Debug, Clone)]
pub struct ArgParser {
    prog: String,
    text: HelpText,
    registry: Registry,
    settings: Settings,
    layout: HelpLayout,
    messages: Messages,
    help_id: Option<EntryId>,
    errors: Vec<ParseError>,
}

impl ArgParser {
    /// Create a parser for `prog` with default settings
    pub fn new(prog: impl Into<String>) -> Self {
        ArgParser {
            prog: prog.into(),
            text: HelpText::default(),
            registry: Registry::new(),
            settings: Settings::default(),
            layout: HelpLayout::default(),
            messages: Messages::default(),
            help_id: None,
            errors: Vec::new(),
        }
    }

    /// Replace the settings. A help entry registered earlier takes the new
    /// prefix; keys of user arguments are not rewritten.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self.refresh_help();
        self
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self.refresh_help();
        self
    }

    pub fn with_layout(mut self, layout: HelpLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the generated usage line. `%(prog)` is substituted.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.text.usage = Some(usage.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.text.description = Some(description.into());
        self
    }

    pub fn with_epilog(mut self, epilog: impl Into<String>) -> Self {
        self.text.epilog = Some(epilog.into());
        self
    }

    pub fn prog(&self) -> &str {
        &self.prog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a key-matched argument. Every key must start with the
    /// configured prefix.
    pub fn add_key_argument<K: Into<String>>(
        &mut self,
        cell: Cell,
        name: impl Into<String>,
        keys: impl IntoIterator<Item = K>,
        help: impl Into<String>,
        nargs: i32,
        required: bool,
    ) -> RegistrationResult<EntryId> {
        self.ensure_help();
        let name = name.into();
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let prefix = &self.settings.key_prefix;
        if let Some(key) = keys.iter().find(|k| !k.starts_with(prefix.as_str()) || k.len() == prefix.len()) {
            return Err(RegistrationError::MissingPrefix {
                key: key.clone(),
                name,
                prefix: prefix.clone(),
            });
        }
        self.registry.add_key(cell, name, keys, help, nargs, required)
    }

    /// Register the next positional slot
    pub fn add_positional_argument(
        &mut self,
        cell: Cell,
        name: impl Into<String>,
        help: impl Into<String>,
        nargs: i32,
        required: bool,
    ) -> RegistrationResult<EntryId> {
        self.ensure_help();
        self.registry.add_positional(cell, name, help, nargs, required)
    }

    /// Entry matched by exactly `key`
    pub fn find_matching_arg(&self, key: &str) -> Option<&Entry> {
        self.registry
            .find_matching_arg(key)
            .and_then(|id| self.registry.get(id))
    }

    /// Register the help entry ahead of the first user argument
    fn ensure_help(&mut self) {
        if !self.settings.add_help || self.help_id.is_some() {
            return;
        }
        let help = self.messages.template(MessageKind::HelpFlagHelp);
        let keys = self.settings.help_keys();
        match self.registry.add_key(Cell::flag(), "help", keys, help, 0, false) {
            Ok(id) => self.help_id = Some(id),
            Err(e) => log::warn!("could not register help entry: {}", e),
        }
    }

    /// Bring an injected help entry in line with the current prefix and
    /// message table
    fn refresh_help(&mut self) {
        let Some(id) = self.help_id else {
            return;
        };
        let keys = self.settings.help_keys().to_vec();
        if let Err(e) = self.registry.rekey(id, keys) {
            log::warn!("could not move help keys: {}", e);
        }
        let help = self.messages.template(MessageKind::HelpFlagHelp);
        if let Some(entry) = self.registry.get_mut(id) {
            entry.help = help.to_string();
        }
    }

    /// Parse every token, writing diagnostics to stdout/stderr
    pub fn parse<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<usize, ParseFailure> {
        self.parse_range(tokens, 0..tokens.len())
    }

    /// Parse `tokens[range]`, writing diagnostics to stdout/stderr
    pub fn parse_range<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
        range: Range<usize>,
    ) -> Result<usize, ParseFailure> {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.parse_with(tokens, range, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Parse the process arguments, skipping the program name
    pub fn parse_env_args(&mut self) -> Result<usize, ParseFailure> {
        let tokens: Vec<String> = std::env::args().collect();
        let start = tokens.len().min(1);
        self.parse_range(&tokens, start..tokens.len())
    }

    /// Parse `tokens[range]`.
    ///
    /// Returns the index one past the last consumed token, not the index of
    /// the last consumed token itself, so `tokens[index..]` is exactly the
    /// unconsumed rest. When a stop positional matched, that rest is left for
    /// a sub-command parser. Found flags are cleared first; values are not.
    ///
    /// On failure each error is written to `err` as one line, followed by the
    /// help text when help was requested or `help_on_error` is set. Displayed
    /// help is announced with one line on `out`.
    pub fn parse_with<S, O, E>(
        &mut self,
        tokens: &[S],
        range: Range<usize>,
        out: &mut O,
        err: &mut E,
    ) -> Result<usize, ParseFailure>
    where
        S: AsRef<str>,
        O: Write,
        E: Write,
    {
        self.ensure_help();
        self.registry.clear_found();
        self.errors.clear();

        let end = range.end.min(tokens.len());
        let start = range.start.min(end);
        let mut session = Session::new(start, end, self.settings.abort_on_error);
        log::debug!("{}: parsing tokens {}..{}", self.prog, start, end);

        Matcher::new(&mut self.registry, &self.settings, self.help_id, tokens).walk(&mut session);

        if !session.aborted {
            let missing: Vec<String> = self
                .registry
                .missing_required()
                .map(|e| e.name().to_string())
                .collect();
            for name in missing {
                session.record(ParseError::MissingArgument(name));
                if session.aborted {
                    break;
                }
            }
        }

        self.errors = session.errors.clone();
        if !session.failed() {
            log::debug!("{}: consumed up to token {}", self.prog, session.index);
            return Ok(session.index);
        }

        for error in self.errors.iter().filter(|e| **e != ParseError::HelpRequested) {
            emit(err, &self.messages.error_line(error));
        }
        let help_displayed = session.help || self.settings.help_on_error;
        if help_displayed {
            emit(err, self.help_text().trim_end());
            emit(out, self.messages.template(MessageKind::HelpDisplayed));
        }

        Err(ParseFailure {
            errors: self.errors.clone(),
            help_displayed,
        })
    }

    /// Errors recorded by the last pass
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn value<T: FromValue>(&self, name: &str) -> Option<T> {
        self.registry.value(name)
    }

    pub fn values<T: FromValue>(&self, name: &str) -> Vec<T> {
        self.registry.values(name)
    }

    pub fn is_found(&self, name: &str) -> bool {
        self.registry.is_found(name)
    }

    /// Rendered help block
    pub fn help_text(&self) -> String {
        HelpRenderer::new(&self.prog, &self.text, &self.layout, &self.messages).render(&self.registry)
    }

    pub fn usage(&self) -> String {
        HelpRenderer::new(&self.prog, &self.text, &self.layout, &self.messages).usage(&self.registry)
    }

    pub fn print_help<W: Write>(&mut self, sink: &mut W) {
        self.ensure_help();
        emit(sink, self.help_text().trim_end());
    }

    /// Restore every cell to its defaults and forget recorded errors
    pub fn reset(&mut self) {
        self.registry.reset();
        self.errors.clear();
    }
}

fn emit<W: Write>(sink: &mut W, line: &str) {
    if let Err(e) = writeln!(sink, "{}", line) {
        log::warn!("failed to write parser output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(parser: &mut ArgParser, tokens: &[&str]) -> (Result<usize, ParseFailure>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = parser.parse_with(tokens, 0..tokens.len(), &mut out, &mut err);
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn quiet() -> Settings {
        Settings::default().with_help_on_error(false)
    }

    #[test]
    fn test_key_value_forms() {
        for tokens in [&["-i", "8"][..], &["--input=8"][..], &["--input", "8"][..]] {
            let mut parser = ArgParser::new("prog");
            parser
                .add_key_argument(Cell::number(0u32), "input", ["-i", "--input"], "", 1, false)
                .unwrap();
            let (result, _, _) = run(&mut parser, tokens);
            assert_eq!(result, Ok(tokens.len()));
            assert!(parser.is_found("input"));
            assert_eq!(parser.value::<u32>("input"), Some(8));
        }
    }

    #[test]
    fn test_short_cluster() {
        let mut parser = ArgParser::new("prog");
        parser.add_key_argument(Cell::flag(), "force", ["-f"], "", 0, false).unwrap();
        parser.add_key_argument(Cell::counter(), "count", ["-c"], "", 0, false).unwrap();

        run(&mut parser, &["-fccc"]).0.unwrap();
        assert_eq!(parser.value::<bool>("force"), Some(true));
        assert_eq!(parser.value::<u64>("count"), Some(3));

        let mut separate = parser.clone();
        separate.reset();
        run(&mut separate, &["-f", "-c", "-c", "-c"]).0.unwrap();
        assert_eq!(separate.value::<u64>("count"), Some(3));
        assert_eq!(separate.value::<bool>("force"), Some(true));
    }

    #[test]
    fn test_cluster_last_key_takes_value() {
        let mut parser = ArgParser::new("prog");
        parser.add_key_argument(Cell::flag(), "force", ["-f"], "", 0, false).unwrap();
        parser.add_key_argument(Cell::string(""), "out", ["-o"], "", 1, false).unwrap();
        run(&mut parser, &["-fo", "file.txt"]).0.unwrap();
        assert_eq!(parser.value::<String>("out").as_deref(), Some("file.txt"));
        assert!(parser.is_found("force"));
    }

    #[test]
    fn test_too_many_list_values() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        parser
            .add_key_argument(Cell::number_list::<i32>(vec![]), "levels", ["-l"], "", -3, false)
            .unwrap();
        let (result, _, err) = run(&mut parser, &["-l", "1,2,3,4"]);
        let failure = result.unwrap_err();
        assert_eq!(
            failure.errors,
            vec![ParseError::TooManyAssignment {
                key: "-l".to_string(),
                expected: 3,
                found: 4,
            }]
        );
        assert!(parser.values::<i32>("levels").is_empty());
        assert_eq!(err, "error: argument '-l' accepts at most 3 value(s), found 4\n");
    }

    #[test]
    fn test_list_forms() {
        let mut parser = ArgParser::new("prog");
        parser
            .add_key_argument(Cell::number_list::<i32>(vec![]), "levels", ["-l"], "", -3, false)
            .unwrap();
        run(&mut parser, &["-l,1,2"]).0.unwrap();
        assert_eq!(parser.values::<i32>("levels"), vec![1, 2]);

        parser.reset();
        run(&mut parser, &["-l", "1", "2", "3"]).0.unwrap();
        assert_eq!(parser.values::<i32>("levels"), vec![1, 2, 3]);
    }

    #[test]
    fn test_accumulate_reports_every_missing_required() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        parser.add_key_argument(Cell::string(""), "mode", ["-m"], "", 1, true).unwrap();
        parser.add_positional_argument(Cell::string(""), "source", "", 1, true).unwrap();
        parser.add_positional_argument(Cell::string(""), "dest", "", 1, true).unwrap();

        let failure = run(&mut parser, &["a.txt"]).0.unwrap_err();
        assert_eq!(
            failure.errors,
            vec![
                ParseError::MissingArgument("mode".to_string()),
                ParseError::MissingArgument("dest".to_string()),
            ]
        );
    }

    #[test]
    fn test_abort_stops_at_first_error() {
        let settings = quiet().with_abort_on_error(true);
        let mut parser = ArgParser::new("prog").with_settings(settings);
        parser.add_key_argument(Cell::number(0u8), "n", ["-n"], "", 1, true).unwrap();
        let failure = run(&mut parser, &["-x", "-y"]).0.unwrap_err();
        assert_eq!(failure.errors, vec![ParseError::UnknownArgument("-x".to_string())]);
    }

    #[test]
    fn test_unknown_ignored() {
        let settings = Settings::default().with_ignore_unknown_key(true);
        let mut parser = ArgParser::new("prog").with_settings(settings);
        parser.add_key_argument(Cell::flag(), "v", ["-v"], "", 0, false).unwrap();
        assert_eq!(run(&mut parser, &["--what", "-v"]).0, Ok(2));
        assert!(parser.is_found("v"));
    }

    #[test]
    fn test_value_for_flag_is_invalid() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        parser.add_key_argument(Cell::flag(), "v", ["--verbose"], "", 0, false).unwrap();
        let failure = run(&mut parser, &["--verbose=yes"]).0.unwrap_err();
        assert_eq!(
            failure.errors,
            vec![ParseError::InvalidAssignment {
                key: "--verbose".to_string(),
                value: "yes".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_value() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        parser.add_key_argument(Cell::string(""), "out", ["-o"], "", 1, false).unwrap();
        parser.add_key_argument(Cell::flag(), "v", ["-v"], "", 0, false).unwrap();
        let failure = run(&mut parser, &["-o", "-v"]).0.unwrap_err();
        assert_eq!(failure.errors, vec![ParseError::MissingAssignment("-o".to_string())]);
        assert!(parser.is_found("v"));
    }

    #[test]
    fn test_negative_number_is_a_value() {
        let mut parser = ArgParser::new("prog");
        parser
            .add_key_argument(Cell::number(0i32), "offset", ["-o"], "", 1, false)
            .unwrap();
        parser.add_positional_argument(Cell::number(0i32), "base", "", 1, false).unwrap();
        run(&mut parser, &["-o", "-5", "-7"]).0.unwrap();
        assert_eq!(parser.value::<i32>("offset"), Some(-5));
        assert_eq!(parser.value::<i32>("base"), Some(-7));
    }

    #[test]
    fn test_unexpected_positional() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        let failure = run(&mut parser, &["stray"]).0.unwrap_err();
        assert_eq!(
            failure.errors,
            vec![ParseError::UnexpectedPositional("stray".to_string())]
        );
    }

    #[test]
    fn test_help_writes_both_sinks() {
        let mut parser = ArgParser::new("prog").with_description("Does things.");
        parser.add_key_argument(Cell::flag(), "v", ["-v"], "Be loud", 0, false).unwrap();
        let (result, out, err) = run(&mut parser, &["--help", "-v"]);
        let failure = result.unwrap_err();
        assert!(failure.help_requested());
        assert!(failure.help_displayed);
        assert_eq!(out, "parser failed, help displayed\n");
        assert!(err.starts_with("usage: prog [options]"));
        assert!(err.contains("-h, --help, -?"));
        assert!(err.contains("Be loud"));
        assert!(!err.contains("error:"));
        // Walk stopped at the help key
        assert!(!parser.is_found("v"));
    }

    #[test]
    fn test_help_disabled() {
        let settings = quiet().with_add_help(false);
        let mut parser = ArgParser::new("prog").with_settings(settings);
        parser.add_key_argument(Cell::flag(), "v", ["-v"], "", 0, false).unwrap();
        assert!(parser.find_matching_arg("-h").is_none());
        let failure = run(&mut parser, &["-h"]).0.unwrap_err();
        assert_eq!(failure.errors, vec![ParseError::UnknownArgument("-h".to_string())]);
    }

    #[test]
    fn test_help_keys_are_reserved() {
        let mut parser = ArgParser::new("prog");
        assert!(matches!(
            parser.add_key_argument(Cell::string(""), "host", ["-h"], "", 1, false),
            Err(RegistrationError::DuplicateKey { .. })
        ));

        let mut parser = ArgParser::new("prog").with_settings(Settings::default().with_add_help(false));
        parser.add_key_argument(Cell::string(""), "host", ["-h"], "", 1, false).unwrap();
        run(&mut parser, &["-h", "example.org"]).0.unwrap();
        assert_eq!(parser.value::<String>("host").as_deref(), Some("example.org"));
    }

    #[test]
    fn test_comma_joined_negative_list_values() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        parser
            .add_key_argument(Cell::number_list::<i32>(vec![]), "levels", ["-l"], "", -3, false)
            .unwrap();
        parser
            .add_key_argument(Cell::number_list::<f64>(vec![]), "point", ["-p"], "", 2, false)
            .unwrap();

        assert_eq!(run(&mut parser, &["-l", "-1,-2"]).0, Ok(2));
        assert_eq!(parser.values::<i32>("levels"), vec![-1, -2]);

        parser.reset();
        run(&mut parser, &["-p", "-1.5,-2", "-l", "3,-4,5"]).0.unwrap();
        assert_eq!(parser.values::<f64>("point"), vec![-1.5, -2.0]);
        assert_eq!(parser.values::<i32>("levels"), vec![3, -4, 5]);
    }

    #[test]
    fn test_list_values_stop_at_arity() {
        let mut parser = ArgParser::new("prog").with_settings(quiet());
        parser
            .add_key_argument(Cell::number_list::<u8>(vec![]), "pair", ["-p"], "", 2, false)
            .unwrap();
        parser.add_positional_argument(Cell::number(0u8), "rest", "", 1, false).unwrap();

        assert_eq!(run(&mut parser, &["-p", "1", "2", "3"]).0, Ok(4));
        assert_eq!(parser.values::<u8>("pair"), vec![1, 2]);
        assert_eq!(parser.value::<u8>("rest"), Some(3));
    }

    #[test]
    fn test_late_builders_update_help_entry() {
        let mut parser = ArgParser::new("prog");
        parser.add_key_argument(Cell::flag(), "v", ["-v"], "", 0, false).unwrap();
        let mut parser = parser
            .with_settings(quiet().with_key_prefix("/"))
            .with_messages(Messages::new(crate::i18n::Locale::German));

        assert!(parser.find_matching_arg("-h").is_none());
        let help = parser.find_matching_arg("//help").unwrap();
        assert_eq!(help.keys(), ["/h", "//help", "/?"]);
        assert_eq!(help.help(), "diese Hilfe anzeigen und beenden");

        let failure = run(&mut parser, &["/?"]).0.unwrap_err();
        assert!(failure.help_requested());
    }

    #[test]
    fn test_key_prefix_enforced() {
        let mut parser = ArgParser::new("prog");
        assert_eq!(
            parser.add_key_argument(Cell::flag(), "v", ["verbose"], "", 0, false),
            Err(RegistrationError::MissingPrefix {
                key: "verbose".to_string(),
                name: "v".to_string(),
                prefix: "-".to_string(),
            })
        );
    }

    #[test]
    fn test_stop_positional_leaves_rest() {
        let settings = Settings::default().with_stop_positional("command");
        let mut parser = ArgParser::new("tool").with_settings(settings);
        parser.add_key_argument(Cell::flag(), "v", ["-v"], "", 0, false).unwrap();
        parser
            .add_positional_argument(Cell::string(""), "command", "", 1, true)
            .unwrap();

        let tokens = ["-v", "build", "--release", "x"];
        let index = run(&mut parser, &tokens).0.unwrap();
        assert_eq!(index, 2);
        assert_eq!(parser.value::<String>("command").as_deref(), Some("build"));

        let mut child = ArgParser::new("tool build");
        child.add_key_argument(Cell::flag(), "release", ["--release"], "", 0, false).unwrap();
        child.add_positional_argument(Cell::string(""), "target", "", 1, false).unwrap();
        let mut sink = Vec::new();
        let end = child.parse_with(&tokens, index..tokens.len(), &mut sink, &mut io::sink());
        assert_eq!(end, Ok(4));
        assert!(child.is_found("release"));
        assert_eq!(child.value::<String>("target").as_deref(), Some("x"));
    }

    #[test]
    fn test_found_cleared_values_kept() {
        let mut parser = ArgParser::new("prog");
        parser.add_key_argument(Cell::number(1u8), "n", ["-n"], "", 1, false).unwrap();
        run(&mut parser, &["-n", "4"]).0.unwrap();
        run(&mut parser, &[]).0.unwrap();
        assert!(!parser.is_found("n"));
        assert_eq!(parser.value::<u8>("n"), Some(4));
        parser.reset();
        assert_eq!(parser.value::<u8>("n"), Some(1));
    }

    #[test]
    fn test_help_on_error_renders_help() {
        let mut parser = ArgParser::new("prog");
        let (result, out, err) = run(&mut parser, &["--nope"]);
        assert!(result.unwrap_err().help_displayed);
        assert!(err.starts_with("error: unknown argument '--nope'\nusage: prog"));
        assert_eq!(out, "parser failed, help displayed\n");
    }
}
