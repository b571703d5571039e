//! Localized message text
//!
//! User-visible text is looked up by [`MessageKind`] in a per-locale table.
//! The locale is chosen when a [`Messages`] value is built, either directly or
//! through a selector function supplied by the caller.

mod tables;

use crate::error::{ConversionError, ParseError};
use std::fmt;

/// Every piece of user-visible text the parser emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    UnknownArgument,
    UnexpectedPositional,
    InvalidAssignment,
    AssignmentFailed,
    MissingAssignment,
    MissingListAssignment,
    TooManyAssignment,
    MissingArgument,
    NotListType,
    HelpRequested,
    HelpDisplayed,
    InvalidInput,
    BoundaryLow,
    BoundaryHigh,
    ErrorPrefix,
    UsagePrefix,
    PositionalHeading,
    OptionsHeading,
    HelpFlagHelp,
    OptionsPlaceholder,
}

/// Supported message languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    German,
}

impl Locale {
    /// Pick a locale from a tag such as `de`, `de_DE.UTF-8` or `en-US`.
    /// Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" => Locale::German,
            _ => Locale::English,
        }
    }
}

/// Message table bound to one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Messages { locale }
    }

    /// Build with the locale returned by `selector`
    pub fn select<F: FnOnce() -> Locale>(selector: F) -> Self {
        Self::new(selector())
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Raw template with `{name}` placeholders
    pub fn template(&self, kind: MessageKind) -> &'static str {
        tables::lookup(self.locale, kind)
    }

    /// Fill the placeholders of `kind`'s template
    pub fn format(&self, kind: MessageKind, args: &[(&str, &dyn fmt::Display)]) -> String {
        let mut text = self.template(kind).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), &value.to_string());
        }
        text
    }

    pub fn reason(&self, error: ConversionError) -> &'static str {
        self.template(match error {
            ConversionError::InvalidInput => MessageKind::InvalidInput,
            ConversionError::BoundaryLow => MessageKind::BoundaryLow,
            ConversionError::BoundaryHigh => MessageKind::BoundaryHigh,
        })
    }

    /// One-line description of a parse error
    pub fn describe(&self, error: &ParseError) -> String {
        use MessageKind as K;
        match error {
            ParseError::UnknownArgument(key) => self.format(K::UnknownArgument, &[("key", key)]),
            ParseError::UnexpectedPositional(value) => {
                self.format(K::UnexpectedPositional, &[("value", value)])
            }
            ParseError::InvalidAssignment { key, value } => {
                self.format(K::InvalidAssignment, &[("key", key), ("value", value)])
            }
            ParseError::AssignmentFailed { key, value, reason } => self.format(
                K::AssignmentFailed,
                &[("key", key), ("value", value), ("reason", &self.reason(*reason))],
            ),
            ParseError::MissingAssignment(key) => {
                self.format(K::MissingAssignment, &[("key", key)])
            }
            ParseError::MissingListAssignment { key, expected, found } => self.format(
                K::MissingListAssignment,
                &[("key", key), ("expected", expected), ("found", found)],
            ),
            ParseError::TooManyAssignment { key, expected, found } => self.format(
                K::TooManyAssignment,
                &[("key", key), ("expected", expected), ("found", found)],
            ),
            ParseError::MissingArgument(name) => {
                self.format(K::MissingArgument, &[("name", name)])
            }
            ParseError::NotListType(key) => self.format(K::NotListType, &[("key", key)]),
            ParseError::HelpRequested => self.template(K::HelpRequested).to_string(),
        }
    }

    /// Error line as written to the error sink
    pub fn error_line(&self, error: &ParseError) -> String {
        format!("{}: {}", self.template(MessageKind::ErrorPrefix), self.describe(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("de_DE.UTF-8"), Locale::German);
        assert_eq!(Locale::from_tag("DE"), Locale::German);
        assert_eq!(Locale::from_tag("en-US"), Locale::English);
        assert_eq!(Locale::from_tag("C"), Locale::English);
        assert_eq!(Locale::from_tag(""), Locale::English);
    }

    #[test]
    fn test_describe_fills_placeholders() {
        let messages = Messages::default();
        let error = ParseError::TooManyAssignment {
            key: "-l".to_string(),
            expected: 3,
            found: 4,
        };
        assert_eq!(
            messages.describe(&error),
            "argument '-l' accepts at most 3 value(s), found 4"
        );
    }

    #[test]
    fn test_describe_conversion_reason() {
        let messages = Messages::new(Locale::English);
        let error = ParseError::AssignmentFailed {
            key: "--port".to_string(),
            value: "70000".to_string(),
            reason: ConversionError::BoundaryHigh,
        };
        assert_eq!(
            messages.error_line(&error),
            "error: cannot assign '70000' to '--port': value is above the maximum"
        );
    }

    #[test]
    fn test_selected_locale() {
        let messages = Messages::select(|| Locale::from_tag("de"));
        assert_eq!(messages.locale(), Locale::German);
        assert_eq!(
            messages.describe(&ParseError::MissingArgument("file".to_string())),
            "erforderliches Argument 'file' fehlt"
        );
    }
}
