//! Help text rendering
//!
//! Formats the entries of a [`Registry`] into an aligned two-column listing
//! (option string, wrapped help), preceded by a usage line and description and
//! followed by an epilog.

pub mod wrap;

pub use wrap::wrap;

use crate::i18n::{MessageKind, Messages};
use crate::registry::{Arity, Entry, Registry};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Token replaced by the program name in usage, description and epilog
pub const PROG_TOKEN: &str = "%(prog)";

/// Column layout of the help listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HelpLayout {
    /// Spaces before each option string
    pub indent: usize,
    /// Column where help text starts
    pub option_width: usize,
    /// Maximum line width
    pub total_width: usize,
    /// Characters a help line may break at
    pub break_chars: String,
    /// Bold section headings
    pub color: bool,
}

impl Default for HelpLayout {
    fn default() -> Self {
        HelpLayout {
            indent: 2,
            option_width: 24,
            total_width: 80,
            break_chars: " -/,".to_string(),
            color: false,
        }
    }
}

/// Free-form texts around the argument listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpText {
    pub usage: Option<String>,
    pub description: Option<String>,
    pub epilog: Option<String>,
}

/// Replace every `%(prog)` in `text`
pub fn substitute_prog(text: &str, prog: &str) -> String {
    text.replace(PROG_TOKEN, prog)
}

/// Option column text of an entry: keys (or metavar) followed by value slots
pub fn option_string(entry: &Entry) -> String {
    let metavar = entry.metavar();
    let mut slots: Vec<String> = Vec::new();
    if !entry.is_positional() {
        slots.push(entry.keys().join(", "));
    }
    match entry.arity() {
        Arity::Flag => {}
        Arity::Exactly(n) => slots.extend(std::iter::repeat(metavar.clone()).take(n)),
        Arity::UpTo(_) => {
            slots.push(metavar.clone());
            slots.push(format!("[{} ...]", metavar));
        }
    }
    slots.join(" ")
}

/// Renders help for one parser
pub struct HelpRenderer<'a> {
    prog: &'a str,
    text: &'a HelpText,
    layout: &'a HelpLayout,
    messages: &'a Messages,
}

impl<'a> HelpRenderer<'a> {
    pub fn new(
        prog: &'a str,
        text: &'a HelpText,
        layout: &'a HelpLayout,
        messages: &'a Messages,
    ) -> Self {
        HelpRenderer {
            prog,
            text,
            layout,
            messages,
        }
    }

    /// Usage line: the configured one, or one built from the registry
    pub fn usage(&self, registry: &Registry) -> String {
        let prefix = self.messages.template(MessageKind::UsagePrefix);
        let body = match &self.text.usage {
            Some(usage) => substitute_prog(usage, self.prog),
            None => {
                let mut parts = vec![self.prog.to_string()];
                if registry.options().next().is_some() {
                    parts.push(self.messages.template(MessageKind::OptionsPlaceholder).to_string());
                }
                for entry in registry.positionals() {
                    let slot = option_string(entry);
                    if entry.is_required() {
                        parts.push(slot);
                    } else {
                        parts.push(format!("[{}]", slot));
                    }
                }
                parts.join(" ")
            }
        };
        format!("{} {}", prefix, body)
    }

    /// Full help block
    pub fn render(&self, registry: &Registry) -> String {
        let mut out = String::new();
        out.push_str(&self.usage(registry));
        out.push('\n');

        if let Some(description) = &self.text.description {
            out.push('\n');
            self.push_paragraph(&mut out, description);
        }

        let positionals: Vec<&Entry> = registry.positionals().collect();
        if !positionals.is_empty() {
            out.push('\n');
            self.push_section(&mut out, MessageKind::PositionalHeading, &positionals);
        }

        let options: Vec<&Entry> = registry.options().collect();
        if !options.is_empty() {
            out.push('\n');
            self.push_section(&mut out, MessageKind::OptionsHeading, &options);
        }

        if let Some(epilog) = &self.text.epilog {
            out.push('\n');
            self.push_paragraph(&mut out, epilog);
        }
        out
    }

    fn push_paragraph(&self, out: &mut String, text: &str) {
        let text = substitute_prog(text, self.prog);
        for line in wrap(&text, self.layout.total_width, &self.layout.break_chars) {
            out.push_str(&line);
            out.push('\n');
        }
    }

    fn push_section(&self, out: &mut String, heading: MessageKind, entries: &[&Entry]) {
        let heading = self.messages.template(heading);
        if self.layout.color {
            out.push_str(&heading.bold().to_string());
        } else {
            out.push_str(heading);
        }
        out.push('\n');
        for entry in entries {
            self.push_entry(out, entry);
        }
    }

    fn push_entry(&self, out: &mut String, entry: &Entry) {
        let layout = self.layout;
        let lead = format!("{}{}", " ".repeat(layout.indent), option_string(entry));
        let help_width = layout.total_width.saturating_sub(layout.option_width).max(10);
        let help = wrap(entry.help(), help_width, &layout.break_chars);
        let pad = " ".repeat(layout.option_width);

        if entry.help().is_empty() {
            out.push_str(&lead);
            out.push('\n');
            return;
        }

        let mut lines = help.iter();
        if lead.chars().count() + 2 > layout.option_width {
            // Too wide for the column: help starts on its own line
            out.push_str(&lead);
            out.push('\n');
        } else if let Some(first) = lines.next() {
            out.push_str(&format!("{:<width$}{}\n", lead, first, width = layout.option_width));
        }
        for line in lines {
            out.push_str(&pad);
            out.push_str(line);
            out.push('\n');
        }
    }
}
