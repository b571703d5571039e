//! Parser behaviour switches

use serde::{Deserialize, Serialize};

/// Token syntax and error policy of one parser
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Leading text that marks a token as a key-switch
    pub key_prefix: String,

    /// Separates key and inline value (`--input=8`)
    pub assignment_delimiter: char,

    /// Separates values inside one list token (`1,2,3`)
    pub list_delimiter: char,

    /// Expand `-fcc` into `-f -c -c`
    pub cluster_short_keys: bool,

    /// Skip unknown keys instead of recording an error
    pub ignore_unknown_key: bool,

    /// Stop at the first error
    pub abort_on_error: bool,

    /// Render help after a failed parse
    pub help_on_error: bool,

    /// Register `-h, --help, -?`
    pub add_help: bool,

    /// Positional whose match ends the pass, leaving the rest of the tokens
    /// to a sub-command parser
    pub stop_positional: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            key_prefix: "-".to_string(),
            assignment_delimiter: '=',
            list_delimiter: ',',
            cluster_short_keys: true,
            ignore_unknown_key: false,
            abort_on_error: false,
            help_on_error: true,
            add_help: true,
            stop_positional: None,
        }
    }
}

impl Settings {
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_abort_on_error(mut self, abort: bool) -> Self {
        self.abort_on_error = abort;
        self
    }

    pub fn with_ignore_unknown_key(mut self, ignore: bool) -> Self {
        self.ignore_unknown_key = ignore;
        self
    }

    pub fn with_help_on_error(mut self, help: bool) -> Self {
        self.help_on_error = help;
        self
    }

    pub fn with_add_help(mut self, add: bool) -> Self {
        self.add_help = add;
        self
    }

    pub fn with_cluster_short_keys(mut self, cluster: bool) -> Self {
        self.cluster_short_keys = cluster;
        self
    }

    /// Name the positional that hands the remaining tokens to a sub-parser
    pub fn with_stop_positional(mut self, name: impl Into<String>) -> Self {
        self.stop_positional = Some(name.into());
        self
    }

    /// Keys of the injected help entry
    pub fn help_keys(&self) -> [String; 3] {
        let p = &self.key_prefix;
        [format!("{p}h"), format!("{p}{p}help"), format!("{p}?")]
    }
}
