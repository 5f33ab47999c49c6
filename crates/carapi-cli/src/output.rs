//! Output formatting for carapi-cli

use colored::Colorize;
use serde::Serialize;

/// Context for output rendering
pub struct OutputContext {
    pub compact: bool,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(compact: bool, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { compact, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.green());
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print a response as JSON on stdout
    pub fn print<T: Serialize + ?Sized>(&self, data: &T) {
        println!("{}", self.render(data));
    }

    /// Print key-value pairs (for the auth command)
    pub fn print_kv(&self, pairs: &[(&str, String)]) {
        for (key, value) in pairs {
            println!("{}: {}", key.bold(), value);
        }
    }

    fn render<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let rendered = if self.compact {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };
        rendered.unwrap_or_else(|_| "null".to_string())
    }
}
