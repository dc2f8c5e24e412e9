//! Rendering of command results
//!
//! Every command prints through a [`Formatter`] so that `--json`,
//! `--quiet` and `--no-color` behave the same everywhere. In JSON mode
//! stdout carries exactly one JSON document and errors go to stderr as
//! `{"error": "..."}`.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use console::Style;
use serde::Serialize;

use super::OutputConfig;

/// What a piece of text is, which decides how it is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Folder,
    Size,
    Date,
    Key,
    Url,
    Name,
    Success,
    Error,
    Warning,
}

/// Maps roles to terminal styles
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    colored: bool,
}

impl Theme {
    pub fn colored() -> Self {
        Self { colored: true }
    }

    /// Every role renders as plain text
    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn style(&self, role: Role) -> Style {
        if !self.colored {
            return Style::new();
        }
        match role {
            Role::Folder => Style::new().blue().bold(),
            Role::Size | Role::Success => Style::new().green(),
            Role::Date => Style::new().dim(),
            Role::Key => Style::new().cyan(),
            Role::Url => Style::new().cyan().underlined(),
            Role::Name => Style::new().bold(),
            Role::Error => Style::new().red(),
            Role::Warning => Style::new().yellow(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    theme: Theme,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        let theme = if config.no_color || config.json {
            Theme::plain()
        } else {
            Theme::colored()
        };
        Self { config, theme }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Spinners and progress bars are only drawn for interactive human output
    pub fn progress_enabled(&self) -> bool {
        !self.config.quiet && !self.config.json
    }

    pub fn paint(&self, role: Role, text: &str) -> String {
        self.theme.style(role).apply_to(text).to_string()
    }

    /// `✓ message` on stdout; silent in quiet and JSON mode
    pub fn success(&self, message: &str) {
        if self.human_output() {
            println!("{} {message}", self.paint(Role::Success, "✓"));
        }
    }

    /// `⚠ message` on stderr; silent in quiet and JSON mode
    pub fn warning(&self, message: &str) {
        if self.human_output() {
            eprintln!("{} {message}", self.paint(Role::Warning, "⚠"));
        }
    }

    /// Errors are printed in every mode, quiet included
    pub fn error(&self, message: &str) {
        if self.config.json {
            eprintln!("{}", error_document(message));
        } else {
            eprintln!("{} {message}", self.paint(Role::Error, "✗"));
        }
    }

    /// Pretty-printed JSON on stdout
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => self.error(&format!("Failed to serialize output: {e}")),
        }
    }

    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }

    /// `key: value` with the key right-aligned and styled
    pub fn property(&self, key: &str, value: &str) {
        self.println(&format!("{}: {value}", self.paint(Role::Key, &format!("{key:>10}"))));
    }

    pub fn table(&self, header: &[&str], rows: Vec<Vec<String>>) {
        if !self.config.quiet {
            println!("{}", self.build_table(header, rows));
        }
    }

    fn human_output(&self) -> bool {
        !self.config.quiet && !self.config.json
    }

    fn build_table(&self, header: &[&str], rows: Vec<Vec<String>>) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header.iter().copied())
            .add_rows(rows);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

fn error_document(message: &str) -> String {
    let document = serde_json::json!({ "error": message });
    serde_json::to_string_pretty(&document).unwrap_or_else(|_| message.to_string())
}

/// Human-readable size in binary units
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
