//! Output handling shared by all commands

mod formatter;
mod progress;

pub use formatter::{Formatter, Role, format_size};
pub use progress::Spinner;

/// How command output is rendered
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Strict JSON on stdout, errors as JSON on stderr
    pub json: bool,
    /// Disable ANSI styling
    pub no_color: bool,
    /// Suppress everything except errors
    pub quiet: bool,
}
