//! Spinner for remote calls that may take a while

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::Formatter;

/// A spinner that is only drawn when the formatter allows progress output
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(formatter: &Formatter, message: impl Into<String>) -> Self {
        if !formatter.progress_enabled() {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// Remove the spinner from the terminal
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;

    #[test]
    fn test_hidden_in_json_mode() {
        let formatter = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        let spinner = Spinner::start(&formatter, "Uploading");
        assert!(!spinner.is_visible());
        spinner.finish();
    }

    #[test]
    fn test_hidden_in_quiet_mode() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        assert!(!Spinner::start(&formatter, "Downloading").is_visible());
    }
}
