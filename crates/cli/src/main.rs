//! docgate - files and list records in SharePoint sites from the command line

mod commands;
mod exit_code;
mod output;

use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

/// Gateway for documents and list records stored in SharePoint sites
#[derive(Parser, Debug)]
#[command(name = "docgate", version, about, propagate_version = true)]
pub struct Cli {
    /// Print strict JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configured site to operate on (defaults to the first one)
    #[arg(long, global = true, env = "DOCGATE_SITE")]
    pub site: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "debug", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::GeneralError.into();
    }

    let output_config = cli.output_config();
    let site = cli.site;

    let code = match cli.command {
        Commands::Completions(args) => {
            commands::completions::execute(args, &mut Cli::command())
        }
        command => commands::execute(command, site.as_deref(), output_config).await,
    };

    code.into()
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docgate",
            "stat",
            "Reports/q1.pdf",
            "--json",
            "--site",
            "Finance",
            "-vv",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.site.as_deref(), Some("Finance"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Stat(_)));
    }

    #[test]
    fn test_output_config_from_flags() {
        let cli = Cli::try_parse_from(["docgate", "--quiet", "--no-color", "config", "path"]).unwrap();
        let config = cli.output_config();
        assert!(config.quiet);
        assert!(config.no_color);
        assert!(!config.json);
    }
}
