//! Command implementations
//!
//! Each command builds its own [`Formatter`], does its work through a
//! [`DocumentGateway`] and maps failures to an [`ExitCode`].

pub mod columns;
pub mod completions;
pub mod config;
pub mod download;
pub mod items;
pub mod path;
pub mod share;
pub mod stat;
pub mod upload;

use std::sync::Arc;

use clap::Subcommand;
use docgate_core::{ConfigManager, DocumentGateway, SiteSelector, split_item_path};
use docgate_graph::GraphClient;

use crate::exit_code::{ExitCode, exit_code_from_error};
use crate::output::{Formatter, OutputConfig};

/// Gateway type every remote command works with
pub type Gateway = DocumentGateway<GraphClient>;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Upload a local file, unless the remote path already exists
    Upload(upload::UploadArgs),

    /// Download a file by path or by item ID
    Download(download::DownloadArgs),

    /// Show metadata of a file or folder
    Stat(stat::StatArgs),

    /// Print the folder path of an item
    Path(path::PathArgs),

    /// Resolve a sharing link to the item it points at
    Share(share::ShareArgs),

    /// List the rows of a site list
    Items(items::ItemsArgs),

    /// Show the column names of a site list
    Columns(columns::ColumnsArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Run any command except `completions`, which needs the clap definition
pub async fn execute(command: Commands, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    match command {
        Commands::Config(cmd) => config::execute(cmd, site, output_config),
        Commands::Upload(args) => upload::execute(args, site, output_config).await,
        Commands::Download(args) => download::execute(args, site, output_config).await,
        Commands::Stat(args) => stat::execute(args, site, output_config).await,
        Commands::Path(args) => path::execute(args, site, output_config).await,
        Commands::Share(args) => share::execute(args, site, output_config).await,
        Commands::Items(args) => items::execute(args, site, output_config).await,
        Commands::Columns(args) => columns::execute(args, site, output_config).await,
        Commands::Completions(_) => {
            Formatter::new(output_config).error("completions must be dispatched by main");
            ExitCode::GeneralError
        }
    }
}

/// Load the configuration and build a gateway for the selected site
pub fn connect(site: Option<&str>, formatter: &Formatter) -> Result<Gateway, ExitCode> {
    let manager = ConfigManager::new().map_err(|e| report(formatter, "Failed to locate configuration", &e))?;

    let mut config = manager
        .load()
        .map_err(|e| report(formatter, "Failed to load configuration", &e))?;
    config.apply_overrides(|key| std::env::var(key).ok());

    let site_config = config
        .select_site(&SiteSelector::from_option(site))
        .map_err(|e| report(formatter, "Failed to select site", &e))?;

    tracing::debug!(site_id = %site_config.site_id, library = %site_config.library, "Connecting");

    let client = GraphClient::from_site(&site_config, &config.http, config.retry.clone())
        .map_err(|e| report(formatter, "Failed to create client", &e))?;

    DocumentGateway::new(site_config, Arc::new(client))
        .map_err(|e| report(formatter, "Failed to create gateway", &e))
}

/// Print an error with context and return its exit code
pub fn report(formatter: &Formatter, context: &str, err: &docgate_core::Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    exit_code_from_error(err)
}

/// Split a remote path into (folder, file name)
pub fn parse_remote_path(path: &str) -> Result<(String, String), String> {
    split_item_path(path).ok_or_else(|| format!("Remote path '{path}' does not name a file"))
}

/// The `--library` flag, or the site's default library
pub fn library_or_default<'a>(library: Option<&'a str>, gateway: &'a Gateway) -> &'a str {
    match library {
        Some(library) if !library.trim().is_empty() => library,
        _ => &gateway.site().library,
    }
}
