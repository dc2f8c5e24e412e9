//! config command - Create and inspect the configuration file

use clap::{Args, Subcommand};
use docgate_core::{ConfigManager, GatewayConfig, SiteEntry};
use serde::Serialize;
use serde_json::Value;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Role};

use super::report;

const MASK: &str = "***";

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration template
    Init(InitArgs),

    /// Print the configuration with secrets masked
    Show,

    /// Print the location of the configuration file
    Path,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name used to select the site with --site
    #[arg(long, default_value = "default")]
    pub name: String,

    /// Entra ID tenant
    #[arg(long, default_value = "")]
    pub tenant_id: String,

    /// Application (client) ID of the app registration
    #[arg(long, default_value = "")]
    pub client_id: String,

    /// Graph site ID (hostname,site-collection-id,web-id)
    #[arg(long, default_value = "")]
    pub site_id: String,

    /// Default document library
    #[arg(long, default_value = docgate_core::DEFAULT_LIBRARY)]
    pub library: String,

    /// Default list for `items` and `columns`
    #[arg(long, default_value = "")]
    pub list_name: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PathOutput {
    path: String,
    exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitOutput {
    path: String,
    site: String,
}

/// Execute a config subcommand
pub fn execute(cmd: ConfigCommands, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => return report(&formatter, "Failed to locate configuration", &e),
    };

    match cmd {
        ConfigCommands::Init(args) => execute_init(&manager, args, &formatter),
        ConfigCommands::Show => execute_show(&manager, site, &formatter),
        ConfigCommands::Path => execute_path(&manager, &formatter),
    }
}

fn execute_init(manager: &ConfigManager, args: InitArgs, formatter: &Formatter) -> ExitCode {
    let path = manager.config_path().display().to_string();

    if manager.config_path().exists() && !args.force {
        formatter.error(&format!(
            "Configuration already exists at {path} (use --force to overwrite)"
        ));
        return ExitCode::UsageError;
    }

    let config = template(args);
    let site = config
        .sites
        .first()
        .map(|s| s.name.clone())
        .unwrap_or_default();

    if let Err(e) = manager.save(&config) {
        return report(formatter, "Failed to write configuration", &e);
    }

    tracing::info!(path = %path, "Wrote configuration template");

    if formatter.is_json() {
        formatter.json(&InitOutput { path, site });
    } else {
        formatter.success(&format!("Configuration written to {path}"));
        formatter.println("Set DOCGATE_CLIENT_SECRET or edit client_secret before connecting.");
    }

    ExitCode::Success
}

fn execute_show(manager: &ConfigManager, site: Option<&str>, formatter: &Formatter) -> ExitCode {
    let mut config = match manager.load() {
        Ok(config) => config,
        Err(e) => return report(formatter, "Failed to load configuration", &e),
    };

    // Incomplete sites are still shown, so only the name is checked here
    if let Some(name) = site {
        if !config.sites.iter().any(|s| s.name == name) {
            formatter.error(&format!("Site '{name}' is not configured"));
            return ExitCode::AuthError;
        }
        config.sites.retain(|s| s.name == name);
    }

    let masked = match masked_value(&config) {
        Ok(value) => value,
        Err(e) => {
            formatter.error(&format!("Failed to render configuration: {e}"));
            return ExitCode::GeneralError;
        }
    };

    if formatter.is_json() {
        formatter.json(&masked);
        return ExitCode::Success;
    }

    formatter.property("tenant", &config.tenant_id);
    if let Some(credentials) = &config.credentials {
        formatter.property("client", &credentials.client_id);
    }
    formatter.property("graph", &formatter.paint(Role::Url, &config.http.graph_base_url));
    formatter.property("timeout", &format!("{}s", config.http.timeout_secs));
    formatter.property("retries", &config.retry.max_attempts.to_string());

    if config.sites.is_empty() {
        formatter.warning("No sites configured");
        return ExitCode::Success;
    }

    let rows = config
        .sites
        .iter()
        .map(|s| {
            vec![
                formatter.paint(Role::Name, &s.name),
                s.site_id.clone(),
                s.library.clone(),
                s.list_name.clone(),
                secret_state(&s.client_secret).to_string(),
            ]
        })
        .collect();
    formatter.table(&["Site", "Site ID", "Library", "List", "Secret"], rows);

    ExitCode::Success
}

fn execute_path(manager: &ConfigManager, formatter: &Formatter) -> ExitCode {
    let path = manager.config_path();

    if formatter.is_json() {
        formatter.json(&PathOutput {
            path: path.display().to_string(),
            exists: path.exists(),
        });
    } else {
        formatter.println(&path.display().to_string());
    }

    ExitCode::Success
}

fn template(args: InitArgs) -> GatewayConfig {
    GatewayConfig {
        tenant_id: args.tenant_id,
        sites: vec![SiteEntry {
            name: args.name,
            client_id: args.client_id,
            client_secret: String::new(),
            site_id: args.site_id,
            site_name: String::new(),
            library: args.library,
            list_name: args.list_name,
        }],
        ..Default::default()
    }
}

fn secret_state(secret: &str) -> &'static str {
    if secret.is_empty() { "unset" } else { MASK }
}

/// Configuration as JSON with every non-empty `client_secret` replaced
fn masked_value(config: &GatewayConfig) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(config)?;
    mask_secrets(&mut value);
    Ok(value)
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if key == "client_secret" {
                    if field.as_str().is_some_and(|s| !s.is_empty()) {
                        *field = Value::String(MASK.to_string());
                    }
                } else {
                    mask_secrets(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}
