//! Configuration management
//!
//! The configuration file lives at `~/.config/docgate/config.toml` (or under
//! `$DOCGATE_CONFIG_DIR`). It names the tenant and one or more sites; a
//! [`SiteSelector`] picks the site a gateway is built for, and the result is
//! validated before any remote call is made.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DEFAULT_LIBRARY;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "DOCGATE_CONFIG_DIR";

/// Environment variable overriding the tenant ID
pub const TENANT_ID_ENV: &str = "DOCGATE_TENANT_ID";

/// Environment variable overriding the application client secret
pub const CLIENT_SECRET_ENV: &str = "DOCGATE_CLIENT_SECRET";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Current configuration schema version
const SCHEMA_VERSION: u32 = 1;

/// Whole configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub tenant_id: String,

    /// Application credentials that take precedence over per-site ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AppCredentials>,

    #[serde(default)]
    pub sites: Vec<SiteEntry>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            tenant_id: String::new(),
            credentials: None,
            sites: Vec::new(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Application registration shared by all sites
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// One site as written in the configuration file
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SiteEntry {
    /// Selection key used by `--site`
    pub name: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default)]
    pub site_id: String,

    #[serde(default)]
    pub site_name: String,

    /// Default document library
    #[serde(default = "default_library")]
    pub library: String,

    /// Default list
    #[serde(default)]
    pub list_name: String,
}

fn default_library() -> String {
    DEFAULT_LIBRARY.to_string()
}

impl fmt::Debug for SiteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteEntry")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("site_id", &self.site_id)
            .field("site_name", &self.site_name)
            .field("library", &self.library)
            .field("list_name", &self.list_name)
            .finish()
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,

    #[serde(default = "default_authority_host")]
    pub authority_host: String,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_authority_host() -> String {
    "https://login.microsoftonline.com".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            graph_base_url: default_graph_base_url(),
            authority_host: default_authority_host(),
        }
    }
}

/// Retry settings for transient transport failures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    10000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Which configured site a gateway is built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteSelector {
    /// The first site in the file
    First,
    /// The site whose `name` matches exactly
    Named(String),
}

impl SiteSelector {
    /// `Named` when a name was given, `First` otherwise
    pub fn from_option(name: Option<&str>) -> Self {
        match name {
            Some(name) => SiteSelector::Named(name.to_string()),
            None => SiteSelector::First,
        }
    }
}

/// Everything needed to authenticate against and operate on one site
///
/// Immutable once a gateway has been built from it.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub site_id: String,
    pub site_name: String,
    pub library: String,
    pub list_name: String,
}

impl SiteConfig {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        site_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            site_id: site_id.into(),
            site_name: String::new(),
            library: DEFAULT_LIBRARY.to_string(),
            list_name: String::new(),
        }
    }

    pub fn with_list_name(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = list_name.into();
        self
    }

    /// Replace the site's client ID and secret with application credentials
    pub fn with_credentials(mut self, credentials: &AppCredentials) -> Self {
        self.client_id = credentials.client_id.clone();
        self.client_secret = credentials.client_secret.clone();
        self
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("site_id", &self.site_id),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(Error::ConfigurationInvalid(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        if self.library.trim().is_empty() {
            return Err(Error::ConfigurationInvalid(
                "library must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("site_id", &self.site_id)
            .field("site_name", &self.site_name)
            .field("library", &self.library)
            .field("list_name", &self.list_name)
            .finish()
    }
}

impl GatewayConfig {
    /// Resolve and validate the site a gateway should be built for
    pub fn select_site(&self, selector: &SiteSelector) -> Result<SiteConfig> {
        let entry = match selector {
            SiteSelector::First => self.sites.first().ok_or_else(|| {
                Error::ConfigurationInvalid("no sites configured".to_string())
            })?,
            SiteSelector::Named(name) => {
                self.sites.iter().find(|s| &s.name == name).ok_or_else(|| {
                    let known: Vec<&str> = self.sites.iter().map(|s| s.name.as_str()).collect();
                    Error::ConfigurationInvalid(format!(
                        "site '{name}' is not configured (known: {})",
                        if known.is_empty() {
                            "none".to_string()
                        } else {
                            known.join(", ")
                        }
                    ))
                })?
            }
        };

        let mut site = SiteConfig {
            tenant_id: self.tenant_id.clone(),
            client_id: entry.client_id.clone(),
            client_secret: entry.client_secret.clone(),
            site_id: entry.site_id.clone(),
            site_name: entry.site_name.clone(),
            library: entry.library.clone(),
            list_name: entry.list_name.clone(),
        };

        if let Some(credentials) = &self.credentials {
            site = site.with_credentials(credentials);
        }

        site.validate()?;
        Ok(site)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tenant_id) = lookup(TENANT_ID_ENV).filter(|v| !v.is_empty()) {
            self.tenant_id = tenant_id;
        }

        if let Some(secret) = lookup(CLIENT_SECRET_ENV).filter(|v| !v.is_empty()) {
            match &mut self.credentials {
                Some(credentials) => credentials.client_secret = secret,
                None => {
                    for site in &mut self.sites {
                        site.client_secret = secret.clone();
                    }
                }
            }
        }
    }
}

/// Loads and saves the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the default location
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| {
                    Error::ConfigurationInvalid(
                        "could not determine configuration directory".to_string(),
                    )
                })?
                .join("docgate"),
        };

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
        })
    }

    /// Create a manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, or defaults when the file does not exist
    pub fn load(&self) -> Result<GatewayConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No configuration file, using defaults");
            return Ok(GatewayConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: GatewayConfig = toml::from_str(&content).map_err(|e| {
            Error::ConfigurationInvalid(format!(
                "failed to parse {}: {e}",
                self.config_path.display()
            ))
        })?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::ConfigurationInvalid(format!(
                "schema version {} is newer than supported version {SCHEMA_VERSION}",
                config.schema_version
            )));
        }

        Ok(config)
    }

    /// Write the configuration, creating the directory if needed
    pub fn save(&self, config: &GatewayConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            Error::ConfigurationInvalid(format!("failed to serialize configuration: {e}"))
        })?;
        std::fs::write(&self.config_path, content)?;

        // The file holds client secrets
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.config_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}
