//! Access tokens for the Graph API
//!
//! [`ClientSecretCredential`] runs the OAuth2 client-credentials grant for an
//! app registration and keeps the token until shortly before it expires.

use std::fmt;

use async_trait::async_trait;
use docgate_core::RemoteError;
use jiff::Timestamp;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::TokenError;

/// Scope requesting every application permission granted to the app
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Seconds before expiry at which a cached token is replaced
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Source of bearer tokens for Graph requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, RemoteError>;
}

/// A token acquired elsewhere, used as-is
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&"***").finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, RemoteError> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

struct CachedToken {
    token: String,
    /// Unix seconds after which the token must be refreshed
    refresh_after: i64,
}

/// OAuth2 client-credentials grant against the Microsoft identity platform
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: Mutex<Option<CachedToken>>,
}

impl ClientSecretCredential {
    pub fn new(
        http: reqwest::Client,
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url(authority_host, tenant_id),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<TokenResponse, TokenError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", GRAPH_DEFAULT_SCOPE),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let rejected: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                code: rejected.error,
                description: rejected.error_description,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for ClientSecretCredential {
    async fn access_token(&self) -> Result<String, RemoteError> {
        let mut cache = self.cache.lock().await;
        let now = Timestamp::now().as_second();

        if let Some(cached) = cache.as_ref()
            && now < cached.refresh_after
        {
            return Ok(cached.token.clone());
        }

        let response = self.request_token().await?;
        tracing::debug!(
            client_id = %self.client_id,
            expires_in = response.expires_in,
            "Acquired access token"
        );

        *cache = Some(CachedToken {
            token: response.access_token.clone(),
            refresh_after: refresh_after(now, response.expires_in),
        });
        Ok(response.access_token)
    }
}

fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        urlencoding::encode(tenant_id)
    )
}

/// Point in time after which a token issued at `now` is refreshed
fn refresh_after(now: i64, expires_in: i64) -> i64 {
    now + (expires_in - EXPIRY_MARGIN_SECS).max(0)
}
