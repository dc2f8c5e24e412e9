//! Graph client implementation
//!
//! Talks to Microsoft Graph over HTTPS and implements the `RemoteItemClient`
//! trait from docgate-core.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use url::Url;

use docgate_core::{
    ByteStream, Drive, Error, HttpConfig, ListColumn, ListItem, ListQuery, RemoteError,
    RemoteItem, RemoteItemClient, Result, RetryConfig, SiteConfig, is_retryable_error,
    retry_with_backoff,
};

use crate::auth::{ClientSecretCredential, TokenProvider};
use crate::error::{from_graph_response, from_reqwest};
use crate::models::{Collection, ColumnResource, DriveItemResource, DriveResource, ListItemResource};

type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Query option that makes a write fail instead of replacing or renaming
const CONFLICT_BEHAVIOR_FAIL: (&str, &str) = ("@microsoft.graph.conflictBehavior", "fail");

/// Microsoft Graph client
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenProvider>,
    retry: RetryConfig,
}

impl GraphClient {
    /// Create a client that authenticates with `token`
    pub fn new(
        token: Arc<dyn TokenProvider>,
        http_config: &HttpConfig,
        retry: RetryConfig,
    ) -> Result<Self> {
        let http = build_http_client(http_config)?;
        Self::with_http_client(http, token, http_config, retry)
    }

    /// Create a client for a site, using its app registration's credentials
    pub fn from_site(site: &SiteConfig, http_config: &HttpConfig, retry: RetryConfig) -> Result<Self> {
        site.validate()?;

        let http = build_http_client(http_config)?;
        let credential = ClientSecretCredential::new(
            http.clone(),
            &http_config.authority_host,
            &site.tenant_id,
            site.client_id.clone(),
            site.client_secret.clone(),
        );

        Self::with_http_client(http, Arc::new(credential), http_config, retry)
    }

    fn with_http_client(
        http: reqwest::Client,
        token: Arc<dyn TokenProvider>,
        http_config: &HttpConfig,
        retry: RetryConfig,
    ) -> Result<Self> {
        // A trailing slash keeps the version segment when joining
        let base = format!("{}/", http_config.graph_base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| {
            Error::ConfigurationInvalid(format!(
                "invalid graph_base_url '{}': {e}",
                http_config.graph_base_url
            ))
        })?;

        Ok(Self {
            http,
            base_url,
            token,
            retry,
        })
    }

    /// Absolute URL for a relative endpoint path whose segments are already encoded
    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::InvalidResponse(format!("cannot build URL for '{path}': {e}")))
    }

    fn drives_url(&self, site_id: &str) -> RemoteResult<Url> {
        self.endpoint(&format!("sites/{}/drives", encode_segment(site_id)))
    }

    fn item_by_path_url(&self, drive_id: &str, full_path: &str) -> RemoteResult<Url> {
        self.endpoint(&format!(
            "drives/{}/root:/{}",
            encode_segment(drive_id),
            encode_item_path(full_path)
        ))
    }

    fn item_by_id_url(&self, drive_id: &str, item_id: &str) -> RemoteResult<Url> {
        self.endpoint(&format!(
            "drives/{}/items/{}",
            encode_segment(drive_id),
            encode_segment(item_id)
        ))
    }

    fn content_by_id_url(&self, drive_id: &str, item_id: &str) -> RemoteResult<Url> {
        self.endpoint(&format!(
            "drives/{}/items/{}/content",
            encode_segment(drive_id),
            encode_segment(item_id)
        ))
    }

    fn content_by_path_url(&self, drive_id: &str, full_path: &str) -> RemoteResult<Url> {
        let mut url = self.endpoint(&format!(
            "drives/{}/root:/{}:/content",
            encode_segment(drive_id),
            encode_item_path(full_path)
        ))?;
        url.query_pairs_mut()
            .append_pair(CONFLICT_BEHAVIOR_FAIL.0, CONFLICT_BEHAVIOR_FAIL.1);
        Ok(url)
    }

    fn shared_item_url(&self, token: &str) -> RemoteResult<Url> {
        self.endpoint(&format!("shares/{}/driveItem", encode_segment(token)))
    }

    fn list_url(&self, site_id: &str, list_name: &str, collection: &str) -> RemoteResult<Url> {
        self.endpoint(&format!(
            "sites/{}/lists/{}/{collection}",
            encode_segment(site_id),
            encode_segment(list_name)
        ))
    }

    /// GET a JSON resource, retrying transient failures
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> RemoteResult<T> {
        let this = self;
        let url = &url;
        retry_with_backoff(
            &self.retry,
            || async move {
                let token = this.token.access_token().await?;
                tracing::debug!(%url, "GET");
                let response = this
                    .http
                    .get(url.clone())
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(from_reqwest)?;
                read_json(response).await
            },
            is_retryable_error,
        )
        .await
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl RemoteItemClient for GraphClient {
    async fn list_drives(&self, site_id: &str) -> RemoteResult<Vec<Drive>> {
        let url = self.drives_url(site_id)?;
        let drives: Collection<DriveResource> = self.get_json(url).await?;
        if drives.next_link.is_some() {
            tracing::debug!(site_id, "Drive listing has more pages; only the first is used");
        }

        Ok(drives
            .value
            .into_iter()
            .map(|d| d.into_drive(site_id))
            .collect())
    }

    async fn get_item_by_path(
        &self,
        drive_id: &str,
        full_path: &str,
    ) -> RemoteResult<RemoteItem> {
        let url = self.item_by_path_url(drive_id, full_path)?;
        let item: DriveItemResource = self.get_json(url).await?;
        Ok(with_drive(item.into(), drive_id))
    }

    async fn get_item_by_id(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> RemoteResult<RemoteItem> {
        let url = self.item_by_id_url(drive_id, item_id)?;
        let item: DriveItemResource = self.get_json(url).await?;
        Ok(with_drive(item.into(), drive_id))
    }

    async fn get_item_content(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> RemoteResult<ByteStream> {
        let url = self.content_by_id_url(drive_id, item_id)?;

        let this = self;
        let url = &url;
        // The service redirects to a pre-authenticated download URL; the
        // bearer token is not forwarded across hosts.
        let response = retry_with_backoff(
            &self.retry,
            || async move {
                let token = this.token.access_token().await?;
                tracing::debug!(%url, "GET content");
                let response = this
                    .http
                    .get(url.clone())
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(from_reqwest)?;
                ensure_success(response).await
            },
            is_retryable_error,
        )
        .await?;

        Ok(response.bytes_stream().map_err(from_reqwest).boxed())
    }

    async fn put_item_content(
        &self,
        drive_id: &str,
        full_path: &str,
        content: Bytes,
    ) -> RemoteResult<RemoteItem> {
        let url = self.content_by_path_url(drive_id, full_path)?;
        let this = self;
        let url = &url;
        let content = &content;

        let item: DriveItemResource = retry_with_backoff(
            &self.retry,
            || async move {
                let token = this.token.access_token().await?;
                tracing::debug!(%url, size = content.len(), "PUT content");
                let response = this
                    .http
                    .put(url.clone())
                    .bearer_auth(token)
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(content.clone())
                    .send()
                    .await
                    .map_err(from_reqwest)?;
                read_json(response).await
            },
            is_retryable_error,
        )
        .await?;

        Ok(with_drive(item.into(), drive_id))
    }

    async fn get_item_by_sharing_token(
        &self,
        token: &str,
    ) -> RemoteResult<RemoteItem> {
        let url = self.shared_item_url(token)?;
        let item: DriveItemResource = self.get_json(url).await?;
        Ok(item.into())
    }

    async fn list_list_items(
        &self,
        site_id: &str,
        list_name: &str,
        query: &ListQuery,
    ) -> RemoteResult<Vec<ListItem>> {
        let mut url = self.list_url(site_id, list_name, "items")?;
        let pairs = query.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let items: Collection<ListItemResource> = self.get_json(url).await?;
        Ok(items.value.into_iter().map(ListItem::from).collect())
    }

    async fn list_list_columns(
        &self,
        site_id: &str,
        list_name: &str,
    ) -> RemoteResult<Vec<ListColumn>> {
        let url = self.list_url(site_id, list_name, "columns")?;
        let columns: Collection<ColumnResource> = self.get_json(url).await?;
        Ok(columns.value.into_iter().map(ListColumn::from).collect())
    }
}

fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("docgate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::ConfigurationInvalid(format!("failed to create HTTP client: {e}")))
}

/// Fill in the drive when the service left the parent reference out
fn with_drive(mut item: RemoteItem, drive_id: &str) -> RemoteItem {
    item.drive_id.get_or_insert_with(|| drive_id.to_string());
    item
}

async fn ensure_success(
    response: reqwest::Response,
) -> RemoteResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(from_graph_response(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> RemoteResult<T> {
    let response = ensure_success(response).await?;
    let body = response.text().await.map_err(from_reqwest)?;
    serde_json::from_str(&body).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}

/// Percent-encode a single path segment
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Percent-encode each segment of a drive-relative path, dropping empty ones
fn encode_item_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
