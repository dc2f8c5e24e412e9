//! One entry point for every gateway operation on a site

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncSeek};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::lists::ListProjector;
use crate::path::FolderPathParts;
use crate::resolver::PathResolver;
use crate::sharing::SharingLinkDecoder;
use crate::traits::RemoteItemClient;
use crate::types::{Drive, ListColumnMap, ListItem, ListQuery, RemoteItem};
use crate::transfer::TransferOrchestrator;

/// Files, folders and lists of one configured site
///
/// The site configuration is validated when the gateway is built and does
/// not change afterwards. The client handle is shared by all components.
pub struct DocumentGateway<C: RemoteItemClient + ?Sized> {
    site: SiteConfig,
    client: Arc<C>,
    resolver: PathResolver<C>,
    sharing: SharingLinkDecoder<C>,
    transfer: TransferOrchestrator<C>,
    lists: ListProjector<C>,
}

impl<C: RemoteItemClient + ?Sized> DocumentGateway<C> {
    /// Build a gateway, failing with `ConfigurationInvalid` on incomplete settings
    pub fn new(site: SiteConfig, client: Arc<C>) -> Result<Self> {
        site.validate()?;

        tracing::debug!(site_id = %site.site_id, library = %site.library, "Gateway ready");

        Ok(Self {
            resolver: PathResolver::new(Arc::clone(&client), site.site_id.clone()),
            sharing: SharingLinkDecoder::new(Arc::clone(&client)),
            transfer: TransferOrchestrator::new(Arc::clone(&client), site.site_id.clone()),
            lists: ListProjector::new(Arc::clone(&client), site.site_id.clone()),
            client,
            site,
        })
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// The underlying client, for calls the gateway does not wrap
    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    pub async fn resolve_drive(&self, library_name: &str) -> Result<Drive> {
        self.resolver.resolve_drive(library_name).await
    }

    pub async fn resolve_by_path(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
    ) -> Result<RemoteItem> {
        self.resolver
            .resolve_by_path(library_name, folder_path, file_name)
            .await
    }

    pub async fn try_resolve_by_path(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
    ) -> Result<Option<RemoteItem>> {
        self.resolver
            .try_resolve_by_path(library_name, folder_path, file_name)
            .await
    }

    pub async fn resolve_folder_path(&self, item_id: &str, site_id: &str) -> Result<FolderPathParts> {
        self.resolver.resolve_folder_path(item_id, site_id).await
    }

    /// Folder path of an item joined with `/`, empty for items under the root
    pub async fn folder_path_string(&self, item_id: &str, site_id: &str) -> Result<String> {
        let parts = self.resolver.resolve_folder_path(item_id, site_id).await?;
        Ok(parts.join())
    }

    /// Folder path of an item obtained elsewhere, walked in the item's own drive
    pub async fn folder_path_of(&self, item: &RemoteItem) -> Result<FolderPathParts> {
        self.resolver.folder_path_of(item).await
    }

    pub async fn item_from_sharing_link(&self, sharing_url: &str) -> Result<RemoteItem> {
        self.sharing.decode(sharing_url).await
    }

    pub async fn upload<R>(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
        content: &mut R,
    ) -> Result<RemoteItem>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + ?Sized,
    {
        self.transfer
            .upload(library_name, folder_path, file_name, content)
            .await
    }

    pub async fn upload_bytes(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        self.transfer
            .upload_bytes(library_name, folder_path, file_name, content)
            .await
    }

    pub async fn download(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
    ) -> Result<Option<Bytes>> {
        self.transfer
            .download(library_name, folder_path, file_name)
            .await
    }

    pub async fn download_by_id(&self, item_id: &str, site_id: &str) -> Result<Option<Bytes>> {
        self.transfer.download_by_id(item_id, site_id).await
    }

    pub async fn item_content(&self, item: &RemoteItem) -> Result<Bytes> {
        self.transfer.fetch_content(item).await
    }

    /// Rows of `list_name`, or of the configured list when it is empty
    ///
    /// A `None` query expands the column values (`$expand=fields`).
    pub async fn list_items(
        &self,
        list_name: &str,
        query: Option<ListQuery>,
    ) -> Result<Vec<ListItem>> {
        let list_name = self.list_or_default(list_name)?;
        self.lists.list_items(list_name, query).await
    }

    /// Column map of `list_name`, or of the configured list when it is empty
    pub async fn list_columns(&self, list_name: &str) -> Result<ListColumnMap> {
        let list_name = self.list_or_default(list_name)?;
        self.lists.list_columns(list_name).await
    }

    fn list_or_default<'a>(&'a self, list_name: &'a str) -> Result<&'a str> {
        if !list_name.trim().is_empty() {
            return Ok(list_name);
        }
        if self.site.list_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "no list name given and none configured for the site".to_string(),
            ));
        }
        Ok(&self.site.list_name)
    }
}
