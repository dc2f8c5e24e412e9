//! The capability a storage backend must provide
//!
//! The gateway never talks HTTP itself. Everything it needs from the remote
//! service goes through [`RemoteItemClient`], which keeps the core testable
//! against in-memory fakes and independent of any SDK.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::RemoteError;
use crate::types::{Drive, ListColumn, ListItem, ListQuery, RemoteItem};

/// Item content as a stream of chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, RemoteError>>;

/// Primitive operations of the remote item service
///
/// Implementations must be safe to share between concurrent calls. Missing
/// resources are reported as [`RemoteError::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteItemClient: Send + Sync {
    /// List the document libraries of a site
    async fn list_drives(&self, site_id: &str) -> Result<Vec<Drive>, RemoteError>;

    /// Get an item by its path relative to the drive root
    async fn get_item_by_path(
        &self,
        drive_id: &str,
        full_path: &str,
    ) -> Result<RemoteItem, RemoteError>;

    /// Get an item by ID
    async fn get_item_by_id(&self, drive_id: &str, item_id: &str)
    -> Result<RemoteItem, RemoteError>;

    /// Open the content of a file item
    async fn get_item_content(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<ByteStream, RemoteError>;

    /// Write content to a path relative to the drive root
    ///
    /// Missing intermediate folders are created by the service. Writing to a
    /// path that already exists fails with [`RemoteError::Conflict`].
    async fn put_item_content(
        &self,
        drive_id: &str,
        full_path: &str,
        content: Bytes,
    ) -> Result<RemoteItem, RemoteError>;

    /// Get the item a sharing token points to
    async fn get_item_by_sharing_token(&self, token: &str) -> Result<RemoteItem, RemoteError>;

    /// List the rows of a site list
    async fn list_list_items(
        &self,
        site_id: &str,
        list_name: &str,
        query: &ListQuery,
    ) -> Result<Vec<ListItem>, RemoteError>;

    /// List the column definitions of a site list
    async fn list_list_columns(
        &self,
        site_id: &str,
        list_name: &str,
    ) -> Result<Vec<ListColumn>, RemoteError>;
}
