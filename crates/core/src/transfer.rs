//! Idempotent uploads and whole-content downloads

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use crate::error::{Error, RemoteError, Result};
use crate::path::join_item_path;
use crate::resolver::PathResolver;
use crate::traits::RemoteItemClient;
use crate::types::{DEFAULT_LIBRARY, Drive, RemoteItem};

/// Upper bound for buffer space reserved from a reported item size
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Moves file content between callers and document libraries
pub struct TransferOrchestrator<C: RemoteItemClient + ?Sized> {
    client: Arc<C>,
    resolver: PathResolver<C>,
}

impl<C: RemoteItemClient + ?Sized> TransferOrchestrator<C> {
    pub fn new(client: Arc<C>, site_id: impl Into<String>) -> Self {
        let resolver = PathResolver::new(Arc::clone(&client), site_id);
        Self { client, resolver }
    }

    /// Upload `content` unless an item already exists at the target path
    ///
    /// The reader is rewound before use. When the path is already taken the
    /// existing item is returned and nothing is written.
    #[tracing::instrument(level = "debug", skip(self, content))]
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
        content.rewind().await?;

        let drive = self.resolver.resolve_drive(library_name).await?;
        let full_path = join_item_path(folder_path, file_name);
        if let Some(existing) = self.existing_item(&drive, &full_path).await? {
            return Ok(existing);
        }

        let mut buf = Vec::new();
        content.read_to_end(&mut buf).await?;
        self.write_new(&drive, &full_path, Bytes::from(buf)).await
    }

    /// Upload in-memory content unless an item already exists at the target path
    #[tracing::instrument(level = "debug", skip(self, content), fields(size = content.len()))]
    pub async fn upload_bytes(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        let drive = self.resolver.resolve_drive(library_name).await?;
        let full_path = join_item_path(folder_path, file_name);
        if let Some(existing) = self.existing_item(&drive, &full_path).await? {
            return Ok(existing);
        }

        self.write_new(&drive, &full_path, content).await
    }

    /// Content of the file at `library/folder_path/file_name`, `None` if absent
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn download(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
    ) -> Result<Option<Bytes>> {
        let drive = self.resolver.resolve_drive(library_name).await?;
        let full_path = join_item_path(folder_path, file_name);

        let mut item = match self.resolver.resolve_in_drive(&drive, &full_path).await {
            Ok(item) => item,
            Err(Error::ItemNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        item.drive_id.get_or_insert_with(|| drive.id.clone());

        content_or_absent(self.fetch_content(&item).await)
    }

    /// Content of an item in the site's `Documents` library, `None` if absent
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn download_by_id(&self, item_id: &str, site_id: &str) -> Result<Option<Bytes>> {
        let drive = self
            .resolver
            .resolve_drive_in(site_id, DEFAULT_LIBRARY)
            .await?;

        let mut item = match self.client.get_item_by_id(&drive.id, item_id).await {
            Ok(item) => item,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(Error::remote(e)),
        };
        item.drive_id.get_or_insert_with(|| drive.id.clone());

        content_or_absent(self.fetch_content(&item).await)
    }

    /// Read the whole content of a file item into memory
    pub async fn fetch_content(&self, item: &RemoteItem) -> Result<Bytes> {
        if item.id.is_empty() {
            return Err(Error::InvalidArgument("item has no ID".to_string()));
        }
        if item.is_folder {
            return Err(Error::InvalidArgument(format!(
                "'{}' is a folder and has no content",
                item.name
            )));
        }
        let drive_id = match item.drive_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "item '{}' has no drive reference",
                    item.id
                )));
            }
        };

        let mut stream = match self.client.get_item_content(drive_id, &item.id).await {
            Ok(stream) => stream,
            Err(e) if e.is_not_found() => return Err(Error::ItemNotFound(item.id.clone())),
            Err(e) => return Err(Error::remote(e)),
        };

        let capacity = item.size.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
        let mut buf = BytesMut::with_capacity(capacity);
        while let Some(chunk) = stream.try_next().await.map_err(Error::remote)? {
            buf.extend_from_slice(&chunk);
        }

        tracing::debug!(item_id = %item.id, size = buf.len(), "Downloaded item content");
        Ok(buf.freeze())
    }

    async fn existing_item(&self, drive: &Drive, full_path: &str) -> Result<Option<RemoteItem>> {
        match self.resolver.resolve_in_drive(drive, full_path).await {
            Ok(existing) => {
                tracing::info!(
                    path = full_path,
                    item_id = %existing.id,
                    "Item already exists, skipping upload"
                );
                Ok(Some(existing))
            }
            Err(Error::ItemNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Put content at a path known to be free a moment ago
    ///
    /// A conflict means a concurrent writer got there first; their item wins.
    async fn write_new(&self, drive: &Drive, full_path: &str, content: Bytes) -> Result<RemoteItem> {
        let size = content.len();
        match self
            .client
            .put_item_content(&drive.id, full_path, content)
            .await
        {
            Ok(item) => {
                tracing::info!(path = full_path, item_id = %item.id, size, "Uploaded item");
                Ok(item)
            }
            Err(RemoteError::Conflict(reason)) => {
                tracing::warn!(path = full_path, %reason, "Item created concurrently, using existing");
                self.resolver.resolve_in_drive(drive, full_path).await
            }
            Err(e) => Err(Error::remote(e)),
        }
    }
}

/// A file whose metadata exists but whose content is gone counts as absent
fn content_or_absent(result: Result<Bytes>) -> Result<Option<Bytes>> {
    match result {
        Ok(content) => Ok(Some(content)),
        Err(Error::ItemNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ByteStream, MockRemoteItemClient};
    use std::io::Cursor;

    fn mock_with_documents() -> MockRemoteItemClient {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_list_drives().returning(|site_id| {
            Ok(vec![Drive {
                id: "b!docs".to_string(),
                name: "Documents".to_string(),
                site_id: site_id.to_string(),
            }])
        });
        mock
    }

    fn chunks(parts: &[&'static str]) -> ByteStream {
        let items: Vec<std::result::Result<Bytes, RemoteError>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        Box::pin(futures::stream::iter(items))
    }

    #[tokio::test]
    async fn test_upload_skips_existing_item() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_path()
            .returning(|_, _| Ok(RemoteItem::file("01EX", "a.txt")));
        mock.expect_put_item_content().never();

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let mut content = Cursor::new(b"hello".to_vec());
        let item = orchestrator
            .upload("Documents", "Reports", "a.txt", &mut content)
            .await
            .unwrap();
        assert_eq!(item.id, "01EX");
    }

    #[tokio::test]
    async fn test_upload_writes_whole_stream_from_start() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_path()
            .returning(|_, path| Err(RemoteError::NotFound(path.to_string())));
        mock.expect_put_item_content()
            .withf(|drive_id: &str, path: &str, content: &Bytes| {
                drive_id == "b!docs" && path == "Reports/a.txt" && content.as_ref() == b"hello"
            })
            .times(1)
            .returning(|_, _, _| Ok(RemoteItem::file("01NEW", "a.txt")));

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let mut content = Cursor::new(b"hello".to_vec());
        content.set_position(3);
        let item = orchestrator
            .upload("Documents", "Reports", "a.txt", &mut content)
            .await
            .unwrap();
        assert_eq!(item.id, "01NEW");
    }

    #[tokio::test]
    async fn test_upload_aborts_when_resolution_fails() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_path()
            .returning(|_, _| Err(RemoteError::Network("timed out".to_string())));
        mock.expect_put_item_content().never();

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let err = orchestrator
            .upload_bytes("Documents", "", "a.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_upload_to_unknown_library() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_path().never();
        mock.expect_put_item_content().never();

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let err = orchestrator
            .upload_bytes("Archive", "", "a.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LibraryNotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_conflict_returns_concurrent_item() {
        let mut mock = mock_with_documents();
        let mut lookups = 0;
        mock.expect_get_item_by_path().times(2).returning(move |_, path| {
            lookups += 1;
            if lookups == 1 {
                Err(RemoteError::NotFound(path.to_string()))
            } else {
                Ok(RemoteItem::file("01RACE", "a.txt"))
            }
        });
        mock.expect_put_item_content()
            .times(1)
            .returning(|_, _, _| Err(RemoteError::Conflict("nameAlreadyExists".to_string())));

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let item = orchestrator
            .upload_bytes("Documents", "", "a.txt", Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert_eq!(item.id, "01RACE");
    }

    #[tokio::test]
    async fn test_download_missing_is_none() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_path()
            .returning(|_, path| Err(RemoteError::NotFound(path.to_string())));
        mock.expect_get_item_content().never();

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let content = orchestrator
            .download("Documents", "Reports", "a.txt")
            .await
            .unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_download_buffers_all_chunks() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_path()
            .returning(|_, _| Ok(RemoteItem::file("01A", "a.txt")));
        mock.expect_get_item_content()
            .withf(|drive_id: &str, item_id: &str| drive_id == "b!docs" && item_id == "01A")
            .returning(|_, _| Ok(chunks(&["hel", "lo ", "world"])));

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let content = orchestrator
            .download("Documents", "", "a.txt")
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some(&b"hello world"[..]));
    }

    #[tokio::test]
    async fn test_download_by_id() {
        let mut mock = mock_with_documents();
        mock.expect_get_item_by_id()
            .withf(|_: &str, item_id: &str| item_id == "01A")
            .returning(|drive_id, _| Ok(RemoteItem::file("01A", "a.txt").in_drive(drive_id)));
        mock.expect_get_item_by_id()
            .withf(|_: &str, item_id: &str| item_id == "missing")
            .returning(|_, id| Err(RemoteError::NotFound(id.to_string())));
        mock.expect_get_item_content()
            .returning(|_, _| Ok(chunks(&["data"])));

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let found = orchestrator.download_by_id("01A", "site").await.unwrap();
        assert_eq!(found.as_deref(), Some(&b"data"[..]));

        let missing = orchestrator.download_by_id("missing", "site").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_fetch_content_requires_drive_reference() {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_get_item_content().never();

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let err = orchestrator
            .fetch_content(&RemoteItem::file("01A", "a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = orchestrator
            .fetch_content(&RemoteItem::file("", "a.txt").in_drive("b!docs"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_fetch_content_stream_failure() {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_get_item_content().returning(|_, _| {
            let items: Vec<std::result::Result<Bytes, RemoteError>> = vec![
                Ok(Bytes::from_static(b"par")),
                Err(RemoteError::Network("connection reset".to_string())),
            ];
            Ok(Box::pin(futures::stream::iter(items)) as ByteStream)
        });

        let orchestrator = TransferOrchestrator::new(Arc::new(mock), "site");
        let err = orchestrator
            .fetch_content(&RemoteItem::file("01A", "a.txt").in_drive("b!docs"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteUnavailable(RemoteError::Network(_))));
    }
}
