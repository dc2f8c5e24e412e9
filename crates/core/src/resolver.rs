//! Path resolution in both directions
//!
//! Forward: `library/folder/file` to a concrete item. Backward: an item ID to
//! the names of the folders above it, found by following parent references
//! up to the drive root.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::path::{FolderPathParts, join_item_path};
use crate::traits::RemoteItemClient;
use crate::types::{DEFAULT_LIBRARY, Drive, RemoteItem};

/// Most folder names a resolved folder path may hold, the root not counted
pub const MAX_HIERARCHY_DEPTH: usize = 1024;

/// Resolves paths and ancestries against one site
pub struct PathResolver<C: RemoteItemClient + ?Sized> {
    client: Arc<C>,
    site_id: String,
}

impl<C: RemoteItemClient + ?Sized> Clone for PathResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            site_id: self.site_id.clone(),
        }
    }
}

impl<C: RemoteItemClient + ?Sized> PathResolver<C> {
    pub fn new(client: Arc<C>, site_id: impl Into<String>) -> Self {
        Self {
            client,
            site_id: site_id.into(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Find the configured site's drive for a document library name
    pub async fn resolve_drive(&self, library_name: &str) -> Result<Drive> {
        self.resolve_drive_in(&self.site_id, library_name).await
    }

    /// Find a site's drive for a document library name, ignoring case
    pub async fn resolve_drive_in(&self, site_id: &str, library_name: &str) -> Result<Drive> {
        let drives = self
            .client
            .list_drives(site_id)
            .await
            .map_err(Error::remote)?;

        tracing::debug!(
            site_id,
            library = library_name,
            drives = drives.len(),
            "Matching document library"
        );

        drives
            .into_iter()
            .find(|d| d.matches_library(library_name))
            .ok_or_else(|| Error::LibraryNotFound(library_name.to_string()))
    }

    /// Resolve a path relative to the root of an already resolved drive
    pub async fn resolve_in_drive(&self, drive: &Drive, full_path: &str) -> Result<RemoteItem> {
        match self.client.get_item_by_path(&drive.id, full_path).await {
            Ok(item) => Ok(item),
            Err(e) if e.is_not_found() => {
                Err(Error::ItemNotFound(format!("{}/{}", drive.name, full_path)))
            }
            Err(e) => Err(Error::remote(e)),
        }
    }

    /// Resolve `library/folder_path/file_name` to an item
    ///
    /// Fails with [`Error::ItemNotFound`] when the library exists but the
    /// item does not.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn resolve_by_path(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
    ) -> Result<RemoteItem> {
        let drive = self.resolve_drive(library_name).await?;
        let full_path = join_item_path(folder_path, file_name);
        self.resolve_in_drive(&drive, &full_path).await
    }

    /// Like [`resolve_by_path`](Self::resolve_by_path) with absence as `None`
    pub async fn try_resolve_by_path(
        &self,
        library_name: &str,
        folder_path: &str,
        file_name: &str,
    ) -> Result<Option<RemoteItem>> {
        match self
            .resolve_by_path(library_name, folder_path, file_name)
            .await
        {
            Ok(item) => Ok(Some(item)),
            Err(Error::ItemNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Names of the folders containing `item_id`, root first
    ///
    /// The item is looked up in the site's `Documents` library. Neither the
    /// item itself nor the drive root is part of the result, so an item
    /// directly under the root yields an empty path.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn resolve_folder_path(
        &self,
        item_id: &str,
        site_id: &str,
    ) -> Result<FolderPathParts> {
        let drive = self.resolve_drive_in(site_id, DEFAULT_LIBRARY).await?;

        let item = match self.client.get_item_by_id(&drive.id, item_id).await {
            Ok(item) => item,
            Err(e) if e.is_not_found() => return Err(Error::ItemNotFound(item_id.to_string())),
            Err(e) => return Err(Error::remote(e)),
        };

        self.walk_ancestors(&drive.id, item).await
    }

    /// Names of the folders containing an already fetched item, root first
    ///
    /// Ancestors are looked up in the item's own drive. An item that does
    /// not name its drive is taken to live in the configured site's
    /// `Documents` library.
    #[tracing::instrument(level = "debug", skip(self, item), fields(item_id = %item.id))]
    pub async fn folder_path_of(&self, item: &RemoteItem) -> Result<FolderPathParts> {
        let drive_id = match &item.drive_id {
            Some(drive_id) => drive_id.clone(),
            None => self.resolve_drive(DEFAULT_LIBRARY).await?.id,
        };
        self.walk_ancestors(&drive_id, item.clone()).await
    }

    /// Collect ancestor names from `item` up to, but excluding, the root
    async fn walk_ancestors(&self, drive_id: &str, item: RemoteItem) -> Result<FolderPathParts> {
        let start_id = item.id.clone();
        let mut visited = HashSet::new();
        visited.insert(item.id.clone());

        let mut names = Vec::new();
        let mut current = item;

        while let Some(parent_id) = current.parent_id.clone() {
            if !visited.insert(parent_id.clone()) {
                return Err(Error::InvalidHierarchy(format!(
                    "cycle detected: item '{parent_id}' is its own ancestor"
                )));
            }

            let parent = match self.client.get_item_by_id(drive_id, &parent_id).await {
                Ok(parent) => parent,
                Err(e) if e.is_not_found() => {
                    return Err(Error::InvalidHierarchy(format!(
                        "parent '{parent_id}' of item '{}' does not exist",
                        current.id
                    )));
                }
                Err(e) => return Err(Error::remote(e)),
            };

            if parent.is_root() {
                break;
            }
            if names.len() == MAX_HIERARCHY_DEPTH {
                return Err(Error::InvalidHierarchy(format!(
                    "more than {MAX_HIERARCHY_DEPTH} folders above item '{start_id}'"
                )));
            }

            names.push(parent.name.clone());
            current = parent;
        }

        tracing::debug!(depth = names.len(), "Reached drive root");
        Ok(FolderPathParts::from_leaf_to_root(names))
    }
}
