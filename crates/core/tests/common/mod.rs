//! In-memory remote item service for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use docgate_core::{
    ByteStream, Drive, ListColumn, ListItem, ListQuery, RemoteError, RemoteItem, RemoteItemClient,
    encode_sharing_token,
};

pub const SITE_ID: &str = "contoso.sharepoint.com,site-1";
pub const DOCUMENTS_DRIVE: &str = "b!documents";
pub const ROOT_ID: &str = "root-id";

#[derive(Default)]
struct State {
    /// (drive, item id) to item
    items: HashMap<(String, String), RemoteItem>,
    /// (drive, path) to item id
    paths: HashMap<(String, String), String>,
    contents: HashMap<String, Bytes>,
    shares: HashMap<String, RemoteItem>,
    list_items: HashMap<String, Vec<ListItem>>,
    list_columns: HashMap<String, Vec<ListColumn>>,
    last_query: Option<ListQuery>,
    next_id: u32,
}

/// A site with a `Documents` library whose drive root is `ROOT_ID`
pub struct FakeRemote {
    drives: Vec<Drive>,
    state: Mutex<State>,
    puts: AtomicUsize,
    fail_lookups: Mutex<Option<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        let fake = Self {
            drives: vec![Drive {
                id: DOCUMENTS_DRIVE.to_string(),
                name: "Documents".to_string(),
                site_id: SITE_ID.to_string(),
            }],
            state: Mutex::new(State::default()),
            puts: AtomicUsize::new(0),
            fail_lookups: Mutex::new(None),
        };
        fake.insert_item(RemoteItem::folder(ROOT_ID, "root").in_drive(DOCUMENTS_DRIVE));
        fake
    }

    /// Add another document library to the site
    pub fn with_drive(mut self, id: &str, name: &str) -> Self {
        self.drives.push(Drive {
            id: id.to_string(),
            name: name.to_string(),
            site_id: SITE_ID.to_string(),
        });
        self
    }

    /// Store an item as-is, without touching any path index
    pub fn insert_item(&self, item: RemoteItem) {
        let drive_id = item.drive_id.clone().unwrap_or_else(|| DOCUMENTS_DRIVE.to_string());
        let mut state = self.state.lock().unwrap();
        state.items.insert((drive_id, item.id.clone()), item);
    }

    /// Store a file under `path` in the `Documents` drive
    pub fn insert_file(&self, id: &str, path: &str, content: &[u8]) {
        let name = path.rsplit('/').next().unwrap_or(path);
        let item = RemoteItem::file(id, name)
            .in_drive(DOCUMENTS_DRIVE)
            .with_parent(ROOT_ID);
        let mut state = self.state.lock().unwrap();
        state
            .paths
            .insert((DOCUMENTS_DRIVE.to_string(), path.to_string()), id.to_string());
        state
            .contents
            .insert(id.to_string(), Bytes::copy_from_slice(content));
        state
            .items
            .insert((DOCUMENTS_DRIVE.to_string(), id.to_string()), item);
    }

    /// Keep the item's metadata but make its content unavailable
    pub fn drop_content(&self, item_id: &str) {
        self.state.lock().unwrap().contents.remove(item_id);
    }

    pub fn share(&self, url: &str, item: RemoteItem) {
        let mut state = self.state.lock().unwrap();
        state.shares.insert(encode_sharing_token(url), item);
    }

    pub fn set_list(&self, list_name: &str, items: Vec<ListItem>, columns: Vec<ListColumn>) {
        let mut state = self.state.lock().unwrap();
        state.list_items.insert(list_name.to_string(), items);
        state.list_columns.insert(list_name.to_string(), columns);
    }

    /// Make every path lookup fail with a network error
    pub fn fail_lookups(&self, reason: &str) {
        *self.fail_lookups.lock().unwrap() = Some(reason.to_string());
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn content_of(&self, item_id: &str) -> Option<Bytes> {
        self.state.lock().unwrap().contents.get(item_id).cloned()
    }

    pub fn last_query(&self) -> Option<ListQuery> {
        self.state.lock().unwrap().last_query.clone()
    }
}

#[async_trait]
impl RemoteItemClient for FakeRemote {
    async fn list_drives(&self, site_id: &str) -> Result<Vec<Drive>, RemoteError> {
        if site_id != SITE_ID {
            return Err(RemoteError::NotFound(format!("site {site_id}")));
        }
        Ok(self.drives.clone())
    }

    async fn get_item_by_path(
        &self,
        drive_id: &str,
        full_path: &str,
    ) -> Result<RemoteItem, RemoteError> {
        if let Some(reason) = self.fail_lookups.lock().unwrap().clone() {
            return Err(RemoteError::Network(reason));
        }

        let state = self.state.lock().unwrap();
        state
            .paths
            .get(&(drive_id.to_string(), full_path.to_string()))
            .and_then(|id| state.items.get(&(drive_id.to_string(), id.clone())))
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(full_path.to_string()))
    }

    async fn get_item_by_id(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<RemoteItem, RemoteError> {
        let state = self.state.lock().unwrap();
        state
            .items
            .get(&(drive_id.to_string(), item_id.to_string()))
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(item_id.to_string()))
    }

    async fn get_item_content(
        &self,
        _drive_id: &str,
        item_id: &str,
    ) -> Result<ByteStream, RemoteError> {
        let content = self
            .content_of(item_id)
            .ok_or_else(|| RemoteError::NotFound(item_id.to_string()))?;

        // Hand the content out in small chunks like a real response body
        let chunks: Vec<Result<Bytes, RemoteError>> = content
            .chunks(4)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn put_item_content(
        &self,
        drive_id: &str,
        full_path: &str,
        content: Bytes,
    ) -> Result<RemoteItem, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let key = (drive_id.to_string(), full_path.to_string());
        if state.paths.contains_key(&key) {
            return Err(RemoteError::Conflict(full_path.to_string()));
        }

        self.puts.fetch_add(1, Ordering::SeqCst);
        state.next_id += 1;
        let id = format!("01NEW{}", state.next_id);
        let name = full_path.rsplit('/').next().unwrap_or(full_path);
        let mut item = RemoteItem::file(&id, name)
            .in_drive(drive_id)
            .with_parent(ROOT_ID);
        item.size = Some(content.len() as u64);

        state.paths.insert(key, id.clone());
        state.contents.insert(id.clone(), content);
        state.items.insert((drive_id.to_string(), id), item.clone());
        Ok(item)
    }

    async fn get_item_by_sharing_token(&self, token: &str) -> Result<RemoteItem, RemoteError> {
        let state = self.state.lock().unwrap();
        state
            .shares
            .get(token)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(token.to_string()))
    }

    async fn list_list_items(
        &self,
        _site_id: &str,
        list_name: &str,
        query: &ListQuery,
    ) -> Result<Vec<ListItem>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.last_query = Some(query.clone());
        state
            .list_items
            .get(list_name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(list_name.to_string()))
    }

    async fn list_list_columns(
        &self,
        _site_id: &str,
        list_name: &str,
    ) -> Result<Vec<ListColumn>, RemoteError> {
        let state = self.state.lock().unwrap();
        state
            .list_columns
            .get(list_name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(list_name.to_string()))
    }
}
