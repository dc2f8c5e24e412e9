//! Folder paths inside a document library
//!
//! Paths are `/`-separated and relative to the drive root. Leading and
//! trailing separators are not significant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path of `file_name` inside `folder_path`
///
/// Returns the bare file name when the folder is empty (the drive root).
pub fn join_item_path(folder_path: &str, file_name: &str) -> String {
    let folder = folder_path.trim_matches('/');
    let file = file_name.trim_start_matches('/');
    if folder.is_empty() {
        file.to_string()
    } else {
        format!("{folder}/{file}")
    }
}

/// Split `a/b/c.txt` into (`a/b`, `c.txt`)
///
/// Returns `None` when there is no file name component.
pub fn split_item_path(path: &str) -> Option<(String, String)> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.rsplit_once('/') {
        Some((folder, file)) => Some((folder.to_string(), file.to_string())),
        None => Some((String::new(), trimmed.to_string())),
    }
}

/// Folder names from the drive root down to a leaf folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderPathParts(Vec<String>);

impl FolderPathParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from names collected while walking from a leaf up to the root
    pub fn from_leaf_to_root(mut names: Vec<String>) -> Self {
        names.reverse();
        Self(names)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names joined with `/`; empty for the drive root
    pub fn join(&self) -> String {
        self.0.join("/")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for FolderPathParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join())
    }
}
