//! Data model shared by the gateway and its backends

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Name the service gives to the top of every drive
pub const ROOT_ITEM_NAME: &str = "root";

/// Document library used when an operation is keyed by item ID only
pub const DEFAULT_LIBRARY: &str = "Documents";

/// A file or folder snapshot returned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    /// Opaque ID, unique within its drive
    pub id: String,

    pub name: String,

    /// Owning drive, when the service reported it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,

    /// Parent item ID; absent for the drive root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Parent path as reported by the service (e.g. `/drive/root:/Reports`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default)]
    pub is_folder: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl RemoteItem {
    /// Create a file item with only identity fields set
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            drive_id: None,
            parent_id: None,
            parent_path: None,
            size: None,
            is_folder: false,
            web_url: None,
            etag: None,
            last_modified: None,
        }
    }

    /// Create a folder item with only identity fields set
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_folder: true,
            ..Self::file(id, name)
        }
    }

    /// Set the owning drive
    pub fn in_drive(mut self, drive_id: impl Into<String>) -> Self {
        self.drive_id = Some(drive_id.into());
        self
    }

    /// Set the parent reference
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Whether this item is the top of its drive
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none() || self.name == ROOT_ITEM_NAME
    }
}

/// A document library within a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,
    pub name: String,
    pub site_id: String,
}

impl Drive {
    /// Whether this drive is the library named `library_name`, ignoring case
    pub fn matches_library(&self, library_name: &str) -> bool {
        self.name.to_lowercase() == library_name.to_lowercase()
    }
}

/// A row of a site list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,

    /// Column values keyed by internal column name
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

/// A column definition of a site list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListColumn {
    /// Internal (API) name
    pub name: String,
    pub display_name: String,
}

impl ListColumn {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}

/// Internal column name to display name
pub type ListColumnMap = HashMap<String, String>;

/// Query options forwarded to the list-items endpoint
///
/// Each field maps to the OData option of the same name. Nothing is
/// interpreted locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub select: Vec<String>,
    pub expand: Vec<String>,
    pub order_by: Option<String>,
    pub top: Option<u32>,
}

impl ListQuery {
    /// Query that expands column values, which the service omits by default
    pub fn with_fields() -> Self {
        Self {
            expand: vec!["fields".to_string()],
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// OData query pairs in a stable order
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("$filter", filter.clone()));
        }
        if !self.select.is_empty() {
            pairs.push(("$select", self.select.join(",")));
        }
        if !self.expand.is_empty() {
            pairs.push(("$expand", self.expand.join(",")));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("$orderby", order_by.clone()));
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_matches_library_ignoring_case() {
        let drive = Drive {
            id: "b!1".to_string(),
            name: "Shared Documents".to_string(),
            site_id: "site".to_string(),
        };
        assert!(drive.matches_library("shared documents"));
        assert!(drive.matches_library("SHARED DOCUMENTS"));
        assert!(!drive.matches_library("Shared"));
    }

    #[test]
    fn test_is_root() {
        assert!(RemoteItem::folder("r", "anything").is_root());
        assert!(RemoteItem::folder("r", "root").with_parent("x").is_root());
        assert!(!RemoteItem::folder("a", "A").with_parent("r").is_root());
    }

    #[test]
    fn test_list_query_pairs() {
        let query = ListQuery {
            filter: Some("fields/Status eq 'Open'".to_string()),
            select: vec!["id".to_string(), "fields".to_string()],
            expand: vec!["fields".to_string()],
            order_by: Some("createdDateTime desc".to_string()),
            top: Some(50),
        };
        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("$filter", "fields/Status eq 'Open'".to_string()),
                ("$select", "id,fields".to_string()),
                ("$expand", "fields".to_string()),
                ("$orderby", "createdDateTime desc".to_string()),
                ("$top", "50".to_string()),
            ]
        );
        assert!(ListQuery::default().to_query_pairs().is_empty());
    }

    #[test]
    fn test_remote_item_json_is_camel_case() {
        let item = RemoteItem::file("01ABC", "report.pdf").in_drive("b!xyz");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["driveId"], "b!xyz");
        assert_eq!(json["isFolder"], false);
        assert!(json.get("parentId").is_none());
    }
}
