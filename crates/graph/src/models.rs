//! Graph resource shapes and their conversion into core types

use docgate_core::{Drive, ListColumn, ListItem, RemoteItem};
use jiff::Timestamp;
use serde::Deserialize;

/// `{"value": [...]}` collection envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    #[serde(default)]
    pub value: Vec<T>,

    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    pub id: Option<String>,
    pub drive_id: Option<String>,
    pub path: Option<String>,
}

/// A `driveItem` resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItemResource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub size: Option<u64>,
    pub web_url: Option<String>,
    #[serde(rename = "eTag")]
    pub etag: Option<String>,
    pub last_modified_date_time: Option<Timestamp>,
    pub parent_reference: Option<ParentReference>,
    pub folder: Option<serde_json::Value>,
    pub root: Option<serde_json::Value>,
}

impl From<DriveItemResource> for RemoteItem {
    fn from(resource: DriveItemResource) -> Self {
        let is_root = resource.root.is_some();
        let parent = resource.parent_reference.unwrap_or_default();

        RemoteItem {
            id: resource.id,
            name: resource.name.unwrap_or_default(),
            drive_id: parent.drive_id,
            // The root facet wins over whatever the parent reference says
            parent_id: if is_root { None } else { parent.id },
            parent_path: parent.path,
            size: resource.size,
            is_folder: resource.folder.is_some() || is_root,
            web_url: resource.web_url,
            etag: resource.etag,
            last_modified: resource.last_modified_date_time,
        }
    }
}

/// A `drive` resource
#[derive(Debug, Clone, Deserialize)]
pub struct DriveResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl DriveResource {
    pub fn into_drive(self, site_id: &str) -> Drive {
        Drive {
            id: self.id,
            name: self.name,
            site_id: site_id.to_string(),
        }
    }
}

/// A `listItem` resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemResource {
    pub id: String,
    #[serde(default)]
    pub fields: Option<serde_json::Map<String, serde_json::Value>>,
    pub web_url: Option<String>,
    pub created_date_time: Option<Timestamp>,
    pub last_modified_date_time: Option<Timestamp>,
}

impl From<ListItemResource> for ListItem {
    fn from(resource: ListItemResource) -> Self {
        ListItem {
            id: resource.id,
            fields: resource.fields.unwrap_or_default(),
            web_url: resource.web_url,
            created: resource.created_date_time,
            last_modified: resource.last_modified_date_time,
        }
    }
}

/// A `columnDefinition` resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnResource {
    pub name: String,
    pub display_name: Option<String>,
}

impl From<ColumnResource> for ListColumn {
    fn from(resource: ColumnResource) -> Self {
        let display_name = resource
            .display_name
            .unwrap_or_else(|| resource.name.clone());
        ListColumn::new(resource.name, display_name)
    }
}
