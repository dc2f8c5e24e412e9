//! Site list rows and column schemas

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::traits::RemoteItemClient;
use crate::types::{ListColumnMap, ListItem, ListQuery};

/// Reads rows and column schemas of a site's lists
///
/// A row listing without an explicit query sends `$expand=fields`, so each
/// [`ListItem`] carries its column values. Pass an empty [`ListQuery`] to
/// get the bare rows the service returns by default.
pub struct ListProjector<C: RemoteItemClient + ?Sized> {
    client: Arc<C>,
    site_id: String,
}

impl<C: RemoteItemClient + ?Sized> ListProjector<C> {
    pub fn new(client: Arc<C>, site_id: impl Into<String>) -> Self {
        Self {
            client,
            site_id: site_id.into(),
        }
    }

    /// Rows of a list, with the query passed through untouched
    ///
    /// `None` is the same as [`ListQuery::with_fields`], which expands the
    /// column values. `Some(ListQuery::default())` sends no query options.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_items(
        &self,
        list_name: &str,
        query: Option<ListQuery>,
    ) -> Result<Vec<ListItem>> {
        let query = query.unwrap_or_else(ListQuery::with_fields);
        let items = self
            .client
            .list_list_items(&self.site_id, list_name, &query)
            .await
            .map_err(Error::remote)?;

        tracing::debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Internal column name to display name for a list
    ///
    /// When the service reports the same internal name twice the later
    /// display name is kept.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_columns(&self, list_name: &str) -> Result<ListColumnMap> {
        let columns = self
            .client
            .list_list_columns(&self.site_id, list_name)
            .await
            .map_err(Error::remote)?;

        Ok(columns
            .into_iter()
            .map(|column| (column.name, column.display_name))
            .collect())
    }
}
