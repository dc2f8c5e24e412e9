//! items command - List the rows of a site list
//!
//! Query options are passed to the service as given. Column values are
//! expanded unless `--expand` says otherwise.

use std::collections::BTreeSet;

use clap::Args;
use docgate_core::{ListColumnMap, ListItem, ListQuery};
use serde_json::Value;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

use super::{connect, report};

#[derive(Args, Debug)]
pub struct ItemsArgs {
    /// List name (defaults to the site's list)
    #[arg(default_value = "")]
    pub list: String,

    /// OData $filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Properties to return ($select), comma separated
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Relationships to expand ($expand), comma separated; defaults to "fields"
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,

    /// OData $orderby expression
    #[arg(long)]
    pub order_by: Option<String>,

    /// Maximum number of rows ($top)
    #[arg(long)]
    pub top: Option<u32>,

    /// Use column display names as table headers
    #[arg(long)]
    pub display_names: bool,
}

impl ItemsArgs {
    fn query(&self) -> ListQuery {
        let mut query = ListQuery::with_fields();
        query.filter = self.filter.clone();
        query.select = self.select.clone();
        if !self.expand.is_empty() {
            query.expand = self.expand.clone();
        }
        query.order_by = self.order_by.clone();
        query.top = self.top;
        query
    }
}

/// Execute the items command
pub async fn execute(args: ItemsArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.top == Some(0) {
        formatter.error("--top must be greater than zero");
        return ExitCode::UsageError;
    }

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    let spinner = Spinner::start(&formatter, "Fetching list items");
    let result = gateway.list_items(&args.list, Some(args.query())).await;
    spinner.finish();

    let items = match result {
        Ok(items) => items,
        Err(e) => return report(&formatter, "Failed to list items", &e),
    };

    if formatter.is_json() {
        formatter.json(&items);
        return ExitCode::Success;
    }

    if items.is_empty() {
        formatter.warning("No items");
        return ExitCode::Success;
    }

    let columns = if args.display_names {
        match gateway.list_columns(&args.list).await {
            Ok(columns) => columns,
            Err(e) => return report(&formatter, "Failed to list columns", &e),
        }
    } else {
        ListColumnMap::new()
    };

    let (header, rows) = item_table(&items, &columns);
    let header: Vec<&str> = header.iter().map(String::as_str).collect();
    formatter.table(&header, rows);

    ExitCode::Success
}

/// Header and rows for a set of items: the ID, then every field seen in any row
fn item_table(items: &[ListItem], columns: &ListColumnMap) -> (Vec<String>, Vec<Vec<String>>) {
    let field_names: BTreeSet<&str> = items
        .iter()
        .flat_map(|item| item.fields.keys().map(String::as_str))
        .collect();

    let mut header = vec!["ID".to_string()];
    header.extend(field_names.iter().map(|name| {
        columns
            .get(*name)
            .cloned()
            .unwrap_or_else(|| (*name).to_string())
    }));

    let rows = items
        .iter()
        .map(|item| {
            let mut row = vec![item.id.clone()];
            row.extend(
                field_names
                    .iter()
                    .map(|name| item.fields.get(*name).map(cell).unwrap_or_default()),
            );
            row
        })
        .collect();

    (header, rows)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
