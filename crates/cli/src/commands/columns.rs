//! columns command - Show internal and display names of a list's columns

use clap::Args;
use docgate_core::ListColumnMap;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Role, Spinner};

use super::{connect, report};

#[derive(Args, Debug)]
pub struct ColumnsArgs {
    /// List name (defaults to the site's list)
    #[arg(default_value = "")]
    pub list: String,
}

/// Execute the columns command
pub async fn execute(args: ColumnsArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    let spinner = Spinner::start(&formatter, "Fetching columns");
    let result = gateway.list_columns(&args.list).await;
    spinner.finish();

    let columns = match result {
        Ok(columns) => columns,
        Err(e) => return report(&formatter, "Failed to list columns", &e),
    };

    if formatter.is_json() {
        formatter.json(&sorted(&columns));
        return ExitCode::Success;
    }

    if columns.is_empty() {
        formatter.warning("No columns");
        return ExitCode::Success;
    }

    let rows = sorted(&columns)
        .into_iter()
        .map(|(name, display_name)| vec![formatter.paint(Role::Name, name), display_name.to_string()])
        .collect();
    formatter.table(&["Name", "Display name"], rows);

    ExitCode::Success
}

/// Columns ordered by internal name, for stable output
fn sorted(columns: &ListColumnMap) -> std::collections::BTreeMap<&str, &str> {
    columns
        .iter()
        .map(|(name, display_name)| (name.as_str(), display_name.as_str()))
        .collect()
}
