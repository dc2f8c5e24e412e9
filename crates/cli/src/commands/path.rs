//! path command - Reconstruct the folder path of an item from its ID

use clap::Args;
use docgate_core::FolderPathParts;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

use super::{connect, report};

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Item ID
    pub item_id: String,

    /// Site that owns the item (defaults to the configured site)
    #[arg(long)]
    pub site_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PathOutput<'a> {
    item_id: &'a str,
    site_id: &'a str,
    folder_path: String,
    parts: &'a FolderPathParts,
}

/// Execute the path command
pub async fn execute(args: PathArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.item_id.trim().is_empty() {
        formatter.error("Item ID must not be empty");
        return ExitCode::UsageError;
    }

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };
    let site_id = args.site_id.as_deref().unwrap_or(&gateway.site().site_id);

    let spinner = Spinner::start(&formatter, format!("Walking ancestors of {}", args.item_id));
    let result = gateway.resolve_folder_path(&args.item_id, site_id).await;
    spinner.finish();

    let parts = match result {
        Ok(parts) => parts,
        Err(e) => {
            return report(
                &formatter,
                &format!("Failed to resolve folder path of '{}'", args.item_id),
                &e,
            );
        }
    };

    if formatter.is_json() {
        formatter.json(&PathOutput {
            item_id: &args.item_id,
            site_id,
            folder_path: parts.join(),
            parts: &parts,
        });
    } else {
        formatter.println(&display_path(&parts));
    }

    ExitCode::Success
}

/// Human form of a folder path; the drive root is shown as `/`
fn display_path(parts: &FolderPathParts) -> String {
    format!("/{}", parts.join())
}
