//! stat command - Show metadata of a file or folder
//!
//! Resolves a library-relative path to the item the service holds there.

use clap::Args;
use docgate_core::RemoteItem;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Role, Spinner, format_size};

use super::{connect, library_or_default, parse_remote_path, report};

#[derive(Args, Debug)]
pub struct StatArgs {
    /// Path inside the library (folder/file)
    pub path: String,

    /// Document library (defaults to the site's library)
    #[arg(short, long)]
    pub library: Option<String>,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (folder, file_name) = match parse_remote_path(&args.path) {
        Ok(parts) => parts,
        Err(err) => {
            formatter.error(&err);
            return ExitCode::UsageError;
        }
    };

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };
    let library = library_or_default(args.library.as_deref(), &gateway);

    let spinner = Spinner::start(&formatter, format!("Resolving {}", args.path));
    let result = gateway.resolve_by_path(library, &folder, &file_name).await;
    spinner.finish();

    match result {
        Ok(item) => {
            print_item(&formatter, &item);
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to resolve '{}'", args.path), &e),
    }
}

/// Print an item as JSON or as a property list
pub fn print_item(formatter: &Formatter, item: &RemoteItem) {
    if formatter.is_json() {
        formatter.json(item);
        return;
    }

    for (key, value) in item_properties(formatter, item) {
        formatter.property(key, &value);
    }
}

fn item_properties(formatter: &Formatter, item: &RemoteItem) -> Vec<(&'static str, String)> {
    let name = if item.is_folder {
        formatter.paint(Role::Folder, &format!("{}/", item.name))
    } else {
        formatter.paint(Role::Name, &item.name)
    };

    let mut properties = vec![
        ("Name", name),
        ("ID", item.id.clone()),
        ("Type", if item.is_folder { "folder" } else { "file" }.to_string()),
    ];

    if let Some(size) = item.size {
        properties.push(("Size", formatter.paint(Role::Size, &format_size(size))));
    }
    if let Some(modified) = &item.last_modified {
        properties.push((
            "Modified",
            formatter.paint(Role::Date, &modified.strftime("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ));
    }
    if let Some(drive_id) = &item.drive_id {
        properties.push(("Drive", drive_id.clone()));
    }
    if let Some(url) = &item.web_url {
        properties.push(("URL", formatter.paint(Role::Url, url)));
    }
    if let Some(etag) = &item.etag {
        properties.push(("ETag", etag.clone()));
    }

    properties
}
