//! upload command - Put a local file into a document library
//!
//! An existing remote file is never replaced; the command then reports the
//! item that is already there.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tokio::fs::File;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner, format_size};

use super::{connect, library_or_default, parse_remote_path, report, stat::print_item};

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub source: PathBuf,

    /// Destination inside the library (folder/file); a trailing `/` keeps the local name
    pub destination: String,

    /// Document library (defaults to the site's library)
    #[arg(short, long)]
    pub library: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadOutput<'a> {
    library: &'a str,
    path: String,
    item: &'a docgate_core::RemoteItem,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let destination = match destination_path(&args.source, &args.destination) {
        Ok(destination) => destination,
        Err(err) => {
            formatter.error(&err);
            return ExitCode::UsageError;
        }
    };
    let (folder, file_name) = match parse_remote_path(&destination) {
        Ok(parts) => parts,
        Err(err) => {
            formatter.error(&err);
            return ExitCode::UsageError;
        }
    };

    let mut file = match open_source(&args.source).await {
        Ok(file) => file,
        Err(err) => {
            formatter.error(&err);
            return ExitCode::UsageError;
        }
    };
    let local_size = file.metadata().await.map(|m| m.len()).unwrap_or_default();

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };
    let library = library_or_default(args.library.as_deref(), &gateway);

    let spinner = Spinner::start(
        &formatter,
        format!("Uploading {} ({})", args.source.display(), format_size(local_size)),
    );
    let result = gateway.upload(library, &folder, &file_name, &mut file).await;
    spinner.finish();

    match result {
        Ok(item) => {
            if formatter.is_json() {
                formatter.json(&UploadOutput {
                    library,
                    path: destination,
                    item: &item,
                });
            } else {
                formatter.success(&format!(
                    "{} -> {library}/{destination}",
                    args.source.display()
                ));
                print_item(&formatter, &item);
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to upload to '{destination}'"), &e),
    }
}

/// Remote path for the upload, taking the local file name for folder targets
fn destination_path(source: &std::path::Path, destination: &str) -> Result<String, String> {
    let trimmed = destination.trim();
    if !trimmed.is_empty() && !trimmed.ends_with('/') {
        return Ok(trimmed.to_string());
    }

    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Cannot derive a file name from '{}'", source.display()))?;
    Ok(format!("{trimmed}{name}"))
}

async fn open_source(path: &std::path::Path) -> Result<File, String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| format!("Cannot read '{}': {e}", path.display()))?;
    if !metadata.is_file() {
        return Err(format!("'{}' is not a file", path.display()));
    }

    File::open(path)
        .await
        .map_err(|e| format!("Cannot open '{}': {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_destination_keeps_explicit_name() {
        assert_eq!(
            destination_path(Path::new("/tmp/a.txt"), "Reports/b.txt").unwrap(),
            "Reports/b.txt"
        );
    }

    #[test]
    fn test_destination_folder_takes_local_name() {
        assert_eq!(
            destination_path(Path::new("/tmp/a.txt"), "Reports/").unwrap(),
            "Reports/a.txt"
        );
        assert_eq!(destination_path(Path::new("a.txt"), "").unwrap(), "a.txt");
    }

    #[tokio::test]
    async fn test_open_source_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = open_source(temp_dir.path()).await.unwrap_err();
        assert!(err.contains("is not a file"));
    }

    #[tokio::test]
    async fn test_open_source_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = open_source(&temp_dir.path().join("missing.txt")).await.unwrap_err();
        assert!(err.starts_with("Cannot read"));
    }

    #[tokio::test]
    async fn test_open_source_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(open_source(&path).await.is_ok());
    }
}
