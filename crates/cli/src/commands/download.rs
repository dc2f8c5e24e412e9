//! download command - Fetch a file by path or by item ID

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Role, Spinner, format_size};

use super::{connect, library_or_default, parse_remote_path, report};

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Path inside the library (folder/file)
    #[arg(required_unless_present = "id", conflicts_with = "id")]
    pub path: Option<String>,

    /// Download by item ID instead of by path
    #[arg(long)]
    pub id: Option<String>,

    /// Site that owns the item (with --id; defaults to the configured site)
    #[arg(long, requires = "id")]
    pub site_id: Option<String>,

    /// Write to this file ("-" for stdout); defaults to the remote file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Document library (defaults to the site's library)
    #[arg(short, long)]
    pub library: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadOutput {
    source: String,
    destination: String,
    size: u64,
    size_human: String,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match Target::from_args(&args) {
        Ok(target) => target,
        Err(err) => {
            formatter.error(&err);
            return ExitCode::UsageError;
        }
    };

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    let spinner = Spinner::start(&formatter, format!("Downloading {}", target.describe()));
    let result = match &target {
        Target::Path { folder, file_name } => {
            let library = library_or_default(args.library.as_deref(), &gateway);
            gateway.download(library, folder, file_name).await
        }
        Target::Id(item_id) => {
            let site_id = args.site_id.as_deref().unwrap_or(&gateway.site().site_id);
            gateway.download_by_id(item_id, site_id).await
        }
    };
    spinner.finish();

    let content = match result {
        Ok(Some(content)) => content,
        Ok(None) => {
            formatter.error(&format!("No item at {}", target.describe()));
            return ExitCode::NotFound;
        }
        Err(e) => return report(&formatter, &format!("Failed to download {}", target.describe()), &e),
    };

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(target.default_file_name()));

    if let Err(err) = write_content(&destination, &content).await {
        formatter.error(&err);
        return ExitCode::GeneralError;
    }

    let size = content.len() as u64;
    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            source: target.describe(),
            destination: destination.display().to_string(),
            size,
            size_human: format_size(size),
        });
    } else if !is_stdout(&destination) {
        formatter.success(&format!(
            "{} -> {} ({})",
            target.describe(),
            destination.display(),
            formatter.paint(Role::Size, &format_size(size))
        ));
    }

    ExitCode::Success
}

/// What to download
#[derive(Debug, PartialEq, Eq)]
enum Target {
    Path { folder: String, file_name: String },
    Id(String),
}

impl Target {
    fn from_args(args: &DownloadArgs) -> Result<Self, String> {
        match (&args.id, &args.path) {
            (Some(id), _) if id.trim().is_empty() => Err("Item ID must not be empty".to_string()),
            (Some(id), _) => Ok(Target::Id(id.clone())),
            (None, Some(path)) => {
                let (folder, file_name) = parse_remote_path(path)?;
                Ok(Target::Path { folder, file_name })
            }
            (None, None) => Err("Either a path or --id is required".to_string()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Target::Path { folder, file_name } => docgate_core::join_item_path(folder, file_name),
            Target::Id(id) => format!("item {id}"),
        }
    }

    fn default_file_name(&self) -> String {
        match self {
            Target::Path { file_name, .. } => file_name.clone(),
            Target::Id(id) => id.clone(),
        }
    }
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

async fn write_content(destination: &Path, content: &Bytes) -> Result<(), String> {
    if is_stdout(destination) {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(content)
            .await
            .map_err(|e| format!("Failed to write to stdout: {e}"))?;
        return stdout
            .flush()
            .await
            .map_err(|e| format!("Failed to write to stdout: {e}"));
    }

    tokio::fs::write(destination, content)
        .await
        .map_err(|e| format!("Failed to write '{}': {e}", destination.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(path: Option<&str>, id: Option<&str>) -> DownloadArgs {
        DownloadArgs {
            path: path.map(str::to_string),
            id: id.map(str::to_string),
            site_id: None,
            output: None,
            library: None,
        }
    }

    #[test]
    fn test_target_from_path() {
        let target = Target::from_args(&args(Some("Reports/q1.pdf"), None)).unwrap();
        assert_eq!(
            target,
            Target::Path {
                folder: "Reports".to_string(),
                file_name: "q1.pdf".to_string()
            }
        );
        assert_eq!(target.describe(), "Reports/q1.pdf");
        assert_eq!(target.default_file_name(), "q1.pdf");
    }

    #[test]
    fn test_target_from_id() {
        let target = Target::from_args(&args(None, Some("01ABC"))).unwrap();
        assert_eq!(target, Target::Id("01ABC".to_string()));
        assert_eq!(target.describe(), "item 01ABC");
    }

    #[test]
    fn test_target_rejects_blank_id() {
        assert!(Target::from_args(&args(None, Some("  "))).is_err());
        assert!(Target::from_args(&args(None, None)).is_err());
    }

    #[tokio::test]
    async fn test_write_content_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q1.pdf");
        write_content(&path, &Bytes::from_static(b"%PDF")).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn test_write_content_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("q1.pdf");
        let err = write_content(&path, &Bytes::from_static(b"x")).await.unwrap_err();
        assert!(err.starts_with("Failed to write"));
    }
}
