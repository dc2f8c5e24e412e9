//! share command - Resolve a sharing link
//!
//! Turns a sharing URL into the item it points at. With `--token-only` the
//! encoded token is printed without contacting the service.

use clap::Args;
use docgate_core::{RemoteItem, encode_sharing_token};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

use super::{connect, report, stat::print_item};

#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Sharing URL as copied from SharePoint
    pub url: String,

    /// Only print the encoded sharing token (works offline)
    #[arg(long)]
    pub token_only: bool,

    /// Also resolve the folder path of the shared item
    #[arg(long, conflicts_with = "token_only")]
    pub folder_path: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenOutput<'a> {
    url: &'a str,
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareOutput<'a> {
    url: &'a str,
    token: String,
    item: &'a RemoteItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_path: Option<String>,
}

/// Execute the share command
pub async fn execute(args: ShareArgs, site: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let url = args.url.trim();
    if url.is_empty() {
        formatter.error("Sharing URL must not be empty");
        return ExitCode::UsageError;
    }
    let token = encode_sharing_token(url);

    if args.token_only {
        if formatter.is_json() {
            formatter.json(&TokenOutput { url, token });
        } else {
            formatter.println(&token);
        }
        return ExitCode::Success;
    }

    let gateway = match connect(site, &formatter) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    let spinner = Spinner::start(&formatter, "Resolving sharing link");
    let result = gateway.item_from_sharing_link(url).await;
    spinner.finish();

    let item = match result {
        Ok(item) => item,
        Err(e) => return report(&formatter, "Failed to resolve sharing link", &e),
    };

    let folder_path = if args.folder_path {
        match gateway.folder_path_of(&item).await {
            Ok(parts) => Some(parts.join()),
            Err(e) => return report(&formatter, "Failed to resolve folder path", &e),
        }
    } else {
        None
    };

    if formatter.is_json() {
        formatter.json(&ShareOutput {
            url,
            token,
            item: &item,
            folder_path,
        });
    } else {
        print_item(&formatter, &item);
        if let Some(path) = folder_path {
            formatter.property("Folder", &format!("/{path}"));
        }
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> OutputConfig {
        OutputConfig {
            quiet: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_token_only_needs_no_configuration() {
        let args = ShareArgs {
            url: "https://example/x".to_string(),
            token_only: true,
            folder_path: false,
        };
        assert_eq!(execute(args, None, quiet()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_blank_url_is_usage_error() {
        let args = ShareArgs {
            url: "   ".to_string(),
            token_only: true,
            folder_path: false,
        };
        assert_eq!(execute(args, None, quiet()).await, ExitCode::UsageError);
    }

    #[test]
    fn test_token_output_shape() {
        let output = TokenOutput {
            url: "https://example/x",
            token: encode_sharing_token("https://example/x"),
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["token"], "u!aHR0cHM6Ly9leGFtcGxlL3g");
    }
}
