//! docgate-core: Core library for the docgate document gateway
//!
//! This crate provides the backend-independent parts of docgate:
//! - Configuration management
//! - Forward and backward path resolution
//! - Sharing link tokens
//! - Idempotent uploads and downloads
//! - List rows and column schemas
//!
//! Everything remote goes through the [`RemoteItemClient`] trait, so the
//! crate does not depend on any HTTP stack and can be tested against fakes.

pub mod config;
pub mod error;
pub mod gateway;
pub mod lists;
pub mod path;
pub mod resolver;
pub mod retry;
pub mod sharing;
pub mod traits;
pub mod transfer;
pub mod types;

pub use config::{
    AppCredentials, ConfigManager, GatewayConfig, HttpConfig, RetryConfig, SiteConfig, SiteEntry,
    SiteSelector,
};
pub use error::{Error, RemoteError, Result};
pub use gateway::DocumentGateway;
pub use lists::ListProjector;
pub use path::{FolderPathParts, join_item_path, split_item_path};
pub use resolver::{MAX_HIERARCHY_DEPTH, PathResolver};
pub use retry::{Backoff, is_retryable_error, retry_with_backoff};
pub use sharing::{SHARING_TOKEN_PREFIX, SharingLinkDecoder, encode_sharing_token};
pub use traits::{ByteStream, RemoteItemClient};
pub use transfer::TransferOrchestrator;
pub use types::{
    DEFAULT_LIBRARY, Drive, ListColumn, ListColumnMap, ListItem, ListQuery, ROOT_ITEM_NAME,
    RemoteItem,
};
