//! Error types for docgate
//!
//! [`RemoteError`] is what a [`RemoteItemClient`](crate::RemoteItemClient)
//! reports and [`Error`] is what gateway operations return. There is no
//! blanket conversion between them: each call site classifies a remote
//! "not found" as an absent item, a missing share or a broken hierarchy.

use thiserror::Error;

/// Result alias used across the gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the remote item service
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The addressed drive, item, share or list does not exist (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),

    /// A write collided with an existing item (HTTP 409)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials were rejected or lack the required permissions
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any other non-success response from the service
    #[error("service error (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, reset)
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a body that could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether this is the service's "does not exist" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }

    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Network(_) => true,
            RemoteError::Service { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            RemoteError::NotFound(_)
            | RemoteError::Conflict(_)
            | RemoteError::Auth(_)
            | RemoteError::InvalidResponse(_) => false,
        }
    }
}

/// Error returned by gateway operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Document library not found: {0}")]
    LibraryNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("No item found for sharing link: {0}")]
    ShareNotFound(String),

    #[error("Invalid folder hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(#[source] RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a remote failure that has no more specific meaning at this boundary
    pub fn remote(err: RemoteError) -> Self {
        Error::RemoteUnavailable(err)
    }

    /// Whether the operation failed only because something does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::LibraryNotFound(_) | Error::ItemNotFound(_) | Error::ShareNotFound(_)
        )
    }

    /// Process exit code for this error
    ///
    /// 1 general, 2 usage, 3 remote/network, 4 auth or configuration, 5 not found.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::LibraryNotFound(_) | Error::ItemNotFound(_) | Error::ShareNotFound(_) => 5,
            Error::ConfigurationInvalid(_) => 4,
            Error::RemoteUnavailable(RemoteError::Auth(_)) => 4,
            Error::RemoteUnavailable(_) => 3,
            Error::InvalidArgument(_) => 2,
            Error::InvalidHierarchy(_) | Error::Io(_) => 1,
        }
    }
}
