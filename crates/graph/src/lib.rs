//! docgate-graph: Microsoft Graph adapter for docgate
//!
//! Implements the `RemoteItemClient` trait from docgate-core against the
//! Graph v1.0 REST API, authenticating with an app registration's client
//! secret.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{ClientSecretCredential, GRAPH_DEFAULT_SCOPE, StaticToken, TokenProvider};
pub use client::GraphClient;
pub use error::{TokenError, from_graph_response, from_reqwest};
