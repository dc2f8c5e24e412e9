//! Mapping Graph and transport failures onto [`RemoteError`]

use docgate_core::RemoteError;
use serde::Deserialize;
use thiserror::Error;

/// Failure while acquiring an access token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint rejected the request (HTTP {status}): {code}: {description}")]
    Rejected {
        status: u16,
        code: String,
        description: String,
    },

    #[error("malformed token response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<TokenError> for RemoteError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Request(e) => from_reqwest(e),
            TokenError::Rejected { .. } => RemoteError::Auth(err.to_string()),
            TokenError::Malformed(_) => RemoteError::InvalidResponse(err.to_string()),
        }
    }
}

/// `{"error": {"code": ..., "message": ..., "innerError": {"request-id": ...}}}`
#[derive(Debug, Default, Deserialize)]
struct GraphErrorEnvelope {
    #[serde(default)]
    error: GraphErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub inner_error: Option<InnerError>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InnerError {
    #[serde(rename = "request-id")]
    pub request_id: Option<String>,
}

/// Extract the error object from a Graph error response body
///
/// Bodies that are not Graph error JSON yield an empty [`GraphErrorBody`].
pub(crate) fn parse_graph_error_body(body: &str) -> GraphErrorBody {
    serde_json::from_str::<GraphErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default()
}

/// Classify a non-success Graph response
pub fn from_graph_response(status: u16, body: &str) -> RemoteError {
    let parsed = parse_graph_error_body(body);
    let request_id = parsed
        .inner_error
        .as_ref()
        .and_then(|inner| inner.request_id.clone());

    let mut message = parsed
        .message
        .clone()
        .unwrap_or_else(|| format!("Graph API error (HTTP {status})"));
    if let Some(code) = &parsed.code {
        message = format!("{code}: {message}");
    }

    tracing::debug!(status, request_id = ?request_id, %message, "Graph request failed");

    match status {
        404 => RemoteError::NotFound(message),
        409 => RemoteError::Conflict(message),
        401 | 403 => RemoteError::Auth(message),
        _ => RemoteError::Service {
            status,
            code: parsed.code,
            message,
        },
    }
}

/// Classify a transport-level failure
pub fn from_reqwest(err: reqwest::Error) -> RemoteError {
    if let Some(status) = err.status() {
        return from_graph_response(status.as_u16(), "");
    }
    if err.is_decode() {
        return RemoteError::InvalidResponse(err.to_string());
    }
    RemoteError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOT_FOUND_BODY: &str = r#"{
        "error": {
            "code": "itemNotFound",
            "message": "The resource could not be found.",
            "innerError": {"request-id": "b1c2d3", "date": "2024-05-01T10:00:00"}
        }
    }"#;

    #[test]
    fn test_not_found() {
        let err = from_graph_response(404, NOT_FOUND_BODY);
        match err {
            RemoteError::NotFound(message) => {
                assert_eq!(message, "itemNotFound: The resource could not be found.")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            from_graph_response(409, r#"{"error":{"code":"nameAlreadyExists","message":"exists"}}"#),
            RemoteError::Conflict(_)
        ));
        assert!(matches!(from_graph_response(401, ""), RemoteError::Auth(_)));
        assert!(matches!(from_graph_response(403, ""), RemoteError::Auth(_)));

        match from_graph_response(429, r#"{"error":{"code":"activityLimitReached","message":"slow down"}}"#) {
            RemoteError::Service { status, code, .. } => {
                assert_eq!(status, 429);
                assert_eq!(code.as_deref(), Some("activityLimitReached"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body() {
        match from_graph_response(502, "<html>Bad Gateway</html>") {
            RemoteError::Service {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 502);
                assert!(code.is_none());
                assert_eq!(message, "Graph API error (HTTP 502)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_request_id() {
        let body = parse_graph_error_body(NOT_FOUND_BODY);
        assert_eq!(body.code.as_deref(), Some("itemNotFound"));
        assert_eq!(
            body.inner_error.and_then(|i| i.request_id).as_deref(),
            Some("b1c2d3")
        );
    }

    #[test]
    fn test_rejected_token_is_auth() {
        let err: RemoteError = TokenError::Rejected {
            status: 401,
            code: "invalid_client".to_string(),
            description: "AADSTS7000215: Invalid client secret provided.".to_string(),
        }
        .into();
        assert!(matches!(err, RemoteError::Auth(_)));
    }
}
