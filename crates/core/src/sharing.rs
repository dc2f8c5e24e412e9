//! Sharing links
//!
//! The service addresses a shared item by a token derived from the sharing
//! URL: base64 of the URL bytes without padding, in the URL-safe alphabet,
//! prefixed with `u!`.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{Error, Result};
use crate::traits::RemoteItemClient;
use crate::types::RemoteItem;

/// Prefix marking a token built from a URL
pub const SHARING_TOKEN_PREFIX: &str = "u!";

/// Encode a sharing URL into the token the service accepts
pub fn encode_sharing_token(sharing_url: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(sharing_url.as_bytes());
    format!("{SHARING_TOKEN_PREFIX}{encoded}")
}

/// Resolves sharing URLs to the items they point to
pub struct SharingLinkDecoder<C: RemoteItemClient + ?Sized> {
    client: Arc<C>,
}

impl<C: RemoteItemClient + ?Sized> SharingLinkDecoder<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn decode(&self, sharing_url: &str) -> Result<RemoteItem> {
        if sharing_url.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "sharing URL must not be empty".to_string(),
            ));
        }

        let token = encode_sharing_token(sharing_url);
        match self.client.get_item_by_sharing_token(&token).await {
            Ok(item) => Ok(item),
            Err(e) if e.is_not_found() => Err(Error::ShareNotFound(sharing_url.to_string())),
            Err(e) => Err(Error::remote(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::traits::MockRemoteItemClient;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn test_encode_known_urls() {
        assert_eq!(
            encode_sharing_token("https://example/x"),
            "u!aHR0cHM6Ly9leGFtcGxlL3g"
        );
        assert_eq!(
            encode_sharing_token("https://contoso.sharepoint.com/sites/Tech?a=~~~"),
            "u!aHR0cHM6Ly9jb250b3NvLnNoYXJlcG9pbnQuY29tL3NpdGVzL1RlY2g_YT1-fn4"
        );
    }

    #[test]
    fn test_encode_substitutes_url_unsafe_characters() {
        // "???" is "Pz8/" and "??>>" is "Pz8+Pg==" in standard base64
        assert_eq!(encode_sharing_token("???"), "u!Pz8_");
        assert_eq!(encode_sharing_token("??>>"), "u!Pz8-Pg");
    }

    #[test]
    fn test_encode_matches_standard_alphabet_rewrite() {
        for url in [
            "https://onedrive.live.com/redir?resid=ABC123",
            "https://contoso.sharepoint.com/:w:/s/Tech/EaBc?e=x1y2",
            "a",
            "ab",
            "",
        ] {
            let rewritten = STANDARD
                .encode(url.as_bytes())
                .trim_end_matches('=')
                .replace('/', "_")
                .replace('+', "-");
            let token = encode_sharing_token(url);
            assert_eq!(token, format!("u!{rewritten}"));
            assert!(!token.contains('='));
            assert!(!token.contains('/'));
            assert!(!token.contains('+'));
            assert_eq!(token, encode_sharing_token(url));
        }
    }

    #[tokio::test]
    async fn test_decode_looks_up_token() {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_get_item_by_sharing_token()
            .withf(|token: &str| token == "u!aHR0cHM6Ly9leGFtcGxlL3g")
            .times(1)
            .returning(|_| Ok(RemoteItem::file("01SH", "shared.docx").in_drive("b!1")));

        let decoder = SharingLinkDecoder::new(Arc::new(mock));
        let item = decoder.decode("https://example/x").await.unwrap();
        assert_eq!(item.id, "01SH");
    }

    #[tokio::test]
    async fn test_decode_missing_share() {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_get_item_by_sharing_token()
            .returning(|_| Err(RemoteError::NotFound("itemNotFound".to_string())));

        let decoder = SharingLinkDecoder::new(Arc::new(mock));
        let err = decoder.decode("https://example/x").await.unwrap_err();
        assert!(matches!(err, Error::ShareNotFound(_)));
    }

    #[tokio::test]
    async fn test_decode_remote_failure() {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_get_item_by_sharing_token()
            .returning(|_| Err(RemoteError::Auth("accessDenied".to_string())));

        let decoder = SharingLinkDecoder::new(Arc::new(mock));
        let err = decoder.decode("https://example/x").await.unwrap_err();
        assert!(matches!(err, Error::RemoteUnavailable(RemoteError::Auth(_))));
    }

    #[tokio::test]
    async fn test_decode_rejects_empty_url() {
        let mut mock = MockRemoteItemClient::new();
        mock.expect_get_item_by_sharing_token().never();

        let decoder = SharingLinkDecoder::new(Arc::new(mock));
        let err = decoder.decode("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
