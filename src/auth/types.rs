// ! OAuth 2.0 wire types
// !
// ! Token endpoint responses as returned by the provider.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OAuth 2.0 Token Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token
    pub access_token: String,

    /// The type of token (typically "Bearer")
    #[serde(default)]
    pub token_type: Option<String>,

    /// The lifetime in seconds of the access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// The refresh token; present on the first consent and with `prompt=consent`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// The scope of the access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Additional parameters (`id_token` and the like)
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

/// OAuth 2.0 Error Response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuth2Error {
    /// Error code
    pub error: String,

    /// Human-readable error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// URI for more information about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_without_refresh_token() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"ya29.x","expires_in":3599,"token_type":"Bearer","scope":"a b"}"#,
        )
        .unwrap();
        assert_eq!(response.access_token, "ya29.x");
        assert_eq!(response.expires_in, Some(3599));
        assert!(response.refresh_token.is_none());
    }

    #[test]
    fn test_oauth_error_parse() {
        let error: OAuth2Error =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#)
                .unwrap();
        assert_eq!(error.error, "invalid_grant");
        assert_eq!(error.error_description.as_deref(), Some("Bad Request"));
    }
}
