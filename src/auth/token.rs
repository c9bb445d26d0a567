// ! Token endpoint requests
// !
// ! Module builds the authorization URL and talks to the provider's token
// ! endpoint for the `authorization_code` and `refresh_token` grants.

use reqwest::Client;
use url::Url;

use crate::auth::client_secret::ClientSecret;
use crate::auth::errors::{AuthError, describe_oauth_error};
use crate::auth::pkce::{CODE_CHALLENGE_METHOD, PkceParams};
use crate::auth::types::{OAuth2Error, TokenResponse};
use crate::core::error::{McpError, McpResult};

/// Read-only access to AdMob account data
pub const SCOPE_ADMOB_READONLY: &str = "https://www.googleapis.com/auth/admob.readonly";
/// Access to AdMob reports
pub const SCOPE_ADMOB_REPORT: &str = "https://www.googleapis.com/auth/admob.report";
/// Scopes requested by the authorization flow
pub const ADMOB_SCOPES: &[&str] = &[SCOPE_ADMOB_READONLY, SCOPE_ADMOB_REPORT];

/// Build authorization URL for OAuth flow
///
/// Requests offline access and forces the consent screen so the provider
/// returns a refresh token even when the user authorized before.
pub fn build_authorization_url(
    client: &ClientSecret,
    redirect_uri: &str,
    state: &str,
    pkce: &PkceParams,
    scopes: &[&str],
) -> Result<Url, AuthError> {
    let mut url = Url::parse(&client.auth_uri)
        .map_err(|e| AuthError::Config(format!("Invalid authorization endpoint: {e}")))?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &client.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("state", state)
        .append_pair("code_challenge", &pkce.challenge)
        .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD);

    Ok(url)
}

/// Exchange authorization code for tokens
///
/// A response without a refresh token is rejected; the token file would be
/// useless without one.
pub async fn exchange_code(
    http: &Client,
    token_uri: &str,
    client: &ClientSecret,
    code: &str,
    redirect_uri: &str,
    code_verifier: &str,
) -> Result<TokenResponse, AuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
        ("code_verifier", code_verifier),
    ];

    let response = post_token_request(http, token_uri, &params)
        .await
        .map_err(AuthError::TokenExchange)?;

    match response.refresh_token {
        Some(ref token) if !token.is_empty() => Ok(response),
        _ => Err(AuthError::TokenExchange(
            "Token response did not include a refresh token".to_string(),
        )),
    }
}

/// Mint an access token from a refresh token
pub async fn refresh_access_token(
    http: &Client,
    token_uri: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> McpResult<TokenResponse> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];

    post_token_request(http, token_uri, &params)
        .await
        .map_err(|e| McpError::Auth(format!("Token refresh failed: {e}")))
}

async fn post_token_request(
    http: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let response = http
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| format!("Request to token endpoint failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        if let Ok(oauth_error) = serde_json::from_str::<OAuth2Error>(&error_text) {
            return Err(describe_oauth_error(&oauth_error));
        }
        return Err(format!("HTTP {}: {}", status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Invalid token response: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> ClientSecret {
        ClientSecret::from_json(r#"{"installed":{"client_id":"client123","client_secret":"shh"}}"#)
            .unwrap()
    }

    #[test]
    fn test_build_authorization_url() {
        let pkce = PkceParams::new();
        let url = build_authorization_url(
            &client(),
            "http://localhost:3000/oauth2callback",
            "state123",
            &pkce,
            ADMOB_SCOPES,
        )
        .unwrap();

        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/auth?"));
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client123");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/oauth2callback");
        assert_eq!(
            params["scope"],
            "https://www.googleapis.com/auth/admob.readonly https://www.googleapis.com/auth/admob.report"
        );
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], "state123");
        assert_eq!(params["code_challenge"], pkce.challenge);
        assert_eq!(params["code_challenge_method"], "S256");
        assert!(!url.as_str().contains("shh"));
    }

    #[tokio::test]
    async fn test_exchange_requires_refresh_token() {
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.only",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        let err = exchange_code(
            &Client::new(),
            &format!("{}/token", server.uri()),
            &client(),
            "code",
            "http://localhost:3000/oauth2callback",
            "verifier",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(ref msg) if msg.contains("refresh token")));
    }

    #[tokio::test]
    async fn test_refresh_surfaces_oauth_error() {
        use wiremock::matchers::{body_string_contains, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&server)
            .await;

        let err = refresh_access_token(&Client::new(), &server.uri(), "id", "secret", "1//r")
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::Auth(ref msg) if msg.contains("invalid_grant")));
    }
}
