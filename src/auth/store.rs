// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Credential store
//!
//! Persists the long-lived refresh token as `token.json` in the
//! `authorized_user` shape understood by Google client libraries.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::auth::errors::AuthError;
use crate::auth::token::refresh_access_token;
use crate::core::error::McpResult;

/// Value of the `type` field in the token file
pub const AUTHORIZED_USER: &str = "authorized_user";

const TOKEN_FILE: &str = "token.json";

/// Contents of `token.json`
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredCredential {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl StoredCredential {
    pub fn authorized_user(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            credential_type: AUTHORIZED_USER.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    fn is_usable(&self) -> bool {
        self.credential_type == AUTHORIZED_USER && !self.refresh_token.trim().is_empty()
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("type", &self.credential_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// File-backed token storage
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store rooted at the credentials directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_FILE),
        }
    }

    /// Path of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential.
    ///
    /// Returns `None` when there is nothing usable on disk; callers treat that
    /// as "not authenticated".
    pub fn load(&self) -> Option<StoredCredential> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "No stored credential: {}", e);
                return None;
            }
        };

        let credential: StoredCredential = match serde_json::from_str(&data) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unparsable token file: {}", e);
                return None;
            }
        };

        if !credential.is_usable() {
            tracing::warn!(path = %self.path.display(), "Ignoring token file without a usable refresh token");
            return None;
        }

        Some(credential)
    }

    /// Overwrite the token file
    ///
    /// Writes a sibling temporary file and renames it into place, so a crash
    /// never leaves a truncated token behind.
    pub fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        let persist = |e: std::io::Error| AuthError::Persist(format!("{}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(persist)?;
        }

        let data = serde_json::to_string_pretty(credential)
            .map_err(|e| AuthError::Persist(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(persist)?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(persist)?;
        }

        std::fs::rename(&tmp, &self.path).map_err(persist)?;
        tracing::info!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }
}

/// Handle that mints access tokens from a stored refresh token
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    credential: StoredCredential,
    token_uri: String,
    http: Client,
}

impl AuthorizedClient {
    pub fn new(credential: StoredCredential, token_uri: impl Into<String>, http: Client) -> Self {
        Self {
            credential,
            token_uri: token_uri.into(),
            http,
        }
    }

    pub fn credential(&self) -> &StoredCredential {
        &self.credential
    }

    /// Run the `refresh_token` grant and return a fresh access token
    pub async fn access_token(&self) -> McpResult<String> {
        let response = refresh_access_token(
            &self.http,
            &self.token_uri,
            &self.credential.client_id,
            &self.credential.client_secret,
            &self.credential.refresh_token,
        )
        .await?;
        tracing::debug!(expires_in = ?response.expires_in, "Refreshed access token");
        Ok(response.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested"));
        let credential = StoredCredential::authorized_user("id", "secret", "1//refresh");

        store.save(&credential).unwrap();
        assert_eq!(store.load(), Some(credential));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({
                "type": "authorized_user",
                "client_id": "id",
                "client_secret": "secret",
                "refresh_token": "1//refresh"
            })
        );
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store
            .save(&StoredCredential::authorized_user("id", "secret", "r"))
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store
            .save(&StoredCredential::authorized_user("id", "secret", "first"))
            .unwrap();
        store
            .save(&StoredCredential::authorized_user("id2", "secret2", "second"))
            .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.client_id, "id2");
        assert_eq!(loaded.refresh_token, "second");
    }

    #[test]
    fn test_unusable_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        assert_eq!(store.load(), None);

        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), None);

        std::fs::write(
            store.path(),
            r#"{"type":"service_account","client_id":"a","client_secret":"b","refresh_token":"c"}"#,
        )
        .unwrap();
        assert_eq!(store.load(), None);

        std::fs::write(
            store.path(),
            r#"{"type":"authorized_user","client_id":"a","client_secret":"b","refresh_token":""}"#,
        )
        .unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = StoredCredential::authorized_user("id", "top-secret", "1//refresh");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("1//refresh"));
    }

    #[tokio::test]
    async fn test_access_token_refresh() {
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AuthorizedClient::new(
            StoredCredential::authorized_user("id", "secret", "1//refresh"),
            format!("{}/token", server.uri()),
            Client::new(),
        );
        assert_eq!(client.access_token().await.unwrap(), "ya29.fresh");
    }
}
