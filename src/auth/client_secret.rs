// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! OAuth client identity
//!
//! The operator downloads `client_secret.json` from the Google Cloud console.
//! Desktop clients store their fields under `installed`, web clients under
//! `web`; both are accepted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::auth::errors::AuthError;

/// Google's authorization endpoint
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google's token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Application-level OAuth client registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Parse the downloaded JSON document
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| AuthError::Config(format!("Malformed client secret: {e}")))?;

        let secret = file.installed.or(file.web).ok_or_else(|| {
            AuthError::Config("Client secret has neither an 'installed' nor a 'web' key".to_string())
        })?;

        if secret.client_id.trim().is_empty() {
            return Err(AuthError::Config("Client secret has an empty client_id".to_string()));
        }

        Ok(secret)
    }

    /// Load from disk
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AuthError::Config(format!(
                "Cannot read client secret at {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }
}
