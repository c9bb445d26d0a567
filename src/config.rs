// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Runtime configuration
//!
//! Built once at startup from the process environment and shared by
//! reference afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory holding `client_secret.json` and `token.json`
pub const DEFAULT_CREDENTIALS_DIR: &str = "./credentials";
/// Base URL of the AdMob REST API
pub const DEFAULT_API_BASE_URL: &str = "https://admob.googleapis.com/v1/";

const CLIENT_SECRET_FILE: &str = "client_secret.json";
const TOKEN_FILE: &str = "token.json";

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the client secret and the stored token
    pub credentials_dir: PathBuf,
    /// AdMob publisher identifier, e.g. `pub-1234567890123456`
    pub publisher_code: Option<String>,
    /// Debug mode (verbose logging, `.env` loading)
    pub debug: bool,
    /// AdMob API base URL, always ending in `/`
    pub api_base_url: String,
    /// Token endpoint used instead of the client secret's `token_uri`
    pub token_uri_override: Option<String>,
    /// How long the authorization flow waits for the browser redirect
    pub callback_timeout: Duration,
    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_dir: PathBuf::from(DEFAULT_CREDENTIALS_DIR),
            publisher_code: None,
            debug: false,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_uri_override: None,
            callback_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(dir) = non_blank("CREDENTIALS_DIR") {
            config.credentials_dir = PathBuf::from(dir);
        }
        config.publisher_code = non_blank("PUBLISHER_CODE");
        config.debug = non_blank("DEBUG").is_some_and(|value| is_truthy(&value));
        config
    }

    /// Override the credentials directory
    pub fn with_credentials_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.credentials_dir = dir.into();
        self
    }

    /// Set the publisher code
    pub fn with_publisher_code<S: Into<String>>(mut self, code: S) -> Self {
        self.publisher_code = Some(code.into());
        self
    }

    /// Point API calls at a different base URL
    pub fn with_api_base_url<S: Into<String>>(mut self, url: S) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.api_base_url = url;
        self
    }

    /// Use a fixed token endpoint
    pub fn with_token_uri<S: Into<String>>(mut self, uri: S) -> Self {
        self.token_uri_override = Some(uri.into());
        self
    }

    /// Set how long to wait for the authorization callback
    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    /// Set the outbound request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Path of the operator-provided OAuth client file
    pub fn client_secret_path(&self) -> PathBuf {
        self.credentials_dir.join(CLIENT_SECRET_FILE)
    }

    /// Path of the persisted token
    pub fn token_path(&self) -> PathBuf {
        self.credentials_dir.join(TOKEN_FILE)
    }

    /// Credentials directory as a path
    pub fn credentials_dir(&self) -> &Path {
        &self.credentials_dir
    }
}

/// Whether a flag value reads as enabled
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
