// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Authorization flow
//!
//! One run of the OAuth 2.0 authorization-code flow with a loopback
//! redirect:
//!
//! 1. load the client secret
//! 2. bind the callback listener
//! 3. open the authorization URL in the browser
//! 4. wait for the redirect
//! 5. exchange the code, then persist the refresh token

use reqwest::Client;
use url::Url;

use crate::auth::callback::{CallbackListener, DEFAULT_REDIRECT_URI};
use crate::auth::client_secret::ClientSecret;
use crate::auth::errors::AuthError;
use crate::auth::pkce::{PkceParams, generate_state};
use crate::auth::store::{CredentialStore, StoredCredential};
use crate::auth::token::{ADMOB_SCOPES, build_authorization_url, exchange_code};
use crate::config::Config;

/// Presents the authorization URL to the user
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &Url) -> std::io::Result<()>;
}

/// Opens URLs in the system browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &Url) -> std::io::Result<()> {
        eprintln!("Opening browser for authentication...");
        open::that(url.as_str())
    }
}

/// A configured authorization flow
#[derive(Debug, Clone)]
pub struct AuthorizationFlow<'a> {
    config: &'a Config,
    redirect_uri: Url,
    http: Client,
}

impl<'a> AuthorizationFlow<'a> {
    pub fn new(config: &'a Config) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {e}")))?;
        let redirect_uri = Url::parse(DEFAULT_REDIRECT_URI)
            .map_err(|e| AuthError::Config(format!("Invalid redirect URI: {e}")))?;

        Ok(Self {
            config,
            redirect_uri,
            http,
        })
    }

    /// Use a different loopback redirect URI
    pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
        self.redirect_uri = redirect_uri;
        self
    }

    /// Run the flow and persist the resulting credential
    pub async fn run(&self, opener: &dyn UrlOpener) -> Result<StoredCredential, AuthError> {
        let client = ClientSecret::load(&self.config.client_secret_path())?;

        let listener = CallbackListener::bind(&self.redirect_uri).await?;
        let redirect_uri = listener.redirect_uri().to_string();

        let state = generate_state();
        let pkce = PkceParams::new();
        let auth_url = build_authorization_url(&client, &redirect_uri, &state, &pkce, ADMOB_SCOPES)?;

        if let Err(e) = opener.open(&auth_url) {
            tracing::warn!("Failed to open browser: {}", e);
            eprintln!("Could not open browser. Please visit:\n{auth_url}");
        }

        eprintln!("Waiting for callback on {redirect_uri} ...");
        let code = listener
            .wait_for_code(&state, self.config.callback_timeout)
            .await?;

        tracing::info!("Authorization code received, exchanging for tokens");
        let token_uri = self
            .config
            .token_uri_override
            .as_deref()
            .unwrap_or(&client.token_uri);
        let tokens = exchange_code(
            &self.http,
            token_uri,
            &client,
            &code,
            &redirect_uri,
            &pkce.verifier,
        )
        .await?;

        let refresh_token = tokens
            .refresh_token
            .ok_or_else(|| AuthError::TokenExchange("No refresh token".to_string()))?;
        let credential =
            StoredCredential::authorized_user(client.client_id, client.client_secret, refresh_token);
        CredentialStore::new(&self.config.credentials_dir).save(&credential)?;

        Ok(credential)
    }
}

/// Ensure a stored credential exists, running the flow when needed.
///
/// With `force` unset an existing credential is returned as-is and no
/// listener is started.
pub async fn authorize(
    config: &Config,
    opener: &dyn UrlOpener,
    force: bool,
) -> Result<StoredCredential, AuthError> {
    if !force {
        if let Some(existing) = CredentialStore::new(&config.credentials_dir).load() {
            tracing::info!("Already authorized; pass --force to re-authorize");
            return Ok(existing);
        }
    }

    AuthorizationFlow::new(config)?.run(opener).await
}
