// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! # AdMob MCP server
//!
//! Exposes a read-only slice of the [Google AdMob API](https://developers.google.com/admob/api)
//! as [Model Context Protocol](https://modelcontextprotocol.io/) tools and prompts
//! served over standard input/output.
//!
//! ## Tools
//!
//! - `get_account`: the publisher account's name, ID, time zone and currency
//! - `list_apps`, `list_ad_units`: every app or ad unit, all pages concatenated
//! - `generate_network_report`, `generate_mediation_report`: reports for a
//!   date range with optional dimensions, filters and sorting
//!
//! ## Authorization
//!
//! `admob-mcp auth` runs the OAuth 2.0 authorization-code flow once through
//! a loopback listener and stores a refresh token in
//! `$CREDENTIALS_DIR/token.json`. The server re-reads that file on every tool
//! call.
//!
//! ```rust,no_run
//! use admob_mcp::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> McpResult<()> {
//!     let config = Arc::new(Config::from_env());
//!     let server = build_server(config).await?;
//!     server.run_with_stdio().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`admob`]: AdMob client, tool arguments, reports and registration
//! - [`auth`]: credential store and the authorization flow
//! - [`config`]: runtime configuration
//! - [`core`]: errors and the tool/prompt handler traits
//! - [`protocol`]: MCP message types
//! - [`server`]: request routing and lifecycle
//! - [`transport`]: stdio transport

pub mod admob;
pub mod auth;
pub mod config;
pub mod core;
pub mod protocol;
pub mod server;
pub mod transport;

pub use core::error::{McpError, McpResult};

/// Commonly used types
pub mod prelude {
    pub use crate::admob::{ToolDispatcher, build_server};
    pub use crate::auth::{AuthError, CredentialStore, StoredCredential, UrlOpener, authorize};
    pub use crate::config::Config;
    pub use crate::core::{
        error::{McpError, McpResult},
        prompt::{Prompt, PromptHandler},
        tool::{Tool, ToolHandler},
    };
    pub use crate::protocol::messages::*;
    pub use crate::protocol::types::*;
    pub use crate::server::McpServer;
    pub use crate::transport::StdioServerTransport;

    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
    pub use std::collections::HashMap;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let error = McpError::NotAuthenticated("no token".to_string());
        assert_eq!(error.category(), "auth");
    }
}
