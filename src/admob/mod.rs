// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! AdMob tools and prompts
//!
//! Everything specific to the AdMob API lives here: argument types, report
//! construction, the REST client, pagination and the MCP registration glue.

pub mod args;
pub mod client;
pub mod pagination;
pub mod prompts;
pub mod report;
pub mod tools;

pub use args::{ReportKind, ToolCall};
pub use client::{AdMobApi, AdMobClient};
pub use pagination::{Page, collect_pages};
pub use prompts::register_prompts;
pub use report::ReportSpec;
pub use tools::{ToolDispatcher, register_tools};

use std::sync::Arc;

use crate::config::Config;
use crate::core::error::McpResult;
use crate::server::McpServer;

/// Name reported in `initialize`
pub const SERVER_NAME: &str = "admob-mcp";

const INSTRUCTIONS: &str = "Read-only access to one Google AdMob publisher account. \
Use get_account, list_apps and list_ad_units to discover inventory, and \
generate_network_report or generate_mediation_report for performance data. \
If a tool reports that the server is not authenticated, ask the user to run `admob-mcp auth`.";

/// Build a server with every AdMob tool and prompt registered
pub async fn build_server(config: Arc<Config>) -> McpResult<McpServer> {
    let server = McpServer::new(SERVER_NAME.to_string(), env!("CARGO_PKG_VERSION").to_string())
        .with_instructions(INSTRUCTIONS);

    let dispatcher = Arc::new(ToolDispatcher::new(config)?);
    register_tools(&server, dispatcher).await?;
    register_prompts(&server).await?;

    let tools = server.list_tools().await?.len();
    let prompts = server.list_prompts().await?.len();
    tracing::debug!(tools, prompts, "Registered AdMob tools and prompts");
    Ok(server)
}
