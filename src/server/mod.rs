//! MCP server implementation
//!
//! This module provides the request router and registries for tools and prompts.

pub mod mcp_server;

pub use mcp_server::{McpServer, ServerState};
