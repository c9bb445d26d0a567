// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Tool system
//!
//! A tool is a named, schema-described operation a client can invoke. The
//! server keeps one [`Tool`] per name and forwards `tools/call` arguments to
//! its [`ToolHandler`].

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::error::McpResult;
use crate::protocol::types::{ToolInfo, ToolResult};

/// Trait for implementing tool handlers
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments
    ///
    /// # Arguments
    /// * `arguments` - Tool arguments as key-value pairs
    ///
    /// # Returns
    /// The tool result. Failures the caller can act on belong in the result
    /// with `isError` set; `Err` is reserved for contract violations.
    async fn call(&self, arguments: HashMap<String, Value>) -> McpResult<ToolResult>;
}

/// A registered tool with its handler
pub struct Tool {
    /// Information about the tool
    pub info: ToolInfo,
    /// Handler that implements the tool's functionality
    pub handler: Box<dyn ToolHandler>,
}

impl Tool {
    /// Create a new tool from its descriptor and handler
    pub fn new<H>(info: ToolInfo, handler: H) -> Self
    where
        H: ToolHandler + 'static,
    {
        Self {
            info,
            handler: Box::new(handler),
        }
    }

    /// Execute the tool
    pub async fn call(&self, arguments: HashMap<String, Value>) -> McpResult<ToolResult> {
        tracing::debug!(tool = %self.info.name, "Calling tool");
        self.handler.call(arguments).await
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool").field("info", &self.info).finish()
    }
}
