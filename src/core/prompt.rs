// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Prompt system
//!
//! Prompts are canned message templates a client can fetch by name. Each
//! registered prompt pairs its descriptor with a [`PromptHandler`] that renders
//! the messages from the supplied arguments.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::error::{McpError, McpResult};
use crate::protocol::types::{GetPromptResult as PromptResult, Prompt as PromptInfo};

/// Trait for implementing prompt handlers
#[async_trait]
pub trait PromptHandler: Send + Sync {
    /// Render the prompt messages for the given arguments
    ///
    /// # Arguments
    /// * `arguments` - Prompt arguments as key-value pairs
    ///
    /// # Returns
    /// Result containing the generated prompt messages or an error
    async fn get(&self, arguments: HashMap<String, String>) -> McpResult<PromptResult>;
}

/// A registered prompt with its handler
pub struct Prompt {
    /// Information about the prompt
    pub info: PromptInfo,
    /// Handler that renders the prompt
    pub handler: Box<dyn PromptHandler>,
}

impl Prompt {
    /// Create a new prompt with the given information and handler
    pub fn new<H>(info: PromptInfo, handler: H) -> Self
    where
        H: PromptHandler + 'static,
    {
        Self {
            info,
            handler: Box::new(handler),
        }
    }

    /// Render the prompt after checking required arguments are present and non-blank
    pub async fn get(&self, arguments: HashMap<String, String>) -> McpResult<PromptResult> {
        if let Some(ref args) = self.info.arguments {
            for arg in args {
                let supplied = arguments
                    .get(&arg.name)
                    .is_some_and(|value| !value.trim().is_empty());
                if arg.required.unwrap_or(false) && !supplied {
                    return Err(McpError::validation(format!(
                        "Required argument '{}' missing for prompt '{}'",
                        arg.name, self.info.name
                    )));
                }
            }
        }

        self.handler.get(arguments).await
    }
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt").field("info", &self.info).finish()
    }
}
