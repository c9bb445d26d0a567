//! Core abstractions
//!
//! Error handling plus the tool and prompt handler traits the server
//! dispatches to.

pub mod error;
pub mod prompt;
pub mod tool;

pub use error::{McpError, McpResult};
pub use prompt::{Prompt, PromptHandler};
pub use tool::{Tool, ToolHandler};

pub use crate::protocol::types::{PromptArgument, PromptInfo, PromptMessage, PromptResult, ToolInfo};
