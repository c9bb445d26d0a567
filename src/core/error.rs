// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

// ! Error types for the AdMob MCP server
// !
// ! Module defines the crate-wide error type. Protocol-level failures end up as
// ! JSON-RPC error responses; tool-time failures are turned into error content
// ! by the tool dispatcher instead.

use thiserror::Error;

/// The main error type for the server
#[derive(Error, Debug, Clone)]
pub enum McpError {
    /// Transport-related errors (I/O on the MCP stream)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol-level errors (invalid messages, unexpected state)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Requested tool was not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Requested prompt was not found
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// Method not found (JSON-RPC error)
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters (JSON-RPC error)
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or malformed configuration (client secret, publisher code)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable stored credential
    #[error("Not Authenticated: {0}")]
    NotAuthenticated(String),

    /// Non-success response from the AdMob API
    #[error("AdMob API error (status {status}): {message}")]
    Upstream {
        /// HTTP status code returned by the API
        status: u16,
        /// Provider error message, or the raw body
        message: String,
    },

    /// OAuth 2.0 authorization errors
    #[error("Authorization error: {0}")]
    Auth(String),

    /// I/O errors from the standard library
    #[error("I/O error: {0}")]
    Io(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {0}")]
    Internal(String),
}

// Manual From implementations for types that don't implement Clone
impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<url::ParseError> for McpError {
    fn from(err: url::ParseError) -> Self {
        McpError::Url(err.to_string())
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            McpError::Timeout(err.to_string())
        } else {
            McpError::Http(err.to_string())
        }
    }
}

/// Result type alias for server operations
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new IO error from std::io::Error
    pub fn io(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }

    /// Create a new serialization error from serde_json::Error
    pub fn serialization(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Create an upstream error from a status code and message
    pub fn upstream<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Whether this error belongs to the caller's tool invocation rather than
    /// the protocol session. Such errors are reported as error content.
    pub fn is_tool_error(&self) -> bool {
        !matches!(
            self,
            McpError::ToolNotFound(_)
                | McpError::PromptNotFound(_)
                | McpError::MethodNotFound(_)
                | McpError::InvalidParams(_)
                | McpError::Transport(_)
                | McpError::Protocol(_)
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            McpError::Transport(_) => "transport",
            McpError::Protocol(_) => "protocol",
            McpError::Serialization(_) => "serialization",
            McpError::ToolNotFound(_) => "not_found",
            McpError::PromptNotFound(_) => "not_found",
            McpError::MethodNotFound(_) => "not_found",
            McpError::InvalidParams(_) => "validation",
            McpError::Validation(_) => "validation",
            McpError::Config(_) => "config",
            McpError::NotAuthenticated(_) => "auth",
            McpError::Upstream { .. } => "upstream",
            McpError::Auth(_) => "auth",
            McpError::Io(_) => "io",
            McpError::Url(_) => "validation",
            McpError::Http(_) => "http",
            McpError::Timeout(_) => "timeout",
            McpError::Internal(_) => "internal",
        }
    }
}
