// ! Transport layer traits
// !
// ! Module defines the server-side transport abstraction the MCP server is
// ! driven through.

use crate::core::error::McpResult;
use crate::protocol::types::{JsonRpcRequest, JsonRpcResponse};
use async_trait::async_trait;

/// Server request handler function type
pub type ServerRequestHandler = std::sync::Arc<
    dyn Fn(
            JsonRpcRequest,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = McpResult<JsonRpcResponse>> + Send + 'static>,
        > + Send
        + Sync,
>;

/// Transport trait for MCP servers
///
/// Trait defines the interface for receiving requests and sending responses
/// in a server-side MCP connection.
#[async_trait]
pub trait ServerTransport: Send + Sync {
    /// Serve requests until the peer closes the connection
    ///
    /// # Returns
    /// Result indicating a clean shutdown or a transport failure
    async fn start(&mut self) -> McpResult<()>;

    /// Set the request handler that will process incoming requests
    ///
    /// # Arguments
    /// * `handler` - The request handler function
    fn set_request_handler(&mut self, handler: ServerRequestHandler);

    /// Stop the server transport
    async fn stop(&mut self) -> McpResult<()>;

    /// Check if the server is running
    fn is_running(&self) -> bool {
        true
    }

    /// Get server information for debugging
    fn server_info(&self) -> String {
        "Unknown server transport".to_string()
    }
}

/// Transport configuration options
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum accepted line length in bytes
    pub max_message_size: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_message_size: Some(16 * 1024 * 1024), // 16 MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert_eq!(config.max_message_size, Some(16 * 1024 * 1024));
    }
}
