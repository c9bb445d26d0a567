// ! STDIO transport implementation for MCP
// !
// ! Newline-delimited JSON-RPC over a reader/writer pair. The process uses
// ! stdin/stdout; tests drive the same loop through in-memory pipes.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::core::error::{McpError, McpResult};
use crate::protocol::types::{IncomingMessage, JsonRpcResponse, error_codes};
use crate::transport::traits::{ServerRequestHandler, ServerTransport, TransportConfig};

/// STDIO transport for MCP servers
///
/// Reads one JSON-RPC message per line and writes one response per line.
/// Notifications are consumed without a reply.
pub struct StdioServerTransport<R = tokio::io::Stdin, W = tokio::io::Stdout> {
    reader: Option<BufReader<R>>,
    writer: Option<BufWriter<W>>,
    config: TransportConfig,
    running: bool,
    request_handler: Option<ServerRequestHandler>,
}

impl StdioServerTransport {
    /// Create a new STDIO server transport over the process stdin/stdout
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a new STDIO server transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Self {
        Self::with_streams(tokio::io::stdin(), tokio::io::stdout(), config)
    }
}

impl Default for StdioServerTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioServerTransport<R, W>
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
    W: AsyncWrite + Unpin + Send + Sync + 'static,
{
    /// Create a transport over arbitrary streams
    pub fn with_streams(reader: R, writer: W, config: TransportConfig) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
            writer: Some(BufWriter::new(writer)),
            config,
            running: false,
            request_handler: None,
        }
    }

    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        if let Some(max) = self.config.max_message_size {
            if line.len() > max {
                tracing::warn!(size = line.len(), max, "Rejecting oversized message");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::INVALID_REQUEST,
                    format!("Message exceeds {max} bytes"),
                ));
            }
        }

        let request = match IncomingMessage::parse(line) {
            Ok(IncomingMessage::Request(request)) => request,
            Ok(IncomingMessage::Notification(notification)) => {
                tracing::debug!(method = %notification.method, "Received notification");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to parse message: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let id = request.id.clone();
        let result = match self.request_handler {
            Some(ref handler) => handler(request).await,
            None => Err(McpError::MethodNotFound(request.method)),
        };

        Some(match result {
            Ok(response) => response,
            Err(McpError::MethodNotFound(method)) => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            ),
            Err(error) => {
                tracing::error!(category = error.category(), "Request handler failed: {}", error);
                JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, error.to_string())
            }
        })
    }
}

async fn write_line<W: AsyncWrite + Unpin>(
    writer: &mut BufWriter<W>,
    response: &JsonRpcResponse,
) -> McpResult<()> {
    let response_line = serde_json::to_string(response).map_err(McpError::serialization)?;

    tracing::trace!("Sending: {}", response_line);

    writer
        .write_all(response_line.as_bytes())
        .await
        .map_err(|e| McpError::transport(format!("Failed to write response: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| McpError::transport(format!("Failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| McpError::transport(format!("Failed to flush: {e}")))?;

    Ok(())
}

#[async_trait]
impl<R, W> ServerTransport for StdioServerTransport<R, W>
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
    W: AsyncWrite + Unpin + Send + Sync + 'static,
{
    async fn start(&mut self) -> McpResult<()> {
        tracing::debug!("Starting STDIO server transport");

        let mut reader = self
            .reader
            .take()
            .ok_or_else(|| McpError::transport("STDIN reader already taken"))?;
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| McpError::transport("STDOUT writer already taken"))?;

        self.running = true;

        let mut line = String::new();
        let outcome = loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    tracing::debug!("STDIN closed, stopping server");
                    break Ok(());
                }
                Ok(_) => {
                    let message = line.trim();
                    if message.is_empty() {
                        continue;
                    }

                    tracing::trace!("Received: {}", message);

                    if let Some(response) = self.handle_line(message).await {
                        if let Err(e) = write_line(&mut writer, &response).await {
                            break Err(e);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading from stdin: {}", e);
                    break Err(McpError::io(e));
                }
            }
        };

        self.running = false;
        outcome
    }

    fn set_request_handler(&mut self, handler: ServerRequestHandler) {
        self.request_handler = Some(handler);
    }

    async fn stop(&mut self) -> McpResult<()> {
        tracing::debug!("Stopping STDIO server transport");
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn server_info(&self) -> String {
        format!("STDIO server transport (running: {})", self.running)
    }
}
