// ! MCP server implementation
// !
// ! Module provides the MCP server that keeps the tool and prompt registries
// ! and routes JSON-RPC requests to them.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::{
    PromptInfo, ToolInfo,
    error::{McpError, McpResult},
    prompt::{Prompt, PromptHandler},
    tool::{Tool, ToolHandler},
};
use crate::protocol::{error_codes::*, messages::*, methods, types::*};
use crate::transport::traits::{ServerRequestHandler, ServerTransport};

/// Main MCP server implementation
///
/// Cloning is cheap: registries and state are shared, so a clone handed to
/// the transport sees every tool registered on the original.
#[derive(Clone)]
pub struct McpServer {
    /// Server information
    info: ServerInfo,
    /// Server capabilities
    capabilities: ServerCapabilities,
    /// Instructions returned from `initialize`
    instructions: Option<String>,
    /// Registered tools
    tools: Arc<RwLock<HashMap<String, Tool>>>,
    /// Registered prompts
    prompts: Arc<RwLock<HashMap<String, Prompt>>>,
    /// Server state
    state: Arc<RwLock<ServerState>>,
}

/// Internal server state
#[derive(Debug, Clone, PartialEq)]
pub enum ServerState {
    /// Server is not yet serving a transport
    Uninitialized,
    /// Transport is running, waiting for `initialize`
    Initializing,
    /// Client completed `initialize`
    Running,
    /// Transport has stopped
    Stopped,
}

impl McpServer {
    /// Create a new MCP server with the given name and version
    pub fn new(name: String, version: String) -> Self {
        Self {
            info: ServerInfo::new(name, version),
            capabilities: ServerCapabilities {
                prompts: Some(PromptsCapability {
                    list_changed: Some(false),
                }),
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            instructions: None,
            tools: Arc::new(RwLock::new(HashMap::new())),
            prompts: Arc::new(RwLock::new(HashMap::new())),
            state: Arc::new(RwLock::new(ServerState::Uninitialized)),
        }
    }

    /// Set the instructions sent to clients on `initialize`
    pub fn with_instructions<S: Into<String>>(mut self, instructions: S) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Get server information
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get server capabilities
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    // ========================================================================
    // Tool Management
    // ========================================================================

    /// Add a tool with its descriptor
    pub async fn add_tool<H>(&self, info: ToolInfo, handler: H) -> McpResult<()>
    where
        H: ToolHandler + 'static,
    {
        if info.name.trim().is_empty() {
            return Err(McpError::validation("Tool name cannot be empty"));
        }

        let name = info.name.clone();
        let mut tools = self.tools.write().await;
        if tools.insert(name.clone(), Tool::new(info, handler)).is_some() {
            tracing::warn!(tool = %name, "Replaced existing tool registration");
        }
        Ok(())
    }

    /// List all registered tools, ordered by name
    pub async fn list_tools(&self) -> McpResult<Vec<ToolInfo>> {
        let tools = self.tools.read().await;
        let mut infos: Vec<ToolInfo> = tools.values().map(|t| t.info.clone()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    /// Call a tool
    ///
    /// Unknown names fail with [`McpError::ToolNotFound`]. Any other failure
    /// raised by the handler is folded into an error result so the session
    /// survives a bad call.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, Value>>,
    ) -> McpResult<ToolResult> {
        let tools = self.tools.read().await;
        let tool = tools
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        match tool.call(arguments.unwrap_or_default()).await {
            Ok(result) => Ok(result),
            Err(error) if error.is_tool_error() => {
                tracing::warn!(tool = %name, category = error.category(), "Tool call failed: {}", error);
                Ok(ToolResult::error(error.to_string()))
            }
            Err(error) => Err(error),
        }
    }

    /// Check if a specific tool is registered
    pub async fn has_tool(&self, name: &str) -> bool {
        self.tools.read().await.contains_key(name)
    }

    // ========================================================================
    // Prompt Management
    // ========================================================================

    /// Add a prompt to the server
    pub async fn add_prompt<H>(&self, info: PromptInfo, handler: H) -> McpResult<()>
    where
        H: PromptHandler + 'static,
    {
        if info.name.trim().is_empty() {
            return Err(McpError::validation("Prompt name cannot be empty"));
        }

        let name = info.name.clone();
        self.prompts
            .write()
            .await
            .insert(name, Prompt::new(info, handler));
        Ok(())
    }

    /// List all registered prompts, ordered by name
    pub async fn list_prompts(&self) -> McpResult<Vec<PromptInfo>> {
        let prompts = self.prompts.read().await;
        let mut infos: Vec<PromptInfo> = prompts.values().map(|p| p.info.clone()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    /// Get a prompt
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> McpResult<PromptResult> {
        let prompts = self.prompts.read().await;
        match prompts.get(name) {
            Some(prompt) => prompt.get(arguments.unwrap_or_default()).await,
            None => Err(McpError::PromptNotFound(name.to_string())),
        }
    }

    // ========================================================================
    // Server Lifecycle
    // ========================================================================

    /// Serve requests on the given transport until it stops
    pub async fn start<T>(&self, mut transport: T) -> McpResult<()>
    where
        T: ServerTransport + 'static,
    {
        {
            let mut state = self.state.write().await;
            match *state {
                ServerState::Uninitialized | ServerState::Stopped => {
                    *state = ServerState::Initializing;
                }
                _ => return Err(McpError::protocol("Server is already started")),
            }
        }

        let server = self.clone();
        let request_handler: ServerRequestHandler = Arc::new(move |request| {
            let server = server.clone();
            Box::pin(async move { server.handle_request(request).await })
        });
        transport.set_request_handler(request_handler);

        tracing::debug!("{}", transport.server_info());
        let outcome = transport.start().await;

        *self.state.write().await = ServerState::Stopped;
        outcome
    }

    /// Start server with STDIO transport and run until stdin closes or Ctrl+C
    pub async fn run_with_stdio(self) -> McpResult<()> {
        use crate::transport::stdio::StdioServerTransport;

        let transport = StdioServerTransport::new();
        tracing::info!(server = %self.info.name, "Server started with STDIO transport");

        tokio::select! {
            outcome = self.start(transport) => {
                tracing::info!("STDIO stream closed, shutting down");
                outcome
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| McpError::internal(format!("Signal handling error: {e}")))?;
                tracing::info!("Shutdown signal received, stopping server...");
                *self.state.write().await = ServerState::Stopped;
                Ok(())
            }
        }
    }

    /// Check if the server has completed initialization
    pub async fn is_running(&self) -> bool {
        matches!(*self.state.read().await, ServerState::Running)
    }

    /// Get the current server state
    pub async fn state(&self) -> ServerState {
        self.state.read().await.clone()
    }

    // ========================================================================
    // Request Handling
    // ========================================================================

    /// Handle an incoming JSON-RPC request
    ///
    /// Every failure is turned into a JSON-RPC error response; only a result
    /// that cannot be serialized escapes as `Err`.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        tracing::debug!(method = %request.method, id = %request.id, "Handling request");

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request.params).await,
            methods::PING => Ok(serde_json::to_value(PingResult {})?),
            methods::TOOLS_LIST => self.handle_tools_list(request.params).await,
            methods::TOOLS_CALL => self.handle_tools_call(request.params).await,
            methods::PROMPTS_LIST => self.handle_prompts_list(request.params).await,
            methods::PROMPTS_GET => self.handle_prompts_get(request.params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        match result {
            Ok(value) => Ok(JsonRpcResponse::success(request.id, value)?),
            Err(error) => {
                let code = match error {
                    McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
                    McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
                    McpError::PromptNotFound(_) => PROMPT_NOT_FOUND,
                    McpError::InvalidParams(_) | McpError::Validation(_) => INVALID_PARAMS,
                    _ => INTERNAL_ERROR,
                };
                tracing::debug!(code, category = error.category(), "Request failed: {}", error);
                Ok(JsonRpcResponse::error(request.id, code, error.to_string()))
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let params: InitializeParams = required_params(params, methods::INITIALIZE)?;

        let protocol_version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            params.protocol_version
        } else {
            tracing::warn!(
                requested = %params.protocol_version,
                "Unsupported protocol version, offering {}",
                LATEST_PROTOCOL_VERSION
            );
            LATEST_PROTOCOL_VERSION.to_string()
        };

        tracing::info!(
            client = %params.client_info.name,
            version = %protocol_version,
            "Client initialized"
        );
        *self.state.write().await = ServerState::Running;

        let mut result = InitializeResult::new(
            protocol_version,
            self.capabilities.clone(),
            self.info.clone(),
        );
        result.instructions = self.instructions.clone();
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_list(&self, params: Option<Value>) -> McpResult<Value> {
        let _params: ListParams = optional_params(params)?;
        let result = ListToolsResult {
            tools: self.list_tools().await?,
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let params: CallToolParams = required_params(params, methods::TOOLS_CALL)?;
        let result = self.call_tool(&params.name, params.arguments).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_prompts_list(&self, params: Option<Value>) -> McpResult<Value> {
        let _params: ListParams = optional_params(params)?;
        let result = ListPromptsResult {
            prompts: self.list_prompts().await?,
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_prompts_get(&self, params: Option<Value>) -> McpResult<Value> {
        let params: GetPromptParams = required_params(params, methods::PROMPTS_GET)?;
        let result = self.get_prompt(&params.name, params.arguments).await?;
        Ok(serde_json::to_value(result)?)
    }
}

fn required_params<T: DeserializeOwned>(params: Option<Value>, method: &str) -> McpResult<T> {
    let params =
        params.ok_or_else(|| McpError::InvalidParams(format!("Missing parameters for {method}")))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn optional_params<T: DeserializeOwned + Default>(params: Option<Value>) -> McpResult<T> {
    match params {
        Some(Value::Null) | None => Ok(T::default()),
        Some(p) => serde_json::from_value(p).map_err(|e| McpError::InvalidParams(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct GreetTool;

    #[async_trait]
    impl ToolHandler for GreetTool {
        async fn call(&self, arguments: HashMap<String, Value>) -> McpResult<ToolResult> {
            match arguments.get("name").and_then(Value::as_str) {
                Some(name) => Ok(ToolResult::text(format!("Hello, {name}"))),
                None => Err(McpError::validation("name is required")),
            }
        }
    }

    fn greet_info(name: &str) -> ToolInfo {
        ToolInfo {
            name: name.to_string(),
            description: Some("Greets".to_string()),
            input_schema: ToolInputSchema::from_json(json!({
                "type": "object",
                "properties": {"name": {"type": "string"}}
            })),
            annotations: None,
        }
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: json!(id),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = McpServer::new("test-server".to_string(), "1.0.0".to_string());
        assert_eq!(server.info().name, "test-server");
        assert_eq!(server.info().version, "1.0.0");
        assert!(!server.is_running().await);
        assert_eq!(server.state().await, ServerState::Uninitialized);
    }

    #[tokio::test]
    async fn test_tools_listed_in_name_order() {
        let server = McpServer::new("test".to_string(), "1.0.0".to_string());
        server.add_tool(greet_info("zeta"), GreetTool).await.unwrap();
        server.add_tool(greet_info("alpha"), GreetTool).await.unwrap();

        let names: Vec<String> = server
            .list_tools()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(server.add_tool(greet_info(" "), GreetTool).await.is_err());
    }

    #[tokio::test]
    async fn test_tool_errors_become_error_results() {
        let server = McpServer::new("test".to_string(), "1.0.0".to_string());
        server.add_tool(greet_info("greet"), GreetTool).await.unwrap();

        let ok = server
            .call_tool("greet", Some(HashMap::from([("name".to_string(), json!("Ada"))])))
            .await
            .unwrap();
        assert!(!ok.is_error());
        assert_eq!(ok.content[0].as_text(), "Hello, Ada");

        let soft = server.call_tool("greet", None).await.unwrap();
        assert!(soft.is_error());

        let hard = server.call_tool("missing", None).await;
        assert!(matches!(hard, Err(McpError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_initialize_negotiates_version() {
        let server = McpServer::new("test".to_string(), "1.0.0".to_string()).with_instructions("hi");

        let response = server
            .handle_request(request(
                1,
                methods::INITIALIZE,
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "client", "version": "0.1"}
                })),
            ))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "test");
        assert_eq!(result["instructions"], "hi");
        assert!(server.is_running().await);

        let response = server
            .handle_request(request(
                2,
                methods::INITIALIZE,
                Some(json!({
                    "protocolVersion": "1999-01-01",
                    "clientInfo": {"name": "client", "version": "0.1"}
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["protocolVersion"], LATEST_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_error_code_mapping() {
        let server = McpServer::new("test".to_string(), "1.0.0".to_string());

        let unknown_method = server
            .handle_request(request(1, "resources/list", None))
            .await
            .unwrap();
        assert_eq!(unknown_method.error.unwrap().code, METHOD_NOT_FOUND);

        let unknown_tool = server
            .handle_request(request(2, methods::TOOLS_CALL, Some(json!({"name": "nope"}))))
            .await
            .unwrap();
        assert_eq!(unknown_tool.error.unwrap().code, TOOL_NOT_FOUND);

        let unknown_prompt = server
            .handle_request(request(3, methods::PROMPTS_GET, Some(json!({"name": "nope"}))))
            .await
            .unwrap();
        assert_eq!(unknown_prompt.error.unwrap().code, PROMPT_NOT_FOUND);

        let missing_params = server
            .handle_request(request(4, methods::TOOLS_CALL, None))
            .await
            .unwrap();
        assert_eq!(missing_params.error.unwrap().code, INVALID_PARAMS);

        let pong = server
            .handle_request(request(5, methods::PING, None))
            .await
            .unwrap();
        assert_eq!(pong.result, Some(json!({})));
    }
}
