//! MCP server over newline-delimited JSON-RPC
//!
//! Each line on the input is one JSON-RPC message; each response is written
//! as one line. Requests are handled in arrival order.

use serde_json::{Value, json};
use std::sync::Arc;
use stock_tools::{Tool, ToolRegistry};
use stock_utils::Config;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::McpError;
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION,
    ReadResourceParams, ResourceContent, ResourcesCapability, ServerCapabilities, ServerInfo,
    ToolDefinition, ToolResult, ToolsCapability,
};
use crate::resource::{HealthResource, Resource};

/// Serves the registered tools and resources to one MCP client
pub struct McpServer {
    info: ServerInfo,
    tools: Arc<ToolRegistry>,
    resources: Vec<Arc<dyn Resource>>,
}

impl McpServer {
    /// Create a server exposing `tools` and the health resource
    pub fn new(config: &Config, tools: Arc<ToolRegistry>) -> Self {
        Self {
            info: ServerInfo {
                name: config.server_name.clone(),
                version: config.server_version.clone(),
            },
            tools,
            resources: vec![Arc::new(HealthResource)],
        }
    }

    /// Add a resource
    pub fn with_resource(mut self, resource: Arc<dyn Resource>) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Handle one raw message; `None` when no response is due
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_value(message).await?,
            Err(e) => {
                let err = McpError::ParseError(e.to_string());
                JsonRpcResponse::failure(Value::Null, err.code(), err.to_string())
            },
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to serialize response: {}", e);
                None
            },
        }
    }

    async fn handle_value(&self, message: Value) -> Option<JsonRpcResponse> {
        // Responses from the client (no method) need no answer.
        if message.get("method").is_none()
            && (message.get("result").is_some() || message.get("error").is_some())
        {
            return None;
        }

        let id = message.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                let err = McpError::InvalidRequest(e.to_string());
                return Some(JsonRpcResponse::failure(id, err.code(), err.to_string()));
            },
        };

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        debug!("Request: {}", request.method);
        let id = request.id.clone().unwrap_or(Value::Null);
        Some(match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e.code(), e.to_string()),
        })
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value> {
        match method {
            "initialize" => Ok(serde_json::to_value(self.initialize_result())?),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tool_definitions() })),
            "tools/call" => {
                let params: CallToolParams = parse_params(params)?;
                let arguments = params.arguments.unwrap_or_else(|| json!({}));
                Ok(serde_json::to_value(self.call_tool(&params.name, arguments).await)?)
            },
            "resources/list" => {
                let resources: Vec<_> = self.resources.iter().map(|r| r.definition()).collect();
                Ok(json!({ "resources": resources }))
            },
            "resources/read" => {
                let params: ReadResourceParams = parse_params(params)?;
                Ok(json!({ "contents": [self.read_resource(&params.uri).await?] }))
            },
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                resources: Some(ResourcesCapability::default()),
            },
            server_info: self.info.clone(),
        }
    }

    /// Definitions of every registered tool, ordered by name
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: Some(tool.description().to_string()),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    /// Run a tool and render its output as a JSON text block
    ///
    /// Failures never become protocol errors: an unknown tool or a failing
    /// tool yields an `{"error": ...}` body the caller can parse.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        info!("Tool call: {}", name);

        let Some(tool) = self.tools.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolResult::json_text(&json!({ "error": format!("Unknown tool: {name}") }));
        };

        match tool.execute(arguments).await {
            Ok(output) => ToolResult::json_text(&output),
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolResult::json_text(&json!({ "error": format!("Error executing {name}: {e}") }))
            },
        }
    }

    async fn read_resource(&self, uri: &str) -> Result<ResourceContent> {
        let resource = self
            .resources
            .iter()
            .find(|r| r.uri() == uri)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: resource.mime_type().map(str::to_string),
            text: Some(resource.read().await?),
        })
    }

    /// Serve until the reader reaches end of input
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        debug!("Input closed, stopping server");
        Ok(())
    }

    /// Serve on the process's stdin/stdout
    pub async fn serve_stdio(&self) -> Result<()> {
        info!(
            "Starting MCP server {} {} on stdio ({} tools)",
            self.info.name,
            self.info.version,
            self.tools.len()
        );
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T> {
    let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::error_codes;
    use async_trait::async_trait;

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        async fn execute(&self, _params: Value) -> stock_core::Result<Value> {
            Err(stock_core::Error::Generic("boom".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, params: Value) -> stock_core::Result<Value> {
            Ok(params)
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the arguments back"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn server() -> McpServer {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(FailingTool));
        McpServer::new(&Config::default(), Arc::new(registry))
    }

    async fn request(server: &McpServer, message: Value) -> Value {
        let line = server.handle_message(&message.to_string()).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    fn text_of(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server();
        let resp = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05", "capabilities": {},
                "clientInfo": {"name": "test", "version": "0"}
            }}),
        )
        .await;

        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(resp["result"]["serverInfo"]["name"], "stock-comparison");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = server();
        let line = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        assert!(server.handle_message(&line).await.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = server();
        let resp = request(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "echo");
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_renders_pretty_json() {
        let server = server();
        let resp = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "echo", "arguments": {"symbols": ["AAPL"]}}}),
        )
        .await;

        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains('\n'));
        assert_eq!(text_of(&resp), json!({"symbols": ["AAPL"]}));
    }

    #[tokio::test]
    async fn test_unknown_and_failing_tools_are_error_bodies() {
        let server = server();

        let resp = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "nope"}}),
        )
        .await;
        assert!(resp.get("error").is_none());
        assert_eq!(text_of(&resp), json!({"error": "Unknown tool: nope"}));

        let resp = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {"name": "failing"}}),
        )
        .await;
        assert_eq!(text_of(&resp), json!({"error": "Error executing failing: boom"}));
    }

    #[tokio::test]
    async fn test_resources() {
        let server = server();
        let resp = request(&server, json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"})).await;
        assert_eq!(resp["result"]["resources"][0]["uri"], "stock://health");

        let resp = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 7, "method": "resources/read", "params": {"uri": "stock://health"}}),
        )
        .await;
        let text = resp["result"]["contents"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!({"status": "ok"}));

        let resp = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 8, "method": "resources/read", "params": {"uri": "stock://x"}}),
        )
        .await;
        assert_eq!(resp["error"]["code"], error_codes::RESOURCE_NOT_FOUND);
        assert_eq!(resp["error"]["message"], "Unknown resource: stock://x");
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server();

        let resp: Value = serde_json::from_str(&server.handle_message("{not json").await.unwrap()).unwrap();
        assert_eq!(resp["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(resp["id"], Value::Null);

        let resp = request(&server, json!({"jsonrpc": "2.0", "id": 9, "method": "bogus"})).await;
        assert_eq!(resp["error"]["code"], error_codes::METHOD_NOT_FOUND);

        let resp = request(&server, json!({"jsonrpc": "2.0", "id": 10, "method": "tools/call"})).await;
        assert_eq!(resp["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_request() {
        let server = server();
        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string(),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            String::new(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string(),
        ]
        .join("\n");

        let mut output = Vec::new();
        server.serve(BufReader::new(input.as_bytes()), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
        assert_eq!(lines[1]["id"], 2);
    }
}
