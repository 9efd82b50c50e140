//! MCP Server
//!
//! Handles the MCP protocol over stdio, processing JSON-RPC 2.0 messages.

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::handler::{App, ToolError};
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities,
    ServerInfo, ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::all_tools;

/// MCP Server that communicates over stdio
pub struct McpServer {
    app: App,
    initialized: bool,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        Self {
            app,
            initialized: false,
        }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC until the reader hits EOF
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                info!("Client disconnected");
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(resp) = self.handle_message(line).await {
                let resp_str = serde_json::to_string(&resp)?;
                debug!("Sending: {}", resp_str);
                writer.write_all(resp_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message
    async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)));
            }
        };

        let id = request.id.clone();

        // No id means a notification: no response expected
        if id.is_none() {
            self.handle_notification(&request.method);
            return None;
        }

        match self.handle_request(&request.method, request.params).await {
            Ok(value) => Some(JsonRpcResponse::success(id, value)),
            Err((code, message)) => Some(JsonRpcResponse::error(id, code, message)),
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" => {
                info!("Client initialized");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            _ => {
                debug!("Unknown notification: {}", method);
            }
        }
    }

    async fn handle_request(&mut self, method: &str, params: Option<Value>) -> Result<Value, (i32, String)> {
        match method {
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(params).await,
            "ping" => Ok(json!({})),
            _ => {
                warn!("Unknown method: {}", method);
                Err((METHOD_NOT_FOUND, format!("Method not found: {}", method)))
            }
        }
    }

    fn handle_initialize(&mut self) -> Result<Value, (i32, String)> {
        info!(
            "Initializing MCP server ({} of {} repositories available)",
            self.app.registry.available_count(),
            self.app.registry.repos.len()
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
            server_info: ServerInfo {
                name: "crossrepo".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, format!("Serialization error: {}", e)))
    }

    fn handle_list_tools(&self) -> Result<Value, (i32, String)> {
        let result = ListToolsResult { tools: all_tools() };

        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, format!("Serialization error: {}", e)))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, (i32, String)> {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e)))?,
            None => return Err((INVALID_PARAMS, "Missing params".to_string())),
        };

        info!("Calling tool: {}", params.name);
        if !self.initialized {
            debug!("Tool call before notifications/initialized");
        }

        let result = self
            .app
            .handle_tool(&params.name, params.arguments)
            .await
            .map_err(|e: ToolError| {
                warn!("{}", e);
                (INVALID_PARAMS, e.to_string())
            })?;

        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, format!("Serialization error: {}", e)))
    }
}
