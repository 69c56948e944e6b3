//! Stdio JSON-RPC server loop.
//!
//! One frame per line on stdin, one response per line on stdout. Logging
//! stays on stderr; stdout carries protocol frames only. Undecodable lines
//! are logged and skipped, notifications get no response, and every
//! tools/call answer wraps the dispatcher's envelope as MCP text content.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::mcp::types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, PROTOCOL_VERSION,
};
use crate::tools::{ToolContext, ToolRegistry};

pub struct McpServer {
    registry: ToolRegistry,
    ctx: ToolContext,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, ctx: ToolContext) -> Self {
        Self { registry, ctx }
    }

    /// Serves stdin until EOF.
    pub async fn run(&self) -> std::io::Result<()> {
        info!(tools = self.registry.len(), "server ready");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line).await {
                let mut frame = serde_json::to_vec(&response)?;
                frame.push(b'\n');
                stdout.write_all(&frame).await?;
                stdout.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handles one wire frame. `None` means no response is due: the frame
    /// was undecodable or a notification.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "skipping undecodable frame");
                return None;
            }
        };

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification");
            return None;
        };

        Some(self.handle_request(id, &request.method, request.params).await)
    }

    async fn handle_request(
        &self,
        id: RequestId,
        method: &str,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        match method {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.list_tools()),
            "tools/call" => self.call_tool(id, params).await,
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        }
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .registry
            .contracts()
            .iter()
            .map(|contract| {
                json!({
                    "name": contract.name,
                    "description": contract.description,
                    "inputSchema": contract.schema.to_json_schema(),
                })
            })
            .collect();
        json!({"tools": tools})
    }

    async fn call_tool(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params = params.unwrap_or(Value::Null);
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params("tools/call requires a tool name"),
            );
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = self.registry.dispatch(&self.ctx, name, arguments).await;
        let is_error = !result.success;
        let text = serde_json::to_string_pretty(&result)
            .unwrap_or_else(|_| r#"{"success":false,"error":"unserializable result"}"#.into());

        JsonRpcResponse::success(
            id,
            json!({
                "content": [{"type": "text", "text": text}],
                "isError": is_error,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::clients::{JiraClient, ZephyrClient};
    use crate::mcp::types::error_codes;
    use crate::tools::build_registry;

    // Clients pointed at a closed port; these tests never reach the network.
    fn server() -> McpServer {
        let ctx = ToolContext {
            jira: Arc::new(JiraClient::new("http://127.0.0.1:9", "u", "t").unwrap()),
            zephyr: Arc::new(ZephyrClient::new("http://127.0.0.1:9", "t").unwrap()),
        };
        McpServer::new(build_registry(), ctx)
    }

    #[tokio::test]
    async fn undecodable_frames_are_skipped() {
        assert!(server().handle_message("not json").await.is_none());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let frame = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server().handle_message(frame).await.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let frame = r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#;
        let response = server().handle_message(frame).await.unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn initialize_reports_server_identity() {
        let frame = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let response = server().handle_message(frame).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "jira-zephyr-mcp");
    }

    #[tokio::test]
    async fn tools_list_renders_every_contract() {
        let frame = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;
        let response = server().handle_message(frame).await.unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 19);
        assert_eq!(tools[0]["name"], "read_jira_issue");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["issueKey"]));
    }

    #[tokio::test]
    async fn failed_dispatch_is_marked_as_tool_error() {
        let frame = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call",
                        "params":{"name":"no_such_tool","arguments":{}}}"#;
        let response = server().handle_message(frame).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("unknown tool"));
    }

    #[tokio::test]
    async fn call_without_tool_name_is_invalid_params() {
        let frame = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{}}"#;
        let response = server().handle_message(frame).await.unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }
}
