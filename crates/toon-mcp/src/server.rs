//! JSON-RPC dispatch over a line-delimited byte stream.
//!
//! One request per line in, one response per line out. Notifications never
//! produce output. Tool failures are reported inside a successful response
//! with `isError: true`; only protocol problems become JSON-RPC errors.

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::protocol::{
    error_codes, InitializeResult, JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolCallResult,
};
use crate::tools::ToolRegistry;
use crate::ServerError;

/// MCP server bound to a fixed tool registry.
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run_stdio(&self) -> Result<(), ServerError> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.run(reader, writer).await
    }

    /// Serve requests from `reader`, writing responses to `writer`, until EOF.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("waiting for JSON-RPC requests");
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                info!("input closed, shutting down");
                break;
            }
            if let Some(response) = self.process_line(&line) {
                let encoded = serde_json::to_string(&response)?;
                writer.write_all(encoded.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                debug!(response = %encoded, "sent");
            }
        }
        Ok(())
    }

    /// Handle one input line. Blank lines and notifications yield `None`.
    pub fn process_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        debug!(request = line, "received");

        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "unparseable request");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };
        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "malformed request");
                return Some(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                ));
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }
        Some(self.handle_request(request))
    }

    fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(Value::Null);
        match request.method.as_str() {
            "initialize" => {
                info!("client connected");
                to_response(id, &InitializeResult::current())
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({ "tools": self.registry.definitions() }),
            ),
            "tools/call" => self.handle_tools_call(id, request.params),
            other => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        }
    }

    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                )
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Invalid params: tools/call requires params",
                )
            }
        };

        let result = match self.registry.call(&params.name, &params.arguments) {
            Ok(text) => ToolCallResult::success(text),
            Err(e) => {
                warn!(tool = %params.name, error = %e, "tool failed");
                ToolCallResult::error(e.to_string())
            }
        };
        to_response(id, &result)
    }
}

fn to_response<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Internal error: {e}"),
        ),
    }
}
