use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{
    config::Config,
    google::GoogleApi,
    mcp::{Request, Response, RpcError, ToolContext, ToolRegistry},
};

const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

pub struct Server {
    config: Config,
    api: Arc<dyn GoogleApi>,
    registry: ToolRegistry,
}

impl Server {
    pub fn new(config: Config, api: Arc<dyn GoogleApi>, registry: ToolRegistry) -> Self {
        Self {
            config,
            api,
            registry,
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.serve(io::stdin(), io::stdout()).await
    }

    /// Reads newline-delimited JSON-RPC messages until EOF, answering each
    /// request on `writer`. Calls are handled one at a time.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                break; // EOF
            }
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                let response_json = serde_json::to_string(&response)?;
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let message = match serde_json::from_str::<Value>(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Discarding malformed message: {e}");
                return Some(Response::failure(
                    Value::Null,
                    RpcError::new(RpcError::PARSE_ERROR, format!("Parse error: {e}")),
                ));
            }
        };

        let request = match Request::deserialize(&message) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Discarding invalid request: {e}");
                let id = message.get("id").cloned().unwrap_or(Value::Null);
                return Some(Response::failure(
                    id,
                    RpcError::new(RpcError::INVALID_REQUEST, format!("Invalid Request: {e}")),
                ));
            }
        };

        let Some(id) = request.id.clone() else {
            tracing::debug!("Received notification {}", request.method);
            return None;
        };

        Some(match self.handle_request(&request).await {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(id, error),
        })
    }

    async fn handle_request(&self, request: &Request) -> Result<Value, RpcError> {
        match request.method.as_str() {
            "initialize" => Ok(Self::handle_initialize(request)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.handle_list_tools()),
            "tools/call" => self.handle_call_tool(request).await,
            method => Err(RpcError::new(
                RpcError::METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            )),
        }
    }

    fn handle_initialize(request: &Request) -> Value {
        let requested = request
            .params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str());
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn handle_list_tools(&self) -> Value {
        let tools: Vec<_> = self.registry.definitions().collect();
        json!({
            "tools": tools
        })
    }

    async fn handle_call_tool(&self, request: &Request) -> Result<Value, RpcError> {
        let params = request
            .params
            .as_ref()
            .ok_or_else(|| RpcError::new(RpcError::INVALID_PARAMS, "Missing parameters"))?;
        let name = params
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| RpcError::new(RpcError::INVALID_PARAMS, "Missing tool name"))?;
        let arguments = params.get("arguments").unwrap_or(&Value::Null);

        let ctx = ToolContext {
            api: self.api.as_ref(),
            config: &self.config,
        };

        match self.registry.call(&ctx, name, arguments).await {
            Ok(result) => serde_json::to_value(result)
                .map_err(|e| RpcError::new(RpcError::INTERNAL_ERROR, e.to_string())),
            Err(e) => {
                tracing::warn!("Rejected call: {e}");
                Err(RpcError::new(RpcError::INVALID_PARAMS, e.to_string()))
            }
        }
    }
}
