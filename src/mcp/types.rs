use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{config::Config, error::ToolError, google::GoogleApi};

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_owned(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// The envelope every `tools/call` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(
        rename = "structuredContent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub structured_content: Option<Value>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            structured_content: None,
            is_error: false,
        }
    }

    pub fn with_structured(mut self, structured: Value) -> Self {
        self.structured_content = Some(structured);
        self
    }

    /// The single place handler failures are turned into text, e.g.
    /// `Error deleting event: Not Found: ...`.
    pub fn failure(action: &str, error: &ToolError) -> Self {
        Self {
            content: vec![Content::Text {
                text: format!("Error {action}: {error}"),
            }],
            structured_content: None,
            is_error: true,
        }
    }

    #[cfg(test)]
    pub fn first_text(&self) -> &str {
        self.content
            .iter()
            .map(|Content::Text { text }| text.as_str())
            .next()
            .unwrap_or_default()
    }
}

/// Configuration section a tool belongs to; disabling the section disables
/// the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolGroup {
    Calendar,
    Tasks,
}

/// What a handler gets to work with for the duration of one call.
pub struct ToolContext<'a> {
    pub api: &'a dyn GoogleApi,
    pub config: &'a Config,
}

pub trait ToolParams: Sized {
    fn input_schema() -> Value;
    fn extract_params(arguments: &Value) -> Result<Self, ToolError>;
}

pub trait ToolProvider: Default {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    /// Used in failure messages: `Error <ACTION>: ...`
    const ACTION: &'static str;
    const GROUP: ToolGroup;
    type Params: ToolParams;

    fn input_schema() -> Value {
        Self::Params::input_schema()
    }

    fn get_tool_definition() -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_owned(),
            description: Self::DESCRIPTION.to_owned(),
            input_schema: Self::input_schema(),
        }
    }

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError>;

    /// Validates `arguments` and runs the tool.
    ///
    /// Only invalid arguments come back as `Err`, before anything reaches the
    /// API. Every other failure is reported inside the envelope.
    async fn execute(
        &self,
        ctx: &ToolContext<'_>,
        arguments: &Value,
    ) -> Result<ToolResult, ToolError> {
        let params = Self::Params::extract_params(arguments)?;

        match self.execute_with_params(ctx, params).await {
            Ok(result) => Ok(result),
            Err(error) => {
                tracing::error!("Error {}: {error}", Self::ACTION);
                Ok(ToolResult::failure(Self::ACTION, &error))
            }
        }
    }
}
