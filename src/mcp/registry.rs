use std::{future::Future, pin::Pin};

use serde_json::Value;
use thiserror::Error;

use super::{ToolContext, ToolDefinition, ToolProvider, ToolResult};
use crate::error::ToolError;

type CallFuture<'a> = Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + 'a>>;
type Handler = for<'a> fn(&'a ToolContext<'a>, &'a Value) -> CallFuture<'a>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool {0} is already registered")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidParams {
        tool: String,
        #[source]
        source: ToolError,
    },
}

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Handler,
}

fn dispatch<'a, T: ToolProvider + 'static>(
    ctx: &'a ToolContext<'a>,
    arguments: &'a Value,
) -> CallFuture<'a> {
    Box::pin(async move { T::default().execute(ctx, arguments).await })
}

/// Tools callable through `tools/call`, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ToolProvider + 'static>(&mut self) -> Result<(), RegistryError> {
        if self.contains(T::NAME) {
            return Err(RegistryError::Duplicate(T::NAME.to_owned()));
        }

        tracing::debug!("Registering tool {}", T::NAME);
        self.tools.push(RegisteredTool {
            definition: T::get_tool_definition(),
            handler: dispatch::<T>,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.definition.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(|tool| &tool.definition)
    }

    /// Runs the named tool. Remote failures are part of the returned
    /// [`ToolResult`]; only unknown tools and invalid arguments are errors.
    pub async fn call(
        &self,
        ctx: &ToolContext<'_>,
        name: &str,
        arguments: &Value,
    ) -> Result<ToolResult, CallError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.definition.name == name)
            .ok_or_else(|| CallError::UnknownTool(name.to_owned()))?;

        tracing::debug!("Calling tool {name}");
        (tool.handler)(ctx, arguments)
            .await
            .map_err(|source| CallError::InvalidParams {
                tool: name.to_owned(),
                source,
            })
    }
}
