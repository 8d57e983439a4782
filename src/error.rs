use thiserror::Error;

use crate::google::ApiError;

/// Everything a tool handler can fail with.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments that do not match the tool's schema or cannot be parsed.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Remote(#[from] ApiError),

    /// A reorder stopped part-way; `moved` kept their new positions.
    #[error("failed to move task {failed_at} after moving [{}]: {source}", .moved.join(", "))]
    PartialReorder {
        failed_at: String,
        moved: Vec<String>,
        #[source]
        source: ApiError,
    },

    #[error("{0}")]
    Internal(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Internal(format!("Failed to serialize result: {err}"))
    }
}

pub fn validation_error(message: impl Into<String>) -> ToolError {
    ToolError::Validation(message.into())
}
