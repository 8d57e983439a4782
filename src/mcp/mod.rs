pub(crate) mod macros;
pub mod params;
mod registry;
mod server;
mod types;

pub use registry::{CallError, RegistryError, ToolRegistry};
pub use server::Server;
pub use types::{
    Content, Request, Response, RpcError, ToolContext, ToolDefinition, ToolGroup, ToolParams,
    ToolProvider, ToolResult,
};
