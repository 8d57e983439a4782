//! MCP server exposing Google Calendar events and Google Tasks as tools.

pub mod config;
pub mod error;
pub mod google;
pub mod mcp;
pub mod tools;
