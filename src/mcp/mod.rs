//! Stdio MCP server exposing the analyzer as `analyze_content` and
//! `batch_analyze` tools.

pub mod protocol;
pub mod server;

pub use server::McpServer;
