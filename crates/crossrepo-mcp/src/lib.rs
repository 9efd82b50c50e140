//! Crossrepo MCP Server
//!
//! Exposes regex search across many local repositories to Claude and other AI
//! assistants via the Model Context Protocol (MCP). Implements MCP over stdio
//! using JSON-RPC 2.0.

pub mod context;
pub mod handler;
pub mod listing;
pub mod protocol;
pub mod server;
pub mod tools;

pub use handler::App;
pub use server::McpServer;
