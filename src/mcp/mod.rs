//! Wire transport: JSON-RPC 2.0 over stdio.

mod server;
pub mod types;

pub use server::McpServer;
