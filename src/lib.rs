//! Schema-validated Jira + Zephyr tooling exposed over an MCP stdio server.
//!
//! The crate is layered leaf-first: `schema` holds the input contracts and
//! validation, `normalize` the canonical list shape, `batch` the ordered
//! partial-failure executor, `clients` the two upstream HTTP adapters,
//! `tools` the dispatcher and handlers, and `mcp` the wire transport.

pub mod batch;
pub mod clients;
pub mod config;
pub mod mcp;
pub mod normalize;
pub mod report;
pub mod schema;
pub mod tools;
