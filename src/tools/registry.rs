//! Tool registry and dispatcher.
//!
//! The registry owns every handler plus the schema registry built from
//! their contracts. `dispatch` is the single entry point for tool calls:
//! it resolves the contract, validates arguments, runs the handler, and
//! folds every possible outcome (including a panic) into a [`ToolResult`].
//! Callers never see an error type escape this function.

use std::collections::HashMap;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::schema::{SchemaRegistry, ToolContract};
use crate::tools::types::{ToolContext, ToolHandler, ToolResult};

pub struct ToolRegistry {
    handlers: HashMap<&'static str, Box<dyn ToolHandler>>,
    schemas: SchemaRegistry,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            schemas: SchemaRegistry::new(),
            order: Vec::new(),
        }
    }

    /// Registers a handler under its contract name. Panics on a duplicate
    /// name, which is a wiring bug caught at startup.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) {
        let contract = handler.contract().clone();
        let name = contract.name;
        self.schemas.register(contract);
        self.handlers.insert(name, handler);
        self.order.push(name);
    }

    /// Contracts in registration order, for listing the tool surface.
    pub fn contracts(&self) -> Vec<&ToolContract> {
        self.order
            .iter()
            .filter_map(|name| self.schemas.lookup(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs a tool by name. Unknown tools, validation failures, handler
    /// errors, and panics all come back as a failed [`ToolResult`].
    pub async fn dispatch(&self, ctx: &ToolContext, name: &str, raw_args: Value) -> ToolResult {
        let contract = match self.schemas.lookup(name) {
            Some(contract) => contract,
            None => {
                warn!(tool = name, "unknown tool requested");
                return ToolResult::fail(format!("unknown tool: {name}"));
            }
        };

        let args = match self.schemas.validate(contract, &raw_args) {
            Ok(args) => args,
            Err(errors) => {
                let detail = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                debug!(tool = name, %detail, "argument validation failed");
                return ToolResult::fail(format!("invalid arguments: {detail}"));
            }
        };

        // Contract lookup succeeding means a handler was registered.
        let handler = match self.handlers.get(name) {
            Some(handler) => handler,
            None => return ToolResult::fail(format!("unknown tool: {name}")),
        };

        debug!(tool = name, "dispatching");
        let outcome = std::panic::AssertUnwindSafe(handler.run(ctx, args))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(data)) => ToolResult::ok(data),
            Ok(Err(err)) => {
                warn!(tool = name, error = %err, "tool failed");
                ToolResult::fail(err.to_string())
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!(tool = name, detail, "tool panicked");
                ToolResult::fail(format!("internal error in {name}: {detail}"))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
