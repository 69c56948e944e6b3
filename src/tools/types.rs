//! Shared types for tool handlers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::clients::{JiraApi, RemoteError, ZephyrApi};
use crate::schema::{Args, ToolContract};

/// Backend clients handed to every tool invocation.
#[derive(Clone)]
pub struct ToolContext {
    pub jira: Arc<dyn JiraApi>,
    pub zephyr: Arc<dyn ZephyrApi>,
}

/// Uniform result envelope returned by the dispatcher for every call.
///
/// `data` and `error` are mutually exclusive; exactly one is present.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Failures a handler can surface. All variants end up flattened into the
/// `error` string of a [`ToolResult`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("{0}")]
    Execution(String),
}

/// A single callable tool: a contract describing its input surface plus the
/// async implementation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn contract(&self) -> &ToolContract;

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError>;
}
