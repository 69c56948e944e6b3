//! Execution status lookup tool.

use async_trait::async_trait;
use serde_json::Value;

use crate::schema::{Args, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::required_u64;

pub(crate) struct GetStatus {
    contract: ToolContract,
}

impl GetStatus {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_status",
                description: "Read one execution status definition by id",
                schema: Schema::new(vec![FieldSpec::integer("statusId").min(1.0).required()]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetStatus {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let status_id = required_u64(&args, "statusId")?;
        Ok(ctx.zephyr.get_status(status_id).await?)
    }
}
