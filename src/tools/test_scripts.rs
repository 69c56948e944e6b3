//! Test script tools.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::schema::{Args, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::{field, put_str, required_str};

const SCRIPT_KINDS: &[&str] = &["plain", "bdd"];

pub(crate) struct CreateTestScript {
    contract: ToolContract,
}

impl CreateTestScript {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "create_test_script",
                description: "Attach a script to an existing test case",
                schema: Schema::new(vec![
                    FieldSpec::string("testCaseKey").required(),
                    FieldSpec::enumeration("type", SCRIPT_KINDS).required(),
                    FieldSpec::string("text").required(),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for CreateTestScript {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let test_case_key = required_str(&args, "testCaseKey")?;
        let mut payload = Map::new();
        put_str(&mut payload, "type", &args, "type");
        put_str(&mut payload, "text", &args, "text");

        let script = ctx
            .zephyr
            .create_test_script(test_case_key, Value::Object(payload))
            .await?;

        Ok(json!({
            "id": field(&script, "id"),
            "type": args.str("type"),
            "text": args.str("text"),
            "testCaseKey": test_case_key,
        }))
    }
}

pub(crate) struct GetTestScriptByTestCase {
    contract: ToolContract,
}

impl GetTestScriptByTestCase {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_test_script_by_test_case",
                description: "Read the script attached to a test case",
                schema: Schema::new(vec![FieldSpec::string("testCaseKey").required()]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetTestScriptByTestCase {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let test_case_key = required_str(&args, "testCaseKey")?;
        let script = ctx.zephyr.get_test_script(test_case_key).await?;

        Ok(json!({
            "id": field(&script, "id"),
            "type": field(&script, "type"),
            "text": field(&script, "text"),
            "testCaseKey": test_case_key,
        }))
    }
}
