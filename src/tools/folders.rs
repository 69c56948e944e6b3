//! Folder listing tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::normalize::normalize_page;
use crate::schema::{Args, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::required_str;

const FOLDER_TYPES: &[&str] = &["TEST_CASE", "TEST_PLAN", "TEST_CYCLE"];

pub(crate) struct GetFolders {
    contract: ToolContract,
}

impl GetFolders {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_folders",
                description: "List folders in a project, optionally filtered by folder type",
                schema: Schema::new(vec![
                    FieldSpec::string("projectKey").required(),
                    FieldSpec::integer("maxResults")
                        .min(1.0)
                        .max(1000.0)
                        .default_value(json!(10)),
                    FieldSpec::integer("startAt").min(0.0).default_value(json!(0)),
                    FieldSpec::enumeration("folderType", FOLDER_TYPES),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetFolders {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let project_key = required_str(&args, "projectKey")?;
        let max_results = args.u64("maxResults").unwrap_or(10);
        let start_at = args.u64("startAt").unwrap_or(0);
        let folder_type = args.str("folderType");

        let raw = ctx
            .zephyr
            .get_folders(project_key, max_results, start_at, folder_type)
            .await?;
        let page = normalize_page(&raw);

        let mut data = page.into_value();
        if let Value::Object(map) = &mut data {
            map.insert("projectKey".to_string(), Value::String(project_key.into()));
        }
        Ok(data)
    }
}
