//! Test case tools, including the bulk-create batch entry point.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::batch::execute_batch;
use crate::normalize::normalize_page;
use crate::schema::{Args, FieldKind, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::{field, nested, required_str};

const SCRIPT_TYPES: &[&str] = &["STEP_BY_STEP", "PLAIN_TEXT"];

/// Field set of one test case, shared between `create_test_case` and each
/// element of `create_multiple_test_cases`.
fn test_case_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("projectKey").required(),
        FieldSpec::string("name").required(),
        FieldSpec::string("objective"),
        FieldSpec::string("precondition"),
        FieldSpec::number("estimatedTime")
            .min(0.0)
            .describe("Estimated duration in milliseconds"),
        FieldSpec::string("priority"),
        FieldSpec::string("status"),
        FieldSpec::integer("folderId").min(1.0),
        FieldSpec::array("labels", FieldKind::String),
        FieldSpec::integer("componentId"),
        FieldSpec::map("customFields"),
        FieldSpec::object(
            "testScript",
            vec![
                FieldSpec::enumeration("type", SCRIPT_TYPES).required(),
                FieldSpec::array(
                    "steps",
                    FieldKind::Object(vec![
                        FieldSpec::integer("index").min(1.0).required(),
                        FieldSpec::string("description").required(),
                        FieldSpec::string("testData"),
                        FieldSpec::string("expectedResult").required(),
                    ]),
                ),
                FieldSpec::string("text"),
            ],
        ),
    ]
}

pub(crate) struct CreateTestCase {
    contract: ToolContract,
}

impl CreateTestCase {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "create_test_case",
                description: "Create a test case, optionally with an inline test script",
                schema: Schema::new(test_case_fields()),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for CreateTestCase {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        // Validation already reduced the input to known fields, so the
        // argument object doubles as the upstream payload.
        let created = ctx.zephyr.create_test_case(args.into_value()).await?;
        Ok(created_view(&created))
    }
}

pub(crate) struct SearchTestCases {
    contract: ToolContract,
}

impl SearchTestCases {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "search_test_cases",
                description: "Search test cases in a project, optionally within a folder",
                schema: Schema::new(vec![
                    FieldSpec::string("projectKey").required(),
                    FieldSpec::integer("folderId").min(1.0),
                    FieldSpec::integer("limit")
                        .min(1.0)
                        .max(1000.0)
                        .default_value(json!(50)),
                    FieldSpec::integer("offset").min(0.0).default_value(json!(0)),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for SearchTestCases {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let project_key = required_str(&args, "projectKey")?;
        let folder_id = args.u64("folderId");
        let limit = args.u64("limit").unwrap_or(50);
        let offset = args.u64("offset").unwrap_or(0);

        let raw = ctx
            .zephyr
            .search_test_cases(project_key, folder_id, limit, offset)
            .await?;
        let page = normalize_page(&raw);
        let cases: Vec<Value> = page.items.iter().map(search_view).collect();

        Ok(json!({
            "testCases": cases,
            "total": page.total,
            "isLast": page.page.is_last,
            "projectKey": project_key,
        }))
    }
}

pub(crate) struct GetTestCase {
    contract: ToolContract,
}

impl GetTestCase {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_test_case",
                description: "Read one test case with script and links",
                schema: Schema::new(vec![FieldSpec::string("testCaseId").required()]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetTestCase {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let test_case_id = required_str(&args, "testCaseId")?;
        let case = ctx.zephyr.get_test_case(test_case_id).await?;

        Ok(json!({
            "id": field(&case, "id"),
            "key": field(&case, "key"),
            "name": field(&case, "name"),
            "projectKey": nested(&case, "project", "id"),
            "objective": field(&case, "objective"),
            "precondition": field(&case, "precondition"),
            "estimatedTime": field(&case, "estimatedTime"),
            "priority": field(&case, "priority"),
            "status": field(&case, "status"),
            "folder": field(&case, "folder"),
            "labels": case.get("labels").cloned().unwrap_or_else(|| json!([])),
            "component": field(&case, "component"),
            "owner": field(&case, "owner"),
            "createdOn": field(&case, "createdOn"),
            "customFields": field(&case, "customFields"),
            "links": field(&case, "links"),
            "testScript": field(&case, "testScript"),
        }))
    }
}

pub(crate) struct CreateMultipleTestCases {
    contract: ToolContract,
}

impl CreateMultipleTestCases {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "create_multiple_test_cases",
                description: "Create several test cases in order, with per-item outcomes",
                schema: Schema::new(vec![
                    FieldSpec::array("testCases", FieldKind::Object(test_case_fields()))
                        .required()
                        .min_items(1),
                    FieldSpec::boolean("continueOnError").default_value(json!(true)),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for CreateMultipleTestCases {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let items: Vec<Value> = args.array("testCases").cloned().unwrap_or_default();
        let continue_on_error = args.bool("continueOnError").unwrap_or(true);

        // Index order matters: later cases may reference folders or data the
        // earlier ones created.
        let zephyr = Arc::clone(&ctx.zephyr);
        let report = execute_batch(items, continue_on_error, |case: Value| {
            let zephyr = Arc::clone(&zephyr);
            async move {
                let created = zephyr.create_test_case(case).await?;
                Ok(created_view(&created))
            }
        })
        .await;

        let summary = report.summary();
        Ok(json!({
            "results": report.results,
            "summary": summary,
        }))
    }
}

/// Trimmed view of a freshly created test case.
fn created_view(case: &Value) -> Value {
    json!({
        "id": field(case, "id"),
        "key": field(case, "key"),
        "name": field(case, "name"),
        "projectKey": nested(case, "project", "id"),
        "objective": field(case, "objective"),
        "precondition": field(case, "precondition"),
        "estimatedTime": field(case, "estimatedTime"),
        "priority": nested(case, "priority", "id"),
        "status": nested(case, "status", "id"),
        "folder": nested(case, "folder", "id"),
        "labels": case.get("labels").cloned().unwrap_or_else(|| json!([])),
        "component": nested(case, "component", "id"),
        "owner": nested(case, "owner", "accountId"),
        "createdOn": field(case, "createdOn"),
        "linkedIssues": linked_issue_count(case),
    })
}

fn search_view(case: &Value) -> Value {
    json!({
        "id": field(case, "id"),
        "key": field(case, "key"),
        "name": field(case, "name"),
        "objective": field(case, "objective"),
        "precondition": field(case, "precondition"),
        "estimatedTime": field(case, "estimatedTime"),
        "priority": nested(case, "priority", "id"),
        "status": nested(case, "status", "id"),
        "folder": nested(case, "folder", "id"),
        "labels": case.get("labels").cloned().unwrap_or_else(|| json!([])),
        "component": nested(case, "component", "id"),
        "owner": nested(case, "owner", "accountId"),
        "createdOn": field(case, "createdOn"),
        "linkedIssues": linked_issue_count(case),
    })
}

fn linked_issue_count(case: &Value) -> u64 {
    case.get("links")
        .and_then(|links| links.get("issues"))
        .and_then(Value::as_array)
        .map(|issues| issues.len() as u64)
        .unwrap_or(0)
}
