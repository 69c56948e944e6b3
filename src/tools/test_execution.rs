//! Test execution tools: recording results, cycle status, linking, reports.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::batch::execute_batch;
use crate::normalize::normalize_page;
use crate::report::{render_html, summarize, TestReport};
use crate::schema::{Args, FieldKind, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::{field, nested, put_str, required_str};

const EXECUTION_STATUSES: &[&str] = &["PASS", "FAIL", "WIP", "BLOCKED"];
const REPORT_FORMATS: &[&str] = &["JSON", "HTML"];

pub(crate) struct ExecuteTest {
    contract: ToolContract,
}

impl ExecuteTest {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "execute_test",
                description: "Record the result of one test execution",
                schema: Schema::new(vec![
                    FieldSpec::string("executionId").required(),
                    FieldSpec::enumeration("status", EXECUTION_STATUSES).required(),
                    FieldSpec::string("comment"),
                    FieldSpec::array("defects", FieldKind::String)
                        .describe("Issue keys to attach as defects"),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for ExecuteTest {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let execution_id = required_str(&args, "executionId")?;

        // Status goes upstream verbatim; defects become issue references.
        // Absent optionals are omitted from the body, not sent as null.
        let mut payload = Map::new();
        put_str(&mut payload, "status", &args, "status");
        put_str(&mut payload, "comment", &args, "comment");
        if let Some(defects) = args.array("defects") {
            let issues: Vec<Value> = defects
                .iter()
                .filter_map(Value::as_str)
                .map(|key| json!({"key": key}))
                .collect();
            payload.insert("issues".to_string(), Value::Array(issues));
        }

        let execution = ctx
            .zephyr
            .update_test_execution(execution_id, Value::Object(payload))
            .await?;

        let defects: Vec<Value> = execution
            .get("defects")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .map(|d| json!({"key": field(d, "key"), "summary": field(d, "summary")}))
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({
            "id": field(&execution, "id"),
            "key": field(&execution, "key"),
            "cycleId": field(&execution, "cycleId"),
            "testCaseId": field(&execution, "testCaseId"),
            "status": field(&execution, "status"),
            "comment": field(&execution, "comment"),
            "executedOn": field(&execution, "executedOn"),
            "executedBy": nested(&execution, "executedBy", "displayName"),
            "defects": defects,
        }))
    }
}

pub(crate) struct GetTestExecutionStatus {
    contract: ToolContract,
}

impl GetTestExecutionStatus {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_test_execution_status",
                description: "Summarize execution progress for a test cycle",
                schema: Schema::new(vec![FieldSpec::string("cycleId").required()]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetTestExecutionStatus {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let cycle_id = required_str(&args, "cycleId")?;
        let raw = ctx.zephyr.cycle_test_results(cycle_id).await?;
        let page = normalize_page(&raw);
        let summary = summarize(&page.items);

        let completed = summary.passed + summary.failed + summary.blocked;
        let remaining = summary.not_executed + summary.in_progress;
        let completion = if summary.total > 0 {
            ((completed as f64 / summary.total as f64) * 100.0).round() as u64
        } else {
            0
        };

        Ok(json!({
            "cycleId": cycle_id,
            "summary": {
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
                "blocked": summary.blocked,
                "inProgress": summary.in_progress,
                "notExecuted": summary.not_executed,
                "passRate": summary.pass_rate.round() as u64,
            },
            "progress": {
                "completed": completed,
                "remaining": remaining,
                "completionPercentage": completion,
            },
        }))
    }
}

pub(crate) struct LinkTestsToIssues {
    contract: ToolContract,
}

impl LinkTestsToIssues {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "link_tests_to_issues",
                description: "Link a test case to one or more issues",
                schema: Schema::new(vec![
                    FieldSpec::string("testCaseId").required(),
                    FieldSpec::array("issueKeys", FieldKind::String)
                        .required()
                        .min_items(1),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for LinkTestsToIssues {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let test_case_id = required_str(&args, "testCaseId")?.to_string();
        let issue_keys: Vec<String> = args
            .array("issueKeys")
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        // One link call per key; a failed key never stops the rest.
        let zephyr = Arc::clone(&ctx.zephyr);
        let report = execute_batch(issue_keys.clone(), true, |issue_key: String| {
            let zephyr = Arc::clone(&zephyr);
            let test_case_id = test_case_id.clone();
            async move {
                zephyr
                    .link_test_case_to_issue(&test_case_id, &issue_key)
                    .await
            }
        })
        .await;

        let summary = report.summary();
        let link_results: Vec<Value> = report
            .results
            .iter()
            .map(|result| {
                let mut entry = Map::new();
                entry.insert(
                    "issueKey".to_string(),
                    Value::String(issue_keys[result.index].clone()),
                );
                entry.insert("success".to_string(), Value::Bool(result.success));
                if let Some(error) = &result.error {
                    entry.insert("error".to_string(), Value::String(error.clone()));
                }
                Value::Object(entry)
            })
            .collect();

        Ok(json!({
            "testCaseId": test_case_id,
            "linkResults": link_results,
            "successCount": summary.successful,
            "failureCount": summary.failed,
        }))
    }
}

pub(crate) struct GenerateTestReport {
    contract: ToolContract,
}

impl GenerateTestReport {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "generate_test_report",
                description: "Generate a cycle execution report as JSON or HTML",
                schema: Schema::new(vec![
                    FieldSpec::string("cycleId").required(),
                    FieldSpec::enumeration("format", REPORT_FORMATS)
                        .default_value(json!("JSON")),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GenerateTestReport {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let cycle_id = required_str(&args, "cycleId")?;
        let format = args.str("format").unwrap_or("JSON");

        let cycle = ctx.zephyr.get_test_cycle(cycle_id).await?;
        let raw_results = ctx.zephyr.cycle_test_results(cycle_id).await?;
        let executions = normalize_page(&raw_results).items;
        let report = TestReport::new(cycle_id, &cycle, executions);

        // Both formats share the same report value; only the rendering
        // differs.
        let content = if format == "HTML" {
            Value::String(render_html(&report))
        } else {
            serde_json::to_value(&report).map_err(|e| ToolError::Execution(e.to_string()))?
        };

        Ok(json!({
            "format": format,
            "content": content,
            "generatedOn": report.generated_on,
        }))
    }
}
