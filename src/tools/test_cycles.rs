//! Test cycle tools.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::normalize::normalize_page;
use crate::schema::{Args, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::{field, put_str, required_str};

pub(crate) struct CreateTestCycle {
    contract: ToolContract,
}

impl CreateTestCycle {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "create_test_cycle",
                description: "Create a test cycle for a project version",
                schema: Schema::new(vec![
                    FieldSpec::string("name").required(),
                    FieldSpec::string("projectKey").required(),
                    FieldSpec::string("versionId").required(),
                    FieldSpec::string("description"),
                    FieldSpec::string("environment"),
                    FieldSpec::string("startDate").describe("Planned start date, ISO 8601"),
                    FieldSpec::string("endDate").describe("Planned end date, ISO 8601"),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for CreateTestCycle {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let mut payload = Map::new();
        put_str(&mut payload, "name", &args, "name");
        put_str(&mut payload, "projectKey", &args, "projectKey");
        put_str(&mut payload, "versionId", &args, "versionId");
        put_str(&mut payload, "description", &args, "description");
        put_str(&mut payload, "environment", &args, "environment");
        put_str(&mut payload, "plannedStartDate", &args, "startDate");
        put_str(&mut payload, "plannedEndDate", &args, "endDate");

        let cycle = ctx.zephyr.create_test_cycle(Value::Object(payload)).await?;
        Ok(json!({
            "id": field(&cycle, "id"),
            "key": field(&cycle, "key"),
            "name": field(&cycle, "name"),
            "description": field(&cycle, "description"),
            "projectId": field(&cycle, "projectId"),
            "versionId": field(&cycle, "versionId"),
            "environment": field(&cycle, "environment"),
            "status": field(&cycle, "status"),
            "plannedStartDate": field(&cycle, "plannedStartDate"),
            "plannedEndDate": field(&cycle, "plannedEndDate"),
            "createdOn": field(&cycle, "createdOn"),
            "executionSummary": field(&cycle, "executionSummary"),
        }))
    }
}

pub(crate) struct ListTestCycles {
    contract: ToolContract,
}

impl ListTestCycles {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "list_test_cycles",
                description: "List test cycles in a project, optionally filtered by version",
                schema: Schema::new(vec![
                    FieldSpec::string("projectKey").required(),
                    FieldSpec::string("versionId"),
                    FieldSpec::integer("limit").min(1.0).default_value(json!(50)),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for ListTestCycles {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let project_key = required_str(&args, "projectKey")?;
        let version_id = args.str("versionId");
        let limit = args.u64("limit").unwrap_or(50);

        let raw = ctx
            .zephyr
            .search_test_cycles(project_key, version_id, limit)
            .await?;
        let page = normalize_page(&raw);
        let cycles: Vec<Value> = page.items.iter().map(cycle_view).collect();

        Ok(json!({
            "total": page.total,
            "isLast": page.page.is_last,
            "testCycles": cycles,
        }))
    }
}

pub(crate) struct GetTestCyclesByIssue {
    contract: ToolContract,
}

impl GetTestCyclesByIssue {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_test_cycles_by_issue",
                description: "List the test cycles linked to an issue",
                schema: Schema::new(vec![FieldSpec::string("issueKey").required()]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetTestCyclesByIssue {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let issue_key = required_str(&args, "issueKey")?;
        let raw = ctx.zephyr.test_cycles_for_issue(issue_key).await?;
        Ok(normalize_page(&raw).into_value())
    }
}

fn cycle_view(cycle: &Value) -> Value {
    json!({
        "id": field(cycle, "id"),
        "key": field(cycle, "key"),
        "name": field(cycle, "name"),
        "description": field(cycle, "description"),
        "projectId": field(cycle, "projectId"),
        "versionId": field(cycle, "versionId"),
        "environment": field(cycle, "environment"),
        "status": field(cycle, "status"),
        "plannedStartDate": field(cycle, "plannedStartDate"),
        "plannedEndDate": field(cycle, "plannedEndDate"),
        "actualStartDate": field(cycle, "actualStartDate"),
        "actualEndDate": field(cycle, "actualEndDate"),
        "createdOn": field(cycle, "createdOn"),
        "updatedOn": field(cycle, "updatedOn"),
        "executionSummary": summary_with_pass_rate(cycle.get("executionSummary")),
    })
}

/// Recomputes the pass rate from the raw counts so the listed summary is
/// internally consistent even when the upstream omits or staleness-skews it.
fn summary_with_pass_rate(summary: Option<&Value>) -> Value {
    let Some(summary) = summary.filter(|s| s.is_object()) else {
        return Value::Null;
    };
    let count = |name: &str| summary.get(name).and_then(Value::as_u64).unwrap_or(0);
    let total = count("total");
    let passed = count("passed");
    let pass_rate = if total > 0 {
        ((passed as f64 / total as f64) * 100.0).round() as u64
    } else {
        0
    };

    json!({
        "total": total,
        "passed": passed,
        "failed": count("failed"),
        "blocked": count("blocked"),
        "inProgress": count("inProgress"),
        "notExecuted": count("notExecuted"),
        "passRate": pass_rate,
    })
}
