//! Test plan tools.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::normalize::normalize_page;
use crate::schema::{Args, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::{field, nested, put_str, required_str};

pub(crate) struct CreateTestPlan {
    contract: ToolContract,
}

impl CreateTestPlan {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "create_test_plan",
                description: "Create a test plan in a project",
                schema: Schema::new(vec![
                    FieldSpec::string("name").required(),
                    FieldSpec::string("projectKey").required(),
                    FieldSpec::string("description"),
                    FieldSpec::string("startDate").describe("Planned start date, ISO 8601"),
                    FieldSpec::string("endDate").describe("Planned end date, ISO 8601"),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for CreateTestPlan {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        // Upstream names differ from the tool surface: description becomes
        // objective, the dates become plannedStartDate/plannedEndDate.
        let mut payload = Map::new();
        put_str(&mut payload, "name", &args, "name");
        put_str(&mut payload, "projectKey", &args, "projectKey");
        put_str(&mut payload, "objective", &args, "description");
        put_str(&mut payload, "plannedStartDate", &args, "startDate");
        put_str(&mut payload, "plannedEndDate", &args, "endDate");

        let plan = ctx.zephyr.create_test_plan(Value::Object(payload)).await?;
        Ok(json!({
            "id": field(&plan, "id"),
            "key": field(&plan, "key"),
            "name": field(&plan, "name"),
            "description": field(&plan, "description"),
            "projectId": field(&plan, "projectId"),
            "status": field(&plan, "status"),
            "createdOn": field(&plan, "createdOn"),
            "createdBy": nested(&plan, "createdBy", "displayName"),
        }))
    }
}

pub(crate) struct ListTestPlans {
    contract: ToolContract,
}

impl ListTestPlans {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "list_test_plans",
                description: "List test plans in a project",
                schema: Schema::new(vec![
                    FieldSpec::string("projectKey").required(),
                    FieldSpec::integer("limit").min(1.0).default_value(json!(50)),
                    FieldSpec::integer("offset").min(0.0).default_value(json!(0)),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for ListTestPlans {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let project_key = required_str(&args, "projectKey")?;
        let limit = args.u64("limit").unwrap_or(50);
        let offset = args.u64("offset").unwrap_or(0);

        let raw = ctx.zephyr.search_test_plans(project_key, limit, offset).await?;
        let page = normalize_page(&raw);
        let plans: Vec<Value> = page.items.iter().map(plan_view).collect();

        Ok(json!({
            "total": page.total,
            "isLast": page.page.is_last,
            "testPlans": plans,
        }))
    }
}

pub(crate) struct GetTestPlansByIssue {
    contract: ToolContract,
}

impl GetTestPlansByIssue {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "get_test_plans_by_issue",
                description: "List the test plans linked to an issue",
                schema: Schema::new(vec![FieldSpec::string("issueKey").required()]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for GetTestPlansByIssue {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let issue_key = required_str(&args, "issueKey")?;
        // The link endpoint answers with a bare array; the normalizer gives
        // it the standard envelope.
        let raw = ctx.zephyr.test_plans_for_issue(issue_key).await?;
        Ok(normalize_page(&raw).into_value())
    }
}

fn plan_view(plan: &Value) -> Value {
    json!({
        "id": field(plan, "id"),
        "key": field(plan, "key"),
        "name": field(plan, "name"),
        "description": field(plan, "description"),
        "status": field(plan, "status"),
        "createdOn": field(plan, "createdOn"),
        "updatedOn": field(plan, "updatedOn"),
        "createdBy": nested(plan, "createdBy", "displayName"),
    })
}
