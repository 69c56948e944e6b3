//! The tool surface: dispatcher, registry, and one handler per tool.
//!
//! Handlers own their contract, read validated arguments, call the remote
//! clients, and shape the response. Everything list-like goes through the
//! normalizer right after the remote call; everything batch-like goes
//! through the batch executor. The dispatcher wraps all of it into the
//! uniform result envelope.

mod folders;
mod jira_issues;
mod registry;
mod status;
mod test_cases;
mod test_cycles;
mod test_execution;
mod test_plans;
mod test_scripts;
pub mod types;


pub use registry::ToolRegistry;
pub use types::{ToolContext, ToolError, ToolHandler, ToolResult};

use serde_json::Value;

use crate::schema::Args;

/// Builds the complete tool surface in listing order.
pub fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(jira_issues::ReadJiraIssue::new()));
    registry.register(Box::new(test_plans::CreateTestPlan::new()));
    registry.register(Box::new(test_plans::ListTestPlans::new()));
    registry.register(Box::new(test_plans::GetTestPlansByIssue::new()));
    registry.register(Box::new(test_cycles::CreateTestCycle::new()));
    registry.register(Box::new(test_cycles::ListTestCycles::new()));
    registry.register(Box::new(test_cycles::GetTestCyclesByIssue::new()));
    registry.register(Box::new(test_execution::ExecuteTest::new()));
    registry.register(Box::new(test_execution::GetTestExecutionStatus::new()));
    registry.register(Box::new(test_execution::LinkTestsToIssues::new()));
    registry.register(Box::new(test_execution::GenerateTestReport::new()));
    registry.register(Box::new(test_cases::CreateTestCase::new()));
    registry.register(Box::new(test_cases::SearchTestCases::new()));
    registry.register(Box::new(test_cases::GetTestCase::new()));
    registry.register(Box::new(test_cases::CreateMultipleTestCases::new()));
    registry.register(Box::new(test_scripts::CreateTestScript::new()));
    registry.register(Box::new(test_scripts::GetTestScriptByTestCase::new()));
    registry.register(Box::new(folders::GetFolders::new()));
    registry.register(Box::new(status::GetStatus::new()));
    registry
}

/// Reads a field the contract marks required. Validation guarantees its
/// presence, so a miss here is a handler/contract mismatch.
pub(crate) fn required_str<'a>(args: &'a Args, name: &'static str) -> Result<&'a str, ToolError> {
    args.str(name)
        .ok_or_else(|| ToolError::InvalidInput(format!("missing field: {name}")))
}

pub(crate) fn required_u64(args: &Args, name: &'static str) -> Result<u64, ToolError> {
    args.u64(name)
        .ok_or_else(|| ToolError::InvalidInput(format!("missing field: {name}")))
}

/// Inserts a string argument into an upstream payload under `key`, skipping
/// absent optionals so they are omitted from the wire body entirely.
pub(crate) fn put_str(
    payload: &mut serde_json::Map<String, Value>,
    key: &str,
    args: &Args,
    name: &str,
) {
    if let Some(value) = args.str(name) {
        payload.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Projection helper: field of an object, `null` when absent.
pub(crate) fn field(value: &Value, name: &str) -> Value {
    value.get(name).cloned().unwrap_or(Value::Null)
}

/// Projection helper: one level deeper.
pub(crate) fn nested(value: &Value, outer: &str, inner: &str) -> Value {
    value
        .get(outer)
        .and_then(|v| v.get(inner))
        .cloned()
        .unwrap_or(Value::Null)
}
