//! Issue tracker tools.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::schema::{Args, FieldKind, FieldSpec, Schema, ToolContract};
use crate::tools::types::{ToolContext, ToolError, ToolHandler};
use crate::tools::{field, nested, required_str};

pub(crate) struct ReadJiraIssue {
    contract: ToolContract,
}

impl ReadJiraIssue {
    pub(crate) fn new() -> Self {
        Self {
            contract: ToolContract {
                name: "read_jira_issue",
                description: "Read a Jira issue with its status, people, and custom fields",
                schema: Schema::new(vec![
                    FieldSpec::string("issueKey")
                        .required()
                        .describe("Issue key, e.g. ABC-123"),
                    FieldSpec::array("fields", FieldKind::String)
                        .describe("Restrict the response to these issue fields"),
                ]),
            },
        }
    }
}

#[async_trait]
impl ToolHandler for ReadJiraIssue {
    fn contract(&self) -> &ToolContract {
        &self.contract
    }

    async fn run(&self, ctx: &ToolContext, args: Args) -> Result<Value, ToolError> {
        let issue_key = required_str(&args, "issueKey")?;
        let fields: Option<Vec<String>> = args.array("fields").map(|list| {
            list.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        });

        let issue = ctx.jira.get_issue(issue_key, fields.as_deref()).await?;
        Ok(project_issue(&issue))
    }
}

/// Flattens the raw issue into the shape callers consume: top-level
/// summary/status/people fields plus every `customfield_*` entry collected
/// under `customFields`.
fn project_issue(issue: &Value) -> Value {
    let empty = Value::Object(Map::new());
    let fields = issue.get("fields").unwrap_or(&empty);

    let custom: Map<String, Value> = fields
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(key, _)| key.starts_with("customfield_"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    json!({
        "key": field(issue, "key"),
        "summary": field(fields, "summary"),
        "description": field(fields, "description"),
        "status": {
            "name": nested(fields, "status", "name"),
            "category": fields
                .get("status")
                .and_then(|s| s.get("statusCategory"))
                .and_then(|c| c.get("name"))
                .cloned()
                .unwrap_or(Value::Null),
        },
        "priority": nested(fields, "priority", "name"),
        "assignee": person(fields.get("assignee")),
        "reporter": person(fields.get("reporter")),
        "created": field(fields, "created"),
        "updated": field(fields, "updated"),
        "issueType": nested(fields, "issuetype", "name"),
        "project": {
            "key": nested(fields, "project", "key"),
            "name": nested(fields, "project", "name"),
        },
        "labels": field(fields, "labels"),
        "components": names(fields.get("components")),
        "fixVersions": names(fields.get("fixVersions")),
        "customFields": custom,
    })
}

fn person(value: Option<&Value>) -> Value {
    match value {
        Some(p) if p.is_object() => json!({
            "name": field(p, "displayName"),
            "email": field(p, "emailAddress"),
        }),
        _ => Value::Null,
    }
}

fn names(value: Option<&Value>) -> Value {
    let list = value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(|e| field(e, "name")).collect())
        .unwrap_or_default();
    Value::Array(list)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn projection_flattens_people_and_collects_custom_fields() {
        let raw = json!({
            "key": "ABC-1",
            "fields": {
                "summary": "Login fails",
                "description": "Steps attached",
                "status": {"name": "In Progress", "statusCategory": {"name": "In Progress"}},
                "priority": {"name": "High"},
                "assignee": {"displayName": "Dana", "emailAddress": "dana@example.com"},
                "reporter": {"displayName": "Riley", "emailAddress": "riley@example.com"},
                "created": "2024-01-01T00:00:00.000Z",
                "updated": "2024-01-02T00:00:00.000Z",
                "issuetype": {"name": "Bug"},
                "project": {"key": "ABC", "name": "Alpha"},
                "labels": ["auth"],
                "components": [{"name": "web"}],
                "fixVersions": [{"name": "1.2"}],
                "customfield_10001": "sprint 4",
            },
        });

        let projected = project_issue(&raw);
        assert_eq!(projected["key"], "ABC-1");
        assert_eq!(projected["status"]["category"], "In Progress");
        assert_eq!(projected["assignee"]["name"], "Dana");
        assert_eq!(projected["components"], json!(["web"]));
        assert_eq!(projected["customFields"]["customfield_10001"], "sprint 4");
    }

    #[test]
    fn projection_leaves_null_for_unassigned() {
        let raw = json!({"key": "ABC-2", "fields": {"summary": "No assignee"}});
        let projected = project_issue(&raw);
        assert_eq!(projected["assignee"], Value::Null);
        assert_eq!(projected["labels"], Value::Null);
        assert_eq!(projected["components"], json!([]));
    }
}
