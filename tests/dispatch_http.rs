//! End-to-end dispatch through real HTTP clients against a mock server.

use std::sync::Arc;

use httpmock::Method::{GET, PUT};
use httpmock::MockServer;
use pretty_assertions::assert_eq;
use serde_json::json;

use jira_zephyr_mcp::clients::{JiraClient, ZephyrClient};
use jira_zephyr_mcp::tools::{build_registry, ToolContext, ToolRegistry};

fn fixture(server: &MockServer) -> (ToolRegistry, ToolContext) {
    let ctx = ToolContext {
        jira: Arc::new(
            JiraClient::new(&server.base_url(), "dev@example.com", "jira-token").unwrap(),
        ),
        zephyr: Arc::new(ZephyrClient::new(&server.base_url(), "zephyr-token").unwrap()),
    };
    (build_registry(), ctx)
}

#[tokio::test]
async fn execute_test_writes_the_exact_payload() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/atm/1.0/testresult/EX-1")
            // Exact body: no comment, no issues when the caller omits them.
            .json_body(json!({"status": "PASS"}));
        then.status(200)
            .json_body(json!({"id": "EX-1", "status": "PASS"}));
    });

    let (registry, ctx) = fixture(&server);
    let result = registry
        .dispatch(
            &ctx,
            "execute_test",
            json!({"executionId": "EX-1", "status": "PASS"}),
        )
        .await;

    mock.assert();
    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.data.unwrap()["status"], "PASS");
}

#[tokio::test]
async fn get_folders_defaults_reach_the_wire() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/atm/1.0/folder")
            .query_param("projectKey", "ABC")
            .query_param("maxResults", "10")
            .query_param("startAt", "0");
        then.status(200).json_body(json!({
            "values": [{"id": 1, "name": "Root", "folderType": "TEST_CASE"}],
            "total": 1,
        }));
    });

    let (registry, ctx) = fixture(&server);
    let result = registry
        .dispatch(&ctx, "get_folders", json!({"projectKey": "ABC"}))
        .await;

    mock.assert();
    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data["total"], 1);
    assert_eq!(data["items"][0]["name"], "Root");
    assert_eq!(data["projectKey"], "ABC");
}

#[tokio::test]
async fn read_jira_issue_round_trips_with_basic_auth() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/api/3/issue/ABC-1")
            .header_exists("authorization");
        then.status(200).json_body(json!({
            "key": "ABC-1",
            "fields": {
                "summary": "Login fails",
                "status": {"name": "Open", "statusCategory": {"name": "To Do"}},
                "reporter": {"displayName": "Riley", "emailAddress": "r@example.com"},
                "project": {"key": "ABC", "name": "Alpha"},
                "labels": ["auth"],
                "components": [],
                "fixVersions": [],
            },
        }));
    });

    let (registry, ctx) = fixture(&server);
    let result = registry
        .dispatch(&ctx, "read_jira_issue", json!({"issueKey": "ABC-1"}))
        .await;

    mock.assert();
    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data["summary"], "Login fails");
    assert_eq!(data["status"]["category"], "To Do");
}

#[tokio::test]
async fn upstream_failure_surfaces_in_the_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/atm/1.0/status/99");
        then.status(404)
            .json_body(json!({"message": "status 99 not found"}));
    });

    let (registry, ctx) = fixture(&server);
    let result = registry
        .dispatch(&ctx, "get_status", json!({"statusId": 99}))
        .await;

    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(result
        .error
        .unwrap()
        .contains("status 99 not found"));
}
