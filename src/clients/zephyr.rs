//! Zephyr (test management) REST API client.
//!
//! One method per endpoint under `/rest/atm/1.0`, bearer-token
//! authenticated. Payload construction and field renames live in the tool
//! layer; this client only moves JSON.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{decode_response, http_client, RemoteError};

const SERVICE: &str = "zephyr";

/// Read/write access to the test-management service.
///
/// Every call is independent and synchronous from the caller's view; there
/// is no transaction spanning calls, and a failure is always an `Err`
/// rather than a fault.
#[async_trait]
pub trait ZephyrApi: Send + Sync {
    async fn create_test_plan(&self, payload: Value) -> Result<Value, RemoteError>;
    async fn search_test_plans(
        &self,
        project_key: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Value, RemoteError>;
    async fn test_plans_for_issue(&self, issue_key: &str) -> Result<Value, RemoteError>;

    async fn create_test_cycle(&self, payload: Value) -> Result<Value, RemoteError>;
    async fn search_test_cycles(
        &self,
        project_key: &str,
        version_id: Option<&str>,
        limit: u64,
    ) -> Result<Value, RemoteError>;
    async fn test_cycles_for_issue(&self, issue_key: &str) -> Result<Value, RemoteError>;
    async fn get_test_cycle(&self, cycle_id: &str) -> Result<Value, RemoteError>;

    async fn update_test_execution(
        &self,
        execution_id: &str,
        payload: Value,
    ) -> Result<Value, RemoteError>;
    async fn cycle_test_results(&self, cycle_id: &str) -> Result<Value, RemoteError>;
    async fn link_test_case_to_issue(
        &self,
        test_case_id: &str,
        issue_key: &str,
    ) -> Result<Value, RemoteError>;

    async fn create_test_case(&self, payload: Value) -> Result<Value, RemoteError>;
    async fn search_test_cases(
        &self,
        project_key: &str,
        folder_id: Option<u64>,
        limit: u64,
        offset: u64,
    ) -> Result<Value, RemoteError>;
    async fn get_test_case(&self, test_case_id: &str) -> Result<Value, RemoteError>;

    async fn create_test_script(
        &self,
        test_case_key: &str,
        payload: Value,
    ) -> Result<Value, RemoteError>;
    async fn get_test_script(&self, test_case_key: &str) -> Result<Value, RemoteError>;

    async fn get_folders(
        &self,
        project_key: &str,
        max_results: u64,
        start_at: u64,
        folder_type: Option<&str>,
    ) -> Result<Value, RemoteError>;
    async fn get_status(&self, status_id: u64) -> Result<Value, RemoteError>;
}

/// `reqwest`-backed [`ZephyrApi`].
pub struct ZephyrClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ZephyrClient {
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            http: http_client(SERVICE)?,
            base_url: format!("{}/rest/atm/1.0", base_url.trim_end_matches('/')),
            api_token: api_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn segment(raw: &str) -> String {
        urlencoding::encode(raw).into_owned()
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, RemoteError> {
        debug!(path, "zephyr GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .map_err(|e| RemoteError::transport(SERVICE, e))?;
        decode_response(SERVICE, response).await
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<Value, RemoteError> {
        debug!(path, "zephyr POST");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| RemoteError::transport(SERVICE, e))?;
        decode_response(SERVICE, response).await
    }

    async fn put(&self, path: &str, payload: &Value) -> Result<Value, RemoteError> {
        debug!(path, "zephyr PUT");
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(&self.api_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| RemoteError::transport(SERVICE, e))?;
        decode_response(SERVICE, response).await
    }
}

#[async_trait]
impl ZephyrApi for ZephyrClient {
    async fn create_test_plan(&self, payload: Value) -> Result<Value, RemoteError> {
        self.post("/testplan", &payload).await
    }

    async fn search_test_plans(
        &self,
        project_key: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Value, RemoteError> {
        self.get(
            "/testplan/search",
            &[
                ("projectKey", project_key.to_string()),
                ("maxResults", limit.to_string()),
                ("startAt", offset.to_string()),
            ],
        )
        .await
    }

    async fn test_plans_for_issue(&self, issue_key: &str) -> Result<Value, RemoteError> {
        let path = format!("/issuelinks/{}/testplans", Self::segment(issue_key));
        self.get(&path, &[]).await
    }

    async fn create_test_cycle(&self, payload: Value) -> Result<Value, RemoteError> {
        self.post("/testrun", &payload).await
    }

    async fn search_test_cycles(
        &self,
        project_key: &str,
        version_id: Option<&str>,
        limit: u64,
    ) -> Result<Value, RemoteError> {
        let mut query = vec![
            ("projectKey", project_key.to_string()),
            ("maxResults", limit.to_string()),
        ];
        if let Some(version_id) = version_id {
            query.push(("versionId", version_id.to_string()));
        }
        self.get("/testrun/search", &query).await
    }

    async fn test_cycles_for_issue(&self, issue_key: &str) -> Result<Value, RemoteError> {
        let path = format!("/issuelinks/{}/testruns", Self::segment(issue_key));
        self.get(&path, &[]).await
    }

    async fn get_test_cycle(&self, cycle_id: &str) -> Result<Value, RemoteError> {
        let path = format!("/testrun/{}", Self::segment(cycle_id));
        self.get(&path, &[]).await
    }

    async fn update_test_execution(
        &self,
        execution_id: &str,
        payload: Value,
    ) -> Result<Value, RemoteError> {
        let path = format!("/testresult/{}", Self::segment(execution_id));
        self.put(&path, &payload).await
    }

    async fn cycle_test_results(&self, cycle_id: &str) -> Result<Value, RemoteError> {
        let path = format!("/testrun/{}/testresults", Self::segment(cycle_id));
        self.get(&path, &[]).await
    }

    async fn link_test_case_to_issue(
        &self,
        test_case_id: &str,
        issue_key: &str,
    ) -> Result<Value, RemoteError> {
        let path = format!("/testcase/{}/links", Self::segment(test_case_id));
        self.post(&path, &serde_json::json!({"issueKeys": [issue_key]}))
            .await
    }

    async fn create_test_case(&self, payload: Value) -> Result<Value, RemoteError> {
        self.post("/testcase", &payload).await
    }

    async fn search_test_cases(
        &self,
        project_key: &str,
        folder_id: Option<u64>,
        limit: u64,
        offset: u64,
    ) -> Result<Value, RemoteError> {
        let mut query = vec![
            ("projectKey", project_key.to_string()),
            ("maxResults", limit.to_string()),
            ("startAt", offset.to_string()),
        ];
        if let Some(folder_id) = folder_id {
            query.push(("folderId", folder_id.to_string()));
        }
        self.get("/testcase/search", &query).await
    }

    async fn get_test_case(&self, test_case_id: &str) -> Result<Value, RemoteError> {
        let path = format!("/testcase/{}", Self::segment(test_case_id));
        self.get(&path, &[]).await
    }

    async fn create_test_script(
        &self,
        test_case_key: &str,
        payload: Value,
    ) -> Result<Value, RemoteError> {
        let path = format!("/testcase/{}/testscript", Self::segment(test_case_key));
        self.post(&path, &payload).await
    }

    async fn get_test_script(&self, test_case_key: &str) -> Result<Value, RemoteError> {
        let path = format!("/testcase/{}/testscript", Self::segment(test_case_key));
        self.get(&path, &[]).await
    }

    async fn get_folders(
        &self,
        project_key: &str,
        max_results: u64,
        start_at: u64,
        folder_type: Option<&str>,
    ) -> Result<Value, RemoteError> {
        let mut query = vec![
            ("projectKey", project_key.to_string()),
            ("maxResults", max_results.to_string()),
            ("startAt", start_at.to_string()),
        ];
        if let Some(folder_type) = folder_type {
            query.push(("folderType", folder_type.to_string()));
        }
        self.get("/folder", &query).await
    }

    async fn get_status(&self, status_id: u64) -> Result<Value, RemoteError> {
        let path = format!("/status/{status_id}");
        self.get(&path, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> ZephyrClient {
        ZephyrClient::new(&server.base_url(), "zephyr-token").unwrap()
    }

    #[tokio::test]
    async fn search_test_plans_sends_pagination_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/atm/1.0/testplan/search")
                .query_param("projectKey", "ABC")
                .query_param("maxResults", "50")
                .query_param("startAt", "10")
                .header("authorization", "Bearer zephyr-token");
            then.status(200).json_body(json!({"values": [], "total": 0}));
        });

        client(&server)
            .search_test_plans("ABC", 50, 10)
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn update_test_execution_puts_to_testresult() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/rest/atm/1.0/testresult/EX-9")
                .json_body(json!({"status": "PASS"}));
            then.status(200)
                .json_body(json!({"id": "EX-9", "status": "PASS"}));
        });

        let updated = client(&server)
            .update_test_execution("EX-9", json!({"status": "PASS"}))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(updated["status"], "PASS");
    }

    #[tokio::test]
    async fn link_endpoint_tolerates_empty_success_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/atm/1.0/testcase/TC-1/links")
                .json_body(json!({"issueKeys": ["ABC-123"]}));
            then.status(201);
        });

        let result = client(&server)
            .link_test_case_to_issue("TC-1", "ABC-123")
            .await
            .unwrap();
        mock.assert();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn folder_query_includes_filter_only_when_present() {
        let server = MockServer::start();
        let without_filter = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/atm/1.0/folder")
                .query_param("projectKey", "ABC")
                .query_param("maxResults", "10")
                .query_param("startAt", "0");
            then.status(200).json_body(json!({"values": []}));
        });

        client(&server)
            .get_folders("ABC", 10, 0, None)
            .await
            .unwrap();
        without_filter.assert();

        let with_filter = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/atm/1.0/folder")
                .query_param("projectKey", "XYZ")
                .query_param("folderType", "TEST_CASE");
            then.status(200).json_body(json!({"values": []}));
        });

        client(&server)
            .get_folders("XYZ", 10, 0, Some("TEST_CASE"))
            .await
            .unwrap();
        with_filter.assert();
    }

    #[tokio::test]
    async fn api_error_message_is_mined_from_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/atm/1.0/status/99");
            then.status(404)
                .json_body(json!({"message": "status 99 not found"}));
        });

        let err = client(&server).get_status(99).await.unwrap_err();
        match err {
            RemoteError::Api {
                status, message, ..
            } => {
                assert_eq!(status, Some(404));
                assert_eq!(message, "status 99 not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
