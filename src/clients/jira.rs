//! Jira REST API v3 client.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{decode_response, http_client, RemoteError};

const SERVICE: &str = "jira";

/// Read access to the issue tracker.
#[async_trait]
pub trait JiraApi: Send + Sync {
    /// Fetches one issue, optionally restricted to specific fields.
    async fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&[String]>,
    ) -> Result<Value, RemoteError>;
}

/// `reqwest`-backed [`JiraApi`] using basic auth.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl JiraClient {
    pub fn new(base_url: &str, username: &str, api_token: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            http: http_client(SERVICE)?,
            base_url: format!("{}/rest/api/3", base_url.trim_end_matches('/')),
            username: username.to_string(),
            api_token: api_token.to_string(),
        })
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    async fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&[String]>,
    ) -> Result<Value, RemoteError> {
        let url = format!("{}/issue/{}", self.base_url, urlencoding::encode(issue_key));
        debug!(issue_key, "fetching jira issue");

        let mut request = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.api_token))
            .header("Accept", "application/json");
        if let Some(fields) = fields {
            request = request.query(&[("fields", fields.join(","))]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::transport(SERVICE, e))?;
        decode_response(SERVICE, response).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn get_issue_sends_auth_and_fields_param() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/api/3/issue/ABC-123")
                .query_param("fields", "summary,status")
                // "user:token" base64-encoded
                .header("authorization", "Basic dXNlcjp0b2tlbg==");
            then.status(200)
                .json_body(json!({"key": "ABC-123", "fields": {"summary": "hello"}}));
        });

        let client = JiraClient::new(&server.base_url(), "user", "token").unwrap();
        let fields = vec!["summary".to_string(), "status".to_string()];
        let issue = client.get_issue("ABC-123", Some(&fields)).await.unwrap();

        mock.assert();
        assert_eq!(issue["key"], "ABC-123");
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/3/issue/NOPE-1");
            then.status(404).json_body(
                json!({"errorMessages": ["Issue does not exist or you do not have permission to see it."]}),
            );
        });

        let client = JiraClient::new(&server.base_url(), "user", "token").unwrap();
        let err = client.get_issue("NOPE-1", None).await.unwrap_err();
        assert!(err.to_string().contains("Issue does not exist"), "got: {err}");
    }
}
