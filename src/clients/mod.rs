//! HTTP clients for the two upstream services.
//!
//! Each client is a mechanical adapter: one method per remote endpoint, no
//! retry, no caching. The [`JiraApi`] and [`ZephyrApi`] traits are the seam
//! the tool layer depends on; tests substitute in-memory fakes behind them.
//! Every failure surfaces as a [`RemoteError`] value. Nothing in this module
//! panics on a bad upstream response.

mod jira;
mod zephyr;

pub use jira::{JiraApi, JiraClient};
pub use zephyr::{ZephyrApi, ZephyrClient};

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Upstream request timeout. Timeouts are reported as transport errors and
/// handled like any other remote failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A failed remote call.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("{service}: {message}")]
    Api {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// The request never produced a usable response (connect failure,
    /// timeout, undecodable body).
    #[error("{service}: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
}

impl RemoteError {
    pub fn transport(service: &'static str, err: impl std::fmt::Display) -> Self {
        RemoteError::Transport {
            service,
            message: err.to_string(),
        }
    }
}

/// Builds the shared HTTP client.
fn http_client(service: &'static str) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| RemoteError::transport(service, e))
}

/// Turns a response into a JSON value, mining error bodies for the
/// upstream-provided message before falling back to a generic description.
/// A success with an empty body (201/204 on link and write endpoints)
/// decodes as `null`.
async fn decode_response(
    service: &'static str,
    response: reqwest::Response,
) -> Result<Value, RemoteError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::transport(service, e))?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&body)
            .map_err(|e| RemoteError::transport(service, format!("invalid JSON body: {e}")));
    }

    Err(RemoteError::Api {
        service,
        status: Some(status.as_u16()),
        message: upstream_message(&body)
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16())),
    })
}

/// Pulls a human-readable message out of an upstream error body. Jira uses
/// `errorMessages: [..]`, Zephyr uses `message`.
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    value
        .get("errorMessages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_prefers_message_field() {
        let body = r#"{"message": "folder not found"}"#;
        assert_eq!(upstream_message(body).as_deref(), Some("folder not found"));
    }

    #[test]
    fn upstream_message_reads_jira_error_messages() {
        let body = r#"{"errorMessages": ["Issue does not exist"], "errors": {}}"#;
        assert_eq!(
            upstream_message(body).as_deref(),
            Some("Issue does not exist")
        );
    }

    #[test]
    fn upstream_message_absent_for_opaque_bodies() {
        assert_eq!(upstream_message("<html>502</html>"), None);
        assert_eq!(upstream_message(r#"{"errorMessages": []}"#), None);
    }
}
