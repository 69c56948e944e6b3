//! Process configuration from environment variables.
//!
//! Loaded once at startup and passed by reference afterwards; nothing
//! re-reads the environment later. Validation reports every problem in one
//! pass so a misconfigured deployment is fixed in one round trip.

use thiserror::Error;

const JIRA_BASE_URL: &str = "JIRA_BASE_URL";
const JIRA_USERNAME: &str = "JIRA_USERNAME";
const JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
const ZEPHYR_API_TOKEN: &str = "ZEPHYR_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: String,
    pub jira_username: String,
    pub jira_api_token: String,
    pub zephyr_api_token: String,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through a lookup function. All problems are
    /// collected before reporting.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();
        let mut require = |name: &str| match get(name) {
            Some(value) if !value.trim().is_empty() => Some(value),
            _ => {
                problems.push(format!("{name}: required"));
                None
            }
        };

        let jira_base_url = require(JIRA_BASE_URL);
        let jira_username = require(JIRA_USERNAME);
        let jira_api_token = require(JIRA_API_TOKEN);
        let zephyr_api_token = require(ZEPHYR_API_TOKEN);

        if let Some(url) = &jira_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                problems.push(format!("{JIRA_BASE_URL}: must be an http(s) URL"));
            }
        }

        if !problems.is_empty() {
            return Err(ConfigError::Invalid(problems));
        }

        // All four are present when no problem was recorded.
        match (jira_base_url, jira_username, jira_api_token, zephyr_api_token) {
            (Some(jira_base_url), Some(jira_username), Some(jira_api_token), Some(zephyr_api_token)) => {
                Ok(Self {
                    jira_base_url,
                    jira_username,
                    jira_api_token,
                    zephyr_api_token,
                })
            }
            _ => Err(ConfigError::Invalid(vec!["incomplete configuration".into()])),
        }
    }
}
