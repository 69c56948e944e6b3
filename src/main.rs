use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;

use jira_zephyr_mcp::clients::{JiraClient, ZephyrClient};
use jira_zephyr_mcp::config::AppConfig;
use jira_zephyr_mcp::mcp::McpServer;
use jira_zephyr_mcp::tools::{build_registry, ToolContext};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // stdout carries protocol frames; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let jira = match JiraClient::new(
        &config.jira_base_url,
        &config.jira_username,
        &config.jira_api_token,
    ) {
        Ok(client) => client,
        Err(err) => {
            error!("failed to build jira client: {err}");
            std::process::exit(1);
        }
    };
    let zephyr = match ZephyrClient::new(&config.jira_base_url, &config.zephyr_api_token) {
        Ok(client) => client,
        Err(err) => {
            error!("failed to build zephyr client: {err}");
            std::process::exit(1);
        }
    };

    let ctx = ToolContext {
        jira: Arc::new(jira),
        zephyr: Arc::new(zephyr),
    };
    let server = McpServer::new(build_registry(), ctx);

    if let Err(err) = server.run().await {
        error!("server terminated: {err}");
        std::process::exit(1);
    }
}
