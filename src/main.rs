use std::sync::Arc;

use anyhow::Context;
use gcal_tasks_mcp_server::{
    config::{Config, Credentials},
    google::GoogleClient,
    mcp, tools,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::load_default()?;
    let credentials = Credentials::from_env()?;
    tracing::debug!("Using credentials {credentials:?}");

    let client = GoogleClient::new(&credentials).context("Failed to create Google client")?;
    let registry = tools::build_registry(&config)?;
    tracing::info!("Registered {} tools", registry.len());

    mcp::Server::new(config, Arc::new(client), registry)
        .run()
        .await
}
