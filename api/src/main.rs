use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use todo_api::UreqTransport;
use todo_core::{StoreClient, StoreConfig, TodoRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StoreConfig::from_env().context("loading store configuration")?;
    let repo = TodoRepository::new(StoreClient::from_config(&config), Arc::new(UreqTransport::new()));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, store = %config.url, "todo api listening");
    todo_api::run(listener, repo).await?;
    Ok(())
}
