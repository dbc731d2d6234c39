//! render-cache server entry point.
//!
//! Boots the render cache service on the MCP stdio transport so a separate
//! rendering process can populate the cache. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use render_cache_core::{AppConfig, CacheDb, RenderCache};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = CacheDb::open(&config.db_path).await?;
    let cache = RenderCache::new(db.open_store(config.cache_name.clone()));

    tracing::info!(
        cache = %config.cache_name,
        db_path = %config.db_path.display(),
        "Starting render-cache server on stdio transport"
    );

    let handler = handler::RenderCacheServer::new(cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
