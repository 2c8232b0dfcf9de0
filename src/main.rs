//! Image Search MCP Server
//!
//! Image search via Google Custom Search and SerpAPI with automatic failover.
//!
//! # Configuration
//! Set `GOOGLE_API_KEY` + `GOOGLE_CSE_ID` and/or `SERPAPI_API_KEY`, or
//! configure in `~/.config/image-search/config.toml`.

use rmcp::{transport::stdio, ServiceExt};

use image_search_mcp::config::Config;
use image_search_mcp::init::init_tracing;
use image_search_mcp::server::ImageSearchMcpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("image_search_mcp")?;

    tracing::info!("Starting Image Search MCP Server");

    let config = Config::load()?;
    let server = ImageSearchMcpServer::new(config)?;

    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
