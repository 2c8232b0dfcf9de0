//! MCP Server implementation for image search
//!
//! This module defines the main MCP server that exposes image search,
//! download, and relevance-analysis tools backed by the provider gateway.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::backends::{google::GoogleBackend, serpapi::SerpApiBackend, ImageSearchBackend};
use crate::cache::SearchCache;
use crate::config::{Config, ConfigError};
use crate::download::{DownloadError, Downloader};
use crate::gateway::SearchGateway;
use crate::ranking;
use crate::types::{DownloadOutcome, ImageResult};

/// The main Image Search MCP Server
#[derive(Clone)]
pub struct ImageSearchMcpServer {
    gateway: Arc<SearchGateway>,
    downloader: Arc<Downloader>,
    cache: Arc<SearchCache>,
    config: Config,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchImagesParams {
    /// The search query
    #[schemars(description = "The image search query string")]
    pub query: String,
    /// Maximum number of results to return
    #[schemars(description = "Maximum number of results to return (default: 10)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DownloadImageParams {
    /// URL of the image to download
    #[schemars(description = "URL of the image to fetch (http/https only)")]
    pub image_url: String,
    /// Directory to save into
    #[schemars(description = "Directory to save the image into (created if absent)")]
    pub output_path: String,
    /// Base filename; the extension is replaced with the detected format
    #[schemars(description = "Base filename; extension is derived from the image content")]
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeImagesParams {
    /// Previously returned search results to rank
    #[schemars(description = "Search results to score and rank")]
    pub results: Vec<ImageResult>,
    /// Free-text relevance criteria
    #[schemars(description = "Free-text criteria; whitespace-separated keywords")]
    pub criteria: String,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl ImageSearchMcpServer {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(&config.download.user_agent)
            .build()
            .expect("Failed to create HTTP client");

        // Priority order: Google first, SerpAPI as the alternate
        let providers: Vec<Arc<dyn ImageSearchBackend>> = vec![
            Arc::new(GoogleBackend::new(client.clone(), config.google.clone())),
            Arc::new(SerpApiBackend::new(client, config.serpapi.clone())),
        ];
        let gateway = Arc::new(SearchGateway::new(providers)?);
        tracing::info!(
            "Active search provider: {}",
            gateway.status().active_provider
        );

        let cache = Arc::new(SearchCache::new(
            config.search.cache_enabled,
            Duration::from_secs(config.search.cache_ttl_seconds),
        ));
        let downloader = Arc::new(Downloader::new(config.download.clone()));

        Ok(Self {
            gateway,
            downloader,
            cache,
            config,
            tool_router: Self::tool_router(),
        })
    }

    // ========================================================================
    // Tools
    // ========================================================================

    #[tool(
        description = "Search for images. Returns image URLs, page links, sources, and dimensions."
    )]
    async fn search_images(
        &self,
        Parameters(params): Parameters<SearchImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(self.config.search.max_results);

        tracing::info!("Searching images for: {} (limit: {})", params.query, limit);

        if let Some(cached) = self.cache.get(&params.query, limit) {
            tracing::debug!("Cache hit for: {}", params.query);
            let json = serde_json::to_string_pretty(&cached)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            return Ok(CallToolResult::success(vec![Content::text(json)]));
        }

        let response = self
            .gateway
            .search(&params.query, limit)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        self.cache.insert(&params.query, limit, response.clone());

        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Download an image to a local directory. The file extension is derived \
                       from the image content, not the URL."
    )]
    async fn download_image(
        &self,
        Parameters(params): Parameters<DownloadImageParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Downloading {} into {}",
            params.image_url,
            params.output_path
        );

        let downloaded = self
            .downloader
            .download(&params.image_url, &params.output_path, &params.filename)
            .await
            .map_err(map_download_error)?;

        let outcome = DownloadOutcome {
            path: downloaded.path.display().to_string(),
            format: downloaded.format.extension.to_string(),
            mime_type: downloaded.format.mime_type.to_string(),
            bytes: downloaded.bytes,
        };

        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Score and rank previously returned image results against free-text \
                       criteria. Returns results sorted by relevance with recommendation tiers."
    )]
    async fn analyze_images(
        &self,
        Parameters(params): Parameters<AnalyzeImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Analyzing {} results against: {}",
            params.results.len(),
            params.criteria
        );

        let analyzed = ranking::analyze(params.results, &params.criteria);

        let json = serde_json::to_string_pretty(&analyzed)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get the current provider, failover state, and cache configuration.")]
    async fn get_config(&self) -> Result<CallToolResult, McpError> {
        #[derive(Serialize)]
        struct ConfigStatus {
            gateway: crate::gateway::GatewayStatus,
            max_results: usize,
            cache_enabled: bool,
            cache_ttl_seconds: u64,
        }

        let status = ConfigStatus {
            gateway: self.gateway.status(),
            max_results: self.config.search.max_results,
            cache_enabled: self.config.search.cache_enabled,
            cache_ttl_seconds: self.config.search.cache_ttl_seconds,
        };

        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

/// Validation rejections are caller errors; everything else is internal
fn map_download_error(e: DownloadError) -> McpError {
    match e {
        DownloadError::UnsafeUrl(_) | DownloadError::Path(_) => {
            McpError::invalid_params(e.to_string(), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for ImageSearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image Search MCP Server - searches for images via Google Custom Search \
                 with automatic failover to SerpAPI on quota exhaustion. Supports image \
                 search, safe downloads with format detection, and relevance ranking."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
