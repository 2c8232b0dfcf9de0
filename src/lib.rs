//! Image Search MCP Library
//!
//! Image search via Google Custom Search and SerpAPI with automatic failover,
//! plus a hardened download pipeline (URL safety checks, magic-byte format
//! detection, traversal-free output paths).
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use image_search_mcp::{Config, ImageSearchMcpServer};
//!
//! let config = Config::load()?;
//! let server = ImageSearchMcpServer::new(config)?;
//! // Use with in-memory transport or serve via stdio
//! ```
//!
//! # Configuration
//! Set `GOOGLE_API_KEY` + `GOOGLE_CSE_ID` and/or `SERPAPI_API_KEY`, or
//! configure in `~/.config/image-search/config.toml`. At least one complete
//! credential set is required.

pub mod backends;
pub mod cache;
pub mod config;
pub mod download;
pub mod gateway;
pub mod init;
pub mod ranking;
pub mod server;
pub mod types;

// Re-export main server type
pub use server::ImageSearchMcpServer;

// Re-export configuration and result types for direct API usage
pub use config::{Config, ConfigError};
pub use server::{AnalyzeImagesParams, DownloadImageParams, SearchImagesParams};
pub use types::{AnalyzedResult, ImageResult, RecommendationTier, SearchResponse};
