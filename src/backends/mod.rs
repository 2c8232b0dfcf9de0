//! Search backend implementations
//!
//! This module provides a trait-based abstraction over the external image
//! search providers. Two adapters exist: Google Custom Search and SerpAPI.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ImageResult;

pub mod google;
pub mod serpapi;

/// Body phrases that mark a response as quota/rate-limit trouble
///
/// Matched on literal substrings; brittle against provider wording changes but
/// kept for compatibility with observed responses.
const RATE_LIMIT_PHRASES: &[&str] = &["rate limit", "quota", "limit exceeded"];

/// A single backend failure
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Whether this failure indicates the provider is rate-limited or out of
    /// quota
    ///
    /// HTTP 429 is the canonical signal; 403 is how one provider reports an
    /// exhausted daily quota. Body sniffing catches providers that bury the
    /// condition in an error message.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            BackendError::Status { status, body } => {
                if matches!(status, 429 | 403) {
                    return true;
                }
                let body = body.to_lowercase();
                RATE_LIMIT_PHRASES.iter().any(|p| body.contains(p))
            }
            _ => false,
        }
    }
}

/// Trait for image search backends
///
/// All backends normalize into the common [`ImageResult`] shape so the gateway
/// and the analysis tools are provider-agnostic.
#[async_trait]
pub trait ImageSearchBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Check if this backend has a complete credential set
    fn is_available(&self) -> bool;

    /// Perform an image search, returning at most `limit` normalized results
    async fn search_images(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageResult>, BackendError>;
}
