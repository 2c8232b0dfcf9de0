//! Common types for image search results
//!
//! These types are shared by both search backends so the gateway and the
//! analysis tools see a single result shape regardless of provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single image search result, normalized across backends
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageResult {
    /// 1-based rank as returned by the backend (not recomputed)
    pub position: u32,
    /// URL of a thumbnail rendition
    pub thumbnail_url: String,
    /// The source/domain the image was found on
    pub source_name: String,
    /// The title/alt text of the image
    pub title: String,
    /// The URL of the page containing the image
    pub page_link: String,
    /// The URL of the full-size image
    pub original_image_url: String,
    /// Whether the result is a product listing (false when the backend
    /// cannot report it)
    #[serde(default)]
    pub is_product: bool,
    /// Human-readable size label, when the backend supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    /// Image width in pixels (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Image height in pixels (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A collection of image search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The search query that was executed
    pub query: String,
    /// The results, in backend rank order
    pub results: Vec<ImageResult>,
    /// The provider that served this response
    pub provider: String,
}

/// Recommendation tier assigned by rank after scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RecommendationTier {
    #[serde(rename = "Highly-recommended")]
    HighlyRecommended,
    #[serde(rename = "Recommended")]
    Recommended,
    #[serde(rename = "Standard")]
    Standard,
}

/// An image result annotated with a relevance score and tier
///
/// Derived per analyze call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzedResult {
    #[serde(flatten)]
    pub result: ImageResult,
    /// Keyword/resolution relevance score (unbounded, practically small)
    pub relevance_score: u32,
    /// Tier derived from rank in the scored ordering
    pub recommendation_tier: RecommendationTier,
}

/// Outcome of a completed download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Final path the image was written to
    pub path: String,
    /// Detected format extension (e.g. "jpg")
    pub format: String,
    /// Detected MIME type
    pub mime_type: String,
    /// Number of bytes written
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serializes_with_hyphenated_names() {
        let json = serde_json::to_string(&RecommendationTier::HighlyRecommended).unwrap();
        assert_eq!(json, "\"Highly-recommended\"");
        let json = serde_json::to_string(&RecommendationTier::Standard).unwrap();
        assert_eq!(json, "\"Standard\"");
    }

    #[test]
    fn analyzed_result_flattens_the_inner_result() {
        let analyzed = AnalyzedResult {
            result: ImageResult {
                position: 1,
                thumbnail_url: "https://cdn.example.com/t.jpg".into(),
                source_name: "example.com".into(),
                title: "A test image".into(),
                page_link: "https://example.com/page".into(),
                original_image_url: "https://example.com/full.jpg".into(),
                is_product: false,
                size_label: None,
                width: Some(800),
                height: Some(600),
            },
            relevance_score: 5,
            recommendation_tier: RecommendationTier::Recommended,
        };
        let value = serde_json::to_value(&analyzed).unwrap();
        assert_eq!(value["position"], 1);
        assert_eq!(value["relevance_score"], 5);
        assert_eq!(value["recommendation_tier"], "Recommended");
        // Options absent rather than null
        assert!(value.get("size_label").is_none());
    }
}
