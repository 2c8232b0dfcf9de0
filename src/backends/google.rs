//! Google Custom Search backend
//!
//! Implements the ImageSearchBackend trait using the Custom Search JSON API
//! with `searchType=image`.
//! See: https://developers.google.com/custom-search/v1/reference/rest/v1/cse/list

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{BackendError, ImageSearchBackend};
use crate::config::GoogleConfig;
use crate::types::ImageResult;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API rejects `num` values above 10
const MAX_PER_REQUEST: usize = 10;

/// Google Custom Search backend
pub struct GoogleBackend {
    client: Client,
    config: GoogleConfig,
}

impl GoogleBackend {
    pub fn new(client: Client, config: GoogleConfig) -> Self {
        Self { client, config }
    }
}

// Custom Search API response types
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: Option<String>,
    /// For image search this is the image URL itself
    link: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
    image: Option<GoogleImageInfo>,
}

#[derive(Debug, Deserialize)]
struct GoogleImageInfo {
    #[serde(rename = "contextLink")]
    context_link: Option<String>,
    #[serde(rename = "thumbnailLink")]
    thumbnail_link: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl GoogleItem {
    fn into_result(self, position: u32) -> ImageResult {
        let image = self.image.unwrap_or(GoogleImageInfo {
            context_link: None,
            thumbnail_link: None,
            width: None,
            height: None,
        });
        ImageResult {
            position,
            thumbnail_url: image.thumbnail_link.unwrap_or_default(),
            source_name: self.display_link.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            page_link: image.context_link.unwrap_or_default(),
            original_image_url: self.link.unwrap_or_default(),
            // The Custom Search API cannot flag shopping results
            is_product: false,
            size_label: None,
            // Zero-sized dimensions are backend noise, not data
            width: image.width.filter(|&w| w > 0),
            height: image.height.filter(|&h| h > 0),
        }
    }
}

#[async_trait]
impl ImageSearchBackend for GoogleBackend {
    fn name(&self) -> &str {
        "google"
    }

    fn is_available(&self) -> bool {
        self.config.is_complete()
    }

    async fn search_images(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageResult>, BackendError> {
        let num = limit.min(MAX_PER_REQUEST).to_string();

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.cse_id.as_str()),
                ("q", query),
                ("searchType", "image"),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GoogleResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        let items = parsed
            .items
            .ok_or_else(|| BackendError::Malformed("response has no items field".into()))?;

        Ok(items
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, item)| item.into_result(i as u32 + 1))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_mapping_covers_all_fields() {
        let json = serde_json::json!({
            "title": "Purple gradient",
            "link": "https://example.com/full.png",
            "displayLink": "example.com",
            "image": {
                "contextLink": "https://example.com/page",
                "thumbnailLink": "https://cdn.example.com/thumb.png",
                "width": 1920,
                "height": 1080
            }
        });
        let item: GoogleItem = serde_json::from_value(json).unwrap();
        let result = item.into_result(3);
        assert_eq!(result.position, 3);
        assert_eq!(result.title, "Purple gradient");
        assert_eq!(result.original_image_url, "https://example.com/full.png");
        assert_eq!(result.source_name, "example.com");
        assert_eq!(result.page_link, "https://example.com/page");
        assert_eq!(result.thumbnail_url, "https://cdn.example.com/thumb.png");
        assert_eq!(result.width, Some(1920));
        assert_eq!(result.height, Some(1080));
        assert!(!result.is_product);
        assert!(result.size_label.is_none());
    }

    #[test]
    fn sparse_items_map_to_empty_fields() {
        let item: GoogleItem = serde_json::from_value(serde_json::json!({})).unwrap();
        let result = item.into_result(1);
        assert_eq!(result.position, 1);
        assert_eq!(result.title, "");
        assert!(result.width.is_none());
    }

    #[test]
    fn missing_items_field_is_a_protocol_violation() {
        let parsed: GoogleResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_none());
    }

    #[test]
    fn availability_tracks_the_credential_pair() {
        let client = Client::new();
        let backend = GoogleBackend::new(client.clone(), GoogleConfig::default());
        assert!(!backend.is_available());
        let backend = GoogleBackend::new(
            client,
            GoogleConfig {
                api_key: "key".into(),
                cse_id: "cx".into(),
            },
        );
        assert!(backend.is_available());
    }
}
