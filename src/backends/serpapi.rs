//! SerpAPI backend
//!
//! Implements the ImageSearchBackend trait using SerpAPI's `google_images`
//! engine. Unlike the Custom Search API this endpoint reports product flags and
//! its own 1-based positions.
//! See: https://serpapi.com/images-results

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{BackendError, ImageSearchBackend};
use crate::config::SerpApiConfig;
use crate::types::ImageResult;

const ENDPOINT: &str = "https://serpapi.com/search.json";

/// SerpAPI backend
pub struct SerpApiBackend {
    client: Client,
    config: SerpApiConfig,
}

impl SerpApiBackend {
    pub fn new(client: Client, config: SerpApiConfig) -> Self {
        Self { client, config }
    }
}

// SerpAPI response types
#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    images_results: Option<Vec<SerpApiImage>>,
}

#[derive(Debug, Deserialize)]
struct SerpApiImage {
    position: Option<u32>,
    thumbnail: Option<String>,
    source: Option<String>,
    title: Option<String>,
    /// URL of the page embedding the image
    link: Option<String>,
    /// URL of the full-size image
    original: Option<String>,
    original_width: Option<u32>,
    original_height: Option<u32>,
    is_product: Option<bool>,
    size: Option<String>,
}

impl SerpApiImage {
    fn into_result(self, fallback_position: u32) -> ImageResult {
        ImageResult {
            position: self.position.unwrap_or(fallback_position),
            thumbnail_url: self.thumbnail.unwrap_or_default(),
            source_name: self.source.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            page_link: self.link.unwrap_or_default(),
            original_image_url: self.original.unwrap_or_default(),
            is_product: self.is_product.unwrap_or(false),
            size_label: self.size,
            width: self.original_width.filter(|&w| w > 0),
            height: self.original_height.filter(|&h| h > 0),
        }
    }
}

#[async_trait]
impl ImageSearchBackend for SerpApiBackend {
    fn name(&self) -> &str {
        "serpapi"
    }

    fn is_available(&self) -> bool {
        self.config.is_complete()
    }

    async fn search_images(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageResult>, BackendError> {
        let num = limit.to_string();

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("engine", "google_images"),
                ("q", query),
                ("api_key", self.config.api_key.as_str()),
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

        let parsed: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        let images = parsed.images_results.ok_or_else(|| {
            BackendError::Malformed("response has no images_results field".into())
        })?;

        Ok(images
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, image)| image.into_result(i as u32 + 1))
            .collect())
    }
}
