//! Security-hardened image download pipeline
//!
//! Fetches bytes from a validated URL, identifies the real format from magic
//! bytes, and writes the result under a sanitized path. Downloads are bounded
//! in size, redirects, and time; a partial file never survives a failed write.

pub mod paths;
pub mod safety;
pub mod sniff;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{redirect, Client};
use thiserror::Error;

use crate::config::DownloadConfig;
use self::paths::PathError;
use self::sniff::DetectedFormat;

/// Download failures surfaced to the caller
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("refusing to fetch unsafe URL: {0}")]
    UnsafeUrl(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch failed: HTTP {status}")]
    Http { status: u16 },

    #[error("download too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: usize },

    #[error("could not detect an image format from the downloaded content")]
    UndetectedFormat,

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// A completed download
#[derive(Debug)]
pub struct Downloaded {
    pub path: PathBuf,
    pub format: DetectedFormat,
    pub bytes: usize,
}

/// Validated image downloader
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Download `url` into `output_dir`, naming the file after
    /// `base_filename` with the sniffed extension
    pub async fn download(
        &self,
        url: &str,
        output_dir: &str,
        base_filename: &str,
    ) -> Result<Downloaded, DownloadError> {
        if !safety::is_safe_url(url) {
            return Err(DownloadError::UnsafeUrl(url.to_string()));
        }

        self.preflight(url).await?;
        let bytes = self.fetch(url).await?;

        let format = sniff::detect(&bytes).ok_or(DownloadError::UndetectedFormat)?;
        tracing::debug!("Detected {} ({} bytes)", format.mime_type, bytes.len());

        // The caller's extension claim is irrelevant; the sniffed one wins
        let safe_name = paths::sanitize_filename(base_filename)?;
        let final_name = format!("{}.{}", paths::strip_extension(&safe_name), format.extension);

        let dir = paths::absolutize(output_dir)?;
        std::fs::create_dir_all(&dir).map_err(|source| DownloadError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;

        let path = paths::resolve_output(output_dir, &final_name)?;
        write_atomic(&path, &bytes).await?;

        tracing::info!("Downloaded {} -> {}", url, path.display());
        Ok(Downloaded {
            path,
            format,
            bytes: bytes.len(),
        })
    }

    /// Metadata preflight: cheap HEAD with a short timeout so an oversized
    /// body is rejected before the full fetch
    ///
    /// Servers that reject HEAD are tolerated; timeouts are not.
    async fn preflight(&self, url: &str) -> Result<(), DownloadError> {
        let head = self
            .client
            .head(url)
            .timeout(Duration::from_secs(self.config.metadata_timeout_seconds))
            .send()
            .await;

        match head {
            Ok(response) => {
                if let Some(len) = response.content_length() {
                    if len as usize > self.config.max_bytes {
                        return Err(DownloadError::TooLarge {
                            size: len,
                            max: self.config.max_bytes,
                        });
                    }
                }
                Ok(())
            }
            Err(e) if e.is_timeout() => Err(DownloadError::Fetch(e)),
            Err(_) => Ok(()),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                status: status.as_u16(),
            });
        }

        // Check Content-Length before downloading the body
        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_bytes {
                return Err(DownloadError::TooLarge {
                    size: len,
                    max: self.config.max_bytes,
                });
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.config.max_bytes {
            return Err(DownloadError::TooLarge {
                size: bytes.len() as u64,
                max: self.config.max_bytes,
            });
        }

        Ok(bytes.to_vec())
    }
}

/// Write the full buffer through a temporary sibling, then rename
///
/// A failure at any step removes the temporary file so no partial download is
/// left at or near the target path.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    let tmp = path.with_extension("part");

    if let Err(source) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(DownloadError::Write {
            path: tmp.display().to_string(),
            source,
        });
    }

    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(DownloadError::Write {
            path: path.display().to_string(),
            source,
        });
    }

    Ok(())
}
