//! Configuration loading for image-search-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variables (GOOGLE_API_KEY, GOOGLE_CSE_ID, SERPAPI_API_KEY)
//! 2. Environment variable IMAGE_SEARCH_CONFIG_PATH
//! 3. ~/.config/image-search/config.toml
//! 4. Default values
//!
//! At least one backend must have a complete credential set or startup fails.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no search provider credentials configured: set GOOGLE_API_KEY + GOOGLE_CSE_ID \
         and/or SERPAPI_API_KEY"
    )]
    NoProviderCredentials,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Google Custom Search credentials
    #[serde(default)]
    pub google: GoogleConfig,
    /// SerpAPI credentials
    #[serde(default)]
    pub serpapi: SerpApiConfig,
    /// Download limits
    #[serde(default)]
    pub download: DownloadConfig,
}

/// General search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of results to return when the caller gives no limit
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Enable result caching
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

/// Google Custom Search configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key for the Custom Search JSON API
    #[serde(default)]
    pub api_key: String,
    /// Programmable Search Engine ID (cx)
    #[serde(default)]
    pub cse_id: String,
}

impl GoogleConfig {
    /// Both halves of the credential pair are required
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.cse_id.is_empty()
    }
}

/// SerpAPI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerpApiConfig {
    /// SerpAPI key
    #[serde(default)]
    pub api_key: String,
}

impl SerpApiConfig {
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Download limits and timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Full-download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub timeout_seconds: u64,
    /// Timeout for the metadata (HEAD) preflight in seconds
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_seconds: u64,
    /// Maximum body size in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Maximum number of redirects to follow
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// User-Agent header for outbound requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_max_results() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_download_timeout() -> u64 {
    30
}

fn default_metadata_timeout() -> u64 {
    15
}

fn default_max_bytes() -> usize {
    50 * 1024 * 1024 // 50MB
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    "image-search-mcp/0.1".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            cache_enabled: default_true(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_download_timeout(),
            metadata_timeout_seconds: default_metadata_timeout(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?
            }
            _ => {
                tracing::info!("Config file not found, using defaults");
                Self::default()
            }
        };

        // Credentials from environment (highest priority)
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            config.google.api_key = key;
        }
        if let Ok(cx) = std::env::var("GOOGLE_CSE_ID") {
            config.google.cse_id = cx;
        }
        if let Ok(key) = std::env::var("SERPAPI_API_KEY") {
            config.serpapi.api_key = key;
        }

        Ok(config)
    }

    /// At least one backend must be fully credentialed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.google.is_complete() && !self.serpapi.is_complete() {
            return Err(ConfigError::NoProviderCredentials);
        }
        Ok(())
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("IMAGE_SEARCH_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        // 2. Check ~/.config/image-search/config.toml
        dirs::home_dir().map(|home| home.join(".config").join("image-search").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_pair_requires_both_halves() {
        let mut google = GoogleConfig::default();
        assert!(!google.is_complete());
        google.api_key = "key".into();
        assert!(!google.is_complete());
        google.cse_id = "cx".into();
        assert!(google.is_complete());
    }

    #[test]
    fn validate_rejects_empty_credentials() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoProviderCredentials)
        ));
    }

    #[test]
    fn validate_accepts_a_single_complete_backend() {
        let mut config = Config::default();
        config.serpapi.api_key = "key".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.download.max_bytes, 50 * 1024 * 1024);
        assert_eq!(config.download.max_redirects, 5);
    }
}
