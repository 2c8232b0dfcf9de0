//! Search gateway with provider failover
//!
//! Owns the active-provider state and dispatches searches to the backends in
//! priority order. A provider that reports rate-limiting is marked disabled for
//! the rest of the process and the gateway retries once against the alternate;
//! all other failures propagate immediately. At most two backend attempts
//! happen per call.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use crate::backends::{BackendError, ImageSearchBackend};
use crate::config::ConfigError;
use crate::types::SearchResponse;

/// Search failures surfaced to the caller
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("limit must be greater than zero")]
    InvalidLimit,

    #[error("search failed on {provider}: {source}")]
    Provider {
        provider: String,
        #[source]
        source: BackendError,
    },
}

/// Mutable failover state, guarded because tool invocations may run
/// concurrently
#[derive(Debug)]
struct ProviderState {
    /// Index of the provider serving new searches
    active: usize,
    /// Sticky per-provider quota-exhaustion flags; never reset within a
    /// process run
    disabled: Vec<bool>,
}

/// Status snapshot for the `get_config` tool
#[derive(Debug, Serialize)]
pub struct GatewayStatus {
    pub active_provider: String,
    pub providers: Vec<ProviderStatus>,
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
    pub disabled: bool,
}

/// Dispatches searches across the configured providers
pub struct SearchGateway {
    /// Priority-ordered adapters; two today, but nothing below assumes that
    providers: Vec<Arc<dyn ImageSearchBackend>>,
    state: Mutex<ProviderState>,
}

impl SearchGateway {
    /// Build a gateway over `providers`, activating the first one with a
    /// complete credential set
    pub fn new(providers: Vec<Arc<dyn ImageSearchBackend>>) -> Result<Self, ConfigError> {
        let active = providers
            .iter()
            .position(|p| p.is_available())
            .ok_or(ConfigError::NoProviderCredentials)?;

        let disabled = vec![false; providers.len()];
        Ok(Self {
            providers,
            state: Mutex::new(ProviderState { active, disabled }),
        })
    }

    /// Search for images, failing over once on rate-limiting
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse, SearchError> {
        if limit == 0 {
            return Err(SearchError::InvalidLimit);
        }

        let active = {
            let state = self.state.lock().unwrap();
            state.active
        };
        let provider = Arc::clone(&self.providers[active]);

        let first_error = match provider.search_images(query, limit).await {
            Ok(results) => return Ok(self.response(query, provider.name(), results, limit)),
            Err(err) => err,
        };

        if !first_error.is_rate_limited() {
            return Err(SearchError::Provider {
                provider: provider.name().to_string(),
                source: first_error,
            });
        }

        tracing::warn!(
            "Provider '{}' is rate-limited, looking for an alternate: {}",
            provider.name(),
            first_error
        );

        let Some(alternate) = self.fail_over(active) else {
            return Err(SearchError::Provider {
                provider: provider.name().to_string(),
                source: first_error,
            });
        };

        let fallback = Arc::clone(&self.providers[alternate]);
        tracing::info!("Switched active provider to '{}'", fallback.name());

        match fallback.search_images(query, limit).await {
            Ok(results) => Ok(self.response(query, fallback.name(), results, limit)),
            Err(err) => Err(SearchError::Provider {
                provider: fallback.name().to_string(),
                source: err,
            }),
        }
    }

    /// Mark `current` exhausted and switch to the next eligible provider
    ///
    /// Performed under the state lock so two concurrent rate-limit detections
    /// cannot flip the active provider inconsistently. Returns the new active
    /// index, or None when no alternate exists.
    fn fail_over(&self, current: usize) -> Option<usize> {
        let mut state = self.state.lock().unwrap();
        state.disabled[current] = true;

        let alternate = self.providers.iter().enumerate().position(|(i, p)| {
            i != current && !state.disabled[i] && p.is_available()
        })?;

        state.active = alternate;
        Some(alternate)
    }

    fn response(
        &self,
        query: &str,
        provider: &str,
        mut results: Vec<crate::types::ImageResult>,
        limit: usize,
    ) -> SearchResponse {
        results.truncate(limit);
        SearchResponse {
            query: query.to_string(),
            results,
            provider: provider.to_string(),
        }
    }

    /// Snapshot of the failover state
    pub fn status(&self) -> GatewayStatus {
        let state = self.state.lock().unwrap();
        GatewayStatus {
            active_provider: self.providers[state.active].name().to_string(),
            providers: self
                .providers
                .iter()
                .enumerate()
                .map(|(i, p)| ProviderStatus {
                    name: p.name().to_string(),
                    available: p.is_available(),
                    disabled: state.disabled[i],
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageResult;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that replays a scripted sequence of responses
    struct ScriptedBackend {
        name: &'static str,
        available: bool,
        responses: Mutex<VecDeque<Result<Vec<ImageResult>, BackendError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(
            name: &'static str,
            available: bool,
            responses: Vec<Result<Vec<ImageResult>, BackendError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                available,
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// Coerce scripted backends into trait objects for the constructor
    fn providers(backends: &[&Arc<ScriptedBackend>]) -> Vec<Arc<dyn ImageSearchBackend>> {
        backends
            .iter()
            .map(|b| Arc::clone(*b) as Arc<dyn ImageSearchBackend>)
            .collect()
    }

    #[async_trait]
    impl ImageSearchBackend for ScriptedBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn search_images(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<ImageResult>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::Malformed("script exhausted".into())))
        }
    }

    fn results(n: usize) -> Vec<ImageResult> {
        (0..n)
            .map(|i| ImageResult {
                position: i as u32 + 1,
                thumbnail_url: format!("https://cdn.example.com/{}.jpg", i),
                source_name: "example.com".into(),
                title: format!("result {}", i),
                page_link: "https://example.com".into(),
                original_image_url: format!("https://example.com/{}.jpg", i),
                is_product: false,
                size_label: None,
                width: None,
                height: None,
            })
            .collect()
    }

    fn rate_limited() -> BackendError {
        BackendError::Status {
            status: 429,
            body: "rate limit exceeded".into(),
        }
    }

    #[test]
    fn construction_requires_an_available_provider() {
        let a = ScriptedBackend::new("a", false, vec![]);
        let b = ScriptedBackend::new("b", false, vec![]);
        assert!(SearchGateway::new(providers(&[&a, &b])).is_err());
    }

    #[test]
    fn construction_activates_the_first_available_provider() {
        let a = ScriptedBackend::new("a", false, vec![]);
        let b = ScriptedBackend::new("b", true, vec![]);
        let gateway = SearchGateway::new(providers(&[&a, &b])).unwrap();
        assert_eq!(gateway.status().active_provider, "b");
    }

    #[tokio::test]
    async fn results_are_truncated_to_limit_in_order() {
        let a = ScriptedBackend::new("a", true, vec![Ok(results(12))]);
        let gateway = SearchGateway::new(providers(&[&a])).unwrap();

        let response = gateway.search("purple gradient ui badges", 5).await.unwrap();
        assert_eq!(response.results.len(), 5);
        let positions: Vec<u32> = response.results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let a = ScriptedBackend::new("a", true, vec![Ok(results(1))]);
        let gateway = SearchGateway::new(providers(&[&a])).unwrap();
        assert!(matches!(
            gateway.search("q", 0).await,
            Err(SearchError::InvalidLimit)
        ));
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test]
    async fn rate_limit_fails_over_once_and_sticks() {
        let a = ScriptedBackend::new("a", true, vec![Err(rate_limited())]);
        let b = ScriptedBackend::new("b", true, vec![Ok(results(3)), Ok(results(3))]);
        let gateway = SearchGateway::new(providers(&[&a, &b])).unwrap();

        let response = gateway.search("q", 10).await.unwrap();
        assert_eq!(response.provider, "b");
        assert_eq!(a.calls(), 1);

        // Second call goes straight to b; a stays disabled for the process
        let response = gateway.search("q", 10).await.unwrap();
        assert_eq!(response.provider, "b");
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 2);

        let status = gateway.status();
        assert_eq!(status.active_provider, "b");
        assert!(status.providers[0].disabled);
        assert!(!status.providers[1].disabled);
    }

    #[tokio::test]
    async fn non_rate_limit_errors_propagate_without_failover() {
        let a = ScriptedBackend::new(
            "a",
            true,
            vec![Err(BackendError::Status {
                status: 500,
                body: "internal server error".into(),
            })],
        );
        let b = ScriptedBackend::new("b", true, vec![Ok(results(3))]);
        let gateway = SearchGateway::new(providers(&[&a, &b])).unwrap();

        let err = gateway.search("q", 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Provider { ref provider, .. } if provider == "a"));
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn failed_retry_surfaces_the_most_recent_error() {
        let a = ScriptedBackend::new("a", true, vec![Err(rate_limited())]);
        let b = ScriptedBackend::new(
            "b",
            true,
            vec![Err(BackendError::Status {
                status: 429,
                body: "quota".into(),
            })],
        );
        let gateway = SearchGateway::new(providers(&[&a, &b])).unwrap();

        let err = gateway.search("q", 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Provider { ref provider, .. } if provider == "b"));
        // One-shot: exactly two attempts, no looping back to a
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn rate_limit_without_an_alternate_propagates() {
        let a = ScriptedBackend::new("a", true, vec![Err(rate_limited())]);
        let b = ScriptedBackend::new("b", false, vec![]);
        let gateway = SearchGateway::new(providers(&[&a, &b])).unwrap();

        let err = gateway.search("q", 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Provider { ref provider, .. } if provider == "a"));
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn a_403_counts_as_quota_exhaustion() {
        let a = ScriptedBackend::new(
            "a",
            true,
            vec![Err(BackendError::Status {
                status: 403,
                body: "daily quota exceeded".into(),
            })],
        );
        let b = ScriptedBackend::new("b", true, vec![Ok(results(1))]);
        let gateway = SearchGateway::new(providers(&[&a, &b])).unwrap();

        let response = gateway.search("q", 10).await.unwrap();
        assert_eq!(response.provider, "b");
    }
}
