//! TTL cache for recent search responses
//!
//! A small time-based map so repeated tool calls with the same query within the
//! TTL do not burn provider quota. Stale entries are evicted on access and
//! swept on insert; nothing survives process restart.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::SearchResponse;

struct CacheEntry {
    response: SearchResponse,
    stored_at: Instant,
}

/// Mutex-guarded query result cache
pub struct SearchCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    enabled: bool,
}

impl SearchCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            enabled,
        }
    }

    fn key(query: &str, limit: usize) -> String {
        format!("{}|{}", query, limit)
    }

    /// Look up a fresh cached response; expired entries are removed
    pub fn get(&self, query: &str, limit: usize) -> Option<SearchResponse> {
        if !self.enabled {
            return None;
        }
        let key = Self::key(query, limit);
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a response, sweeping out anything already past the TTL
    pub fn insert(&self, query: &str, limit: usize, response: SearchResponse) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            Self::key(query, limit),
            CacheEntry {
                response,
                stored_at: Instant::now(),
            },
        );
    }
}
