//! Result cache for basic-auth outcomes
//!
//! Memoizes the identity resolved by a successful basic-auth check so that
//! repeated requests carrying the same credentials within the TTL skip both
//! the credential store lookup and the password hash comparison.
//!
//! Backed by a moka cache: entries expire a fixed time after insertion and
//! are never refreshed or resurrected on expiry. Capacity is bounded.

use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use usergate_core::{AuthConfig, Identity};

/// Derive the cache key for a raw credential (e.g. a basic-auth header value)
///
/// Keys are SHA-256 digests so plaintext passwords are never held as keys.
pub fn credential_key(credential: &str) -> String {
    format!("{:x}", Sha256::digest(credential.as_bytes()))
}

/// Concurrent, time-bounded identity cache
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<String, Identity>,
    ttl: Duration,
    stats: Arc<CacheStats>,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            ttl,
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.cache_ttl(), config.cache_max_capacity)
    }

    /// Look up a cached identity; expired entries are reported as misses
    pub async fn get(&self, key: &str) -> Option<Identity> {
        let result = self.cache.get(key).await;

        if result.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        }

        result
    }

    /// Store an identity; the TTL starts now
    pub async fn put(&self, key: &str, identity: Identity) {
        self.cache.insert(key.to_string(), identity).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }
}

/// Hit/miss counters
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
