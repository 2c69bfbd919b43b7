//! Tiered cache store interface
//!
//! The gateway caches upstream *data* per tier (catalog listings, archive
//! bodies, extracted files) and never the assembled HTTP response. Storage
//! internals are behind the `TierCache` trait; the in-memory default is
//! enough for a single process. Writes are idempotent, so two requests
//! racing on a cold key may both populate it without harm.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::trace::Tier;

/// Per-tier get/set with TTL. Every read reports whether it was served
/// from cache, which feeds the cache-tier status engine.
#[async_trait]
pub trait TierCache: Send + Sync {
    async fn get(&self, tier: Tier, key: &str) -> Option<String>;
    async fn set(&self, tier: Tier, key: &str, value: String, ttl: Duration);
}

/// Process-wide in-memory tier cache with lazy TTL expiry
pub struct MemoryTierCache {
    entries: RwLock<HashMap<(Tier, String), (String, Instant)>>,
}

impl MemoryTierCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTierCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TierCache for MemoryTierCache {
    async fn get(&self, tier: Tier, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        match entries.get(&(tier, key.to_string())) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            _ => None,
        }
    }

    async fn set(&self, tier: Tier, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        // Drop expired entries while we hold the write lock anyway
        let now = Instant::now();
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert((tier, key.to_string()), (value, now + ttl));
    }
}
