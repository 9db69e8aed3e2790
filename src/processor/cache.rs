// =============================================================================
// Candle Cache: TTL-bounded store of recently fetched candle series
// =============================================================================
//
// Keys are the symbol alone or `symbol@timeframe`.  Writes replace the whole
// entry; reads hand back a clone of the `Arc`, so a reader never observes a
// half-written series.  Expired entries are dropped lazily on read and
// eagerly on `sweep`.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market_data::{Candle, CandleKey};
use crate::types::Timeframe;

/// Default time-to-live of a cached series.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache key for a symbol, optionally qualified by timeframe.
pub fn cache_key(symbol: &str, timeframe: Option<Timeframe>) -> String {
    match timeframe {
        Some(tf) => CandleKey::new(symbol, tf).to_string(),
        None => symbol.to_string(),
    }
}

/// Entry count and live keys, for dashboards and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Storage backend for recently fetched candles.
pub trait CandleCache: Send + Sync {
    /// Cached series for `key`, or `None` when absent or expired.
    fn get(&self, key: &str) -> Option<Arc<Vec<Candle>>>;

    /// Replace the series stored under `key`.
    fn set(&self, key: &str, candles: Vec<Candle>);

    /// Drop every expired entry; returns how many were removed.
    fn sweep(&self) -> usize;

    fn stats(&self) -> CacheStats;
}

struct CacheEntry {
    candles: Arc<Vec<Candle>>,
    captured_at: Instant,
}

/// In-memory [`CandleCache`] with a fixed TTL.
pub struct TtlCandleCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for TtlCandleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlCandleCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.captured_at) > self.ttl
    }
}

impl CandleCache for TtlCandleCache {
    fn get(&self, key: &str) -> Option<Arc<Vec<Candle>>> {
        let now = Instant::now();
        {
            let map = self.entries.read();
            match map.get(key) {
                Some(entry) if !self.is_expired(entry, now) => return Some(Arc::clone(&entry.candles)),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: re-check under the write lock, a writer may have refreshed it.
        let mut map = self.entries.write();
        match map.get(key) {
            Some(entry) if !self.is_expired(entry, now) => Some(Arc::clone(&entry.candles)),
            Some(_) => {
                map.remove(key);
                debug!(key = %key, "expired cache entry dropped");
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, candles: Vec<Candle>) {
        let entry = CacheEntry {
            candles: Arc::new(candles),
            captured_at: Instant::now(),
        };
        self.entries.write().insert(key.to_string(), entry);
    }

    fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut map = self.entries.write();
        let before = map.len();
        map.retain(|_, entry| now.duration_since(entry.captured_at) <= self.ttl);
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, remaining = map.len(), "cache sweep");
        }
        removed
    }

    fn stats(&self) -> CacheStats {
        let map = self.entries.read();
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        CacheStats { size: map.len(), keys }
    }
}
