// =============================================================================
// Symbol Processor
// =============================================================================
//
// Drives the indicator and scoring engines across a universe of symbols:
//
//   scan: two-pass cross-sectional scan (sequential and bounded-concurrent)
//   detail: sliding-window time series for a single symbol
//   changes: diffing, filtering and ranking of scan results
//   cache: injected TTL store of recently fetched candles
//
// The processor itself holds only the immutable scoring config and a handle
// to the cache; every scan result is a fresh value.
// =============================================================================

pub mod cache;
pub mod changes;
pub mod detail;
pub mod scan;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;
use crate::market_data::{Candle, SymbolInfo};
use crate::scoring::{BurstAnalysis, ScoringConfig, VolatilityMetrics};
use crate::types::Timeframe;

pub use cache::{cache_key, CacheStats, CandleCache, TtlCandleCache, DEFAULT_CACHE_TTL};
pub use changes::{
    detect_significant_changes, detect_state_transitions, filter_by_thresholds, top_performers,
    StateTransition, ThresholdFilter, TopPerformers, DEFAULT_TOP_LIMIT, SIGNIFICANT_DELTA,
};
pub use detail::SymbolDetail;

/// Full evaluation of one symbol in one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub indicators: IndicatorSnapshot,
    pub volatility: VolatilityMetrics,
    pub burst: BurstAnalysis,
    pub symbol_info: SymbolInfo,
    /// Unix milliseconds.
    pub last_update: i64,
}

pub struct SymbolProcessor {
    config: Arc<ScoringConfig>,
    cache: Arc<dyn CandleCache>,
}

impl SymbolProcessor {
    /// Processor backed by a [`TtlCandleCache`] with the default TTL.
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_cache(config, Arc::new(TtlCandleCache::new()))
    }

    pub fn with_cache(config: ScoringConfig, cache: Arc<dyn CandleCache>) -> Self {
        Self {
            config: Arc::new(config),
            cache,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Fewest candles a symbol needs to take part in a scan.  Also the width
    /// of the detail-mode sliding window.
    pub fn min_candles(&self) -> usize {
        self.config.feature_windows.min_candles()
    }

    // -------------------------------------------------------------------------
    // Cache
    // -------------------------------------------------------------------------

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn set_cached_candles(&self, symbol: &str, timeframe: Option<Timeframe>, candles: Vec<Candle>) {
        self.cache.set(&cache_key(symbol, timeframe), candles);
    }

    pub fn get_cached_candles(&self, symbol: &str, timeframe: Option<Timeframe>) -> Option<Arc<Vec<Candle>>> {
        self.cache.get(&cache_key(symbol, timeframe))
    }

    /// Drop expired cache entries; returns how many were removed.
    pub fn clear_expired_cache(&self) -> usize {
        self.cache.sweep()
    }
}
