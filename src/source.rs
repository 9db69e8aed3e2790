// =============================================================================
// Market Data Source
// =============================================================================
//
// Where the scanner gets candles and symbol metadata from.  The exchange
// client sits behind `MarketDataSource`; `SnapshotSource` serves a JSON
// market snapshot from disk and is what the daemon runs against.
//
// Snapshot file layout:
//
//   {
//     "symbols": [ { "symbol": "BTC_USDT", "volume24h": ..., ... } ],
//     "candles": { "BTC_USDT": { "1m": [ {timestamp, open, ...} ], "5m": [...] } }
//   }
// =============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::market_data::{Candle, SymbolInfo};
use crate::types::{Timeframe, Universe};

/// Candle and metadata provider.
pub trait MarketDataSource: Send + Sync {
    /// Every tradable symbol with its 24h metadata.
    fn symbols(&self) -> Result<Vec<SymbolInfo>>;

    /// Up to `limit` most recent candles at or after `since` (Unix ms),
    /// oldest first.
    fn candles(&self, symbol: &str, timeframe: Timeframe, limit: usize, since: Option<i64>) -> Result<Vec<Candle>>;

    fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo>;
}

/// Narrow a listing to the scanned universe: drop symbols under
/// `min_volume_24h`, rank by the universe's criterion, keep the top N.
pub fn select_universe(symbols: Vec<SymbolInfo>, universe: Universe, min_volume_24h: f64) -> Vec<SymbolInfo> {
    let mut kept: Vec<SymbolInfo> = symbols
        .into_iter()
        .filter(|s| s.volume_24h >= min_volume_24h)
        .collect();

    match universe {
        Universe::OpenInterest200 => kept.sort_by(|a, b| {
            b.open_interest
                .unwrap_or(0.0)
                .total_cmp(&a.open_interest.unwrap_or(0.0))
                .then_with(|| a.symbol.cmp(&b.symbol))
        }),
        Universe::Gainers50 => kept.sort_by(|a, b| {
            b.price_change_percent_24h
                .total_cmp(&a.price_change_percent_24h)
                .then_with(|| a.symbol.cmp(&b.symbol))
        }),
    }
    kept.truncate(universe.size());
    kept
}

// =============================================================================
// SnapshotSource
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
    #[serde(default)]
    pub candles: HashMap<String, HashMap<Timeframe, Vec<Candle>>>,
}

/// [`MarketDataSource`] backed by a JSON snapshot file.
pub struct SnapshotSource {
    path: PathBuf,
    snapshot: RwLock<MarketSnapshot>,
}

impl SnapshotSource {
    /// Read and parse the snapshot at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = read_snapshot(&path)?;
        info!(
            path = %path.display(),
            symbols = snapshot.symbols.len(),
            series = snapshot.candles.len(),
            "market snapshot loaded"
        );
        Ok(Self {
            path,
            snapshot: RwLock::new(snapshot),
        })
    }

    pub fn from_snapshot(snapshot: MarketSnapshot) -> Self {
        Self {
            path: PathBuf::new(),
            snapshot: RwLock::new(snapshot),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file; the previous snapshot stays in place on failure.
    pub fn reload(&self) -> Result<()> {
        let fresh = read_snapshot(&self.path)?;
        debug!(path = %self.path.display(), symbols = fresh.symbols.len(), "market snapshot reloaded");
        *self.snapshot.write() = fresh;
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<MarketSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read market snapshot from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse market snapshot from {}", path.display()))
}

impl MarketDataSource for SnapshotSource {
    fn symbols(&self) -> Result<Vec<SymbolInfo>> {
        Ok(self.snapshot.read().symbols.clone())
    }

    fn candles(&self, symbol: &str, timeframe: Timeframe, limit: usize, since: Option<i64>) -> Result<Vec<Candle>> {
        let snapshot = self.snapshot.read();
        let series = snapshot
            .candles
            .get(symbol)
            .and_then(|by_tf| by_tf.get(&timeframe))
            .ok_or_else(|| anyhow!("no {timeframe} candles for {symbol} in snapshot"))?;

        let from = since.unwrap_or(i64::MIN);
        let recent: Vec<Candle> = series.iter().filter(|c| c.timestamp >= from).copied().collect();
        let start = recent.len().saturating_sub(limit);
        Ok(recent[start..].to_vec())
    }

    fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo> {
        self.snapshot
            .read()
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .cloned()
            .with_context(|| format!("unknown symbol {symbol}"))
    }
}
