// =============================================================================
// Burst Scanner
// =============================================================================
//
// Scores perpetual-futures symbols for short-term volatility bursts from
// OHLCV candles:
//
//   indicators: rolling-window calculators and the per-window snapshot
//   scoring: universe-relative metrics, burst score, state, risk
//   processor: cross-sectional scans, detail series, diffs, candle cache
//   source: market data provider interface + JSON snapshot source
//   config: daemon configuration with env overrides
// =============================================================================

pub mod config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod processor;
pub mod scoring;
pub mod source;
pub mod types;

pub use config::ScannerConfig;
pub use error::{Result, ScanError};
pub use market_data::{Candle, SymbolInfo};
pub use processor::{ScanResult, SymbolDetail, SymbolProcessor};
pub use scoring::{BurstAnalysis, ScoringConfig};
pub use types::{SignalState, Timeframe, Universe};
