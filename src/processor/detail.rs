// =============================================================================
// Single-symbol Detail
// =============================================================================
//
// Slides a window of `min_candles` candles across one symbol's history and
// evaluates indicators + volatility metrics at each position, then scores the
// whole series once.  There is no universe in detail mode, so z-scores and
// volatility scores sit at their universe-less value of 0.
//
// Window positions run over `window..len`, each covering `[i - window, i)`:
// exactly `window` candles give an empty series, `window + 1` give one entry.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::indicators::{calculate_indicators, IndicatorSnapshot};
use crate::market_data::{Candle, SymbolInfo};
use crate::scoring::{analyze, assess_risk, calculate_volatility_metrics, BurstAnalysis, RiskAssessment, VolatilityMetrics};
use crate::types::Timeframe;

use super::SymbolProcessor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetail {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// One snapshot per window position, oldest first.
    pub indicator_series: Vec<IndicatorSnapshot>,
    /// Aligned with `indicator_series`.
    pub volatility_series: Vec<VolatilityMetrics>,
    /// Verdict over the whole history.
    pub burst: BurstAnalysis,
    pub risk: RiskAssessment,
    pub symbol_info: SymbolInfo,
}

impl SymbolProcessor {
    /// Time-series view of a single symbol.
    ///
    /// # Errors
    /// [`ScanError::InsufficientData`] with fewer than [`Self::min_candles`]
    /// candles; any per-window failure is surfaced as-is.
    pub fn process_symbol_detail(
        &self,
        symbol: &str,
        candles: &[Candle],
        symbol_info: &SymbolInfo,
        timeframe: Timeframe,
    ) -> Result<SymbolDetail> {
        let config = self.config();
        let window = self.min_candles();
        if candles.len() < window {
            return Err(ScanError::insufficient("symbol detail", window, candles.len()));
        }

        let positions = candles.len() - window;
        let mut indicator_series = Vec::with_capacity(positions);
        let mut volatility_series = Vec::with_capacity(positions);
        for i in window..candles.len() {
            let slice = &candles[i - window..i];
            let indicators = calculate_indicators(slice, &config.feature_windows)?;
            let metrics = calculate_volatility_metrics(slice, &indicators, &[], config)?;
            indicator_series.push(indicators);
            volatility_series.push(metrics);
        }

        let indicators = calculate_indicators(candles, &config.feature_windows)?;
        let (metrics, burst) = analyze(candles, &indicators, &[], config)?;
        let risk = assess_risk(&metrics, &indicators, timeframe);

        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            points = indicator_series.len(),
            burst_score = format!("{:.2}", burst.burst_score),
            state = %burst.state,
            risk = %risk.risk_level,
            "symbol detail computed"
        );

        Ok(SymbolDetail {
            symbol: symbol.to_string(),
            timeframe,
            indicator_series,
            volatility_series,
            burst,
            risk,
            symbol_info: symbol_info.clone(),
        })
    }
}
