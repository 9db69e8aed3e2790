// =============================================================================
// Volatility Metrics
// =============================================================================
//
// Turns an indicator snapshot plus an optional universe sample into the five
// normalised burst components:
//
//   volatility: realized vol z-scored against the universe (median / MAD)
//   volume surge: last volume vs. its EMA, capped
//   breakout: ATR-normalised distance to the upper Donchian band
//   momentum: RSI deviation from 50 blended with a short ROC
//   trend: ADX scaled onto [0, 1]
//
// An empty universe (detail mode) degrades the z-score and volatility score
// to 0 instead of failing.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::indicators::roc::current_roc;
use crate::indicators::volatility::current_realized_volatility;
use crate::indicators::{mad, median, normalize, z_score, IndicatorSnapshot};
use crate::market_data::{closes, Candle};

use super::config::ScoringConfig;

/// Points of volatility score per unit of universe z-score.
const Z_SCORE_POINTS: f64 = 20.0;
/// ATR multiples over which breakout proximity fades from 1 to 0.
const BREAKOUT_ATR_SPAN: f64 = 2.0;
/// ROC percentage that maps to tanh(1) in the momentum blend.
const ROC_SCALE: f64 = 5.0;
/// ADX value treated as a fully developed trend.
const ADX_FULL_TREND: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityMetrics {
    pub realized_volatility: f64,
    pub volatility_z_score: f64,
    /// 0-100
    pub volatility_score: f64,
    pub volume_surge: f64,
    /// 0-1
    pub volume_surge_normalized: f64,
    pub breakout_proximity: f64,
    /// 0-1
    pub breakout_score: f64,
    pub momentum: f64,
    /// 0-1
    pub momentum_normalized: f64,
    pub trend_quality: f64,
    /// 0-1
    pub trend_quality_normalized: f64,
}

/// Robust universe reference point: `(median, MAD)`.  `None` when the sample
/// is empty.
pub fn universe_stats(universe: &[f64]) -> Option<(f64, f64)> {
    Some((median(universe)?, mad(universe)?))
}

/// Compute [`VolatilityMetrics`] for `candles`.
///
/// # Errors
/// - [`ScanError::InsufficientData`] when there are not enough closes for the
///   realized volatility window.
/// - [`ScanError::NonFinite`] when a price feeds a NaN / infinite return.
pub fn calculate_volatility_metrics(
    candles: &[Candle],
    indicators: &IndicatorSnapshot,
    universe: &[f64],
    config: &ScoringConfig,
) -> Result<VolatilityMetrics> {
    let closes = closes(candles);
    let (current_price, last_volume) = match candles.last() {
        Some(c) => (c.close, c.volume),
        None => return Err(ScanError::insufficient("volatility metrics", 1, 0)),
    };

    // --- Realized volatility vs universe -------------------------------------
    let realized_volatility = current_realized_volatility(&closes, config.volatility_period)
        .ok_or_else(|| {
            ScanError::insufficient(
                "realized volatility",
                config.volatility_period + 1,
                closes.len(),
            )
        })?;
    if !realized_volatility.is_finite() {
        return Err(ScanError::NonFinite { field: "realized_volatility" });
    }

    let (volatility_z_score, volatility_score) = match universe_stats(universe) {
        Some((center, dispersion)) => {
            let z = z_score(realized_volatility, center, dispersion);
            if z.is_finite() {
                (z, (50.0 + z * Z_SCORE_POINTS).clamp(0.0, 100.0))
            } else {
                (0.0, 0.0)
            }
        }
        None => (0.0, 0.0),
    };

    // --- Volume surge --------------------------------------------------------
    let volume_surge = if indicators.volume_ema > 0.0 {
        last_volume / indicators.volume_ema
    } else {
        0.0
    };
    let volume_surge_normalized = (volume_surge / config.volume_surge_cap).clamp(0.0, 1.0);

    // --- Breakout proximity --------------------------------------------------
    let atr_unit = if indicators.atr > 0.0 { indicators.atr } else { 1.0 };
    let distance_to_high = (indicators.donchian_high20 - current_price) / atr_unit;
    let breakout_proximity = (1.0 - distance_to_high.abs() / BREAKOUT_ATR_SPAN).max(0.0);
    let breakout_score = if current_price >= indicators.donchian_high20 {
        1.0
    } else {
        breakout_proximity.clamp(0.0, 1.0)
    };

    // --- Momentum ------------------------------------------------------------
    let rsi_component = (indicators.rsi14 - 50.0) / 50.0;
    let roc = current_roc(&closes, config.momentum_roc_period).unwrap_or(0.0);
    let roc_component = (roc / ROC_SCALE).tanh();
    let momentum = (rsi_component + roc_component) / 2.0;
    let momentum_normalized = normalize(momentum, 1.0);

    // --- Trend quality -------------------------------------------------------
    let trend_quality = indicators.adx14;
    let trend_quality_normalized = (trend_quality / ADX_FULL_TREND).clamp(0.0, 1.0);

    let metrics = VolatilityMetrics {
        realized_volatility,
        volatility_z_score,
        volatility_score,
        volume_surge,
        volume_surge_normalized,
        breakout_proximity,
        breakout_score,
        momentum,
        momentum_normalized,
        trend_quality,
        trend_quality_normalized,
    };

    if !metrics.volume_surge.is_finite() || !metrics.momentum.is_finite() {
        return Err(ScanError::NonFinite { field: "volatility metrics" });
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{calculate_indicators, FeatureWindows};

    fn candles(n: usize, amplitude: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.9).sin() * amplitude;
                Candle {
                    timestamp: i as i64 * 60_000,
                    open: base,
                    high: base + 0.5,
                    low: base - 0.5,
                    close: base,
                    volume: 1_000.0,
                }
            })
            .collect()
    }

    fn snapshot(c: &[Candle]) -> IndicatorSnapshot {
        calculate_indicators(c, &FeatureWindows::default()).unwrap()
    }

    #[test]
    fn empty_universe_degrades_to_zero() {
        let c = candles(60, 2.0);
        let m = calculate_volatility_metrics(&c, &snapshot(&c), &[], &ScoringConfig::default()).unwrap();
        assert_eq!(m.volatility_z_score, 0.0);
        assert_eq!(m.volatility_score, 0.0);
        assert!(m.realized_volatility > 0.0);
    }

    #[test]
    fn universe_z_score_uses_median_and_mad() {
        let c = candles(60, 2.0);
        let snap = snapshot(&c);
        let cfg = ScoringConfig::default();
        let own = calculate_volatility_metrics(&c, &snap, &[], &cfg).unwrap().realized_volatility;

        // Universe centred well below this symbol: median own/2, MAD own/10.
        let universe = [own * 0.4, own * 0.5, own * 0.6];
        let m = calculate_volatility_metrics(&c, &snap, &universe, &cfg).unwrap();
        let expected_z = (own - own * 0.5) / (own * 0.1);
        assert!((m.volatility_z_score - expected_z).abs() < 1e-6);
        assert_eq!(m.volatility_score, 100.0);
    }

    #[test]
    fn degenerate_universe_dispersion_gives_zero_z() {
        let c = candles(60, 2.0);
        let m = calculate_volatility_metrics(&c, &snapshot(&c), &[0.7, 0.7, 0.7], &ScoringConfig::default())
            .unwrap();
        assert_eq!(m.volatility_z_score, 0.0);
        assert_eq!(m.volatility_score, 50.0);
    }

    #[test]
    fn volume_surge_is_capped() {
        let mut c = candles(60, 1.0);
        c.last_mut().unwrap().volume = 100_000.0;
        let m = calculate_volatility_metrics(&c, &snapshot(&c), &[], &ScoringConfig::default()).unwrap();
        assert!(m.volume_surge > 5.0);
        assert_eq!(m.volume_surge_normalized, 1.0);
    }

    #[test]
    fn close_at_channel_high_is_full_breakout() {
        let mut c = candles(60, 1.0);
        let last = c.last_mut().unwrap();
        last.high = 150.0;
        last.close = 150.0;
        let m = calculate_volatility_metrics(&c, &snapshot(&c), &[], &ScoringConfig::default()).unwrap();
        assert_eq!(m.breakout_score, 1.0);
    }

    #[test]
    fn normalised_fields_stay_in_range() {
        for amplitude in [0.0, 0.5, 3.0, 20.0] {
            let c = candles(80, amplitude);
            let m = calculate_volatility_metrics(&c, &snapshot(&c), &[0.1, 0.5, 2.0], &ScoringConfig::default())
                .unwrap();
            assert!((0.0..=100.0).contains(&m.volatility_score));
            for v in [
                m.volume_surge_normalized,
                m.breakout_score,
                m.momentum_normalized,
                m.trend_quality_normalized,
            ] {
                assert!((0.0..=1.0).contains(&v), "{v} out of [0,1] for amplitude {amplitude}");
            }
        }
    }

    #[test]
    fn universe_stats_empty_is_none() {
        assert!(universe_stats(&[]).is_none());
        assert_eq!(universe_stats(&[1.0, 2.0, 3.0]), Some((2.0, 1.0)));
    }
}
