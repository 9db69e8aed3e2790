// =============================================================================
// Burst Score: weighted component blend
// =============================================================================
//
//   raw   = w_vol   * normalize(z)
//         + w_surge * volume_surge_normalized
//         + w_brk   * breakout_score
//         + w_mom   * momentum_normalized
//         + w_trend * trend_quality_normalized
//   score = clamp(50 + 50 * tanh(raw), 0, 100)
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::indicators::{normalize, IndicatorSnapshot};
use crate::market_data::Candle;
use crate::types::{now_ms, SignalState};

use super::config::{BurstWeights, ScoringConfig};
use super::metrics::{calculate_volatility_metrics, VolatilityMetrics};
use super::risk::calculate_leverage_suggestion;
use super::state::determine_signal_state;

/// Composite burst verdict for one symbol at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstAnalysis {
    /// 0-100
    pub burst_score: f64,
    pub burst_raw: f64,
    pub state: SignalState,
    pub leverage_suggestion: u32,
    /// Unix milliseconds.
    pub last_update: i64,
    /// Signed change against a previous scan, when one was compared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_score: Option<f64>,
}

/// Weighted sum of the normalised burst components.
pub fn calculate_raw_burst_score(metrics: &VolatilityMetrics, weights: &BurstWeights) -> f64 {
    let volatility_component = normalize(metrics.volatility_z_score, 1.0);

    weights.volatility * volatility_component
        + weights.volume_surge * metrics.volume_surge_normalized
        + weights.breakout * metrics.breakout_score
        + weights.momentum * metrics.momentum_normalized
        + weights.trend_quality * metrics.trend_quality_normalized
}

/// Map a raw blend onto [0, 100]; `normalize_burst_score(0.0) == 50.0`.
pub fn normalize_burst_score(raw: f64) -> f64 {
    let score = 50.0 + 50.0 * raw.tanh();
    if score.is_nan() {
        return 50.0;
    }
    score.clamp(0.0, 100.0)
}

/// Score, classify and size one symbol from precomputed metrics.
pub fn burst_from_metrics(
    candles: &[Candle],
    indicators: &IndicatorSnapshot,
    metrics: &VolatilityMetrics,
    config: &ScoringConfig,
) -> BurstAnalysis {
    let burst_raw = calculate_raw_burst_score(metrics, &config.weights);
    let burst_score = normalize_burst_score(burst_raw);
    let state = determine_signal_state(candles, indicators, metrics, burst_score, &config.thresholds);
    let leverage_suggestion = calculate_leverage_suggestion(indicators.atr_percent, &config.leverage);

    trace!(
        burst_raw = format!("{:.4}", burst_raw),
        burst_score = format!("{:.2}", burst_score),
        state = %state,
        leverage = leverage_suggestion,
        "burst scored"
    );

    BurstAnalysis {
        burst_score,
        burst_raw,
        state,
        leverage_suggestion,
        last_update: now_ms(),
        delta_score: None,
    }
}

/// Full pipeline for one symbol: metrics first, then the burst verdict.
pub fn analyze(
    candles: &[Candle],
    indicators: &IndicatorSnapshot,
    universe: &[f64],
    config: &ScoringConfig,
) -> Result<(VolatilityMetrics, BurstAnalysis)> {
    let metrics = calculate_volatility_metrics(candles, indicators, universe, config)?;
    let burst = burst_from_metrics(candles, indicators, &metrics, config);
    Ok((metrics, burst))
}

/// Burst verdict only; see [`analyze`].
pub fn calculate_burst_score(
    candles: &[Candle],
    indicators: &IndicatorSnapshot,
    universe: &[f64],
    config: &ScoringConfig,
) -> Result<BurstAnalysis> {
    analyze(candles, indicators, universe, config).map(|(_, burst)| burst)
}

/// Signed score change against `previous`, if there is one.
pub fn calculate_delta_score(current: &BurstAnalysis, previous: Option<&BurstAnalysis>) -> Option<f64> {
    previous.map(|p| current.burst_score - p.burst_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::calculate_indicators;

    fn metrics(z: f64, surge: f64, breakout: f64, momentum: f64, trend: f64) -> VolatilityMetrics {
        VolatilityMetrics {
            realized_volatility: 0.5,
            volatility_z_score: z,
            volatility_score: (50.0 + z * 20.0).clamp(0.0, 100.0),
            volume_surge: surge * 5.0,
            volume_surge_normalized: surge,
            breakout_proximity: breakout,
            breakout_score: breakout,
            momentum: 0.0,
            momentum_normalized: momentum,
            trend_quality: trend * 50.0,
            trend_quality_normalized: trend,
        }
    }

    #[test]
    fn normalize_burst_score_midpoint_and_bounds() {
        assert_eq!(normalize_burst_score(0.0), 50.0);
        for raw in [-1e9, -3.0, -0.2, 0.4, 1.0, 7.0, 1e9] {
            let s = normalize_burst_score(raw);
            assert!((0.0..=100.0).contains(&s), "{s} out of range for {raw}");
        }
        assert_eq!(normalize_burst_score(f64::NAN), 50.0);
    }

    #[test]
    fn raw_score_is_weighted_sum() {
        let m = metrics(0.0, 1.0, 1.0, 1.0, 1.0);
        let raw = calculate_raw_burst_score(&m, &BurstWeights::default());
        // normalize(0) = 0.5
        let expected = 0.35 * 0.5 + 0.30 + 0.20 + 0.15 + 0.10;
        assert!((raw - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_trend_weight_ignores_adx() {
        let weights = BurstWeights {
            trend_quality: 0.0,
            ..BurstWeights::default()
        };
        let low = calculate_raw_burst_score(&metrics(0.5, 0.4, 0.3, 0.6, 0.0), &weights);
        let high = calculate_raw_burst_score(&metrics(0.5, 0.4, 0.3, 0.6, 1.0), &weights);
        assert_eq!(low, high);
    }

    #[test]
    fn delta_score_requires_previous() {
        let base = BurstAnalysis {
            burst_score: 60.0,
            burst_raw: 0.2,
            state: SignalState::Normal,
            leverage_suggestion: 7,
            last_update: 0,
            delta_score: None,
        };
        let later = BurstAnalysis {
            burst_score: 72.5,
            ..base.clone()
        };
        assert_eq!(calculate_delta_score(&later, None), None);
        assert_eq!(calculate_delta_score(&later, Some(&base)), Some(12.5));
    }

    #[test]
    fn analyze_end_to_end() {
        let candles: Vec<Candle> = (0..70)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.6).sin() * 2.0 + i as f64 * 0.1;
                Candle {
                    timestamp: i as i64 * 60_000,
                    open: base - 0.3,
                    high: base + 0.8,
                    low: base - 0.8,
                    close: base + 0.3,
                    volume: 500.0 + (i % 5) as f64 * 50.0,
                }
            })
            .collect();
        let cfg = ScoringConfig::default();
        let snap = calculate_indicators(&candles, &cfg.feature_windows).unwrap();
        let (m, burst) = analyze(&candles, &snap, &[0.2, 0.4, 0.9], &cfg).unwrap();

        assert!((0.0..=100.0).contains(&burst.burst_score));
        assert!((burst.burst_raw - calculate_raw_burst_score(&m, &cfg.weights)).abs() < 1e-12);
        assert_eq!(
            burst.leverage_suggestion,
            calculate_leverage_suggestion(snap.atr_percent, &cfg.leverage)
        );
        assert!(burst.delta_score.is_none());
        assert!(burst.last_update > 0);

        let only = calculate_burst_score(&candles, &snap, &[0.2, 0.4, 0.9], &cfg).unwrap();
        assert_eq!(only.burst_score, burst.burst_score);
        assert_eq!(only.state, burst.state);
    }
}
