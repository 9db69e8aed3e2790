// =============================================================================
// Signal State Classifier
// =============================================================================
//
// Four-state classification evaluated top-to-bottom; first match wins:
//
//   1. ABOUT_TO_BURST: burst score high, volume surge OR breakout proximity
//      high, AND short-window realized vol turning up
//   2. VOLATILE: universe z-score high OR ATR% high
//   3. LOSING_VOL: short-window realized vol collapsed vs. a few bars ago
//   4. NORMAL: nothing above fired
//
// The classifier keeps no memory: it is recomputed from the current window
// every call.  Transition detection compares two independent evaluations.
// =============================================================================

use tracing::trace;

use crate::indicators::volatility::calculate_realized_volatility;
use crate::indicators::IndicatorSnapshot;
use crate::market_data::{closes, Candle};
use crate::types::SignalState;

use super::config::StateThresholds;
use super::metrics::VolatilityMetrics;

/// Classify the current window into a [`SignalState`].
pub fn determine_signal_state(
    candles: &[Candle],
    indicators: &IndicatorSnapshot,
    volatility: &VolatilityMetrics,
    burst_score: f64,
    thresholds: &StateThresholds,
) -> SignalState {
    let short_vols = short_volatility_series(candles, thresholds);

    let state = classify(&short_vols, indicators, volatility, burst_score, thresholds);
    trace!(
        state = %state,
        burst_score = format!("{:.2}", burst_score),
        short_vols = short_vols.len(),
        "signal state classified"
    );
    state
}

/// Realized volatility of the last `short_vol_lookback` closes over
/// `short_vol_period` returns.
pub fn short_volatility_series(candles: &[Candle], thresholds: &StateThresholds) -> Vec<f64> {
    let start = candles.len().saturating_sub(thresholds.short_vol_lookback);
    let recent = closes(&candles[start..]);
    calculate_realized_volatility(&recent, thresholds.short_vol_period)
}

fn classify(
    short_vols: &[f64],
    indicators: &IndicatorSnapshot,
    volatility: &VolatilityMetrics,
    burst_score: f64,
    thresholds: &StateThresholds,
) -> SignalState {
    // --- 1. ABOUT_TO_BURST ------------------------------------------------------
    let atb = &thresholds.about_to_burst;
    if burst_score >= atb.burst_score
        && (volatility.volume_surge_normalized >= atb.volume_surge_min
            || volatility.breakout_score >= atb.breakout_proximity_min)
        && volatility_rising(short_vols, atb.volatility_trend_bars)
    {
        return SignalState::AboutToBurst;
    }

    // --- 2. VOLATILE ------------------------------------------------------------
    let vol = &thresholds.volatile;
    if volatility.volatility_z_score >= vol.volatility_z_score
        || indicators.atr_percent >= vol.atr_percent_min
    {
        return SignalState::Volatile;
    }

    // --- 3. LOSING_VOL ----------------------------------------------------------
    let lv = &thresholds.losing_vol;
    if let Some(drop) = relative_volatility_drop(short_vols, lv.volatility_drop_bars) {
        if drop >= lv.volatility_drop_threshold {
            return SignalState::LosingVol;
        }
    }

    SignalState::Normal
}

/// A transition worth surfacing: the state changed AND the new state is one
/// traders act on (ABOUT_TO_BURST or LOSING_VOL).
pub fn detect_state_transition(previous: SignalState, current: SignalState) -> bool {
    previous != current && matches!(current, SignalState::AboutToBurst | SignalState::LosingVol)
}

/// Latest short vol strictly above the value `bars - 1` samples earlier.
/// Needs at least `bars` samples.
fn volatility_rising(short_vols: &[f64], bars: usize) -> bool {
    if bars < 2 || short_vols.len() < bars {
        return false;
    }
    let latest = short_vols[short_vols.len() - 1];
    let earlier = short_vols[short_vols.len() - bars];
    latest > earlier
}

/// `(v[-bars] - v[-1]) / v[-bars]`, with a zero reference treated as 1.
/// Needs at least `bars` samples.
fn relative_volatility_drop(short_vols: &[f64], bars: usize) -> Option<f64> {
    if bars < 2 || short_vols.len() < bars {
        return None;
    }
    let reference = short_vols[short_vols.len() - bars];
    let latest = short_vols[short_vols.len() - 1];
    let divisor = if reference == 0.0 { 1.0 } else { reference };
    Some((reference - latest) / divisor)
}
