// =============================================================================
// Indicator Snapshot
// =============================================================================
//
// Latest value of every indicator the scorer consumes, computed from scratch
// over the trailing window ending at the last candle.  Unlike the individual
// calculators (which return empty series on short input) the snapshot fails
// loudly so a missing value can never masquerade as a neutral default.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::market_data::{closes, volumes, Candle};

use super::adx::calculate_adx;
use super::atr::calculate_atr;
use super::donchian::calculate_donchian;
use super::ema::calculate_ema;
use super::rsi::calculate_rsi;

/// Look-back windows of the snapshot indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWindows {
    pub rsi: usize,
    pub atr: usize,
    pub adx: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub donchian: usize,
    pub volume: usize,
}

impl Default for FeatureWindows {
    fn default() -> Self {
        Self {
            rsi: 14,
            atr: 14,
            adx: 14,
            ema_fast: 20,
            ema_slow: 50,
            donchian: 20,
            volume: 20,
        }
    }
}

impl FeatureWindows {
    /// Fewest candles for which every snapshot indicator yields a value.
    pub fn min_candles(&self) -> usize {
        [
            self.rsi + 1,
            self.atr + 1,
            2 * self.adx,
            self.ema_fast,
            self.ema_slow,
            self.donchian,
            self.volume,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Scalar indicator values at the last candle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi14: f64,
    pub atr: f64,
    pub atr_percent: f64,
    pub adx14: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub donchian_high20: f64,
    pub donchian_low20: f64,
    pub volume_ema: f64,
}

/// Compute the [`IndicatorSnapshot`] for `candles`.
///
/// # Errors
/// - [`ScanError::InsufficientData`] when `candles` is shorter than
///   [`FeatureWindows::min_candles`].
/// - [`ScanError::NonFinite`] when any component is NaN / infinite or the
///   last close is zero.
pub fn calculate_indicators(candles: &[Candle], windows: &FeatureWindows) -> Result<IndicatorSnapshot> {
    let required = windows.min_candles();
    if candles.len() < required {
        return Err(ScanError::insufficient("indicator snapshot", required, candles.len()));
    }

    let closes = closes(candles);
    let volumes = volumes(candles);
    let available = candles.len();

    let rsi14 = last("rsi", &calculate_rsi(&closes, windows.rsi), windows.rsi + 1, available)?;
    let atr = last("atr", &calculate_atr(candles, windows.atr), windows.atr + 1, available)?;
    let adx14 = last("adx", &calculate_adx(candles, windows.adx).adx, 2 * windows.adx, available)?;
    let ema20 = last("ema_fast", &calculate_ema(&closes, windows.ema_fast), windows.ema_fast, available)?;
    let ema50 = last("ema_slow", &calculate_ema(&closes, windows.ema_slow), windows.ema_slow, available)?;
    let donchian = calculate_donchian(candles, windows.donchian);
    let donchian_high20 = last("donchian_high", &donchian.high, windows.donchian, available)?;
    let donchian_low20 = last("donchian_low", &donchian.low, windows.donchian, available)?;
    let volume_ema = last("volume_ema", &calculate_ema(&volumes, windows.volume), windows.volume, available)?;

    let last_close = closes[closes.len() - 1];
    if last_close == 0.0 {
        return Err(ScanError::NonFinite { field: "atr_percent" });
    }
    let atr_percent = atr / last_close * 100.0;
    if !atr_percent.is_finite() {
        return Err(ScanError::NonFinite { field: "atr_percent" });
    }

    Ok(IndicatorSnapshot {
        rsi14,
        atr,
        atr_percent,
        adx14,
        ema20,
        ema50,
        donchian_high20,
        donchian_low20,
        volume_ema,
    })
}

/// Last element of an indicator series.
///
/// Every calculator yields `available - required + 1` values on clean
/// input; a shorter series was truncated by a non-finite intermediate, so its
/// last element is stale.
fn last(field: &'static str, series: &[f64], required: usize, available: usize) -> Result<f64> {
    if available < required {
        return Err(ScanError::insufficient(field, required, available));
    }
    if series.len() != available - required + 1 {
        return Err(ScanError::NonFinite { field });
    }
    match series.last() {
        Some(&v) if v.is_finite() => Ok(v),
        _ => Err(ScanError::NonFinite { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.5 + (i as f64 * 0.7).sin();
                Candle {
                    timestamp: i as i64 * 60_000,
                    open: base - 0.2,
                    high: base + 1.0,
                    low: base - 1.0,
                    close: base + 0.2,
                    volume: 1_000.0 + (i % 7) as f64 * 100.0,
                }
            })
            .collect()
    }

    #[test]
    fn default_windows_need_fifty_candles() {
        assert_eq!(FeatureWindows::default().min_candles(), 50);
    }

    #[test]
    fn snapshot_insufficient_data() {
        let err = calculate_indicators(&trending_candles(49), &FeatureWindows::default()).unwrap_err();
        assert_eq!(
            err,
            ScanError::InsufficientData {
                indicator: "indicator snapshot",
                required: 50,
                available: 49,
            }
        );
    }

    #[test]
    fn snapshot_values_are_consistent() {
        let candles = trending_candles(80);
        let snap = calculate_indicators(&candles, &FeatureWindows::default()).unwrap();

        assert!((0.0..=100.0).contains(&snap.rsi14));
        assert!(snap.atr > 0.0);
        assert!(snap.adx14 >= 0.0);
        assert!(snap.donchian_high20 >= snap.donchian_low20);
        assert!(snap.volume_ema > 0.0);
        let expected_pct = snap.atr / candles.last().unwrap().close * 100.0;
        assert!((snap.atr_percent - expected_pct).abs() < 1e-10);
        // Uptrend: fast EMA above slow EMA.
        assert!(snap.ema20 > snap.ema50);
    }

    #[test]
    fn snapshot_rejects_non_finite_prices() {
        let mut candles = trending_candles(60);
        candles[55].close = f64::NAN;
        let err = calculate_indicators(&candles, &FeatureWindows::default()).unwrap_err();
        assert!(matches!(err, ScanError::NonFinite { .. }));
    }

    #[test]
    fn snapshot_serialises_camel_case() {
        let snap = calculate_indicators(&trending_candles(60), &FeatureWindows::default()).unwrap();
        let json = serde_json::to_value(snap).unwrap();
        assert!(json.get("atrPercent").is_some());
        assert!(json.get("donchianHigh20").is_some());
    }
}
