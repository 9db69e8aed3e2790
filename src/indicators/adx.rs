// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Smooth +DM, -DM and TR with the EMA over `period`.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = EMA of DX over `period`.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;

use super::atr::true_ranges;
use super::ema::calculate_ema;

/// ADX together with the directional indicators it was derived from.
///
/// `plus_di` / `minus_di` have one entry per smoothed bar; `adx` is shorter
/// by `period - 1` because it smooths DX once more.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

/// Compute ADX, +DI and -DI series from a slice of OHLCV candles.
///
/// All three vectors are empty when `period` is zero or there are fewer
/// than `period + 1` candles.  `adx` additionally needs `2 * period`
/// candles to produce its first value.
pub fn calculate_adx(candles: &[Candle], period: usize) -> AdxSeries {
    if period == 0 || candles.len() < period + 1 {
        return AdxSeries::default();
    }

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
    // ------------------------------------------------------------------
    let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = candles
        .windows(2)
        .map(|w| {
            let up_move = w[1].high - w[0].high;
            let down_move = w[0].low - w[1].low;

            let pdm = if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            };
            let mdm = if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            };
            (pdm, mdm)
        })
        .unzip();
    let tr_vals = true_ranges(candles);

    // ------------------------------------------------------------------
    // Step 3: EMA smoothing
    // ------------------------------------------------------------------
    let smooth_plus_dm = calculate_ema(&plus_dm, period);
    let smooth_minus_dm = calculate_ema(&minus_dm, period);
    let smooth_tr = calculate_ema(&tr_vals, period);

    // ------------------------------------------------------------------
    // Step 4 & 5: DI and DX per smoothed bar
    // ------------------------------------------------------------------
    let bars = smooth_tr
        .len()
        .min(smooth_plus_dm.len())
        .min(smooth_minus_dm.len());

    let mut plus_di = Vec::with_capacity(bars);
    let mut minus_di = Vec::with_capacity(bars);
    let mut dx = Vec::with_capacity(bars);

    for i in 0..bars {
        let (pdi, mdi) = directional_indices(smooth_plus_dm[i], smooth_minus_dm[i], smooth_tr[i]);
        plus_di.push(pdi);
        minus_di.push(mdi);
        dx.push(compute_dx(pdi, mdi));
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = EMA of DX
    // ------------------------------------------------------------------
    let adx = calculate_ema(&dx, period);

    AdxSeries {
        adx,
        plus_di,
        minus_di,
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// +DI / -DI from smoothed DM and TR.  A zero TR means no range at all, so
/// both indices are zero.
fn directional_indices(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> (f64, f64) {
    if smooth_tr <= 0.0 {
        return (0.0, 0.0);
    }
    (
        (smooth_plus_dm / smooth_tr * 100.0).max(0.0),
        (smooth_minus_dm / smooth_tr * 100.0).max(0.0),
    )
}

fn compute_dx(plus_di: f64, minus_di: f64) -> f64 {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        // No directional movement.
        return 0.0;
    }
    (plus_di - minus_di).abs() / di_sum * 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: 0,
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn adx_period_zero() {
        let candles = vec![candle(1.0, 2.0, 0.5, 1.5); 50];
        assert!(calculate_adx(&candles, 0).adx.is_empty());
    }

    #[test]
    fn adx_insufficient_data() {
        let candles = vec![candle(1.0, 2.0, 0.5, 1.5); 10];
        let series = calculate_adx(&candles, 14);
        assert!(series.adx.is_empty());
        assert!(series.plus_di.is_empty());
    }

    #[test]
    fn adx_strong_uptrend() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();

        let series = calculate_adx(&candles, 14);
        let value = *series.adx.last().unwrap();
        assert!(value > 25.0, "expected ADX > 25 for strong trend, got {value}");
        assert!(series.plus_di.last().unwrap() > series.minus_di.last().unwrap());
    }

    #[test]
    fn adx_flat_market() {
        let candles = vec![candle(100.0, 101.0, 99.0, 100.0); 60];
        let value = *calculate_adx(&candles, 14).adx.last().unwrap();
        assert!(value < 1.0, "expected ADX near 0 for flat market, got {value}");
    }

    #[test]
    fn adx_zero_range_is_zero_not_nan() {
        // Identical OHLC everywhere: TR == 0.
        let candles = vec![candle(100.0, 100.0, 100.0, 100.0); 40];
        let series = calculate_adx(&candles, 14);
        assert!(!series.adx.is_empty());
        assert!(series.adx.iter().all(|&v| v == 0.0));
        assert!(series.plus_di.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn adx_and_di_are_non_negative() {
        let candles: Vec<Candle> = (0..120)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0 + (i as f64 * 1.1).cos();
                candle(base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        let series = calculate_adx(&candles, 14);
        assert!(!series.adx.is_empty());
        for v in series.adx.iter().chain(&series.plus_di).chain(&series.minus_di) {
            assert!(*v >= 0.0, "negative directional value {v}");
        }
        for &v in &series.adx {
            assert!(v <= 100.0, "ADX {v} above 100");
        }
    }

    #[test]
    fn adx_series_lengths_align() {
        let candles: Vec<Candle> = (0..40)
            .map(|i| {
                let base = 100.0 + i as f64;
                candle(base, base + 1.0, base - 0.5, base + 0.5)
            })
            .collect();
        let series = calculate_adx(&candles, 5);
        // 39 bar transitions, EMA(5) => 35 DI values, EMA(5) of DX => 31.
        assert_eq!(series.plus_di.len(), 35);
        assert_eq!(series.minus_di.len(), 35);
        assert_eq!(series.adx.len(), 31);
    }

    #[test]
    fn adx_minimum_candles_exact() {
        let period = 5;
        let candles: Vec<Candle> = (0..2 * period)
            .map(|i| {
                let base = 100.0 + i as f64;
                candle(base, base + 1.0, base - 0.5, base + 0.5)
            })
            .collect();
        assert_eq!(calculate_adx(&candles, period).adx.len(), 1);
        assert!(calculate_adx(&candles[..2 * period - 1], period).adx.is_empty());
    }
}
