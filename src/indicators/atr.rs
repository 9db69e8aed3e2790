// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the EMA of TR (SMA-seeded), which keeps it index-aligned with the
// other EMA-smoothed indicators.
//
// Default period: 14
// =============================================================================

use crate::market_data::Candle;

use super::ema::calculate_ema;

/// True range of every bar that has a predecessor (`candles.len() - 1`
/// values).
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let (prev, cur) = (&w[0], &w[1]);
            let hl = cur.high - cur.low;
            let hc = (cur.high - prev.close).abs();
            let lc = (cur.low - prev.close).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Compute the ATR series from a slice of OHLCV candles (oldest first).
///
/// Returns `candles.len() - period` values, or an empty `Vec` when `period`
/// is zero or there are fewer than `period + 1` candles (each TR needs a
/// previous candle).
pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period + 1 {
        return Vec::new();
    }
    calculate_ema(&true_ranges(candles), period)
}

/// Most recent ATR as a percentage of the last close.
///
/// `None` on insufficient data or a zero last close.
pub fn calculate_atr_pct(candles: &[Candle], period: usize) -> Option<f64> {
    let atr = *calculate_atr(candles, period).last()?;
    let last_close = candles.last()?.close;
    if last_close == 0.0 {
        return None;
    }
    Some((atr / last_close) * 100.0)
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
            volume: 100.0,
        }
    }

    #[test]
    fn atr_period_zero() {
        let candles = vec![candle(100.0, 105.0, 95.0, 102.0); 20];
        assert!(calculate_atr(&candles, 0).is_empty());
    }

    #[test]
    fn atr_insufficient_data() {
        let candles = vec![candle(100.0, 105.0, 95.0, 102.0); 14];
        assert!(calculate_atr(&candles, 14).is_empty());
    }

    #[test]
    fn atr_output_length() {
        let candles = vec![
            candle(100.0, 105.0, 95.0, 102.0),
            candle(102.0, 108.0, 98.0, 106.0),
            candle(106.0, 110.0, 104.0, 108.0),
            candle(108.0, 112.0, 106.0, 110.0),
            candle(110.0, 115.0, 108.0, 112.0),
        ];
        let atr = calculate_atr(&candles, 3);
        assert_eq!(atr.len(), 2);
        assert!(atr[0] > 0.0);
    }

    #[test]
    fn atr_constant_range() {
        // Every bar spans 10 with the close at the midpoint: TR is ~10.
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                candle(base, base + 5.0, base - 5.0, base)
            })
            .collect();
        let atr = *calculate_atr(&candles, 14).last().unwrap();
        assert!((atr - 10.0).abs() < 1.0, "expected ATR near 10.0, got {atr}");
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| > H - L
        let candles = vec![
            candle(100.0, 105.0, 95.0, 95.0),
            candle(110.0, 115.0, 108.0, 112.0), // |115-95|=20 > 7
            candle(112.0, 118.0, 110.0, 115.0),
            candle(115.0, 120.0, 113.0, 118.0),
        ];
        let tr = true_ranges(&candles);
        assert!((tr[0] - 20.0).abs() < 1e-10);
        let atr = calculate_atr(&candles, 3);
        assert!(atr[0] > 7.0, "ATR should reflect the gap, got {}", atr[0]);
    }

    #[test]
    fn atr_pct() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64;
                candle(base, base + 3.0, base - 3.0, base + 1.0)
            })
            .collect();
        let val = calculate_atr_pct(&candles, 14).unwrap();
        assert!(val > 0.0);
        assert!(val.is_finite());
    }

    #[test]
    fn atr_pct_zero_close_is_none() {
        let mut candles = vec![candle(1.0, 2.0, 0.5, 1.0); 20];
        candles.last_mut().unwrap().close = 0.0;
        assert!(calculate_atr_pct(&candles, 14).is_none());
    }
}
