// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes; the snapshot
// feeds it into the momentum component of the burst score.
//
// Step 1: Split consecutive close differences into gains and losses.
// Step 2: Smooth both series with the EMA (SMA-seeded, 2/(period+1)).
// Step 3: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// A zero average loss yields RSI = 100, including the no-movement case.
// =============================================================================

use super::ema::calculate_ema;

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The differences drop one element and the EMA drops `period - 1`, so the
/// output has `closes.len() - period` values.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need at least `period` deltas)
/// - If average loss is zero, RSI is 100.0.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    // --- Split deltas into gains and losses ----------------------------------
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            if d > 0.0 {
                (d, 0.0)
            } else {
                (0.0, d.abs())
            }
        })
        .unzip();

    let avg_gains = calculate_ema(&gains, period);
    let avg_losses = calculate_ema(&losses, period);

    avg_gains
        .iter()
        .zip(avg_losses.iter())
        .map(|(&g, &l)| rsi_from_averages(g, l))
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).is_empty());
    }

    #[test]
    fn rsi_output_length() {
        let closes = [102.0, 106.0, 108.0, 110.0, 112.0];
        assert_eq!(calculate_rsi(&closes, 3).len(), 2);

        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64).sin()).collect();
        assert_eq!(calculate_rsi(&closes, 14).len(), 60 - 14);
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert!(!series.is_empty());
        for &v in &series {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert!(!series.is_empty());
        for &v in &series {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_100() {
        // Zero average loss resolves to 100 even without gains.
        let series = calculate_rsi(&[100.0; 30], 14);
        assert!(!series.is_empty());
        assert!(series.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 4);
        for &v in &series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }

        let noisy: Vec<f64> = (0..200)
            .map(|i| 1_000.0 + (i as f64 * 1.7).sin() * 80.0 + (i as f64 * 0.13).cos() * 5.0)
            .collect();
        for &v in &calculate_rsi(&noisy, 14) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
