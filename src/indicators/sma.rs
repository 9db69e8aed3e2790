// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (x_{t-period+1} + ... + x_t) / period
//
// Trailing window, inclusive of the current index.
// =============================================================================

/// Compute the SMA series of `values` over `period`.
///
/// The output has `values.len() - period + 1` elements; element `k` is the
/// mean of `values[k..k + period]`.  Returns an empty `Vec` when `period` is
/// zero or longer than the input.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period_f)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_known_values() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(sma.len(), 3);
        assert!((sma[0] - 2.0).abs() < 1e-10);
        assert!((sma[1] - 3.0).abs() < 1e-10);
        assert!((sma[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn sma_output_length_matches_window_count() {
        let values: Vec<f64> = (0..37).map(|x| (x as f64 * 0.7).sin()).collect();
        for period in 1..=37 {
            let sma = calculate_sma(&values, period);
            assert_eq!(sma.len(), values.len() - period + 1);
            let first = values[..period].iter().sum::<f64>() / period as f64;
            assert!((sma[0] - first).abs() < 1e-10);
        }
    }

    #[test]
    fn sma_insufficient_data() {
        assert!(calculate_sma(&[1.0, 2.0], 3).is_empty());
        assert!(calculate_sma(&[1.0, 2.0], 0).is_empty());
    }
}
