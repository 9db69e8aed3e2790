// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent values, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = x_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period`
// values.  RSI, ATR and ADX all smooth through this function so their outputs
// stay index-aligned.
// =============================================================================

use super::sma::calculate_sma;

/// Compute the EMA series for `values` and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to an input starting at index
/// `period - 1`, so a clean series has `values.len() - period + 1` elements.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `values.len() < period` => empty vec
/// - A non-finite intermediate value ends the series; downstream consumers
///   should not trust a broken tail.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let seed = match calculate_sma(&values[..period], period).first() {
        Some(&s) if s.is_finite() => s,
        _ => return Vec::new(),
    };

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev_ema = seed;
    for &value in &values[period..] {
        let ema = (value - prev_ema) * multiplier + prev_ema;
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}
