// =============================================================================
// Realized Volatility
// =============================================================================
//
// Rolling annualised standard deviation of log returns:
//
//   r_t   = ln(close_t / close_{t-1})
//   var   = Σ (r - mean)² / (period - 1)      (sample variance)
//   vol_t = sqrt(var * 252)
//
// One value per trailing window of `period` returns.
// =============================================================================

const ANNUALISATION_FACTOR: f64 = 252.0;

/// Log returns of consecutive closes (`closes.len() - 1` values).
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Rolling realized volatility over `period` returns.
///
/// Returns `closes.len() - period` values.  Empty when `period < 2` (sample
/// variance is undefined) or there are fewer than `period + 1` closes.
/// Non-positive prices produce non-finite values; callers validate.
pub fn calculate_realized_volatility(closes: &[f64], period: usize) -> Vec<f64> {
    if period < 2 || closes.len() < period + 1 {
        return Vec::new();
    }

    let period_f = period as f64;
    log_returns(closes)
        .windows(period)
        .map(|w| {
            let mean = w.iter().sum::<f64>() / period_f;
            let variance = w.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (period_f - 1.0);
            (variance * ANNUALISATION_FACTOR).sqrt()
        })
        .collect()
}

/// Latest realized volatility, if computable.
pub fn current_realized_volatility(closes: &[f64], period: usize) -> Option<f64> {
    calculate_realized_volatility(closes, period).last().copied()
}
