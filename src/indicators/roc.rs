// =============================================================================
// Rate of Change (ROC): Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

/// Calculate the Rate of Change (ROC) for the given values and period.
///
/// Returns one value per input starting at index `period`.  A zero
/// reference value yields 0 instead of an infinity.
pub fn calculate_roc(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() <= period {
        return Vec::new();
    }

    values
        .iter()
        .zip(&values[period..])
        .map(|(&prev, &cur)| {
            if prev == 0.0 {
                0.0
            } else {
                ((cur - prev) / prev) * 100.0
            }
        })
        .collect()
}

/// Return the most recent ROC value.
pub fn current_roc(values: &[f64], period: usize) -> Option<f64> {
    calculate_roc(values, period).last().copied()
}
