// =============================================================================
// Statistical helpers
// =============================================================================
//
// Dispersion and normalisation primitives shared by the indicators and the
// cross-sectional (universe) scoring.  Median / MAD are used instead of mean /
// standard deviation when comparing a symbol against the universe so that a
// handful of extreme symbols cannot drag the reference point.

/// Population standard deviation of every trailing window of `period`
/// values (divides by `period`).
pub fn calculate_std_dev(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    values
        .windows(period)
        .map(|w| {
            let mean = w.iter().sum::<f64>() / period_f;
            let variance = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f;
            variance.sqrt()
        })
        .collect()
}

/// `(value - mean) / std_dev`, defined as 0 when `std_dev` is 0.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        (value - mean) / std_dev
    }
}

/// Median of `values` (mean of the two middle elements for even lengths).
///
/// `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median absolute deviation from the median.
pub fn mad(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Map ℝ onto [0, 1] with `0.5 + 0.5 * tanh(value / scale)`.
///
/// Monotonic non-decreasing in `value`; `normalize(0.0, s) == 0.5`.
pub fn normalize(value: f64, scale: f64) -> f64 {
    let n = 0.5 + 0.5 * (value / scale).tanh();
    if n.is_nan() {
        return 0.5;
    }
    n.clamp(0.0, 1.0)
}
