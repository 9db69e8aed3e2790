// =============================================================================
// Donchian Channel
// =============================================================================
//
// Rolling price envelope over a fixed look-back:
//   upper  = max(high) over the window
//   lower  = min(low)  over the window
//   middle = (upper + lower) / 2
//
// The scorer measures breakout proximity against the upper band.

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;

/// Donchian bands, one entry per trailing window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonchianChannel {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub middle: Vec<f64>,
}

/// Compute the Donchian channel over `period` candles.
///
/// Each band has `candles.len() - period + 1` values; all are empty when
/// `period` is zero or longer than the input.
pub fn calculate_donchian(candles: &[Candle], period: usize) -> DonchianChannel {
    if period == 0 || candles.len() < period {
        return DonchianChannel::default();
    }

    let windows = candles.len() - period + 1;
    let mut channel = DonchianChannel {
        high: Vec::with_capacity(windows),
        low: Vec::with_capacity(windows),
        middle: Vec::with_capacity(windows),
    };

    for window in candles.windows(period) {
        let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        channel.high.push(high);
        channel.low.push(low);
        channel.middle.push((high + low) / 2.0);
    }

    channel
}
