// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the burst scorer.  Series calculators take slices and return `Vec<f64>`
// (empty on insufficient data); every window is trailing and inclusive of the
// current index, so composed indicators line up element for element.  The
// snapshot builder is the single place where an empty series becomes an
// explicit `ScanError`.

pub mod adx;
pub mod atr;
pub mod donchian;
pub mod ema;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod stats;
pub mod volatility;

pub use adx::{calculate_adx, AdxSeries};
pub use atr::{calculate_atr, calculate_atr_pct};
pub use donchian::{calculate_donchian, DonchianChannel};
pub use ema::calculate_ema;
pub use roc::calculate_roc;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use snapshot::{calculate_indicators, FeatureWindows, IndicatorSnapshot};
pub use stats::{calculate_std_dev, mad, median, normalize, z_score};
pub use volatility::calculate_realized_volatility;
