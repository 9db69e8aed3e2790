// =============================================================================
// Scoring Configuration
// =============================================================================
//
// Every tunable of the burst scorer in one immutable struct.  It is passed by
// reference into each scoring call so tests (and operators) can vary weights
// and thresholds without touching global state.  All fields carry serde
// defaults so a partial JSON block still loads.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::indicators::FeatureWindows;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_volatility_period() -> usize {
    20
}

fn default_momentum_roc_period() -> usize {
    3
}

fn default_volume_surge_cap() -> f64 {
    5.0
}

fn default_short_vol_lookback() -> usize {
    10
}

fn default_short_vol_period() -> usize {
    5
}

// =============================================================================
// BurstWeights
// =============================================================================

/// Component weights of the raw burst score.  The four core weights must sum
/// to 1.0; `trend_quality` is a non-negative add-on on top of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstWeights {
    pub volatility: f64,
    pub volume_surge: f64,
    pub breakout: f64,
    pub momentum: f64,
    /// Add-on outside the core sum; zero drops ADX from the blend.
    pub trend_quality: f64,
}

impl Default for BurstWeights {
    fn default() -> Self {
        Self {
            volatility: 0.35,
            volume_surge: 0.30,
            breakout: 0.20,
            momentum: 0.15,
            trend_quality: 0.10,
        }
    }
}

impl BurstWeights {
    /// Sum of the core weights (trend quality excluded).
    pub fn core_sum(&self) -> f64 {
        self.volatility + self.volume_surge + self.breakout + self.momentum
    }
}

// =============================================================================
// StateThresholds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutToBurstThresholds {
    pub burst_score: f64,
    pub volume_surge_min: f64,
    pub breakout_proximity_min: f64,
    /// Short-vol samples spanned by the rising-volatility check.
    pub volatility_trend_bars: usize,
}

impl Default for AboutToBurstThresholds {
    fn default() -> Self {
        Self {
            burst_score: 75.0,
            volume_surge_min: 0.6,
            breakout_proximity_min: 0.6,
            volatility_trend_bars: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatileThresholds {
    pub volatility_z_score: f64,
    pub atr_percent_min: f64,
}

impl Default for VolatileThresholds {
    fn default() -> Self {
        Self {
            volatility_z_score: 1.5,
            atr_percent_min: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LosingVolThresholds {
    /// Short-vol samples spanned by the collapse check.
    pub volatility_drop_bars: usize,
    /// Relative drop (0-1) that counts as a collapse.
    pub volatility_drop_threshold: f64,
}

impl Default for LosingVolThresholds {
    fn default() -> Self {
        Self {
            volatility_drop_bars: 5,
            volatility_drop_threshold: 0.8,
        }
    }
}

/// Thresholds of the four-state classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateThresholds {
    #[serde(default)]
    pub about_to_burst: AboutToBurstThresholds,
    #[serde(default)]
    pub volatile: VolatileThresholds,
    #[serde(default)]
    pub losing_vol: LosingVolThresholds,
    /// Trailing closes feeding the short realized-volatility series.
    #[serde(default = "default_short_vol_lookback")]
    pub short_vol_lookback: usize,
    /// Window of the short realized-volatility series.
    #[serde(default = "default_short_vol_period")]
    pub short_vol_period: usize,
}

impl Default for StateThresholds {
    fn default() -> Self {
        Self {
            about_to_burst: AboutToBurstThresholds::default(),
            volatile: VolatileThresholds::default(),
            losing_vol: LosingVolThresholds::default(),
            short_vol_lookback: default_short_vol_lookback(),
            short_vol_period: default_short_vol_period(),
        }
    }
}

// =============================================================================
// LeverageTable
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageTier {
    /// Inclusive upper bound on ATR%.
    pub max_atr_percent: f64,
    pub leverage: u32,
}

/// ATR% → leverage tiers, ordered by ascending `max_atr_percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageTable {
    tiers: Vec<LeverageTier>,
    /// Used when ATR% exceeds every tier.
    fallback: u32,
}

impl Default for LeverageTable {
    fn default() -> Self {
        Self::new(
            vec![
                LeverageTier { max_atr_percent: 0.5, leverage: 10 },
                LeverageTier { max_atr_percent: 0.8, leverage: 7 },
                LeverageTier { max_atr_percent: 1.2, leverage: 6 },
            ],
            5,
        )
    }
}

impl LeverageTable {
    /// Build a table; tiers are sorted ascending regardless of input order.
    pub fn new(mut tiers: Vec<LeverageTier>, fallback: u32) -> Self {
        tiers.sort_by(|a, b| a.max_atr_percent.total_cmp(&b.max_atr_percent));
        Self { tiers, fallback }
    }

    pub fn tiers(&self) -> &[LeverageTier] {
        &self.tiers
    }

    pub fn fallback(&self) -> u32 {
        self.fallback
    }

    /// First tier (ascending) whose bound is >= `atr_percent`.
    pub fn lookup(&self, atr_percent: f64) -> u32 {
        self.tiers
            .iter()
            .find(|t| atr_percent <= t.max_atr_percent)
            .map(|t| t.leverage)
            .unwrap_or(self.fallback)
    }

    fn is_ascending(&self) -> bool {
        self.tiers
            .windows(2)
            .all(|w| w[0].max_atr_percent < w[1].max_atr_percent)
    }
}

// =============================================================================
// ScoringConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub feature_windows: FeatureWindows,

    #[serde(default)]
    pub weights: BurstWeights,

    #[serde(default)]
    pub thresholds: StateThresholds,

    #[serde(default)]
    pub leverage: LeverageTable,

    /// Window of the realized volatility used for universe comparison.
    #[serde(default = "default_volatility_period")]
    pub volatility_period: usize,

    /// Look-back of the ROC blended into momentum.
    #[serde(default = "default_momentum_roc_period")]
    pub momentum_roc_period: usize,

    /// Volume surge that maps to a normalised value of 1.0.
    #[serde(default = "default_volume_surge_cap")]
    pub volume_surge_cap: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            feature_windows: FeatureWindows::default(),
            weights: BurstWeights::default(),
            thresholds: StateThresholds::default(),
            leverage: LeverageTable::default(),
            volatility_period: default_volatility_period(),
            momentum_roc_period: default_momentum_roc_period(),
            volume_surge_cap: default_volume_surge_cap(),
        }
    }
}

impl ScoringConfig {
    /// Reject configurations the scorer cannot honour.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        let parts = [w.volatility, w.volume_surge, w.breakout, w.momentum, w.trend_quality];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(ScanError::InvalidConfig(
                "burst weights must be finite and non-negative".into(),
            ));
        }
        if (w.core_sum() - 1.0).abs() > 1e-9 {
            return Err(ScanError::InvalidConfig(format!(
                "core burst weights must sum to 1.0, got {:.6}",
                w.core_sum()
            )));
        }
        if !self.leverage.is_ascending() {
            return Err(ScanError::InvalidConfig(
                "leverage tiers must be strictly ascending by ATR%".into(),
            ));
        }
        if self.volatility_period < 2 || self.thresholds.short_vol_period < 2 {
            return Err(ScanError::InvalidConfig(
                "volatility periods must be at least 2".into(),
            ));
        }
        if self.momentum_roc_period == 0 {
            return Err(ScanError::InvalidConfig("momentum ROC period must be positive".into()));
        }
        if !(self.volume_surge_cap > 0.0) {
            return Err(ScanError::InvalidConfig("volume surge cap must be positive".into()));
        }
        let t = &self.thresholds;
        if t.about_to_burst.volatility_trend_bars < 2 || t.losing_vol.volatility_drop_bars < 2 {
            return Err(ScanError::InvalidConfig(
                "volatility trend / drop spans must be at least 2 samples".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_core_weights_sum_to_one() {
        let w = BurstWeights::default();
        assert!((w.core_sum() - 1.0).abs() < 1e-12);
        assert_eq!(w.trend_quality, 0.10);
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let mut cfg = ScoringConfig::default();
        cfg.weights.momentum = 0.5;
        assert!(matches!(cfg.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn trend_weight_is_an_add_on() {
        let mut cfg = ScoringConfig::default();
        cfg.weights.trend_quality = 0.0;
        assert!(cfg.validate().is_ok());

        cfg.weights.trend_quality = 0.4;
        assert!(cfg.validate().is_ok());

        cfg.weights.trend_quality = -0.1;
        assert!(matches!(cfg.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn leverage_lookup_ascending() {
        let table = LeverageTable::default();
        assert_eq!(table.lookup(0.3), 10);
        assert_eq!(table.lookup(0.5), 10);
        assert_eq!(table.lookup(0.6), 7);
        assert_eq!(table.lookup(1.0), 6);
        assert_eq!(table.lookup(5.0), 5);
    }

    #[test]
    fn leverage_table_sorts_unordered_input() {
        let table = LeverageTable::new(
            vec![
                LeverageTier { max_atr_percent: 1.2, leverage: 6 },
                LeverageTier { max_atr_percent: 0.5, leverage: 10 },
                LeverageTier { max_atr_percent: 0.8, leverage: 7 },
            ],
            5,
        );
        assert_eq!(table, LeverageTable::default());
        assert_eq!(table.lookup(0.3), 10);
    }

    #[test]
    fn unordered_leverage_json_is_rejected() {
        let json = r#"{ "leverage": { "tiers": [
            { "max_atr_percent": 0.8, "leverage": 7 },
            { "max_atr_percent": 0.5, "leverage": 10 }
        ], "fallback": 5 } }"#;
        let cfg: ScoringConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ScoringConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ScoringConfig::default());
    }

    #[test]
    fn deserialise_partial_thresholds() {
        let json = r#"{ "thresholds": { "volatile": { "atr_percent_min": 2.0 } } }"#;
        let cfg: ScoringConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.thresholds.volatile.atr_percent_min, 2.0);
        assert_eq!(cfg.thresholds.volatile.volatility_z_score, 1.5);
        assert_eq!(cfg.thresholds.about_to_burst.burst_score, 75.0);
        assert_eq!(cfg.thresholds.short_vol_lookback, 10);
    }
}
