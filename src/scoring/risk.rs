// =============================================================================
// Risk Assessment: advisory risk level and leverage cap
// =============================================================================
//
// Additive risk points:
//   1. Volatility z-score: +3 above 2.0, +2 above 1.5
//   2. ATR%: +2 above 2.0, +1 above 1.2
//   3. Volume surge: +2 above 10x, +1 above 5x
//   4. Timeframe: +1 on 1m
//
// Points map onto a level and a maximum suggested leverage:
//   >= 6 EXTREME (3x) | >= 4 HIGH (5x) | >= 2 MEDIUM (7x) | else LOW (10x)
//
// Advisory only: nothing in the scan pipeline gates on it.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;
use crate::types::Timeframe;

use super::config::LeverageTable;
use super::metrics::VolatilityMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    fn from_points(points: u32) -> Self {
        match points {
            p if p >= 6 => RiskLevel::Extreme,
            p if p >= 4 => RiskLevel::High,
            p if p >= 2 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Leverage ceiling advised at this level.
    pub fn max_leverage(self) -> u32 {
        match self {
            RiskLevel::Extreme => 3,
            RiskLevel::High => 5,
            RiskLevel::Medium => 7,
            RiskLevel::Low => 10,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Extreme => write!(f, "EXTREME"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// Human-readable name of every factor that contributed points.
    pub risk_factors: Vec<String>,
    pub max_suggested_leverage: u32,
}

/// Score the advisory risk of trading a symbol right now.
pub fn assess_risk(
    volatility: &VolatilityMetrics,
    indicators: &IndicatorSnapshot,
    timeframe: Timeframe,
) -> RiskAssessment {
    let mut factors = Vec::new();
    let mut points = 0u32;

    if volatility.volatility_z_score > 2.0 {
        factors.push("Extreme volatility".to_string());
        points += 3;
    } else if volatility.volatility_z_score > 1.5 {
        factors.push("High volatility".to_string());
        points += 2;
    }

    if indicators.atr_percent > 2.0 {
        factors.push("Very high ATR".to_string());
        points += 2;
    } else if indicators.atr_percent > 1.2 {
        factors.push("High ATR".to_string());
        points += 1;
    }

    if volatility.volume_surge > 10.0 {
        factors.push("Extreme volume surge".to_string());
        points += 2;
    } else if volatility.volume_surge > 5.0 {
        factors.push("High volume surge".to_string());
        points += 1;
    }

    if timeframe == Timeframe::OneMinute {
        factors.push("Short timeframe".to_string());
        points += 1;
    }

    let risk_level = RiskLevel::from_points(points);
    RiskAssessment {
        risk_level,
        risk_factors: factors,
        max_suggested_leverage: risk_level.max_leverage(),
    }
}

/// Leverage suggestion for an ATR% reading.
pub fn calculate_leverage_suggestion(atr_percent: f64, table: &LeverageTable) -> u32 {
    table.lookup(atr_percent)
}
