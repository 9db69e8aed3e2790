// =============================================================================
// Shared types used across the burst scanner
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Candle interval the scanner evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::OneMinute
    }
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Self::OneMinute),
            "5m" => Ok(Self::FiveMinutes),
            other => Err(format!("unsupported timeframe '{other}' (expected 1m or 5m)")),
        }
    }
}

/// Discrete burst classification of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalState {
    /// High composite score, participation spike, and short-term volatility
    /// turning up.
    AboutToBurst,
    /// Already trading with elevated volatility.
    Volatile,
    /// Short-term realized volatility collapsing.
    LosingVol,
    Normal,
}

impl Default for SignalState {
    fn default() -> Self {
        Self::Normal
    }
}

impl std::fmt::Display for SignalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AboutToBurst => write!(f, "ABOUT_TO_BURST"),
            Self::Volatile => write!(f, "VOLATILE"),
            Self::LosingVol => write!(f, "LOSING_VOL"),
            Self::Normal => write!(f, "NORMAL"),
        }
    }
}

/// Which slice of the exchange listing the scanner ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Universe {
    /// Top 200 contracts by open interest.
    #[serde(rename = "oi200")]
    OpenInterest200,
    /// Top 50 contracts by 24h price change.
    #[serde(rename = "gainers50")]
    Gainers50,
}

impl Default for Universe {
    fn default() -> Self {
        Self::OpenInterest200
    }
}

impl Universe {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenInterest200 => "oi200",
            Self::Gainers50 => "gainers50",
        }
    }

    /// Maximum number of symbols kept after ranking.
    pub fn size(self) -> usize {
        match self {
            Self::OpenInterest200 => 200,
            Self::Gainers50 => 50,
        }
    }
}

impl std::fmt::Display for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Universe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "oi200" => Ok(Self::OpenInterest200),
            "gainers50" => Ok(Self::Gainers50),
            other => Err(format!("unsupported universe '{other}' (expected oi200 or gainers50)")),
        }
    }
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
