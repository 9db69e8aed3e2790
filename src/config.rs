// =============================================================================
// Scanner Configuration: JSON file + environment overrides with atomic save
// =============================================================================
//
// Everything the daemon can be tuned with: universe selection, refresh
// cadence, cache TTL, worker count, and the nested scoring config.  All
// fields carry `#[serde(default)]` so older files keep loading as fields are
// added.
//
// Precedence: defaults < JSON file < environment variables.
// =============================================================================

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::processor::DEFAULT_TOP_LIMIT;
use crate::scoring::ScoringConfig;
use crate::types::{Timeframe, Universe};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_min_volume_24h() -> f64 {
    500_000.0
}

fn default_refresh_interval_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_max_concurrency() -> usize {
    8
}

fn default_top_n() -> usize {
    DEFAULT_TOP_LIMIT
}

fn default_candle_limit() -> usize {
    200
}

// =============================================================================
// ScannerConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    // --- Universe ------------------------------------------------------------

    #[serde(default)]
    pub timeframe: Timeframe,

    #[serde(default)]
    pub universe: Universe,

    /// Symbols trading less than this (quote volume, 24h) are not scanned.
    #[serde(default = "default_min_volume_24h")]
    pub min_volume_24h: f64,

    /// Candles requested per symbol and refresh.
    #[serde(default = "default_candle_limit")]
    pub candle_limit: usize,

    // --- Runtime -------------------------------------------------------------

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Worker cap of the concurrent scan.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Length of each logged top-performer list.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    // --- Scoring -------------------------------------------------------------

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            universe: Universe::default(),
            min_volume_24h: default_min_volume_24h(),
            candle_limit: default_candle_limit(),
            refresh_interval_ms: default_refresh_interval_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_concurrency: default_max_concurrency(),
            top_n: default_top_n(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Parse `raw` into `target`, keeping the old value (with a warning) when it
/// does not parse.
fn override_from<T>(name: &str, raw: Option<String>, target: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else { return };
    match raw.trim().parse::<T>() {
        Ok(v) => *target = v,
        Err(e) => warn!(var = name, value = %raw, error = %e, "ignoring invalid environment override"),
    }
}

impl ScannerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or malformed file is an error so the caller can fall back
    /// to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scanner config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scanner config from {}", path.display()))?;

        info!(
            path = %path.display(),
            timeframe = %config.timeframe,
            universe = %config.universe,
            "scanner config loaded"
        );

        Ok(config)
    }

    /// Persist to `path` atomically (write `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise scanner config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "scanner config saved (atomic)");
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any `name -> value` lookup.
    ///
    /// | variable                 | field                                        |
    /// |--------------------------|----------------------------------------------|
    /// | `BURST_THRESHOLD`        | `scoring.thresholds.about_to_burst.burst_score` |
    /// | `VOLATILITY_THRESHOLD`   | `scoring.thresholds.volatile.volatility_z_score` |
    /// | `VOLUME_SURGE_THRESHOLD` | `scoring.thresholds.about_to_burst.volume_surge_min` |
    /// | `DEFAULT_TIMEFRAME`      | `timeframe`                                  |
    /// | `DEFAULT_UNIVERSE`       | `universe`                                   |
    /// | `MIN_VOLUME_24H`         | `min_volume_24h`                             |
    /// | `REFRESH_INTERVAL`       | `refresh_interval_ms`                        |
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let thresholds = &mut self.scoring.thresholds;
        override_from("BURST_THRESHOLD", lookup("BURST_THRESHOLD"), &mut thresholds.about_to_burst.burst_score);
        override_from(
            "VOLATILITY_THRESHOLD",
            lookup("VOLATILITY_THRESHOLD"),
            &mut thresholds.volatile.volatility_z_score,
        );
        override_from(
            "VOLUME_SURGE_THRESHOLD",
            lookup("VOLUME_SURGE_THRESHOLD"),
            &mut thresholds.about_to_burst.volume_surge_min,
        );
        override_from("DEFAULT_TIMEFRAME", lookup("DEFAULT_TIMEFRAME"), &mut self.timeframe);
        override_from("DEFAULT_UNIVERSE", lookup("DEFAULT_UNIVERSE"), &mut self.universe);
        override_from("MIN_VOLUME_24H", lookup("MIN_VOLUME_24H"), &mut self.min_volume_24h);
        override_from("REFRESH_INTERVAL", lookup("REFRESH_INTERVAL"), &mut self.refresh_interval_ms);
    }

    /// Reject settings the daemon cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate().context("invalid scoring config")?;
        anyhow::ensure!(self.refresh_interval_ms > 0, "refresh_interval_ms must be positive");
        anyhow::ensure!(self.max_concurrency > 0, "max_concurrency must be positive");
        anyhow::ensure!(
            self.min_volume_24h.is_finite() && self.min_volume_24h >= 0.0,
            "min_volume_24h must be a non-negative number"
        );
        let needed = self.scoring.feature_windows.min_candles();
        anyhow::ensure!(
            self.candle_limit >= needed,
            "candle_limit {} is below the {} candles scoring needs",
            self.candle_limit,
            needed
        );
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
