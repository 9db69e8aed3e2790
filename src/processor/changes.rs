// =============================================================================
// Scan Diffing, Filtering and Ranking
// =============================================================================
//
// Operates on finished scan results only; nothing here recomputes indicators.
// Results are matched across scans by (symbol, timeframe).
// =============================================================================

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::scoring::{calculate_delta_score, detect_state_transition};
use crate::types::{SignalState, Timeframe};

use super::ScanResult;

/// Burst-score move (either direction) that counts as significant.
pub const SIGNIFICANT_DELTA: f64 = 10.0;

/// Default length of each top-performer list.
pub const DEFAULT_TOP_LIMIT: usize = 20;

fn index_previous(previous: &[ScanResult]) -> HashMap<(&str, Timeframe), &ScanResult> {
    previous
        .iter()
        .map(|r| ((r.symbol.as_str(), r.timeframe), r))
        .collect()
}

// =============================================================================
// Change detection
// =============================================================================

/// Results worth notifying about.
///
/// For each symbol present in both scans:
/// - the current result, when its state changed into ABOUT_TO_BURST or
///   LOSING_VOL;
/// - separately, a copy carrying `delta_score`, when the burst score moved by
///   at least [`SIGNIFICANT_DELTA`].
///
/// A symbol can therefore appear twice.
pub fn detect_significant_changes(current: &[ScanResult], previous: &[ScanResult]) -> Vec<ScanResult> {
    let previous = index_previous(previous);
    let mut changes = Vec::new();

    for result in current {
        let Some(prev) = previous.get(&(result.symbol.as_str(), result.timeframe)) else {
            continue;
        };

        if detect_state_transition(prev.burst.state, result.burst.state) {
            changes.push(result.clone());
        }

        if let Some(delta) = calculate_delta_score(&result.burst, Some(&prev.burst)) {
            if delta.abs() >= SIGNIFICANT_DELTA {
                let mut flagged = result.clone();
                flagged.burst.delta_score = Some(delta);
                changes.push(flagged);
            }
        }
    }

    changes
}

/// A symbol entering ABOUT_TO_BURST or LOSING_VOL between two scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub from_state: SignalState,
    pub to_state: SignalState,
    /// Unix milliseconds of the current result.
    pub timestamp: i64,
    pub burst_score: f64,
    pub volatility_score: f64,
}

pub fn detect_state_transitions(current: &[ScanResult], previous: &[ScanResult]) -> Vec<StateTransition> {
    let previous = index_previous(previous);

    current
        .iter()
        .filter_map(|result| {
            let prev = previous.get(&(result.symbol.as_str(), result.timeframe))?;
            if !detect_state_transition(prev.burst.state, result.burst.state) {
                return None;
            }
            Some(StateTransition {
                symbol: result.symbol.clone(),
                timeframe: result.timeframe,
                from_state: prev.burst.state,
                to_state: result.burst.state,
                timestamp: result.last_update,
                burst_score: result.burst.burst_score,
                volatility_score: result.volatility.volatility_score,
            })
        })
        .collect()
}

// =============================================================================
// Threshold filter
// =============================================================================

/// Optional lower bounds and allowed states; unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdFilter {
    pub min_burst_score: Option<f64>,
    pub min_volatility_score: Option<f64>,
    pub min_volume_surge: Option<f64>,
    pub states: Option<Vec<SignalState>>,
}

impl ThresholdFilter {
    pub fn matches(&self, result: &ScanResult) -> bool {
        if let Some(min) = self.min_burst_score {
            if result.burst.burst_score < min {
                return false;
            }
        }
        if let Some(min) = self.min_volatility_score {
            if result.volatility.volatility_score < min {
                return false;
            }
        }
        if let Some(min) = self.min_volume_surge {
            if result.volatility.volume_surge < min {
                return false;
            }
        }
        if let Some(states) = &self.states {
            if !states.contains(&result.burst.state) {
                return false;
            }
        }
        true
    }
}

pub fn filter_by_thresholds(results: &[ScanResult], filter: &ThresholdFilter) -> Vec<ScanResult> {
    results.iter().filter(|r| filter.matches(r)).cloned().collect()
}

// =============================================================================
// Top performers
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformers {
    pub by_burst_score: Vec<ScanResult>,
    pub by_volatility: Vec<ScanResult>,
    pub by_volume_surge: Vec<ScanResult>,
    pub about_to_burst: Vec<ScanResult>,
}

fn top_by<F>(results: &[ScanResult], limit: usize, key: F) -> Vec<ScanResult>
where
    F: Fn(&ScanResult) -> f64,
{
    let mut ranked: Vec<&ScanResult> = results.iter().collect();
    ranked.sort_by(|a, b| match key(b).total_cmp(&key(a)) {
        Ordering::Equal => a.symbol.cmp(&b.symbol),
        other => other,
    });
    ranked.into_iter().take(limit).cloned().collect()
}

/// Leaders by burst score, volatility score and volume surge, plus the
/// ABOUT_TO_BURST subset; every list capped at `limit`.
pub fn top_performers(results: &[ScanResult], limit: usize) -> TopPerformers {
    let bursting: Vec<ScanResult> = results
        .iter()
        .filter(|r| r.burst.state == SignalState::AboutToBurst)
        .cloned()
        .collect();

    TopPerformers {
        by_burst_score: top_by(results, limit, |r| r.burst.burst_score),
        by_volatility: top_by(results, limit, |r| r.volatility.volatility_score),
        by_volume_surge: top_by(results, limit, |r| r.volatility.volume_surge),
        about_to_burst: top_by(&bursting, limit, |r| r.burst.burst_score),
    }
}
