// =============================================================================
// Burst Scoring Module
// =============================================================================
//
// Stateless scoring over an indicator snapshot:
//
//   metrics: five normalised burst components (+ universe z-score)
//   burst: weighted blend, tanh squash, BurstAnalysis assembly
//   state: four-state first-match classifier and transition check
//   risk: advisory risk level and leverage cap
//   config: weights, thresholds, leverage tiers
//
// Every entry point takes `&ScoringConfig`; nothing here keeps state between
// calls.

pub mod burst;
pub mod config;
pub mod metrics;
pub mod risk;
pub mod state;

pub use burst::{
    analyze, burst_from_metrics, calculate_burst_score, calculate_delta_score,
    calculate_raw_burst_score, normalize_burst_score, BurstAnalysis,
};
pub use config::{
    AboutToBurstThresholds, BurstWeights, LeverageTable, LeverageTier, LosingVolThresholds,
    ScoringConfig, StateThresholds, VolatileThresholds,
};
pub use metrics::{calculate_volatility_metrics, universe_stats, VolatilityMetrics};
pub use risk::{assess_risk, calculate_leverage_suggestion, RiskAssessment, RiskLevel};
pub use state::{detect_state_transition, determine_signal_state};
