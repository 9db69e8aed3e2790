// =============================================================================
// Cross-sectional Scan
// =============================================================================
//
// Pass 1: every symbol with enough candles contributes its latest realized
//         volatility to the universe sample.
// Pass 2: every symbol with metadata is scored against the COMPLETE sample.
//
// The concurrent variant runs both passes on a bounded blocking pool and
// awaits every pass-1 task before any pass-2 task is spawned, so each symbol
// sees the same universe as in the sequential scan.  Per-symbol failures are
// logged and skipped; they never abort the batch.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{Result, ScanError};
use crate::indicators::calculate_indicators;
use crate::indicators::volatility::current_realized_volatility;
use crate::market_data::{closes, Candle, SymbolInfo};
use crate::scoring::{analyze, ScoringConfig};
use crate::types::Timeframe;

use super::{ScanResult, SymbolProcessor};

/// Latest realized volatility of `candles`, or `None` when the symbol is too
/// short to join the universe sample.
pub fn universe_sample(candles: &[Candle], config: &ScoringConfig) -> Option<f64> {
    if candles.len() < config.feature_windows.min_candles() {
        return None;
    }
    current_realized_volatility(&closes(candles), config.volatility_period).filter(|v| v.is_finite())
}

/// Score one symbol against a universe sample.
pub fn evaluate_symbol(
    symbol: &str,
    candles: &[Candle],
    symbol_info: &SymbolInfo,
    universe: &[f64],
    timeframe: Timeframe,
    config: &ScoringConfig,
) -> Result<ScanResult> {
    let indicators = calculate_indicators(candles, &config.feature_windows)?;
    let (volatility, burst) = analyze(candles, &indicators, universe, config)?;
    let last_update = burst.last_update;

    Ok(ScanResult {
        symbol: symbol.to_string(),
        timeframe,
        indicators,
        volatility,
        burst,
        symbol_info: symbol_info.clone(),
        last_update,
    })
}

/// Descending burst score; ties broken by symbol.
pub fn sort_by_burst(results: &mut [ScanResult]) {
    results.sort_by(|a, b| {
        b.burst
            .burst_score
            .total_cmp(&a.burst.burst_score)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

fn log_skip(symbol: &str, err: &ScanError) {
    if err.is_insufficient_data() {
        debug!(symbol = %symbol, error = %err, "symbol skipped");
    } else {
        warn!(symbol = %symbol, error = %err, "symbol scoring failed, skipped");
    }
}

impl SymbolProcessor {
    /// Two-pass scan of every symbol in `candles`.
    ///
    /// Symbols without metadata or with fewer than [`Self::min_candles`]
    /// candles are left out of the result.
    pub fn process_symbols(
        &self,
        candles: &HashMap<String, Vec<Candle>>,
        symbol_info: &HashMap<String, SymbolInfo>,
        timeframe: Timeframe,
    ) -> Vec<ScanResult> {
        let config = self.config();

        // --- Pass 1: universe sample -----------------------------------------
        let universe: Vec<f64> = candles
            .values()
            .filter_map(|series| universe_sample(series, config))
            .collect();

        // --- Pass 2: score against the full universe -------------------------
        let mut results = Vec::with_capacity(candles.len());
        for (symbol, series) in candles {
            let Some(info) = symbol_info.get(symbol) else {
                debug!(symbol = %symbol, "no symbol metadata, skipped");
                continue;
            };
            match evaluate_symbol(symbol, series, info, &universe, timeframe, config) {
                Ok(result) => results.push(result),
                Err(e) => log_skip(symbol, &e),
            }
        }

        sort_by_burst(&mut results);
        debug!(
            timeframe = %timeframe,
            symbols = candles.len(),
            universe = universe.len(),
            scored = results.len(),
            "scan complete"
        );
        results
    }

    /// [`Self::process_symbols`] on a blocking pool of at most
    /// `max_concurrency` workers.
    pub async fn process_symbols_concurrent(
        &self,
        candles: HashMap<String, Arc<Vec<Candle>>>,
        symbol_info: HashMap<String, SymbolInfo>,
        timeframe: Timeframe,
        max_concurrency: usize,
    ) -> Vec<ScanResult> {
        let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

        // --- Pass 1: universe sample -----------------------------------------
        let mut pass1 = Vec::with_capacity(candles.len());
        for (symbol, series) in &candles {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            let config = Arc::clone(&self.config);
            let series = Arc::clone(series);
            let symbol = symbol.clone();
            pass1.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                (symbol, universe_sample(&series, &config))
            }));
        }

        // Barrier: the universe must be complete before anything is scored.
        let mut universe = Vec::with_capacity(pass1.len());
        for handle in pass1 {
            match handle.await {
                Ok((_, Some(v))) => universe.push(v),
                Ok((symbol, None)) => debug!(symbol = %symbol, "not enough candles for universe sample"),
                Err(e) => warn!(error = %e, "universe task failed"),
            }
        }
        let universe = Arc::new(universe);

        // --- Pass 2: score against the full universe -------------------------
        let mut pass2 = Vec::with_capacity(candles.len());
        for (symbol, series) in candles {
            let Some(info) = symbol_info.get(&symbol).cloned() else {
                debug!(symbol = %symbol, "no symbol metadata, skipped");
                continue;
            };
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            let config = Arc::clone(&self.config);
            let universe = Arc::clone(&universe);
            pass2.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let outcome = evaluate_symbol(&symbol, &series, &info, &universe, timeframe, &config);
                (symbol, outcome)
            }));
        }

        let mut results = Vec::with_capacity(pass2.len());
        for handle in pass2 {
            match handle.await {
                Ok((_, Ok(result))) => results.push(result),
                Ok((symbol, Err(e))) => log_skip(&symbol, &e),
                Err(e) => warn!(error = %e, "scoring task failed"),
            }
        }

        sort_by_burst(&mut results);
        info!(
            timeframe = %timeframe,
            universe = universe.len(),
            scored = results.len(),
            workers = max_concurrency.max(1),
            "concurrent scan complete"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize, amplitude: f64, phase: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + ((i as f64 + phase) * 0.8).sin() * amplitude + i as f64 * 0.05;
                Candle {
                    timestamp: i as i64 * 60_000,
                    open: base - 0.1,
                    high: base + amplitude * 0.3 + 0.2,
                    low: base - amplitude * 0.3 - 0.2,
                    close: base,
                    volume: 1_000.0 + ((i as f64 + phase) * 1.3).cos().abs() * 400.0,
                }
            })
            .collect()
    }

    fn info(symbol: &str) -> SymbolInfo {
        SymbolInfo {
            symbol: symbol.to_string(),
            volume_24h: 5_000_000.0,
            last_price: 100.0,
            price_change_24h: 1.0,
            price_change_percent_24h: 1.0,
            open_interest: None,
            funding_rate: None,
        }
    }

    fn universe(entries: &[(&str, Vec<Candle>)]) -> (HashMap<String, Vec<Candle>>, HashMap<String, SymbolInfo>) {
        let candles = entries.iter().map(|(s, c)| (s.to_string(), c.clone())).collect();
        let infos = entries.iter().map(|(s, _)| (s.to_string(), info(s))).collect();
        (candles, infos)
    }

    #[test]
    fn short_symbols_are_excluded() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let (candles, infos) = universe(&[("SHORT_USDT", series(40, 1.0, 0.0)), ("LONG_USDT", series(60, 1.0, 0.0))]);

        let results = processor.process_symbols(&candles, &infos, Timeframe::OneMinute);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "LONG_USDT");
        assert_eq!(results[0].timeframe, Timeframe::OneMinute);
        // Universe holds only LONG_USDT itself: zero dispersion, z = 0.
        assert_eq!(results[0].volatility.volatility_z_score, 0.0);
        assert_eq!(results[0].volatility.volatility_score, 50.0);
    }

    #[test]
    fn symbols_without_metadata_are_skipped() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let (candles, mut infos) = universe(&[("A_USDT", series(60, 1.0, 0.0)), ("B_USDT", series(60, 2.0, 1.0))]);
        infos.remove("B_USDT");

        let results = processor.process_symbols(&candles, &infos, Timeframe::FiveMinutes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "A_USDT");
        // B_USDT still counted in the universe: non-degenerate dispersion.
        assert!(results[0].volatility.volatility_z_score != 0.0);
    }

    #[test]
    fn results_sorted_descending_with_symbol_tiebreak() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let (candles, infos) = universe(&[
            ("ZZZ_USDT", series(80, 1.0, 0.0)),
            ("AAA_USDT", series(80, 1.0, 0.0)),
            ("MID_USDT", series(80, 3.0, 2.0)),
            ("LOW_USDT", series(80, 0.2, 4.0)),
        ]);

        let results = processor.process_symbols(&candles, &infos, Timeframe::OneMinute);
        assert_eq!(results.len(), 4);
        for pair in results.windows(2) {
            assert!(pair[0].burst.burst_score >= pair[1].burst.burst_score);
        }
        let aaa = results.iter().position(|r| r.symbol == "AAA_USDT").unwrap();
        let zzz = results.iter().position(|r| r.symbol == "ZZZ_USDT").unwrap();
        assert_eq!(zzz, aaa + 1);
    }

    #[test]
    fn non_finite_series_is_skipped_not_fatal() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let mut broken = series(60, 1.0, 0.0);
        broken[58].close = f64::NAN;
        let (candles, infos) = universe(&[("BROKEN_USDT", broken), ("OK_USDT", series(60, 1.0, 3.0))]);

        let results = processor.process_symbols(&candles, &infos, Timeframe::OneMinute);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "OK_USDT");
    }

    #[test]
    fn empty_input_yields_empty_scan() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let results = processor.process_symbols(&HashMap::new(), &HashMap::new(), Timeframe::OneMinute);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn concurrent_scan_matches_sequential() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let (candles, infos) = universe(&[
            ("A_USDT", series(70, 1.0, 0.0)),
            ("B_USDT", series(70, 2.5, 1.0)),
            ("C_USDT", series(70, 0.4, 2.0)),
            ("D_USDT", series(45, 1.0, 3.0)),
            ("E_USDT", series(90, 4.0, 5.0)),
        ]);

        let sequential = processor.process_symbols(&candles, &infos, Timeframe::OneMinute);

        let shared: HashMap<String, Arc<Vec<Candle>>> =
            candles.into_iter().map(|(s, c)| (s, Arc::new(c))).collect();
        let concurrent = processor
            .process_symbols_concurrent(shared, infos, Timeframe::OneMinute, 2)
            .await;

        assert_eq!(sequential.len(), 4);
        assert_eq!(concurrent.len(), sequential.len());
        for (s, c) in sequential.iter().zip(&concurrent) {
            assert_eq!(s.symbol, c.symbol);
            assert_eq!(s.volatility, c.volatility);
            assert_eq!(s.burst.burst_score, c.burst.burst_score);
            assert_eq!(s.burst.state, c.burst.state);
        }
    }

    #[tokio::test]
    async fn concurrent_scan_with_zero_workers_still_runs() {
        let processor = SymbolProcessor::new(ScoringConfig::default());
        let mut candles = HashMap::new();
        candles.insert("A_USDT".to_string(), Arc::new(series(60, 1.0, 0.0)));
        let mut infos = HashMap::new();
        infos.insert("A_USDT".to_string(), info("A_USDT"));

        let results = processor
            .process_symbols_concurrent(candles, infos, Timeframe::FiveMinutes, 0)
            .await;
        assert_eq!(results.len(), 1);
    }
}
