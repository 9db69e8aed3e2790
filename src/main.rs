// =============================================================================
// Burst Scanner: Main Entry Point
// =============================================================================
//
// Periodically ranks the configured universe for volatility bursts and logs
// leaders, new ABOUT_TO_BURST / LOSING_VOL states and large score moves.
// Market data comes from a JSON snapshot (BURST_SNAPSHOT_PATH) that is
// re-read every cycle.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use burst_scanner::processor::{
    detect_significant_changes, detect_state_transitions, top_performers, ScanResult, TtlCandleCache,
};
use burst_scanner::scoring::assess_risk;
use burst_scanner::source::{select_universe, MarketDataSource, SnapshotSource};
use burst_scanner::{ScannerConfig, SymbolProcessor};

const DEFAULT_CONFIG_PATH: &str = "scanner_config.json";
const DEFAULT_SNAPSHOT_PATH: &str = "market_snapshot.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Burst Scanner: Starting Up                        ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("BURST_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = ScannerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ScannerConfig::default()
    });
    config.apply_env_overrides();
    config.validate().context("scanner config rejected")?;

    info!(
        timeframe = %config.timeframe,
        universe = %config.universe,
        min_volume_24h = config.min_volume_24h,
        refresh_ms = config.refresh_interval_ms,
        workers = config.max_concurrency,
        "Scanner configured"
    );

    // ── 2. Market data & processor ───────────────────────────────────────
    let snapshot_path =
        std::env::var("BURST_SNAPSHOT_PATH").unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.into());
    let source = Arc::new(SnapshotSource::load(&snapshot_path)?);

    let cache = Arc::new(TtlCandleCache::with_ttl(config.cache_ttl()));
    let processor = Arc::new(SymbolProcessor::with_cache(config.scoring.clone(), cache));

    // ── 3. Scan loop ─────────────────────────────────────────────────────
    let scan_config = config.clone();
    let scan_source = source.clone();
    let scan_processor = processor.clone();
    let scanner = tokio::spawn(async move {
        run_scan_loop(scan_config, scan_source, scan_processor).await;
    });

    info!("Scanner running. Press Ctrl+C to stop.");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received, stopping gracefully");
    scanner.abort();

    if let Err(e) = config.save(&config_path) {
        error!(error = %e, "Failed to save scanner config on shutdown");
    }

    info!("Burst Scanner shut down complete.");
    Ok(())
}

async fn run_scan_loop(
    config: ScannerConfig,
    source: Arc<SnapshotSource>,
    processor: Arc<SymbolProcessor>,
) {
    let mut interval = tokio::time::interval(config.refresh_interval());
    let mut previous: Vec<ScanResult> = Vec::new();

    loop {
        interval.tick().await;

        if let Err(e) = source.reload() {
            warn!(error = %e, "Snapshot reload failed, keeping previous snapshot");
        }

        match scan_once(&config, source.as_ref(), &processor).await {
            Ok(results) => {
                report(&config, &results, &previous);
                previous = results;
            }
            Err(e) => error!(error = %e, "Scan cycle failed"),
        }

        let removed = processor.clear_expired_cache();
        debug!(removed, cached = processor.get_cache_stats().size, "Candle cache swept");
    }
}

/// Fetch candles (through the cache) for the selected universe and scan it.
async fn scan_once(
    config: &ScannerConfig,
    source: &dyn MarketDataSource,
    processor: &SymbolProcessor,
) -> anyhow::Result<Vec<ScanResult>> {
    let listing = source.symbols().context("failed to list symbols")?;
    let universe = select_universe(listing, config.universe, config.min_volume_24h);

    let mut candles = HashMap::with_capacity(universe.len());
    let mut infos = HashMap::with_capacity(universe.len());
    for info in universe {
        let tf = Some(config.timeframe);
        let series = match processor.get_cached_candles(&info.symbol, tf) {
            Some(cached) => cached,
            None => match source.candles(&info.symbol, config.timeframe, config.candle_limit, None) {
                Ok(fresh) => {
                    processor.set_cached_candles(&info.symbol, tf, fresh.clone());
                    Arc::new(fresh)
                }
                Err(e) => {
                    debug!(symbol = %info.symbol, error = %e, "No candles, skipped");
                    continue;
                }
            },
        };
        candles.insert(info.symbol.clone(), series);
        infos.insert(info.symbol.clone(), info);
    }

    Ok(processor
        .process_symbols_concurrent(candles, infos, config.timeframe, config.max_concurrency)
        .await)
}

fn report(config: &ScannerConfig, results: &[ScanResult], previous: &[ScanResult]) {
    let top = top_performers(results, config.top_n);

    info!(
        scored = results.len(),
        about_to_burst = top.about_to_burst.len(),
        leader = top.by_burst_score.first().map(|r| r.symbol.as_str()).unwrap_or("-"),
        "Scan cycle complete"
    );

    for (rank, r) in top.by_burst_score.iter().enumerate() {
        debug!(
            rank = rank + 1,
            symbol = %r.symbol,
            burst_score = format!("{:.2}", r.burst.burst_score),
            state = %r.burst.state,
            leverage = r.burst.leverage_suggestion,
            "Top burst score"
        );
    }

    for r in &top.about_to_burst {
        let risk = assess_risk(&r.volatility, &r.indicators, r.timeframe);
        info!(
            symbol = %r.symbol,
            burst_score = format!("{:.2}", r.burst.burst_score),
            atr_pct = format!("{:.2}", r.indicators.atr_percent),
            leverage = r.burst.leverage_suggestion,
            risk = %risk.risk_level,
            max_leverage = risk.max_suggested_leverage,
            "ABOUT_TO_BURST"
        );
    }

    for t in detect_state_transitions(results, previous) {
        info!(
            symbol = %t.symbol,
            from = %t.from_state,
            to = %t.to_state,
            burst_score = format!("{:.2}", t.burst_score),
            "State transition"
        );
    }

    for change in detect_significant_changes(results, previous) {
        if let Some(delta) = change.burst.delta_score {
            info!(
                symbol = %change.symbol,
                delta = format!("{:+.2}", delta),
                burst_score = format!("{:.2}", change.burst.burst_score),
                "Significant burst score move"
            );
        }
    }
}
