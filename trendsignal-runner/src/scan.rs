//! Replay of historical candles through the engine.
//!
//! A scan feeds the series one closed bar at a time, through the same
//! rolling window the live cycle would fetch, and lists every signal the
//! cycle would have emitted. There are no fills and no position tracking.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;
use trendsignal_core::{
    CandleSeries, ConfigError, EngineConfig, EngineError, Evaluation, Signal, SignalEngine,
};

/// Every signal emitted while replaying `series` bar by bar.
///
/// `window` is the live fetch size. When the config drops a forming bar
/// the replay evaluates the `window - 1` closed candles the cycle would
/// have seen, with every bar already closed. A window too small to ever
/// hold `min_history` closed candles is a config error.
pub fn replay(series: &CandleSeries, config: &EngineConfig, window: usize) -> Result<Vec<Signal>, EngineError> {
    let closed_window = if config.exclude_forming_bar {
        window.saturating_sub(1)
    } else {
        window
    };
    let mut engine = SignalEngine::new(EngineConfig {
        exclude_forming_bar: false,
        ..config.clone()
    })?;
    if closed_window < config.min_history {
        return Err(ConfigError::InvalidParameter {
            name: "window",
            reason: format!(
                "{window} candles leave {closed_window} closed, below min_history ({})",
                config.min_history
            ),
        }
        .into());
    }

    let mut signals = Vec::new();
    for end in config.min_history..=series.len() {
        let start = end.saturating_sub(closed_window);
        if let Evaluation::Ready(report) = engine.evaluate_range(series, start..end)? {
            signals.extend(report.signal);
        }
    }
    Ok(signals)
}

/// One instrument to replay.
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub symbol: String,
    pub series: CandleSeries,
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub symbol: String,
    pub bars: usize,
    pub signals: Vec<Signal>,
}

/// Replay several instruments in parallel, one engine each. Results keep
/// the order of `jobs`.
pub fn scan_many(
    jobs: &[ScanJob],
    config: &EngineConfig,
    window: usize,
) -> Vec<(String, Result<ScanReport, EngineError>)> {
    jobs.par_iter()
        .map(|job| {
            let result = replay(&job.series, config, window).map(|signals| {
                info!(symbol = %job.symbol, bars = job.series.len(), signals = signals.len(), "scan complete");
                ScanReport {
                    symbol: job.symbol.clone(),
                    bars: job.series.len(),
                    signals,
                }
            });
            (job.symbol.clone(), result)
        })
        .collect()
}
