//! One fetch → evaluate → position check → submit pass.
//!
//! The cycle owns the engine and its three collaborators. It is driven by
//! whatever scheduler the caller runs (a timer, a bar-close hook); each
//! `run_once` is independent apart from the engine's structure state.

use thiserror::Error;
use tracing::{debug, info, warn};
use trendsignal_core::collaborators::{CandleSource, CollaboratorError, OrderSink, PositionSentinel};
use trendsignal_core::{CandleSeries, ConfigError, DataError, Evaluation, Signal, SignalEngine};

use crate::config::RunnerConfig;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("candle source failed: {0}")]
    Source(#[source] CollaboratorError),

    #[error("position sentinel failed: {0}")]
    Sentinel(#[source] CollaboratorError),

    #[error("rejected candle data: {0}")]
    Data(#[from] DataError),

    #[error("engine config error: {0}")]
    Config(#[from] ConfigError),
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    NotReady { available: usize, required: usize },
    /// No new closed bar since the last cycle.
    AlreadyEvaluated,
    NoSignal,
    /// A signal fired while a position was open; nothing was submitted.
    Suppressed { open_positions: usize, signal: Signal },
    Submitted(Signal),
    /// The sink refused the order. The bar still counts as evaluated.
    SubmitFailed { signal: Signal, reason: String },
}

impl CycleOutcome {
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            CycleOutcome::Suppressed { signal, .. }
            | CycleOutcome::Submitted(signal)
            | CycleOutcome::SubmitFailed { signal, .. } => Some(signal),
            _ => None,
        }
    }
}

pub struct TradingCycle<S, P, O> {
    engine: SignalEngine,
    source: S,
    sentinel: P,
    sink: O,
    window: usize,
}

impl<S, P, O> TradingCycle<S, P, O>
where
    S: CandleSource,
    P: PositionSentinel,
    O: OrderSink,
{
    pub fn new(engine: SignalEngine, source: S, sentinel: P, sink: O, window: usize) -> Self {
        Self {
            engine,
            source,
            sentinel,
            sink,
            window,
        }
    }

    pub fn from_config(config: &RunnerConfig, source: S, sentinel: P, sink: O) -> Result<Self, CycleError> {
        let engine = SignalEngine::new(config.engine.clone())?;
        Ok(Self::new(engine, source, sentinel, sink, config.window))
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn symbol(&self) -> &str {
        self.source.symbol()
    }

    pub fn run_once(&mut self) -> Result<CycleOutcome, CycleError> {
        let candles = self.source.fetch(self.window).map_err(CycleError::Source)?;
        let series = CandleSeries::from_candles(candles).map_err(|e| {
            warn!(symbol = self.source.symbol(), error = %e, "rejected candle data");
            e
        })?;

        let signal = match self.engine.evaluate(&series)? {
            Evaluation::NotReady { available, required } => {
                return Ok(CycleOutcome::NotReady { available, required })
            }
            Evaluation::AlreadyEvaluated { .. } => return Ok(CycleOutcome::AlreadyEvaluated),
            Evaluation::Ready(report) => match report.signal {
                Some(signal) => signal,
                None => return Ok(CycleOutcome::NoSignal),
            },
        };

        let symbol = self.source.symbol().to_string();
        let open_positions = self
            .sentinel
            .open_count(&symbol)
            .map_err(CycleError::Sentinel)?;
        if open_positions > 0 {
            debug!(symbol = %symbol, open_positions, kind = %signal.kind, "signal suppressed");
            return Ok(CycleOutcome::Suppressed {
                open_positions,
                signal,
            });
        }

        match self.sink.submit(&symbol, &signal) {
            Ok(()) => {
                info!(
                    symbol = %symbol,
                    kind = %signal.kind,
                    entry_price = signal.entry_price,
                    config = %self.engine.fingerprint(),
                    "order submitted"
                );
                Ok(CycleOutcome::Submitted(signal))
            }
            Err(e) => {
                warn!(symbol = %symbol, kind = %signal.kind, error = %e, "order submission failed");
                Ok(CycleOutcome::SubmitFailed {
                    signal,
                    reason: e.to_string(),
                })
            }
        }
    }
}
