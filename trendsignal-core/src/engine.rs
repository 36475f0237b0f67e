//! Per-instrument signal engine.
//!
//! One `SignalEngine` owns the fusion engine, the market structure tracker
//! and the risk calculator for a single instrument and timeframe. Each call
//! to [`SignalEngine::evaluate`] rebuilds the indicator frame over the
//! closed candles, evaluates the newest closed bar and returns at most one
//! [`Signal`].
//!
//! The structure tracker is stateful, so calls must move forward in time.
//! Re-evaluating a bar that was already evaluated is reported as
//! [`Evaluation::AlreadyEvaluated`] and leaves all state untouched.

use std::ops::Range;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{EngineConfig, SourceSelection};
use crate::domain::{Candle, CandleSeries, Signal, SignalKind, SignalOrigin, SignalReason};
use crate::error::{ConfigError, DataError};
use crate::frame::FrameBuilder;
use crate::fusion::{FusionEvaluation, SignalFusionEngine};
use crate::risk::RiskLevelCalculator;
use crate::structure::{MarketStructureState, MarketStructureTracker, StructureUpdate};

/// Outcome of one evaluation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Fewer closed candles than `min_history`.
    NotReady { available: usize, required: usize },
    /// The newest closed bar is not newer than the last evaluated one.
    AlreadyEvaluated { timestamp: DateTime<Utc> },
    Ready(Box<EvaluationReport>),
}

impl Evaluation {
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Evaluation::Ready(report) => report.signal.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Index of the evaluated bar in the caller's series.
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub fusion: FusionEvaluation,
    pub structure: StructureUpdate,
    pub atr: Option<f64>,
    pub signal: Option<Signal>,
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    fingerprint: String,
    frames: FrameBuilder,
    fusion: SignalFusionEngine,
    structure: MarketStructureTracker,
    risk: RiskLevelCalculator,
    last_evaluated: Option<DateTime<Utc>>,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fingerprint: config.fingerprint(),
            frames: FrameBuilder::new(&config)?,
            fusion: SignalFusionEngine::from_config(&config),
            structure: MarketStructureTracker::new(config.swing_lookback)?,
            risk: RiskLevelCalculator::from_config(&config),
            last_evaluated: None,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn structure_state(&self) -> &MarketStructureState {
        self.structure.state()
    }

    pub fn last_evaluated(&self) -> Option<DateTime<Utc>> {
        self.last_evaluated
    }

    /// Evaluate the newest closed bar of the whole series.
    pub fn evaluate(&mut self, series: &CandleSeries) -> Result<Evaluation, DataError> {
        self.evaluate_range(series, 0..series.len())
    }

    /// Evaluate the newest closed bar of `series[range]`, treating the
    /// range as the full available history.
    pub fn evaluate_range(
        &mut self,
        series: &CandleSeries,
        range: Range<usize>,
    ) -> Result<Evaluation, DataError> {
        if range.start > range.end || range.end > series.len() {
            return Err(DataError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: series.len(),
            });
        }
        if let Some(max_secs) = self.config.max_gap_secs {
            series.check_max_gap(range.clone(), max_secs)?;
        }

        let window = &series.as_slice()[range.clone()];
        let closed = if self.config.exclude_forming_bar {
            &window[..window.len().saturating_sub(1)]
        } else {
            window
        };
        if closed.len() < self.config.min_history {
            debug!(
                available = closed.len(),
                required = self.config.min_history,
                "not enough closed candles"
            );
            return Ok(Evaluation::NotReady {
                available: closed.len(),
                required: self.config.min_history,
            });
        }

        let latest = closed.len() - 1;
        let timestamp = closed[latest].timestamp;
        if self.last_evaluated.is_some_and(|t| timestamp <= t) {
            return Ok(Evaluation::AlreadyEvaluated { timestamp });
        }

        let report = self.evaluate_closed(closed, latest, range.start);
        self.last_evaluated = Some(timestamp);
        Ok(Evaluation::Ready(Box::new(report)))
    }

    fn evaluate_closed(&mut self, closed: &[Candle], latest: usize, offset: usize) -> EvaluationReport {
        let mut frame = self.frames.build(closed);
        self.fusion.annotate(&mut frame, closed);
        let fusion = self.fusion.evaluate_closed(&frame, closed, latest);
        let structure = self.structure.update(closed, latest);

        let candle = &closed[latest];
        let atr = frame.atr[latest];
        let bar_index = offset + latest;
        let signal = self.select(&fusion, &structure).map(|(kind, origin, reasons)| {
            let levels = self.risk.levels(candle.close, kind, atr);
            Signal {
                kind,
                origin,
                entry_price: candle.close,
                stop_loss: levels.stop_loss,
                take_profit: levels.take_profit,
                bar_index,
                timestamp: candle.timestamp,
                reasons,
            }
        });

        match &signal {
            Some(s) => info!(
                kind = %s.kind,
                origin = ?s.origin,
                entry_price = s.entry_price,
                stop_loss = s.stop_loss,
                take_profit = ?s.take_profit,
                bar_index,
                reasons = ?s.reasons,
                config = %self.fingerprint,
                "signal"
            ),
            None => debug!(
                bar_index,
                timestamp = %candle.timestamp,
                bull = fusion.latest.bull,
                bear = fusion.latest.bear,
                structure = ?structure.direction,
                config = %self.fingerprint,
                "no signal"
            ),
        }

        EvaluationReport {
            bar_index,
            timestamp: candle.timestamp,
            fusion,
            structure,
            atr,
            signal,
        }
    }

    /// Pick the emitted decision according to `signal_source`.
    fn select(
        &self,
        fusion: &FusionEvaluation,
        structure: &StructureUpdate,
    ) -> Option<(SignalKind, SignalOrigin, Vec<SignalReason>)> {
        let from_fusion = fusion
            .rising_edge()
            .map(|kind| (kind, SignalOrigin::Fusion, fusion.latest.reasons.clone()));
        let from_structure = structure
            .decision
            .as_ref()
            .map(|d| (d.kind, SignalOrigin::Structure, d.reasons.clone()));

        match self.config.signal_source {
            SourceSelection::Fusion => from_fusion,
            SourceSelection::Structure => from_structure,
            SourceSelection::Either => match (from_fusion, from_structure) {
                (Some(f), Some(s)) if f.0 != s.0 => {
                    debug!(fusion = %f.0, structure = %s.0, "opposing decisions cancel");
                    None
                }
                (Some(f), _) => Some(f),
                (None, s) => s,
            },
        }
    }
}
