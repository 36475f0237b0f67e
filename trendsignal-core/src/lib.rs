//! TrendSignal Core: streaming technical-analysis signal engine.
//!
//! This crate turns an ordered candle series into discrete BUY/SELL signals:
//! - Domain types (candles, candle series, signals)
//! - Stateless indicator primitives (EMA, ATR, HMA, MACD, RSI, ADX)
//! - Stateful trend trackers (Supertrend, Donchian trend, oscillator pair)
//! - Market structure (pivots, liquidity levels, BOS, MSU)
//! - Signal fusion with presets and composable filters
//! - ATR-based risk levels
//! - `SignalEngine`, the per-instrument façade tying these together
//!
//! No I/O happens here; collaborators are traits in [`collaborators`].

pub mod collaborators;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod frame;
pub mod fusion;
pub mod indicators;
pub mod risk;
pub mod structure;
pub mod trackers;

pub use config::{EngineConfig, SourceSelection};
pub use domain::{Candle, CandleSeries, Signal, SignalKind, SignalOrigin, SignalReason};
pub use engine::{Evaluation, EvaluationReport, SignalEngine};
pub use error::{CandleFault, ConfigError, DataError, EngineError};
