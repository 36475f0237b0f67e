//! Contracts for the systems around the engine.
//!
//! The engine never performs I/O. A trading cycle fetches candles from a
//! [`CandleSource`], asks a [`PositionSentinel`] whether the instrument is
//! already exposed, and hands emitted signals to an [`OrderSink`]. Retry
//! policy belongs to the implementations.

use thiserror::Error;

use crate::domain::{Candle, Signal};

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies the most recent candles for one instrument.
pub trait CandleSource {
    fn symbol(&self) -> &str;

    /// Up to `count` of the newest candles, oldest first. The newest may
    /// still be forming.
    fn fetch(&mut self, count: usize) -> Result<Vec<Candle>, CollaboratorError>;
}

/// Reports open exposure; new signals are suppressed while it is non-zero.
pub trait PositionSentinel {
    fn open_count(&self, symbol: &str) -> Result<usize, CollaboratorError>;
}

/// Accepts emitted signals for execution.
pub trait OrderSink {
    fn submit(&mut self, symbol: &str, signal: &Signal) -> Result<(), CollaboratorError>;
}
