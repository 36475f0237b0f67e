//! Domain types for TrendSignal

pub mod candle;
pub mod signal;

pub use candle::{Candle, CandleSeries};
pub use signal::{Signal, SignalKind, SignalOrigin, SignalReason};
