//! Stateful trend trackers.
//!
//! Each tracker is an explicit state struct advanced by a pure
//! `step(prior, input) -> state` function, plus a `compute` that folds
//! `step` over a candle slice in chronological order. Trackers must see
//! bars strictly in order: every output depends on the preceding state.

pub mod donchian;
pub mod oscillator;
pub mod supertrend;

pub use donchian::{DonchianSeries, DonchianTrendTracker, TREND_DOWN, TREND_NEUTRAL, TREND_UP};
pub use oscillator::{OscillatorPair, OscillatorSeries, OscillatorState};
pub use supertrend::{AtrSmoothing, SupertrendState, SupertrendTracker, TrendDirection};

/// `a` moved from at-or-below `b` to strictly above it between two bars.
pub fn cross_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    a > b && prev_a <= prev_b
}

/// `a` moved from at-or-above `b` to strictly below it between two bars.
pub fn cross_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    a < b && prev_a >= prev_b
}
