//! Stateless indicator primitives.
//!
//! Every function maps a full input series to an output series of the same
//! length. Indices before an indicator's warm-up are `None`: an explicit
//! "undefined" marker rather than a numeric placeholder. Composite
//! indicators accept `&[Option<f64>]` so undefined inputs flow through
//! without being mistaken for zeros.
//!
//! Stateful trend trackers (Supertrend, Donchian trend, oscillator pair) live
//! in `crate::trackers` and consume these primitives.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod hma;
pub mod lag;
pub mod macd;
pub mod rolling;
pub mod rsi;

pub use adx::{adx, AdxSeries};
pub use atr::{simple_atr, true_range, wilder_atr};
pub use ema::{ema, ema_of_series, exp_smooth};
pub use hma::{hma, hma_warmup};
pub use lag::LagBuffer;
pub use macd::{macd, MacdSeries};
pub use rolling::{lift, rolling_max, rolling_min, sma, wma};
pub use rsi::ema_rsi;

/// One value per candle; `None` where the indicator is undefined.
pub type Series = Vec<Option<f64>>;

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one candle every 15 minutes.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    let data: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_candles(&data)
}

/// Create candles from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| crate::domain::Candle {
            timestamp: base + chrono::Duration::minutes(15 * i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
