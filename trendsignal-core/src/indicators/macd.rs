//! MACD: Moving Average Convergence Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal_period)
//! histogram = line - signal

use super::ema::{ema, ema_of_series};
use super::Series;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Series = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of_series(&line, signal_period);
    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();
    MacdSeries {
        line,
        signal,
        histogram,
    }
}
