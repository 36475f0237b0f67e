//! Donchian trend: sticky breakout state.
//!
//! Channel: hh[i] / ll[i] are the highest high / lowest low of the `length`
//! bars ending at i. The breakout test at bar i compares close[i] against
//! hh[i-1] / ll[i-1] so a bar never breaks out of a channel it is part of.
//!
//! trend[i] = +1 on a close above hh[i-1], -1 on a close below ll[i-1],
//! otherwise trend[i-1]. Zero during warm-up (i < length).

use crate::domain::Candle;
use crate::error::ConfigError;
use crate::indicators::{rolling_max, rolling_min, Series};

pub const TREND_UP: i8 = 1;
pub const TREND_DOWN: i8 = -1;
pub const TREND_NEUTRAL: i8 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct DonchianSeries {
    pub upper: Series,
    pub lower: Series,
    pub trend: Vec<i8>,
}

/// One bar of the sticky trend. `hh_prev` / `ll_prev` are the prior bar's
/// channel; an undefined channel keeps the trend neutral.
pub fn step(prior_trend: i8, close: f64, hh_prev: Option<f64>, ll_prev: Option<f64>) -> i8 {
    let (Some(hh), Some(ll)) = (hh_prev, ll_prev) else {
        return TREND_NEUTRAL;
    };
    if close > hh {
        TREND_UP
    } else if close < ll {
        TREND_DOWN
    } else {
        prior_trend
    }
}

#[derive(Debug, Clone)]
pub struct DonchianTrendTracker {
    length: usize,
}

impl DonchianTrendTracker {
    pub fn new(length: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::invalid("donchian_period", "must be >= 1"));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn compute(&self, candles: &[Candle]) -> DonchianSeries {
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let upper = rolling_max(&highs, self.length);
        let lower = rolling_min(&lows, self.length);

        let mut trend = Vec::with_capacity(candles.len());
        let mut prior = TREND_NEUTRAL;
        for (i, candle) in candles.iter().enumerate() {
            let t = match i.checked_sub(1) {
                Some(p) => step(prior, candle.close, upper[p], lower[p]),
                None => TREND_NEUTRAL,
            };
            trend.push(t);
            prior = t;
        }

        DonchianSeries {
            upper,
            lower,
            trend,
        }
    }
}
