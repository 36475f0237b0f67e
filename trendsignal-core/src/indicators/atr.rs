//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), with
//! TR[0] = high[0] - low[0].
//!
//! Two smoothings are exposed:
//! - `wilder_atr`: seed ATR[period-1] = mean(TR[0..period]), then
//!   ATR[t] = (ATR[t-1] * (period-1) + TR[t]) / period.
//! - `simple_atr`: rolling mean of TR over `period` bars.
//!
//! Both are undefined before index `period - 1`.

use super::rolling::{lift, sma};
use super::Series;
use crate::domain::Candle;

/// Compute the True Range series from candles.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let range = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(pc) => range.max((c.high - pc).abs()).max((c.low - pc).abs()),
                None => range,
            }
        })
        .collect()
}

/// Wilder-smoothed ATR.
pub fn wilder_atr(candles: &[Candle], period: usize) -> Series {
    let n = candles.len();
    let mut result = vec![None; n];
    if n < period || period == 0 {
        return result;
    }

    let tr = true_range(candles);
    let seed = tr[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        let atr = (prev * (period as f64 - 1.0) + tr[i]) / period as f64;
        result[i] = Some(atr);
        prev = atr;
    }
    result
}

/// Simple rolling-mean ATR.
pub fn simple_atr(candles: &[Candle], period: usize) -> Series {
    sma(&lift(&true_range(candles)), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_candles, DEFAULT_EPSILON};

    fn sample() -> Vec<Candle> {
        make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, 6, 2) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, 1, 8) = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = max(6, 4, 2) = 6
            (101.0, 106.0, 100.0, 105.0), // TR = max(6, 5, 1) = 6
        ])
    }

    #[test]
    fn true_range_basic() {
        let tr = true_range(&sample());
        assert_eq!(tr, vec![10.0, 8.0, 9.0, 6.0, 6.0]);
    }

    #[test]
    fn true_range_gap_up() {
        let candles = make_ohlc_candles(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, 15, 8) = 15
        ]);
        assert_approx(true_range(&candles)[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_atr_period_3() {
        let result = wilder_atr(&sample(), 3);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        // seed = mean(10, 8, 9) = 9
        assert_approx(result[2].unwrap(), 9.0, DEFAULT_EPSILON);
        // (9*2 + 6) / 3 = 8
        assert_approx(result[3].unwrap(), 8.0, DEFAULT_EPSILON);
        // (8*2 + 6) / 3 = 22/3
        assert_approx(result[4].unwrap(), 22.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn simple_atr_period_3() {
        let result = simple_atr(&sample(), 3);
        assert_eq!(result[1], None);
        assert_approx(result[2].unwrap(), 9.0, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_too_few_candles_is_undefined() {
        let candles = make_ohlc_candles(&[(100.0, 105.0, 95.0, 102.0)]);
        assert!(wilder_atr(&candles, 14).iter().all(Option::is_none));
        assert!(simple_atr(&candles, 14).iter().all(Option::is_none));
    }

    #[test]
    fn zero_period_is_undefined() {
        let candles = sample();
        assert!(wilder_atr(&candles, 0).iter().all(Option::is_none));
        assert!(simple_atr(&candles, 0).iter().all(Option::is_none));
    }
}
