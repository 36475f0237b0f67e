//! Hull Moving Average (HMA).
//!
//! HMA = WMA(2 * WMA(x, period/2) - WMA(x, period), floor(sqrt(period)))
//!
//! The inner difference is defined from index `period - 1`; the outer WMA
//! needs `floor(sqrt(period)) - 1` more, so the first defined value sits at
//! `hma_warmup(period)`.

use super::rolling::{lift, wma};
use super::Series;

fn sqrt_length(period: usize) -> usize {
    ((period as f64).sqrt().floor() as usize).max(1)
}

/// Index of the first defined HMA value: `period + floor(sqrt(period)) - 2`.
pub fn hma_warmup(period: usize) -> usize {
    period + sqrt_length(period) - 2
}

pub fn hma(values: &[f64], period: usize) -> Series {
    if period < 2 {
        return vec![None; values.len()];
    }
    let lifted = lift(values);
    let half = wma(&lifted, period / 2);
    let full = wma(&lifted, period);
    let raw: Series = half
        .iter()
        .zip(&full)
        .map(|(h, f)| Some(2.0 * (*h)? - (*f)?))
        .collect();
    wma(&raw, sqrt_length(period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn warmup_formula() {
        assert_eq!(hma_warmup(55), 55 + 7 - 2);
        assert_eq!(hma_warmup(9), 9 + 3 - 2);
        assert_eq!(hma_warmup(4), 4);
    }

    #[test]
    fn period_below_two_is_undefined() {
        assert_eq!(hma(&[1.0, 2.0, 3.0], 1), vec![None, None, None]);
    }

    #[test]
    fn undefined_exactly_until_warmup() {
        for period in [4, 9, 16, 20, 55] {
            let values: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
            let result = hma(&values, period);
            let first = result.iter().position(Option::is_some).unwrap();
            assert_eq!(first, hma_warmup(period), "period {period}");
            assert!(result[first..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn hma_lag_on_linear_series() {
        // WMA(L) of a line with slope b lags by b*(L-1)/3.
        // period 16: raw = x + b*(5 - 14/3) = x + b/3, outer WMA(4) lags b,
        // so HMA = x - 2b/3.
        let b = 2.0;
        let values: Vec<f64> = (0..60).map(|i| 10.0 + b * i as f64).collect();
        let result = hma(&values, 16);
        for i in hma_warmup(16)..values.len() {
            assert_approx(result[i].unwrap(), values[i] - 2.0 * b / 3.0, 1e-9);
        }
    }

    #[test]
    fn hma_of_constant_is_constant() {
        let result = hma(&[7.0; 40], 9);
        for v in result.into_iter().flatten() {
            assert_approx(v, 7.0, DEFAULT_EPSILON);
        }
    }
}
