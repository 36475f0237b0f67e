//! Relative Strength Index (RSI) with EMA-averaged gains and losses.
//!
//! gain[t] = max(close[t] - close[t-1], 0), loss[t] = max(close[t-1] - close[t], 0)
//! RSI = 100 - 100 / (1 + EMA(gain) / EMA(loss))
//!
//! Defined from index 1 (the first price change).
//! Edge cases: avg_loss == 0 → RSI = 100; both averages 0 → RSI = 50.

use super::ema::ema_of_series;
use super::Series;

/// RSI from average gain and average loss.
pub fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

pub fn ema_rsi(closes: &[f64], period: usize) -> Series {
    let changes: Vec<Option<f64>> = (0..closes.len())
        .map(|i| i.checked_sub(1).map(|p| closes[i] - closes[p]))
        .collect();
    let gains: Series = changes.iter().map(|c| c.map(|d| d.max(0.0))).collect();
    let losses: Series = changes.iter().map(|c| c.map(|d| (-d).max(0.0))).collect();
    let avg_gain = ema_of_series(&gains, period);
    let avg_loss = ema_of_series(&losses, period);
    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| Some(rsi_value((*g)?, (*l)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn first_value_is_undefined() {
        let result = ema_rsi(&[10.0, 11.0, 12.0], 14);
        assert_eq!(result[0], None);
        assert!(result[1].is_some());
    }

    #[test]
    fn all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = ema_rsi(&closes, 14);
        assert_approx(result[19].unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_is_50() {
        let result = ema_rsi(&[100.0; 10], 14);
        assert_approx(result[9].unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn alternating_moves_stay_in_bounds() {
        let closes: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        for v in ema_rsi(&closes, 5).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn rsi_value_known() {
        // gain 2, loss 1 → RS 2 → 100 - 100/3
        assert_approx(rsi_value(2.0, 1.0), 100.0 - 100.0 / 3.0, DEFAULT_EPSILON);
    }
}
