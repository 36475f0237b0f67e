//! Swing-point detection over closed bars.
//!
//! Bar i is a swing high when its high is strictly greater than every high
//! within `lookback` bars on both sides; swing lows mirror this on lows.
//! A bar needs `lookback` closed bars after it before it can qualify.

use crate::domain::Candle;

use super::pivots::PivotKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swing {
    pub index: usize,
    pub kind: PivotKind,
    pub price: f64,
}

pub fn is_swing_high(candles: &[Candle], i: usize, lookback: usize) -> bool {
    is_extreme(candles, i, lookback, |c| c.high, |a, b| a > b)
}

pub fn is_swing_low(candles: &[Candle], i: usize, lookback: usize) -> bool {
    is_extreme(candles, i, lookback, |c| c.low, |a, b| a < b)
}

fn is_extreme(
    candles: &[Candle],
    i: usize,
    lookback: usize,
    field: fn(&Candle) -> f64,
    beats: fn(f64, f64) -> bool,
) -> bool {
    if i < lookback || i + lookback >= candles.len() {
        return false;
    }
    let pivot = field(&candles[i]);
    (1..=lookback).all(|j| {
        beats(pivot, field(&candles[i - j])) && beats(pivot, field(&candles[i + j]))
    })
}

/// Swings among `candles[from..]` in chronological order; highs before lows
/// on the same bar.
pub fn find_swings(candles: &[Candle], from: usize, lookback: usize) -> Vec<Swing> {
    let end = candles.len().saturating_sub(lookback);
    let mut swings = Vec::new();
    for i in from.max(lookback)..end {
        if is_swing_high(candles, i, lookback) {
            swings.push(Swing {
                index: i,
                kind: PivotKind::High,
                price: candles[i].high,
            });
        }
        if is_swing_low(candles, i, lookback) {
            swings.push(Swing {
                index: i,
                kind: PivotKind::Low,
                price: candles[i].low,
            });
        }
    }
    swings
}
