//! ADX: Average Directional Index, EMA-smoothed.
//!
//! Steps:
//! 1. +DM = max(high - prev_high, 0), -DM = max(prev_low - low, 0); the
//!    smaller of the two is zeroed (only the dominant direction counts)
//! 2. EMA(period) of +DM, -DM, and the single-bar true range
//! 3. +DI = 100 * EMA(+DM) / EMA(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = EMA(DX, period)
//!
//! A zero denominator makes DX undefined for that bar only; the ADX
//! recursion skips it and resumes on the next defined DX.

use super::atr::true_range;
use super::ema::ema_of_series;
use super::Series;
use crate::domain::Candle;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub plus_di: Series,
    pub minus_di: Series,
    pub dx: Series,
    pub adx: Series,
}

/// Directional movement for one bar against the previous bar.
pub fn directional_movement(prev: &Candle, cur: &Candle) -> (f64, f64) {
    let up = (cur.high - prev.high).max(0.0);
    let down = (prev.low - cur.low).max(0.0);
    if up > down {
        (up, 0.0)
    } else if down > up {
        (0.0, down)
    } else {
        (0.0, 0.0)
    }
}

pub fn adx(candles: &[Candle], period: usize) -> AdxSeries {
    let n = candles.len();
    if period == 0 {
        return AdxSeries {
            plus_di: vec![None; n],
            minus_di: vec![None; n],
            dx: vec![None; n],
            adx: vec![None; n],
        };
    }

    let mut plus_dm = vec![None; n];
    let mut minus_dm = vec![None; n];
    for i in 1..n {
        let (p, m) = directional_movement(&candles[i - 1], &candles[i]);
        plus_dm[i] = Some(p);
        minus_dm[i] = Some(m);
    }
    // TR aligned with DM: bar 0 has no previous close and no movement.
    let tr: Series = true_range(candles)
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i > 0).then_some(v))
        .collect();

    let smooth_plus = ema_of_series(&plus_dm, period);
    let smooth_minus = ema_of_series(&minus_dm, period);
    let smooth_tr = ema_of_series(&tr, period);

    let mut plus_di = vec![None; n];
    let mut minus_di = vec![None; n];
    let mut dx = vec![None; n];
    for i in 0..n {
        let (Some(p), Some(m), Some(t)) = (smooth_plus[i], smooth_minus[i], smooth_tr[i]) else {
            continue;
        };
        if t == 0.0 {
            continue;
        }
        let pdi = 100.0 * p / t;
        let mdi = 100.0 * m / t;
        plus_di[i] = Some(pdi);
        minus_di[i] = Some(mdi);
        let sum = pdi + mdi;
        if sum != 0.0 {
            dx[i] = Some(100.0 * (pdi - mdi).abs() / sum);
        }
    }

    let adx = ema_of_series(&dx, period);
    AdxSeries {
        plus_di,
        minus_di,
        dx,
        adx,
    }
}
