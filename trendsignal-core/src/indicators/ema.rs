//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[0] = x[0]; EMA[t] = EMA[t-1] + alpha * (x[t] - EMA[t-1]),
//! alpha = 2 / (period + 1). No SMA seed: the average is defined from the
//! first input onward, so a constant series has a constant EMA.

use super::Series;

/// Smoothing factor for an EMA of the given period (pandas `span`).
pub fn alpha_for_period(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Exponential filter with an explicit alpha.
///
/// Starts at the first defined input. An undefined input yields an
/// undefined output but does not reset the recursion: the next defined
/// input continues from the last defined state.
pub fn exp_smooth(values: &[Option<f64>], alpha: f64) -> Series {
    let mut prev: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            let x = (*v)?;
            let y = match prev {
                Some(p) => p + alpha * (x - p),
                None => x,
            };
            prev = Some(y);
            Some(y)
        })
        .collect()
}

/// EMA of a series that may contain undefined entries.
pub fn ema_of_series(values: &[Option<f64>], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    exp_smooth(values, alpha_for_period(period))
}

/// EMA of a fully defined series.
pub fn ema(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    let alpha = alpha_for_period(period);
    let mut prev: Option<f64> = None;
    values
        .iter()
        .map(|&x| {
            let y = prev.map_or(x, |p| p + alpha * (x - p));
            prev = Some(y);
            Some(y)
        })
        .collect()
}
