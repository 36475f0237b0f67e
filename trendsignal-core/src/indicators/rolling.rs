//! Trailing-window primitives: rolling max/min, SMA, WMA.
//!
//! All outputs are undefined before index `length - 1`. SMA and WMA are
//! also undefined wherever any input inside the window is undefined.

use super::Series;

/// Lift a fully defined series into `Series` form.
pub fn lift(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Highest value over the trailing `length` values (inclusive of the current one).
pub fn rolling_max(values: &[f64], length: usize) -> Series {
    rolling_extreme(values, length, f64::NEG_INFINITY, f64::max)
}

/// Lowest value over the trailing `length` values (inclusive of the current one).
pub fn rolling_min(values: &[f64], length: usize) -> Series {
    rolling_extreme(values, length, f64::INFINITY, f64::min)
}

fn rolling_extreme(values: &[f64], length: usize, init: f64, pick: fn(f64, f64) -> f64) -> Series {
    let mut result = vec![None; values.len()];
    if length == 0 {
        return result;
    }
    for (start, window) in values.windows(length).enumerate() {
        result[start + length - 1] = Some(window.iter().copied().fold(init, pick));
    }
    result
}

/// Simple moving average.
pub fn sma(values: &[Option<f64>], length: usize) -> Series {
    windowed(values, length, |w| w.iter().sum::<f64>() / length as f64)
}

/// Linearly weighted moving average: weights 1..=length, newest heaviest.
pub fn wma(values: &[Option<f64>], length: usize) -> Series {
    let denom = (length * (length + 1) / 2) as f64;
    windowed(values, length, |w| {
        w.iter()
            .enumerate()
            .map(|(k, v)| v * (k + 1) as f64)
            .sum::<f64>()
            / denom
    })
}

/// Apply `f` to every fully defined trailing window.
fn windowed(values: &[Option<f64>], length: usize, f: impl Fn(&[f64]) -> f64) -> Series {
    let n = values.len();
    let mut result = vec![None; n];
    if n < length || length == 0 {
        return result;
    }
    let mut buf = Vec::with_capacity(length);
    for end in (length - 1)..n {
        buf.clear();
        buf.extend(values[end + 1 - length..=end].iter().map_while(|v| *v));
        if buf.len() == length {
            result[end] = Some(f(&buf));
        }
    }
    result
}
