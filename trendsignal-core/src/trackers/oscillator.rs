//! TsFast / TsSlow oscillator pair.
//!
//! ts_fast is an EMA-smoothed RSI. ts_slow trails it inside a volatility
//! band derived from the bar-to-bar movement of ts_fast, flipping sides when
//! ts_fast crosses it. ts_fast alone drives the contrarian filter.

use crate::indicators::{ema_of_series, ema_rsi, exp_smooth, LagBuffer, Series};

use super::{cross_above, cross_below};

/// Band width in units of the smoothed |Δts_fast|.
pub const BAND_FACTOR: f64 = 4.236;
pub const RSI_PERIOD: usize = 50;
pub const FAST_SMOOTHING: usize = 30;
/// Fixed smoothing factor of the band filter.
pub const BAND_ALPHA: f64 = 1.0 / 50.0;
pub const CONTRARIAN_LOW: f64 = 35.0;
pub const CONTRARIAN_HIGH: f64 = 65.0;

/// ts_slow recursion state: the last two ts_slow values and the previous ts_fast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorState {
    slow: LagBuffer<f64, 2>,
    fast_prev: Option<f64>,
}

impl OscillatorState {
    /// ts_slow starts at zero.
    pub fn seeded() -> Self {
        Self {
            slow: LagBuffer::filled(0.0),
            fast_prev: None,
        }
    }

    pub fn ts_slow(&self) -> f64 {
        self.slow.lag(1)
    }
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Advance ts_slow by one bar.
///
/// With the band undefined only the ts_fast memory moves; ts_slow holds.
pub fn step(prior: &OscillatorState, fast: Option<f64>, band: Option<f64>) -> OscillatorState {
    let mut next = *prior;
    next.fast_prev = fast;

    let (Some(fast), Some(band)) = (fast, band) else {
        return next;
    };
    let slow1 = prior.slow.lag(1);
    let slow2 = prior.slow.lag(2);
    let up = fast + band * BAND_FACTOR;
    let dn = fast - band * BAND_FACTOR;
    let crossed = |f: fn(f64, f64, f64, f64) -> bool| {
        prior
            .fast_prev
            .is_some_and(|prev| f(prev, slow2, fast, slow1))
    };

    let slow = if up < slow1 {
        up
    } else if crossed(cross_above) {
        dn
    } else if dn > slow1 {
        dn
    } else if crossed(cross_below) {
        up
    } else {
        slow1
    };
    next.slow.push(slow);
    next
}

#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorSeries {
    pub ts_fast: Series,
    pub ts_slow: Series,
    pub band: Series,
}

impl OscillatorSeries {
    /// ts_fast below the contrarian floor.
    pub fn contrarian_bull(&self, i: usize) -> Option<bool> {
        self.ts_fast.get(i).copied().flatten().map(|v| v < CONTRARIAN_LOW)
    }

    /// ts_fast above the contrarian ceiling.
    pub fn contrarian_bear(&self, i: usize) -> Option<bool> {
        self.ts_fast.get(i).copied().flatten().map(|v| v > CONTRARIAN_HIGH)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OscillatorPair;

impl OscillatorPair {
    pub fn compute(&self, closes: &[f64]) -> OscillatorSeries {
        let ts_fast = ema_of_series(&ema_rsi(closes, RSI_PERIOD), FAST_SMOOTHING);

        let moves: Series = (0..ts_fast.len())
            .map(|i| {
                let prev = ts_fast[i.checked_sub(1)?]?;
                Some((ts_fast[i]? - prev).abs())
            })
            .collect();
        let band = exp_smooth(&exp_smooth(&moves, BAND_ALPHA), BAND_ALPHA);

        let mut state = OscillatorState::seeded();
        let ts_slow = ts_fast
            .iter()
            .zip(&band)
            .enumerate()
            .map(|(i, (&fast, &b))| {
                if i == 0 {
                    state.fast_prev = fast;
                    return None;
                }
                state = step(&state, fast, b);
                b.map(|_| state.ts_slow())
            })
            .collect();

        OscillatorSeries {
            ts_fast,
            ts_slow,
            band,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(slow1: f64, slow2: f64, fast_prev: f64) -> OscillatorState {
        let mut s = OscillatorState::seeded();
        s.slow.push(slow2);
        s.slow.push(slow1);
        s.fast_prev = Some(fast_prev);
        s
    }

    #[test]
    fn upper_band_below_slow_trails_down() {
        // up = 40 + 1*4.236 < 60
        let next = step(&state(60.0, 60.0, 41.0), Some(40.0), Some(1.0));
        assert_eq!(next.ts_slow(), 40.0 + BAND_FACTOR);
    }

    #[test]
    fn cross_above_flips_to_lower_band() {
        // fast 52 > slow1 50, fast_prev 49 <= slow2 50; up = 56.2 >= 50
        let next = step(&state(50.0, 50.0, 49.0), Some(52.0), Some(1.0));
        assert_eq!(next.ts_slow(), 52.0 - BAND_FACTOR);
    }

    #[test]
    fn lower_band_above_slow_trails_up() {
        // fast already above: no cross; dn = 60 - 4.236 > 50
        let next = step(&state(50.0, 50.0, 58.0), Some(60.0), Some(1.0));
        assert_eq!(next.ts_slow(), 60.0 - BAND_FACTOR);
    }

    #[test]
    fn cross_below_flips_to_upper_band() {
        // fast 48 < slow1 50, fast_prev 51 >= slow2 50; up = 52.2 >= 50, dn < 50
        let next = step(&state(50.0, 50.0, 51.0), Some(48.0), Some(1.0));
        assert_eq!(next.ts_slow(), 48.0 + BAND_FACTOR);
    }

    #[test]
    fn inside_band_holds() {
        let next = step(&state(50.0, 50.0, 51.0), Some(51.0), Some(1.0));
        assert_eq!(next.ts_slow(), 50.0);
    }

    #[test]
    fn undefined_band_only_moves_fast_memory() {
        let prior = state(50.0, 49.0, 51.0);
        let next = step(&prior, Some(55.0), None);
        assert_eq!(next.ts_slow(), 50.0);
        assert_eq!(next.fast_prev, Some(55.0));
    }

    #[test]
    fn series_aligned_and_bounded() {
        let closes: Vec<f64> = (0..400)
            .map(|i| 100.0 + (i as f64 * 0.05).sin() * 8.0)
            .collect();
        let out = OscillatorPair.compute(&closes);
        assert_eq!(out.ts_fast.len(), closes.len());
        assert_eq!(out.ts_slow.len(), closes.len());
        assert_eq!(out.ts_fast[0], None);
        assert_eq!(out.ts_slow[0], None);
        for v in out.ts_fast.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
        assert!(out.ts_slow[399].is_some());
        assert!(out.band[399].unwrap() >= 0.0);
    }

    #[test]
    fn steady_decline_is_contrarian_bull() {
        let closes: Vec<f64> = (0..200).map(|i| 300.0 - i as f64).collect();
        let out = OscillatorPair.compute(&closes);
        assert_eq!(out.contrarian_bull(199), Some(true));
        assert_eq!(out.contrarian_bear(199), Some(false));
        assert_eq!(out.contrarian_bull(0), None);
    }
}
