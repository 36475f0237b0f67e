//! Supertrend: ATR band-ratchet trend tracker.
//!
//! Bands are anchored on the close: upper = close + mult*ATR,
//! lower = close - mult*ATR. Final bands ratchet: the lower band only
//! rises (or resets after a close below it), the upper band only falls
//! (or resets after a close above it). Direction flips only when the close
//! crosses the opposite final band.
//!
//! Output per bar: the active line (final lower band when trending up,
//! final upper band when trending down) together with its direction.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::error::ConfigError;
use crate::indicators::{simple_atr, wilder_atr, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Which ATR feeds the bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtrSmoothing {
    #[default]
    Wilder,
    Simple,
}

/// Supertrend state after one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupertrendState {
    pub direction: TrendDirection,
    /// The active line.
    pub value: f64,
    pub final_upper: f64,
    pub final_lower: f64,
    /// Close of the bar this state was computed on.
    pub close: f64,
}

/// Per-bar input once ATR is defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupertrendInput {
    pub close: f64,
    pub atr: f64,
}

/// Advance the state machine by one bar.
///
/// `prior` is `None` on the first bar with a defined ATR; that bar starts
/// trending up on its lower band.
pub fn step(
    prior: Option<&SupertrendState>,
    input: SupertrendInput,
    multiplier: f64,
) -> SupertrendState {
    let close = input.close;
    let upper = close + multiplier * input.atr;
    let lower = close - multiplier * input.atr;

    let Some(p) = prior else {
        return SupertrendState {
            direction: TrendDirection::Up,
            value: lower,
            final_upper: upper,
            final_lower: lower,
            close,
        };
    };

    let final_lower = if lower > p.final_lower || p.close < p.final_lower {
        lower
    } else {
        p.final_lower
    };
    let final_upper = if upper < p.final_upper || p.close > p.final_upper {
        upper
    } else {
        p.final_upper
    };

    let direction = match p.direction {
        TrendDirection::Down if close > final_upper => TrendDirection::Up,
        TrendDirection::Up if close < final_lower => TrendDirection::Down,
        unchanged => unchanged,
    };
    let value = match direction {
        TrendDirection::Up => final_lower,
        TrendDirection::Down => final_upper,
    };

    SupertrendState {
        direction,
        value,
        final_upper,
        final_lower,
        close,
    }
}

#[derive(Debug, Clone)]
pub struct SupertrendTracker {
    period: usize,
    multiplier: f64,
    smoothing: AtrSmoothing,
}

impl SupertrendTracker {
    pub fn new(period: usize, multiplier: f64, smoothing: AtrSmoothing) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::invalid("supertrend_period", "must be >= 1"));
        }
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(ConfigError::invalid(
                "sensitivity",
                format!("must be a positive number, got {multiplier}"),
            ));
        }
        Ok(Self {
            period,
            multiplier,
            smoothing,
        })
    }

    /// First index with a defined state.
    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    pub fn compute(&self, candles: &[Candle]) -> Vec<Option<SupertrendState>> {
        let atr: Series = match self.smoothing {
            AtrSmoothing::Wilder => wilder_atr(candles, self.period),
            AtrSmoothing::Simple => simple_atr(candles, self.period),
        };

        let mut prior: Option<SupertrendState> = None;
        candles
            .iter()
            .zip(atr)
            .map(|(candle, atr)| {
                let atr = atr?;
                let state = step(
                    prior.as_ref(),
                    SupertrendInput {
                        close: candle.close,
                        atr,
                    },
                    self.multiplier,
                );
                prior = Some(state);
                Some(state)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_candles, make_ohlc_candles};
    use crate::trackers::cross_below;

    fn input(close: f64, atr: f64) -> SupertrendInput {
        SupertrendInput { close, atr }
    }

    #[test]
    fn first_state_trends_up_on_lower_band() {
        let s = step(None, input(100.0, 2.0), 3.0);
        assert_eq!(s.direction, TrendDirection::Up);
        assert_eq!(s.value, 94.0);
        assert_eq!(s.final_upper, 106.0);
        assert_eq!(s.final_lower, 94.0);
    }

    #[test]
    fn lower_band_holds_tighter_value() {
        let s0 = step(None, input(100.0, 2.0), 3.0); // lower 94
        // close dips to 99: raw lower 93 < 94 and prior close 100 >= 94 → hold 94
        let s1 = step(Some(&s0), input(99.0, 2.0), 3.0);
        assert_eq!(s1.final_lower, 94.0);
        assert_eq!(s1.direction, TrendDirection::Up);
        // close rises to 103: raw lower 97 > 94 → ratchet up
        let s2 = step(Some(&s1), input(103.0, 2.0), 3.0);
        assert_eq!(s2.final_lower, 97.0);
        assert_eq!(s2.value, 97.0);
    }

    #[test]
    fn flips_down_only_below_final_lower() {
        let s0 = step(None, input(100.0, 1.0), 2.0); // lower 98
        let s1 = step(Some(&s0), input(98.5, 1.0), 2.0);
        assert_eq!(s1.direction, TrendDirection::Up);
        let s2 = step(Some(&s1), input(97.0, 1.0), 2.0);
        assert_eq!(s2.direction, TrendDirection::Down);
        assert_eq!(s2.value, s2.final_upper);
    }

    #[test]
    fn down_regime_flips_up_above_final_upper() {
        let s0 = step(None, input(100.0, 1.0), 2.0);
        let down = step(Some(&s0), input(90.0, 1.0), 2.0);
        assert_eq!(down.direction, TrendDirection::Down);
        // upper band: raw 92 < 102 → 92
        assert_eq!(down.final_upper, 92.0);
        let hold = step(Some(&down), input(91.5, 1.0), 2.0);
        assert_eq!(hold.direction, TrendDirection::Down);
        let up = step(Some(&hold), input(95.0, 1.0), 2.0);
        assert_eq!(up.direction, TrendDirection::Up);
        assert_eq!(up.value, up.final_lower);
    }

    #[test]
    fn rising_series_never_crosses_under() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + i as f64 * 0.5).collect();
        let candles = make_candles(&closes);
        for smoothing in [AtrSmoothing::Wilder, AtrSmoothing::Simple] {
            let result = SupertrendTracker::new(10, 3.0, smoothing).unwrap().compute(&candles);
            let states: Vec<(usize, SupertrendState)> = result
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.map(|s| (i, s)))
                .collect();
            assert!(!states.is_empty());
            for (i, s) in &states {
                assert_eq!(s.direction, TrendDirection::Up, "bar {i}");
            }
            for pair in states.windows(2) {
                let (i, prev) = pair[0];
                let (_, cur) = pair[1];
                assert!(
                    !cross_below(closes[i], prev.value, cur.close, cur.value),
                    "crossunder after bar {i}"
                );
            }
        }
    }

    #[test]
    fn direction_changes_only_on_band_cross() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + (i as f64 * 0.07).sin() * 12.0 + (i as f64 * 0.31).cos() * 3.0)
            .collect();
        let result = SupertrendTracker::new(7, 2.0, AtrSmoothing::Wilder)
            .unwrap()
            .compute(&make_candles(&closes));
        let mut flips = 0;
        for i in 1..result.len() {
            let (Some(prev), Some(cur)) = (result[i - 1], result[i]) else {
                continue;
            };
            match (prev.direction, cur.direction) {
                (TrendDirection::Up, TrendDirection::Down) => {
                    flips += 1;
                    assert!(cur.close < cur.final_lower);
                }
                (TrendDirection::Down, TrendDirection::Up) => {
                    flips += 1;
                    assert!(cur.close > cur.final_upper);
                }
                _ => {}
            }
        }
        assert!(flips > 0, "oscillating series should flip at least once");
    }

    #[test]
    fn undefined_until_atr_defined() {
        let candles = make_ohlc_candles(&[(100.0, 105.0, 95.0, 102.0); 3]);
        let result = SupertrendTracker::new(5, 3.0, AtrSmoothing::Wilder).unwrap().compute(&candles);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn lookback_matches_first_defined_index() {
        let candles = make_candles(&[100.0; 20]);
        let tracker = SupertrendTracker::new(6, 3.0, AtrSmoothing::Simple).unwrap();
        let result = tracker.compute(&candles);
        assert_eq!(result.iter().position(Option::is_some), Some(tracker.lookback()));
    }

    #[test]
    fn rejects_zero_period_and_non_positive_multiplier() {
        let err = SupertrendTracker::new(0, 3.0, AtrSmoothing::Wilder).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "supertrend_period", .. }));
        for multiplier in [0.0, -1.5, f64::NAN] {
            let err = SupertrendTracker::new(10, multiplier, AtrSmoothing::Wilder).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidParameter { name: "sensitivity", .. }));
        }
    }
}
