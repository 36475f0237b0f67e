//! Candles, the fundamental market data unit, and the append-only series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CandleFault, DataError};

/// OHLCV candle for one instrument over one bar interval.
///
/// `timestamp` is the bar's open time. Candles are immutable once appended
/// to a `CandleSeries`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// The first sanity violation, if any.
    ///
    /// Checks, in order: every field is finite, every price is strictly
    /// positive, volume is non-negative, high >= low, and the high/low
    /// envelope contains open and close.
    pub fn validate(&self) -> Result<(), CandleFault> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CandleFault::NonFinite { field });
        }
        let prices = &fields[..4];
        if let Some(&(field, value)) = prices.iter().find(|(_, v)| *v <= 0.0) {
            return Err(CandleFault::NonPositivePrice { field, value });
        }
        if self.volume < 0.0 {
            return Err(CandleFault::NegativeVolume(self.volume));
        }
        if self.high < self.low {
            return Err(CandleFault::HighBelowLow {
                high: self.high,
                low: self.low,
            });
        }
        for (field, value) in [("open", self.open), ("close", self.close)] {
            if value > self.high || value < self.low {
                return Err(CandleFault::OutsideRange { field, value });
            }
        }
        Ok(())
    }
}

/// Append-only, strictly time-ordered sequence of candles.
///
/// Indices are never renumbered: `push` only adds at the end, and there is
/// no removal API.
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from candles, validating every append.
    pub fn from_candles(candles: impl IntoIterator<Item = Candle>) -> Result<Self, DataError> {
        let mut series = Self::new();
        for candle in candles {
            series.push(candle)?;
        }
        Ok(series)
    }

    /// Append a candle. Rejects invalid candles and non-increasing timestamps.
    pub fn push(&mut self, candle: Candle) -> Result<(), DataError> {
        let index = self.candles.len();
        candle
            .validate()
            .map_err(|fault| DataError::InvalidCandle {
                index,
                timestamp: candle.timestamp,
                fault,
            })?;
        if let Some(prev) = self.candles.last() {
            if candle.timestamp <= prev.timestamp {
                return Err(DataError::NonIncreasingTimestamp {
                    index,
                    previous: prev.timestamp,
                    current: candle.timestamp,
                });
            }
        }
        self.candles.push(candle);
        Ok(())
    }

    /// Verify no two consecutive candles in `range` are further apart than `max_secs`.
    pub fn check_max_gap(
        &self,
        range: std::ops::Range<usize>,
        max_secs: i64,
    ) -> Result<(), DataError> {
        let start = range.start.max(1);
        for index in start..range.end.min(self.candles.len()) {
            let gap_secs = (self.candles[index].timestamp - self.candles[index - 1].timestamp)
                .num_seconds();
            if gap_secs > max_secs {
                return Err(DataError::TimestampGap {
                    index,
                    gap_secs,
                    max_secs,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn candle_at(minutes: i64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn push_accepts_increasing_timestamps() {
        let mut series = CandleSeries::new();
        series.push(candle_at(0, 100.0)).unwrap();
        series.push(candle_at(15, 101.0)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, 101.0);
    }

    #[test]
    fn push_rejects_duplicate_timestamp() {
        let mut series = CandleSeries::new();
        series.push(candle_at(15, 100.0)).unwrap();
        let err = series.push(candle_at(15, 101.0)).unwrap_err();
        assert!(matches!(err, DataError::NonIncreasingTimestamp { index: 1, .. }));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn push_rejects_nan_close() {
        let mut bad = candle_at(0, 100.0);
        bad.close = f64::NAN;
        let err = CandleSeries::from_candles(vec![bad]).unwrap_err();
        assert!(matches!(err, DataError::InvalidCandle { index: 0, .. }));
    }

    #[test]
    fn push_rejects_inverted_range() {
        let mut bad = candle_at(0, 100.0);
        bad.high = 98.0;
        assert_eq!(
            bad.validate(),
            Err(CandleFault::HighBelowLow {
                high: 98.0,
                low: 99.0
            })
        );
    }

    #[test]
    fn validate_names_each_fault() {
        let base = candle_at(0, 100.0);
        assert_eq!(base.validate(), Ok(()));

        let cases = [
            (
                Candle { volume: f64::INFINITY, ..base },
                CandleFault::NonFinite { field: "volume" },
            ),
            (
                Candle { volume: -1.0, ..base },
                CandleFault::NegativeVolume(-1.0),
            ),
            (
                Candle { open: 101.5, ..base },
                CandleFault::OutsideRange {
                    field: "open",
                    value: 101.5,
                },
            ),
            (
                Candle { close: 98.5, ..base },
                CandleFault::OutsideRange {
                    field: "close",
                    value: 98.5,
                },
            ),
        ];
        for (candle, fault) in cases {
            assert_eq!(candle.validate(), Err(fault));
        }
    }

    #[test]
    fn zero_or_negative_prices_are_rejected() {
        let zero_close = Candle {
            open: 0.0,
            high: 0.5,
            low: 0.0,
            close: 0.0,
            ..candle_at(0, 100.0)
        };
        assert_eq!(
            zero_close.validate(),
            Err(CandleFault::NonPositivePrice {
                field: "open",
                value: 0.0
            })
        );

        let below_zero = Candle {
            low: -2.0,
            ..candle_at(15, 1.0)
        };
        let err = CandleSeries::from_candles(vec![candle_at(0, 5.0), below_zero]).unwrap_err();
        assert_eq!(
            err,
            DataError::InvalidCandle {
                index: 1,
                timestamp: below_zero.timestamp,
                fault: CandleFault::NonPositivePrice {
                    field: "low",
                    value: -2.0
                },
            }
        );
        assert_eq!(
            err.to_string(),
            format!(
                "invalid candle at index 1 ({}): low -2 is not a positive price",
                below_zero.timestamp
            )
        );
    }

    #[test]
    fn max_gap_detects_hole() {
        let series = CandleSeries::from_candles(vec![
            candle_at(0, 100.0),
            candle_at(15, 100.0),
            candle_at(90, 100.0),
        ])
        .unwrap();
        assert!(series.check_max_gap(0..2, 15 * 60).is_ok());
        let err = series.check_max_gap(0..3, 15 * 60).unwrap_err();
        assert_eq!(
            err,
            DataError::TimestampGap {
                index: 2,
                gap_secs: 75 * 60,
                max_secs: 15 * 60
            }
        );
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let candle = candle_at(0, 100.0);
        let json = serde_json::to_string(&candle).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(candle, deser);
    }
}
