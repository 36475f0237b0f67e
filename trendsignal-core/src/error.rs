//! Structured error types for the signal engine.
//!
//! Three families, each handled differently by callers:
//! - `DataError`: the candle input is unusable; the cycle emits nothing.
//! - `ConfigError`: construction-time failure; never defaulted around.
//! - Degenerate arithmetic (zero denominators) is not an error at all: the
//!   affected frame field is `None` for that bar only.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The first sanity violation found in a single candle.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CandleFault {
    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
    #[error("{field} {value} is not a positive price")]
    NonPositivePrice { field: &'static str, value: f64 },
    #[error("volume {0} is negative")]
    NegativeVolume(f64),
    #[error("high {high} is below low {low}")]
    HighBelowLow { high: f64, low: f64 },
    #[error("{field} {value} outside [low, high]")]
    OutsideRange { field: &'static str, value: f64 },
}

/// Errors raised by candle validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("invalid candle at index {index} ({timestamp}): {fault}")]
    InvalidCandle {
        index: usize,
        timestamp: DateTime<Utc>,
        fault: CandleFault,
    },

    #[error("timestamp at index {index} ({current}) is not after the previous candle ({previous})")]
    NonIncreasingTimestamp {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("gap of {gap_secs}s before index {index} exceeds the allowed {max_secs}s")]
    TimestampGap {
        index: usize,
        gap_secs: i64,
        max_secs: i64,
    },

    #[error("evaluation range {start}..{end} is outside a series of {len} candles")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
}

/// Errors that can occur while building or validating an engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Unknown filter style: {0}")]
    UnknownFilterStyle(String),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("parse config TOML: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Any error the engine can surface.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_name_the_input() {
        let err = ConfigError::UnknownPreset("turbo".into());
        assert_eq!(err.to_string(), "Unknown preset: turbo");

        let err = ConfigError::invalid("hma_period", "must be >= 2");
        assert_eq!(
            err.to_string(),
            "invalid parameter `hma_period`: must be >= 2"
        );
    }

    #[test]
    fn engine_error_wraps_both_families() {
        let err: EngineError = ConfigError::UnknownFilterStyle("x".into()).into();
        assert!(matches!(err, EngineError::Config(_)));

        let err: EngineError = DataError::RangeOutOfBounds {
            start: 0,
            end: 5,
            len: 3,
        }
        .into();
        assert!(err.to_string().contains("outside a series of 3"));
    }
}
