//! ATR-based stop-loss and take-profit tiers.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::SignalKind;

/// Stop distance as a fraction of entry when ATR is unusable.
pub const FALLBACK_STOP_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: [f64; 3],
    /// The stop distance came from the entry-price fallback.
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevelCalculator {
    atr_multiplier: f64,
    tp_multipliers: [f64; 3],
}

impl RiskLevelCalculator {
    pub fn new(atr_multiplier: f64, tp_multipliers: [f64; 3]) -> Self {
        Self {
            atr_multiplier,
            tp_multipliers,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.atr_multiplier, config.tp_multipliers)
    }

    /// Levels for a position entered at `entry` on `kind`.
    ///
    /// `entry` is a validated close and so strictly positive. A missing,
    /// zero or non-finite ATR falls back to a stop distance of
    /// `entry * FALLBACK_STOP_FRACTION`.
    pub fn levels(&self, entry: f64, kind: SignalKind, atr: Option<f64>) -> RiskLevels {
        let s = kind.sign();
        let (distance, used_fallback) = match atr {
            Some(a) if a.is_finite() && a > 0.0 => (a * self.atr_multiplier, false),
            _ => (entry.abs() * FALLBACK_STOP_FRACTION, true),
        };
        let stop_loss = entry - s * distance;
        let risk = (entry - stop_loss).abs();
        RiskLevels {
            stop_loss,
            take_profit: self.tp_multipliers.map(|m| entry + s * risk * m),
            used_fallback,
        }
    }
}

impl Default for RiskLevelCalculator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
