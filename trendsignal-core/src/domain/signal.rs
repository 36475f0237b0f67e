//! Signal: the engine's only output.
//!
//! A signal is produced once per evaluation and never retained by the engine.
//! "No signal" is the absence of a `Signal`, not a third kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

impl SignalKind {
    /// +1.0 for Buy, -1.0 for Sell. Multiplies price offsets in risk maths.
    pub fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Which decision path produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalOrigin {
    Fusion,
    Structure,
}

/// Why a decision path fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalReason {
    SupertrendCrossover,
    SupertrendCrossoverGrace,
    SupertrendCrossunder,
    SupertrendCrossunderGrace,
    Confirmed,
    TrendStrength,
    StrongTrend,
    Contrarian,
    VolumeDivergence,
    BullishBosAboveIlq,
    BearishBosBelowIlq,
    BullishMsu,
    BearishMsu,
    BullishIlqRetest,
    BearishIlqRetest,
}

/// A BUY or SELL decision with its risk levels attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub origin: SignalOrigin,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: [f64; 3],
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub reasons: Vec<SignalReason>,
}
