//! Market structure: swing pivots, liquidity levels, break of structure
//! (BOS) and market structure update (MSU).
//!
//! All mutable state lives in one [`MarketStructureState`] owned by a
//! [`MarketStructureTracker`]; callers read it through getters only.

pub mod liquidity;
pub mod pivots;
pub mod swing;
pub mod tracker;

pub use liquidity::{LiquidityLevel, LiquidityLevels, LiquidityPattern, LiquiditySide, LiquidityType};
pub use pivots::{PivotHistory, PivotKind, PivotPoint, PIVOT_CAPACITY};
pub use swing::{find_swings, is_swing_high, is_swing_low, Swing};
pub use tracker::{
    BosEvent, MarketStructureState, MarketStructureTracker, StructureDecision, StructureDirection,
    StructureUpdate, RETEST_TOLERANCE,
};
