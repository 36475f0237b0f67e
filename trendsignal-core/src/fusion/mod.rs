//! Signal fusion: Supertrend crossover + confirmations + optional filters.

pub mod engine;
pub mod filters;
pub mod preset;

pub use engine::{BarDecision, FusionEvaluation, SignalFusionEngine};
pub use filters::{FilterKind, FilterSet, FilterStyle, ALL_FILTERS};
pub use preset::Preset;
