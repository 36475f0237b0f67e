//! TrendSignal Runner: drives `trendsignal-core` against real inputs.
//!
//! This crate provides:
//! - `RunnerConfig` loading from TOML
//! - A CSV candle source
//! - Order sinks (log, JSONL file, in-memory) and position sentinels
//! - The live trading cycle
//! - Historical replay scans, parallel across instruments

pub mod config;
pub mod csv_source;
pub mod cycle;
pub mod scan;
pub mod sinks;

pub use config::{RunnerConfig, RunnerError, DEFAULT_WINDOW};
pub use csv_source::{load_series, read_candles, CsvCandleSource};
pub use cycle::{CycleError, CycleOutcome, TradingCycle};
pub use scan::{replay, scan_many, ScanJob, ScanReport};
pub use sinks::{FixedPositions, JsonlSink, LogSink, NoPositions, OrderRecord, RecordingSink};
