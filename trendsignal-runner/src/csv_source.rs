//! Candle files: `timestamp,open,high,low,close,volume`, oldest first.
//!
//! Timestamps are RFC 3339 (`2024-03-15T09:30:00Z`) or unix seconds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use trendsignal_core::collaborators::{CandleSource, CollaboratorError};
use trendsignal_core::{Candle, CandleSeries};

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Read every row of a candle file. Row order is kept as written; ordering
/// and sanity checks happen when the rows enter a `CandleSeries`.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, CollaboratorError> {
    let unavailable = |reason: String| CollaboratorError::Unavailable {
        service: "candle file",
        reason,
    };
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| unavailable(format!("{}: {e}", path.display())))?;

    let mut candles = Vec::new();
    for (row_no, result) in reader.deserialize::<CandleRow>().enumerate() {
        let row = result.map_err(|e| unavailable(format!("{} row {}: {e}", path.display(), row_no + 1)))?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            unavailable(format!(
                "{} row {}: bad timestamp {:?}",
                path.display(),
                row_no + 1,
                row.timestamp
            ))
        })?;
        candles.push(Candle {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    debug!(path = %path.display(), rows = candles.len(), "read candle file");
    Ok(candles)
}

/// Read and validate a whole candle file.
pub fn load_series(path: &Path) -> Result<CandleSeries> {
    let candles = read_candles(path)?;
    CandleSeries::from_candles(candles)
        .with_context(|| format!("invalid candle data in {}", path.display()))
}

/// A candle file that an external process keeps appending to.
///
/// Every `fetch` re-reads the file, so the newest row may be the bar that is
/// still forming.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    symbol: String,
    path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(symbol: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            symbol: symbol.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandleSource for CsvCandleSource {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn fetch(&mut self, count: usize) -> Result<Vec<Candle>, CollaboratorError> {
        let mut candles = read_candles(&self.path)?;
        let skip = candles.len().saturating_sub(count);
        candles.drain(..skip);
        Ok(candles)
    }
}
