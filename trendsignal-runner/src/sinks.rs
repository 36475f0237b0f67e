//! Order sinks and position sentinels the runner ships with.
//!
//! Broker connectivity is out of scope: `JsonlSink` appends each order to a
//! file that an execution process can tail, `LogSink` only logs.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use trendsignal_core::collaborators::{CollaboratorError, OrderSink, PositionSentinel};
use trendsignal_core::Signal;

/// One line of an order file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub symbol: String,
    #[serde(flatten)]
    pub signal: Signal,
}

/// Logs each order at `info` and accepts it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OrderSink for LogSink {
    fn submit(&mut self, symbol: &str, signal: &Signal) -> Result<(), CollaboratorError> {
        info!(
            symbol,
            kind = %signal.kind,
            entry_price = signal.entry_price,
            stop_loss = signal.stop_loss,
            take_profit = ?signal.take_profit,
            "order"
        );
        Ok(())
    }
}

/// Appends one JSON object per order to a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every well-formed record in the file; malformed lines are skipped.
    pub fn read_all(&self) -> io::Result<Vec<OrderRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = io::BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(record) = serde_json::from_str::<OrderRecord>(&line) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl OrderSink for JsonlSink {
    fn submit(&mut self, symbol: &str, signal: &Signal) -> Result<(), CollaboratorError> {
        let record = OrderRecord {
            symbol: symbol.to_string(),
            signal: signal.clone(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{json}")?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps submitted orders in memory. `rejecting` builds one that refuses
/// every order, for exercising failure paths.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub orders: Vec<OrderRecord>,
    reject_with: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            orders: Vec::new(),
            reject_with: Some(reason.into()),
        }
    }
}

impl OrderSink for RecordingSink {
    fn submit(&mut self, symbol: &str, signal: &Signal) -> Result<(), CollaboratorError> {
        if let Some(reason) = &self.reject_with {
            return Err(CollaboratorError::Rejected(reason.clone()));
        }
        self.orders.push(OrderRecord {
            symbol: symbol.to_string(),
            signal: signal.clone(),
        });
        Ok(())
    }
}

/// Never reports an open position.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPositions;

impl PositionSentinel for NoPositions {
    fn open_count(&self, _symbol: &str) -> Result<usize, CollaboratorError> {
        Ok(0)
    }
}

/// Reports the same open-position count for every symbol.
#[derive(Debug, Clone, Copy)]
pub struct FixedPositions(pub usize);

impl PositionSentinel for FixedPositions {
    fn open_count(&self, _symbol: &str) -> Result<usize, CollaboratorError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trendsignal_core::{SignalKind, SignalOrigin, SignalReason};

    fn sample_signal(bar_index: usize) -> Signal {
        Signal {
            kind: SignalKind::Sell,
            origin: SignalOrigin::Fusion,
            entry_price: 200.0,
            stop_loss: 204.4,
            take_profit: [195.6, 191.2, 186.8],
            bar_index,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            reasons: vec![SignalReason::SupertrendCrossunder, SignalReason::Confirmed],
        }
    }

    #[test]
    fn jsonl_appends_one_line_per_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlSink::new(dir.path().join("orders/out.jsonl"));
        sink.submit("BTCUSDT", &sample_signal(10)).unwrap();
        sink.submit("ETHUSDT", &sample_signal(11)).unwrap();

        let text = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("\"symbol\":\"BTCUSDT\""));
        assert!(text.contains("\"kind\":\"SELL\""));

        let records = sink.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].symbol, "ETHUSDT");
        assert_eq!(records[1].signal, sample_signal(11));
    }

    #[test]
    fn jsonl_read_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let mut sink = JsonlSink::new(&path);
        sink.submit("BTCUSDT", &sample_signal(1)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        assert_eq!(sink.read_all().unwrap().len(), 1);
    }

    #[test]
    fn rejecting_sink_keeps_nothing() {
        let mut sink = RecordingSink::rejecting("market closed");
        let err = sink.submit("BTCUSDT", &sample_signal(1)).unwrap_err();
        assert_eq!(err.to_string(), "rejected: market closed");
        assert!(sink.orders.is_empty());
    }

    #[test]
    fn sentinels_report_counts() {
        assert_eq!(NoPositions.open_count("X").unwrap(), 0);
        assert_eq!(FixedPositions(2).open_count("X").unwrap(), 2);
    }
}
