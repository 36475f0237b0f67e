//! Bounded newest-first pivot history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pivots kept per kind.
pub const PIVOT_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    pub kind: PivotKind,
}

/// Swing pivots of one kind, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotHistory {
    kind: PivotKind,
    points: VecDeque<PivotPoint>,
}

impl PivotHistory {
    pub fn new(kind: PivotKind) -> Self {
        Self {
            kind,
            points: VecDeque::with_capacity(PIVOT_CAPACITY + 1),
        }
    }

    pub fn kind(&self) -> PivotKind {
        self.kind
    }

    /// Push a pivot to the front, evicting the oldest beyond capacity.
    ///
    /// Returns `false` (and records nothing) when `price` equals the
    /// current newest pivot.
    pub fn insert(&mut self, price: f64, timestamp: DateTime<Utc>) -> bool {
        if self.newest().is_some_and(|p| p.price == price) {
            return false;
        }
        self.points.push_front(PivotPoint {
            price,
            timestamp,
            kind: self.kind,
        });
        self.points.truncate(PIVOT_CAPACITY);
        true
    }

    pub fn newest(&self) -> Option<&PivotPoint> {
        self.points.front()
    }

    /// Price `k` pivots back; `price(0)` is the newest.
    pub fn price(&self, k: usize) -> Option<f64> {
        self.points.get(k).map(|p| p.price)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PivotPoint> {
        self.points.iter()
    }
}
