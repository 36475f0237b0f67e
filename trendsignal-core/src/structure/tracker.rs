//! Market structure tracker: pivots → liquidity → BOS / MSU → decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Candle, SignalKind, SignalReason};
use crate::error::ConfigError;

use super::liquidity::{LiquidityLevels, LiquidityPattern};
use super::pivots::{PivotHistory, PivotKind};
use super::swing::find_swings;

/// Retest tolerance around the ILQ, as a fraction of price.
pub const RETEST_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureDirection {
    Bullish,
    Bearish,
}

/// A break of structure that fired on this bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BosEvent {
    pub direction: StructureDirection,
    /// The TLQ that was crossed.
    pub level: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDecision {
    pub kind: SignalKind,
    pub reasons: Vec<SignalReason>,
}

/// Everything one `update` observed on its bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureUpdate {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub pattern: Option<LiquidityPattern>,
    pub bos: Option<BosEvent>,
    pub msu: Option<StructureDirection>,
    pub direction: StructureDirection,
    pub decision: Option<StructureDecision>,
}

/// Pivot, liquidity and direction state, mutated once per update.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketStructureState {
    highs: PivotHistory,
    lows: PivotHistory,
    levels: LiquidityLevels,
    direction: StructureDirection,
    last_break_time: Option<DateTime<Utc>>,
    last_high_time: Option<DateTime<Utc>>,
    last_low_time: Option<DateTime<Utc>>,
    bullish_armed: bool,
    bearish_armed: bool,
}

impl Default for MarketStructureState {
    fn default() -> Self {
        Self {
            highs: PivotHistory::new(PivotKind::High),
            lows: PivotHistory::new(PivotKind::Low),
            levels: LiquidityLevels::default(),
            direction: StructureDirection::Bullish,
            last_break_time: None,
            last_high_time: None,
            last_low_time: None,
            bullish_armed: true,
            bearish_armed: true,
        }
    }
}

impl MarketStructureState {
    pub fn highs(&self) -> &PivotHistory {
        &self.highs
    }

    pub fn lows(&self) -> &PivotHistory {
        &self.lows
    }

    pub fn levels(&self) -> &LiquidityLevels {
        &self.levels
    }

    pub fn direction(&self) -> StructureDirection {
        self.direction
    }

    pub fn last_break_time(&self) -> Option<DateTime<Utc>> {
        self.last_break_time
    }

    /// Newest swing bar already consumed, across both kinds.
    fn last_consumed(&self) -> Option<DateTime<Utc>> {
        self.last_high_time.max(self.last_low_time)
    }

    /// Insert swings not seen before. Returns which kinds gained a pivot.
    fn absorb_swings(&mut self, candles: &[Candle], lookback: usize) -> (bool, bool) {
        // every bar up to the last consumed swing was already fully scanned
        let from = match self.last_consumed() {
            Some(t) => candles.partition_point(|c| c.timestamp <= t),
            None => 0,
        };

        let mut new_high = false;
        let mut new_low = false;
        for swing in find_swings(candles, from, lookback) {
            let ts = candles[swing.index].timestamp;
            let (history, last) = match swing.kind {
                PivotKind::High => (&mut self.highs, &mut self.last_high_time),
                PivotKind::Low => (&mut self.lows, &mut self.last_low_time),
            };
            if last.is_some_and(|t| ts <= t) {
                continue;
            }
            *last = Some(ts);
            if history.insert(swing.price, ts) {
                debug!(kind = ?swing.kind, price = swing.price, %ts, "pivot recorded");
                match swing.kind {
                    PivotKind::High => new_high = true,
                    PivotKind::Low => new_low = true,
                }
            }
        }
        (new_high, new_low)
    }

    fn detect_bos(&mut self, candle: &Candle) -> Option<BosEvent> {
        let close = candle.close;
        let mut event = None;

        if let Some(level) = self.levels.bottom_tlq() {
            if close < level && self.direction != StructureDirection::Bearish && self.bearish_armed {
                self.direction = StructureDirection::Bearish;
                self.bearish_armed = false;
                event = Some(BosEvent {
                    direction: StructureDirection::Bearish,
                    level,
                    timestamp: candle.timestamp,
                });
            }
        }
        if let Some(level) = self.levels.top_tlq() {
            if close > level && self.direction != StructureDirection::Bullish && self.bullish_armed {
                self.direction = StructureDirection::Bullish;
                self.bullish_armed = false;
                event = Some(BosEvent {
                    direction: StructureDirection::Bullish,
                    level,
                    timestamp: candle.timestamp,
                });
            }
        }

        if let Some(bos) = event {
            self.last_break_time = Some(bos.timestamp);
            info!(direction = ?bos.direction, level = bos.level, close, "break of structure");
        }
        event
    }

    fn detect_msu(&self, candle: &Candle) -> Option<StructureDirection> {
        let (ph0, ph1) = (self.highs.price(0)?, self.highs.price(1)?);
        let (pl0, pl1) = (self.lows.price(0)?, self.lows.price(1)?);

        if ph0 < ph1 && pl0 < pl1 && candle.high > ph0 && candle.high < ph1 {
            Some(StructureDirection::Bearish)
        } else if pl0 > pl1 && ph0 > ph1 && candle.low < pl0 && candle.low > pl1 {
            Some(StructureDirection::Bullish)
        } else {
            None
        }
    }

    /// Rules in priority order; the last match sets the kind.
    fn decide(
        &self,
        candle: &Candle,
        bos: Option<&BosEvent>,
        msu: Option<StructureDirection>,
    ) -> Option<StructureDecision> {
        let close = candle.close;
        let bottom_ilq = self.levels.bottom_ilq();
        let top_ilq = self.levels.top_ilq();
        let bullish = self.direction == StructureDirection::Bullish;
        let bearish = self.direction == StructureDirection::Bearish;
        let mut matches: Vec<(SignalKind, SignalReason)> = Vec::new();

        match bos.map(|b| b.direction) {
            Some(StructureDirection::Bullish) if bottom_ilq.is_some_and(|ilq| close > ilq) => {
                matches.push((SignalKind::Buy, SignalReason::BullishBosAboveIlq));
            }
            Some(StructureDirection::Bearish) if top_ilq.is_some_and(|ilq| close < ilq) => {
                matches.push((SignalKind::Sell, SignalReason::BearishBosBelowIlq));
            }
            _ => {}
        }

        match msu {
            Some(StructureDirection::Bullish) if bullish => {
                matches.push((SignalKind::Buy, SignalReason::BullishMsu));
            }
            Some(StructureDirection::Bearish) if bearish => {
                matches.push((SignalKind::Sell, SignalReason::BearishMsu));
            }
            _ => {}
        }

        if let Some(ilq) = bottom_ilq.filter(|_| bullish) {
            if candle.low <= ilq * (1.0 + RETEST_TOLERANCE) && close > ilq {
                matches.push((SignalKind::Buy, SignalReason::BullishIlqRetest));
            }
        }
        if let Some(ilq) = top_ilq.filter(|_| bearish) {
            if candle.high >= ilq * (1.0 - RETEST_TOLERANCE) && close < ilq {
                matches.push((SignalKind::Sell, SignalReason::BearishIlqRetest));
            }
        }

        let (kind, _) = *matches.last()?;
        let reasons = matches
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r)
            .collect();
        Some(StructureDecision { kind, reasons })
    }
}

/// Tracks market structure for one instrument across successive updates.
#[derive(Debug, Clone)]
pub struct MarketStructureTracker {
    lookback: usize,
    state: MarketStructureState,
}

impl MarketStructureTracker {
    pub fn new(lookback: usize) -> Result<Self, ConfigError> {
        if lookback == 0 {
            return Err(ConfigError::invalid("swing_lookback", "must be >= 1"));
        }
        Ok(Self {
            lookback,
            state: MarketStructureState::default(),
        })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn state(&self) -> &MarketStructureState {
        &self.state
    }

    /// Evaluate bar `index` of `candles`, treating `candles[..=index]` as
    /// closed. Successive calls must move forward in time.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn update(&mut self, candles: &[Candle], index: usize) -> StructureUpdate {
        let closed = &candles[..=index];
        let candle = &closed[index];

        let (new_high, new_low) = self.state.absorb_swings(closed, self.lookback);
        if new_high {
            self.state.bearish_armed = true;
        }
        if new_low {
            self.state.bullish_armed = true;
        }

        let state = &mut self.state;
        let pattern = state.levels.recompute(&state.highs, &state.lows);
        let bos = state.detect_bos(candle);
        let msu = state.detect_msu(candle);
        let decision = state.decide(candle, bos.as_ref(), msu);

        if let Some(d) = &decision {
            debug!(kind = %d.kind, reasons = ?d.reasons, index, "structure decision");
        }

        StructureUpdate {
            bar_index: index,
            timestamp: candle.timestamp,
            pattern,
            bos,
            msu,
            direction: state.direction,
            decision,
        }
    }
}
