//! Supertrend crossover fused with confirmations and optional filters.
//!
//! Base signal: the close crosses the Supertrend line between i-1 and i.
//! A crossover one bar late still counts when the Donchian trend opposed it
//! on that bar (one-bar grace). Under `Preset::Confirmed` the base signal
//! also needs MACD, EMA ordering, a rising/falling HMA and Donchian trend
//! agreement; `Preset::AllSignals` takes the raw cross alone.
//!
//! Any required input that is undefined on the bar fails its check.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{Candle, SignalKind, SignalReason};
use crate::frame::IndicatorFrame;
use crate::trackers::{cross_above, cross_below};

use super::filters::FilterSet;
use super::preset::Preset;

/// Fusion verdict for one bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BarDecision {
    pub index: usize,
    pub bull: bool,
    pub bear: bool,
    /// Reasons for whichever side fired; empty when neither did.
    pub reasons: Vec<SignalReason>,
}

impl BarDecision {
    pub fn kind(&self) -> Option<SignalKind> {
        match (self.bull, self.bear) {
            (true, false) => Some(SignalKind::Buy),
            (false, true) => Some(SignalKind::Sell),
            _ => None,
        }
    }
}

/// Decisions for the latest closed bar and the one before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionEvaluation {
    pub latest: BarDecision,
    pub previous: Option<BarDecision>,
}

impl FusionEvaluation {
    /// The side that is true on the latest bar but was not on the previous.
    pub fn rising_edge(&self) -> Option<SignalKind> {
        let kind = self.latest.kind()?;
        let was_on = self.previous.as_ref().is_some_and(|p| match kind {
            SignalKind::Buy => p.bull,
            SignalKind::Sell => p.bear,
        });
        (!was_on).then_some(kind)
    }
}

#[derive(Debug, Clone)]
pub struct SignalFusionEngine {
    preset: Preset,
    filters: FilterSet,
    adx_threshold: f64,
}

impl SignalFusionEngine {
    pub fn new(preset: Preset, filters: FilterSet, adx_threshold: f64) -> Self {
        Self {
            preset,
            filters,
            adx_threshold,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.preset,
            FilterSet::new(config.filter_style, &config.extra_filters),
            config.adx_threshold,
        )
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn filters(&self) -> FilterSet {
        self.filters
    }

    /// Evaluate both sides on bar `i`.
    pub fn decide(&self, frame: &IndicatorFrame, candles: &[Candle], i: usize) -> BarDecision {
        let bull = self.side(SignalKind::Buy, frame, candles, i);
        let bear = self.side(SignalKind::Sell, frame, candles, i);
        let (bull_ok, bear_ok) = (bull.is_some(), bear.is_some());
        let reasons = match (bull, bear) {
            (Some(r), None) | (None, Some(r)) => r,
            _ => Vec::new(),
        };
        BarDecision {
            index: i,
            bull: bull_ok,
            bear: bear_ok,
            reasons,
        }
    }

    /// Decisions for `latest` and `latest - 1`.
    pub fn evaluate_closed(
        &self,
        frame: &IndicatorFrame,
        candles: &[Candle],
        latest: usize,
    ) -> FusionEvaluation {
        FusionEvaluation {
            latest: self.decide(frame, candles, latest),
            previous: latest.checked_sub(1).map(|p| self.decide(frame, candles, p)),
        }
    }

    /// Fill `bull_signal` / `bear_signal` for every bar of the frame.
    pub fn annotate(&self, frame: &mut IndicatorFrame, candles: &[Candle]) {
        for i in 0..frame.len().min(candles.len()) {
            let d = self.decide(frame, candles, i);
            frame.bull_signal[i] = d.bull;
            frame.bear_signal[i] = d.bear;
        }
    }

    /// Reasons if `side` fires on bar `i`.
    fn side(
        &self,
        side: SignalKind,
        frame: &IndicatorFrame,
        candles: &[Candle],
        i: usize,
    ) -> Option<Vec<SignalReason>> {
        let grace_allowed = self.preset.requires_confirmation();
        let mut reasons = vec![base_signal(side, frame, candles, i, grace_allowed)?];

        if self.preset.requires_confirmation() {
            if !confirmed(side, frame, i) {
                return None;
            }
            reasons.push(SignalReason::Confirmed);
        }

        for kind in self.filters.iter() {
            if !kind.check(side, frame, candles, i, self.adx_threshold) {
                return None;
            }
            reasons.push(kind.reason());
        }
        Some(reasons)
    }
}

/// Close crossed the Supertrend line between bars `i - 1` and `i`.
fn supertrend_cross(side: SignalKind, frame: &IndicatorFrame, candles: &[Candle], i: usize) -> bool {
    let Some(p) = i.checked_sub(1) else {
        return false;
    };
    let (Some(prev), Some(cur)) = (frame.supertrend[p], frame.supertrend[i]) else {
        return false;
    };
    let cross = match side {
        SignalKind::Buy => cross_above,
        SignalKind::Sell => cross_below,
    };
    cross(candles[p].close, prev.value, candles[i].close, cur.value)
}

fn base_signal(
    side: SignalKind,
    frame: &IndicatorFrame,
    candles: &[Candle],
    i: usize,
    grace_allowed: bool,
) -> Option<SignalReason> {
    let (now, late) = match side {
        SignalKind::Buy => (
            SignalReason::SupertrendCrossover,
            SignalReason::SupertrendCrossoverGrace,
        ),
        SignalKind::Sell => (
            SignalReason::SupertrendCrossunder,
            SignalReason::SupertrendCrossunderGrace,
        ),
    };
    if supertrend_cross(side, frame, candles, i) {
        return Some(now);
    }
    let p = i.checked_sub(1)?;
    let opposed = frame.donchian.trend[p] as f64 == -side.sign();
    (grace_allowed && opposed && supertrend_cross(side, frame, candles, p)).then_some(late)
}

fn confirmed(side: SignalKind, frame: &IndicatorFrame, i: usize) -> bool {
    let s = side.sign();
    let Some(p) = i.checked_sub(1) else {
        return false;
    };

    let macd_ok = matches!(
        (frame.macd.line[i], frame.macd.line[p]),
        (Some(m), Some(prev)) if s * m > 0.0 && s * (m - prev) > 0.0
    );
    let ema_ok = matches!(
        (frame.ema_fast[i], frame.ema_slow[i]),
        (Some(fast), Some(slow)) if s * (fast - slow) > 0.0
    );
    let hma_ok = i >= 2
        && matches!(
            (frame.hma[i], frame.hma[i - 2]),
            (Some(h), Some(back)) if s * (h - back) > 0.0
        );
    let donchian_ok = frame.donchian.trend[i] as f64 == s;

    macd_ok && ema_ok && hma_ok && donchian_ok
}
