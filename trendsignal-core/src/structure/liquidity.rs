//! Liquidity levels derived from the pivot histories.
//!
//! TLQ (trend liquidity) is the level whose break flips the structure; ILQ
//! (internal liquidity) is the most recent pivot on the same side, used as
//! the retest level. Top and bottom levels are never set together.

use serde::{Deserialize, Serialize};

use super::pivots::PivotHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquiditySide {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiquidityType {
    Tlq,
    Ilq,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityLevel {
    pub price: f64,
    pub side: LiquiditySide,
    #[serde(rename = "type")]
    pub kind: LiquidityType,
}

/// Which pivot pattern last set the levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityPattern {
    HigherHigh,
    LowerLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiquidityLevels {
    top_tlq: Option<f64>,
    top_ilq: Option<f64>,
    bottom_tlq: Option<f64>,
    bottom_ilq: Option<f64>,
}

impl LiquidityLevels {
    pub fn top_tlq(&self) -> Option<f64> {
        self.top_tlq
    }

    pub fn top_ilq(&self) -> Option<f64> {
        self.top_ilq
    }

    pub fn bottom_tlq(&self) -> Option<f64> {
        self.bottom_tlq
    }

    pub fn bottom_ilq(&self) -> Option<f64> {
        self.bottom_ilq
    }

    /// Every level currently set.
    pub fn levels(&self) -> Vec<LiquidityLevel> {
        [
            (self.top_tlq, LiquiditySide::Top, LiquidityType::Tlq),
            (self.top_ilq, LiquiditySide::Top, LiquidityType::Ilq),
            (self.bottom_tlq, LiquiditySide::Bottom, LiquidityType::Tlq),
            (self.bottom_ilq, LiquiditySide::Bottom, LiquidityType::Ilq),
        ]
        .into_iter()
        .filter_map(|(price, side, kind)| price.map(|price| LiquidityLevel { price, side, kind }))
        .collect()
    }

    /// Re-derive the levels from the pivots. Needs two pivots of each kind;
    /// returns the pattern applied, if any.
    ///
    /// Higher high (ph0 above ph1 and ph2) sets the bottom levels; lower low
    /// (pl0 below pl1 and pl2) sets the top levels. A missing ph2 / pl2 does
    /// not constrain. If both patterns hold, the one whose newest pivot is
    /// more recent wins, lower low on a tie.
    pub fn recompute(
        &mut self,
        highs: &PivotHistory,
        lows: &PivotHistory,
    ) -> Option<LiquidityPattern> {
        let (Some(ph0), Some(ph1)) = (highs.price(0), highs.price(1)) else {
            return None;
        };
        let (Some(pl0), Some(pl1)) = (lows.price(0), lows.price(1)) else {
            return None;
        };

        let higher_high = ph0 > ph1 && highs.price(2).map_or(true, |ph2| ph0 > ph2);
        let lower_low = pl0 < pl1 && lows.price(2).map_or(true, |pl2| pl0 < pl2);

        let pattern = match (higher_high, lower_low) {
            (true, true) => {
                let high_time = highs.newest().map(|p| p.timestamp);
                let low_time = lows.newest().map(|p| p.timestamp);
                if high_time > low_time {
                    LiquidityPattern::HigherHigh
                } else {
                    LiquidityPattern::LowerLow
                }
            }
            (true, false) => LiquidityPattern::HigherHigh,
            (false, true) => LiquidityPattern::LowerLow,
            (false, false) => return None,
        };

        match pattern {
            LiquidityPattern::HigherHigh => {
                self.bottom_tlq = Some(pl0.min(pl1));
                self.bottom_ilq = Some(pl0);
                self.top_tlq = None;
                self.top_ilq = None;
            }
            LiquidityPattern::LowerLow => {
                self.top_tlq = Some(ph0.max(ph1));
                self.top_ilq = Some(ph0);
                self.bottom_tlq = None;
                self.bottom_ilq = None;
            }
        }
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::pivots::PivotKind;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + chrono::Duration::minutes(minute)
    }

    /// Builds a history from oldest to newest (timestamps ascending).
    fn history(kind: PivotKind, prices: &[(f64, i64)]) -> PivotHistory {
        let mut h = PivotHistory::new(kind);
        for &(p, t) in prices {
            h.insert(p, at(t));
        }
        h
    }

    #[test]
    fn higher_high_sets_bottom_levels() {
        let highs = history(PivotKind::High, &[(105.0, 0), (108.0, 10), (110.0, 20)]);
        let lows = history(PivotKind::Low, &[(100.0, 5), (102.0, 15)]);
        let mut levels = LiquidityLevels::default();
        assert_eq!(
            levels.recompute(&highs, &lows),
            Some(LiquidityPattern::HigherHigh)
        );
        assert_eq!(levels.bottom_tlq(), Some(100.0));
        assert_eq!(levels.bottom_ilq(), Some(102.0));
        assert_eq!(levels.top_tlq(), None);
        assert_eq!(levels.levels().len(), 2);
    }

    #[test]
    fn lower_low_clears_bottom_levels() {
        let mut levels = LiquidityLevels::default();
        let highs = history(PivotKind::High, &[(105.0, 0), (108.0, 10), (110.0, 20)]);
        let lows = history(PivotKind::Low, &[(100.0, 5), (102.0, 15)]);
        levels.recompute(&highs, &lows);

        let highs = history(PivotKind::High, &[(110.0, 20), (107.0, 30)]);
        let lows = history(PivotKind::Low, &[(100.0, 5), (102.0, 15), (97.0, 35)]);
        assert_eq!(levels.recompute(&highs, &lows), Some(LiquidityPattern::LowerLow));
        assert_eq!(levels.top_tlq(), Some(110.0));
        assert_eq!(levels.top_ilq(), Some(107.0));
        assert_eq!(levels.bottom_tlq(), None);
        assert_eq!(levels.bottom_ilq(), None);
    }

    #[test]
    fn both_patterns_prefer_more_recent_pivot() {
        let highs = history(PivotKind::High, &[(100.0, 0), (110.0, 40)]);
        let lows = history(PivotKind::Low, &[(95.0, 10), (90.0, 30)]);
        let mut levels = LiquidityLevels::default();
        assert_eq!(
            levels.recompute(&highs, &lows),
            Some(LiquidityPattern::HigherHigh)
        );

        let highs = history(PivotKind::High, &[(100.0, 0), (110.0, 30)]);
        let lows = history(PivotKind::Low, &[(95.0, 10), (90.0, 40)]);
        assert_eq!(levels.recompute(&highs, &lows), Some(LiquidityPattern::LowerLow));
    }

    #[test]
    fn needs_two_pivots_per_kind() {
        let highs = history(PivotKind::High, &[(100.0, 0), (110.0, 30)]);
        let lows = history(PivotKind::Low, &[(95.0, 10)]);
        let mut levels = LiquidityLevels::default();
        assert_eq!(levels.recompute(&highs, &lows), None);
        assert!(levels.levels().is_empty());
    }

    #[test]
    fn no_pattern_keeps_previous_levels() {
        let mut levels = LiquidityLevels::default();
        let highs = history(PivotKind::High, &[(105.0, 0), (110.0, 20)]);
        let lows = history(PivotKind::Low, &[(100.0, 5), (102.0, 15)]);
        levels.recompute(&highs, &lows);
        let highs = history(PivotKind::High, &[(110.0, 20), (108.0, 30)]);
        let lows = history(PivotKind::Low, &[(102.0, 15), (103.0, 35)]);
        assert_eq!(levels.recompute(&highs, &lows), None);
        assert_eq!(levels.bottom_ilq(), Some(102.0));
    }
}
