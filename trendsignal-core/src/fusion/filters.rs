//! Optional fusion filters and the filter-style table.
//!
//! Each [`FilterKind`] gates one side of a base signal. A [`FilterStyle`]
//! names a fixed set of kinds; the active [`FilterSet`] is the style's set
//! unioned with individually enabled kinds. Disabled filters pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, SignalKind, SignalReason};
use crate::error::ConfigError;
use crate::frame::IndicatorFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// ADX above the threshold.
    TrendStrength,
    /// Close on the signal's side of the trend EMA.
    StrongTrend,
    /// Oscillator in the contrarian zone for the signal's side.
    Contrarian,
    /// Short volume EMA above the long one.
    VolumeDivergence,
}

pub const ALL_FILTERS: [FilterKind; 4] = [
    FilterKind::TrendStrength,
    FilterKind::StrongTrend,
    FilterKind::Contrarian,
    FilterKind::VolumeDivergence,
];

impl FilterKind {
    fn bit(self) -> u8 {
        1 << self as u8
    }

    pub fn reason(self) -> SignalReason {
        match self {
            FilterKind::TrendStrength => SignalReason::TrendStrength,
            FilterKind::StrongTrend => SignalReason::StrongTrend,
            FilterKind::Contrarian => SignalReason::Contrarian,
            FilterKind::VolumeDivergence => SignalReason::VolumeDivergence,
        }
    }

    /// Whether bar `i` passes this filter for `side`. Undefined inputs fail.
    pub fn check(
        self,
        side: SignalKind,
        frame: &IndicatorFrame,
        candles: &[Candle],
        i: usize,
        adx_threshold: f64,
    ) -> bool {
        let s = side.sign();
        match self {
            FilterKind::TrendStrength => frame.adx.adx[i].is_some_and(|v| v > adx_threshold),
            FilterKind::StrongTrend => frame.ema_trend[i].is_some_and(|e| s * (candles[i].close - e) > 0.0),
            FilterKind::Contrarian => match side {
                SignalKind::Buy => frame.oscillator.contrarian_bull(i),
                SignalKind::Sell => frame.oscillator.contrarian_bear(i),
            }
            .unwrap_or(false),
            FilterKind::VolumeDivergence => frame.volume_osc[i].is_some_and(|v| v > 0.0),
        }
    }
}

/// Named filter bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterStyle {
    #[default]
    None,
    TrendStrength,
    StrongTrend,
    Contrarian,
    VolumeDivergence,
    TrendConfluence,
    All,
}

/// The one place a style's name and filter set are defined.
const STYLE_TABLE: &[(FilterStyle, &str, &[FilterKind])] = &[
    (FilterStyle::None, "none", &[]),
    (FilterStyle::TrendStrength, "trend_strength", &[FilterKind::TrendStrength]),
    (FilterStyle::StrongTrend, "strong_trend", &[FilterKind::StrongTrend]),
    (FilterStyle::Contrarian, "contrarian", &[FilterKind::Contrarian]),
    (FilterStyle::VolumeDivergence, "volume_divergence", &[FilterKind::VolumeDivergence]),
    (
        FilterStyle::TrendConfluence,
        "trend_confluence",
        &[FilterKind::TrendStrength, FilterKind::StrongTrend],
    ),
    (FilterStyle::All, "all", &ALL_FILTERS),
];

impl FilterStyle {
    fn entry(self) -> &'static (FilterStyle, &'static str, &'static [FilterKind]) {
        STYLE_TABLE
            .iter()
            .find(|(s, _, _)| *s == self)
            .unwrap_or(&STYLE_TABLE[0])
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn filters(self) -> &'static [FilterKind] {
        self.entry().2
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        STYLE_TABLE.iter().map(|(_, name, _)| *name)
    }
}

impl fmt::Display for FilterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        STYLE_TABLE
            .iter()
            .find(|(_, name, _)| *name == key)
            .map(|(style, _, _)| *style)
            .ok_or_else(|| ConfigError::UnknownFilterStyle(s.to_string()))
    }
}

impl TryFrom<String> for FilterStyle {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FilterStyle> for String {
    fn from(style: FilterStyle) -> Self {
        style.name().to_string()
    }
}

/// Active filters as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSet(u8);

impl FilterSet {
    pub fn new(style: FilterStyle, extra: &[FilterKind]) -> Self {
        style
            .filters()
            .iter()
            .chain(extra)
            .fold(Self::default(), |set, kind| Self(set.0 | kind.bit()))
    }

    pub fn contains(self, kind: FilterKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled kinds in declaration order.
    pub fn iter(self) -> impl Iterator<Item = FilterKind> {
        ALL_FILTERS.into_iter().filter(move |k| self.contains(*k))
    }
}
