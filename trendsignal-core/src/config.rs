//! Serializable engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fusion::{FilterKind, FilterStyle, Preset};
use crate::trackers::AtrSmoothing;

/// Where emitted signals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSelection {
    #[default]
    Fusion,
    Structure,
    /// Fusion when it fires, otherwise structure; opposing decisions cancel.
    Either,
}

/// Every tunable of one engine instance.
///
/// Missing TOML keys take the defaults below. Unknown preset or filter-style
/// names fail at load; numeric constraints are checked by [`validate`].
///
/// [`validate`]: EngineConfig::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub preset: Preset,
    pub filter_style: FilterStyle,
    /// Filters enabled on top of `filter_style`.
    pub extra_filters: Vec<FilterKind>,
    pub signal_source: SourceSelection,

    /// Supertrend ATR multiplier.
    pub sensitivity: f64,
    pub supertrend_period: usize,
    pub atr_smoothing: AtrSmoothing,

    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub ema_trend_period: usize,
    pub hma_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub donchian_period: usize,
    pub adx_period: usize,
    pub adx_threshold: f64,
    pub volume_fast_period: usize,
    pub volume_slow_period: usize,

    pub risk_atr_period: usize,
    pub atr_multiplier: f64,
    pub tp_multipliers: [f64; 3],

    pub swing_lookback: usize,
    /// Drop the newest candle as still forming.
    pub exclude_forming_bar: bool,
    pub min_history: usize,
    /// Largest allowed gap between consecutive candles, in seconds.
    pub max_gap_secs: Option<i64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preset: Preset::Confirmed,
            filter_style: FilterStyle::None,
            extra_filters: Vec::new(),
            signal_source: SourceSelection::Fusion,
            sensitivity: 2.0,
            supertrend_period: 10,
            atr_smoothing: AtrSmoothing::Wilder,
            ema_fast_period: 150,
            ema_slow_period: 250,
            ema_trend_period: 200,
            hma_period: 55,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            donchian_period: 20,
            adx_period: 14,
            adx_threshold: 20.0,
            volume_fast_period: 5,
            volume_slow_period: 10,
            risk_atr_period: 14,
            atr_multiplier: 2.2,
            tp_multipliers: [1.0, 2.0, 3.0],
            swing_lookback: 3,
            exclude_forming_bar: true,
            min_history: 300,
            max_gap_secs: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Content hash of the configuration, stable across runs.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("supertrend_period", self.supertrend_period),
            ("ema_fast_period", self.ema_fast_period),
            ("ema_slow_period", self.ema_slow_period),
            ("ema_trend_period", self.ema_trend_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("donchian_period", self.donchian_period),
            ("adx_period", self.adx_period),
            ("volume_fast_period", self.volume_fast_period),
            ("volume_slow_period", self.volume_slow_period),
            ("risk_atr_period", self.risk_atr_period),
            ("swing_lookback", self.swing_lookback),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::invalid(name, "must be >= 1"));
            }
        }
        if self.hma_period < 2 {
            return Err(ConfigError::invalid("hma_period", "must be >= 2"));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::invalid(
                "macd_fast",
                format!("must be below macd_slow ({})", self.macd_slow),
            ));
        }
        if self.volume_fast_period >= self.volume_slow_period {
            return Err(ConfigError::invalid(
                "volume_fast_period",
                format!("must be below volume_slow_period ({})", self.volume_slow_period),
            ));
        }
        for (name, value) in [
            ("sensitivity", self.sensitivity),
            ("atr_multiplier", self.atr_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(name, format!("must be a positive number, got {value}")));
            }
        }
        if !(0.0..=100.0).contains(&self.adx_threshold) {
            return Err(ConfigError::invalid(
                "adx_threshold",
                format!("must be within 0..=100, got {}", self.adx_threshold),
            ));
        }
        let [m1, m2, m3] = self.tp_multipliers;
        if !(m1.is_finite() && m3.is_finite() && 0.0 < m1 && m1 < m2 && m2 < m3) {
            return Err(ConfigError::invalid(
                "tp_multipliers",
                "must be positive and strictly increasing",
            ));
        }
        if self.min_history < 3 {
            return Err(ConfigError::invalid("min_history", "must be >= 3"));
        }
        if self.max_gap_secs.is_some_and(|g| g <= 0) {
            return Err(ConfigError::invalid("max_gap_secs", "must be > 0 when set"));
        }
        Ok(())
    }
}
