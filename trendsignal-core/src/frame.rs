//! Per-bar indicator frame aligned 1:1 with a candle slice.

use crate::config::EngineConfig;
use crate::domain::Candle;
use crate::error::ConfigError;
use crate::indicators::{adx, ema, hma, macd, wilder_atr, AdxSeries, MacdSeries, Series};
use crate::trackers::{
    DonchianSeries, DonchianTrendTracker, OscillatorPair, OscillatorSeries, SupertrendState,
    SupertrendTracker,
};

/// Every indicator the fusion engine reads, one entry per candle.
///
/// `bull_signal` / `bear_signal` start all-false and are filled by
/// `SignalFusionEngine::annotate`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub ema_fast: Series,
    pub ema_slow: Series,
    pub ema_trend: Series,
    pub hma: Series,
    pub supertrend: Vec<Option<SupertrendState>>,
    pub macd: MacdSeries,
    pub donchian: DonchianSeries,
    pub adx: AdxSeries,
    pub oscillator: OscillatorSeries,
    /// Short minus long EMA of volume.
    pub volume_osc: Series,
    /// ATR used for risk levels.
    pub atr: Series,
    pub bull_signal: Vec<bool>,
    pub bear_signal: Vec<bool>,
}

impl IndicatorFrame {
    /// One-off frame; engines keep a [`FrameBuilder`] instead.
    pub fn compute(candles: &[Candle], config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(FrameBuilder::new(config)?.build(candles))
    }

    pub fn len(&self) -> usize {
        self.bull_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bull_signal.is_empty()
    }
}

/// Builds frames for one config. The stateful trackers are constructed
/// once, so a bad period surfaces here rather than on every bar.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    config: EngineConfig,
    supertrend: SupertrendTracker,
    donchian: DonchianTrendTracker,
}

impl FrameBuilder {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            supertrend: SupertrendTracker::new(
                config.supertrend_period,
                config.sensitivity,
                config.atr_smoothing,
            )?,
            donchian: DonchianTrendTracker::new(config.donchian_period)?,
            config: config.clone(),
        })
    }

    pub fn build(&self, candles: &[Candle]) -> IndicatorFrame {
        let config = &self.config;
        let n = candles.len();
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        let volume_osc = ema(&volumes, config.volume_fast_period)
            .into_iter()
            .zip(ema(&volumes, config.volume_slow_period))
            .map(|(f, s)| Some(f? - s?))
            .collect();

        IndicatorFrame {
            ema_fast: ema(&closes, config.ema_fast_period),
            ema_slow: ema(&closes, config.ema_slow_period),
            ema_trend: ema(&closes, config.ema_trend_period),
            hma: hma(&closes, config.hma_period),
            supertrend: self.supertrend.compute(candles),
            macd: macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal),
            donchian: self.donchian.compute(candles),
            adx: adx(candles, config.adx_period),
            oscillator: OscillatorPair.compute(&closes),
            volume_osc,
            atr: wilder_atr(candles, config.risk_atr_period),
            bull_signal: vec![false; n],
            bear_signal: vec![false; n],
        }
    }
}
