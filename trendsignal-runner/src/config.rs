//! Runner configuration: one instrument, its fetch window and its engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trendsignal_core::{ConfigError, EngineConfig};

/// Candles fetched per cycle when the file does not say otherwise.
pub const DEFAULT_WINDOW: usize = 500;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse runner TOML: {0}")]
    Parse(String),

    #[error("serialize runner TOML: {0}")]
    Serialize(String),

    #[error("engine config error: {0}")]
    Engine(#[from] ConfigError),

    #[error("window of {window} candles cannot hold {required} closed candles")]
    WindowTooSmall { window: usize, required: usize },
}

/// ```toml
/// symbol = "BTCUSDT"
/// window = 500
///
/// [engine]
/// preset = "confirmed"
/// filter_style = "trend_strength"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub symbol: String,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

impl RunnerConfig {
    pub fn new(symbol: impl Into<String>, engine: EngineConfig) -> Self {
        Self {
            symbol: symbol.into(),
            window: DEFAULT_WINDOW,
            engine,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, RunnerError> {
        let config: Self = toml::from_str(text).map_err(|e| RunnerError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, RunnerError> {
        toml::to_string_pretty(self).map_err(|e| RunnerError::Serialize(e.to_string()))
    }

    /// Candles the window must hold for the engine to ever be ready.
    pub fn required_window(&self) -> usize {
        self.engine.min_history + usize::from(self.engine.exclude_forming_bar)
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        self.engine.validate()?;
        if self.window < self.required_window() {
            return Err(RunnerError::WindowTooSmall {
                window: self.window,
                required: self.required_window(),
            });
        }
        Ok(())
    }
}
