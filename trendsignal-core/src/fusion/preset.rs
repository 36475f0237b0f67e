//! Fusion presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How much confirmation a Supertrend crossover needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Preset {
    /// Crossover (with Donchian grace) plus MACD, EMA, HMA and Donchian agreement.
    #[default]
    Confirmed,
    /// Raw crossover / crossunder only.
    AllSignals,
}

const PRESET_NAMES: &[(Preset, &str)] = &[
    (Preset::Confirmed, "confirmed"),
    (Preset::AllSignals, "all_signals"),
];

impl Preset {
    pub fn name(self) -> &'static str {
        PRESET_NAMES
            .iter()
            .find(|(p, _)| *p == self)
            .map_or("confirmed", |(_, n)| *n)
    }

    pub fn requires_confirmation(self) -> bool {
        self == Preset::Confirmed
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        PRESET_NAMES
            .iter()
            .find(|(_, n)| *n == key)
            .map(|(p, _)| *p)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl TryFrom<String> for Preset {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Preset> for String {
    fn from(p: Preset) -> Self {
        p.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("confirmed".parse::<Preset>().unwrap(), Preset::Confirmed);
        assert_eq!("ALL_SIGNALS".parse::<Preset>().unwrap(), Preset::AllSignals);
    }

    #[test]
    fn unknown_name_is_config_error() {
        let err = "aggressive".parse::<Preset>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownPreset("aggressive".into()));
        assert_eq!(err.to_string(), "Unknown preset: aggressive");
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&Preset::AllSignals).unwrap();
        assert_eq!(json, "\"all_signals\"");
        assert!(serde_json::from_str::<Preset>("\"nope\"").is_err());
    }
}
