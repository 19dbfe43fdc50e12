use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use common::{Error, Result};

/// Strategy selection file (TOML).
///
/// Example `config/strategy.toml`:
/// ```toml
/// [strategy]
/// type = "sma_crossover"
///
/// [strategy.params]
/// short_window = 5
/// long_window = 20
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    pub strategy: StrategySpec,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategySpec {
    /// Strategy type identifier: "heikin_ashi", "sma_crossover" or
    /// "news_sentiment".
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Indicator-specific parameters.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl StrategyFileConfig {
    /// Load from a TOML file. Any failure is a configuration error.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse strategy config at '{path}': {e}"))
        })
    }
}
