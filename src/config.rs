use config::{Config, Environment, File};
use serde::Deserialize;

use crate::pipeline::FeatureConfig;
use crate::policy::DecisionThresholds;
use crate::{Result, TradingError};

/// Application settings, layered from an optional `quantbot.toml` and
/// `QUANTBOT_`-prefixed environment variables (e.g.
/// `QUANTBOT_INITIAL_CAPITAL=50000`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub thresholds: DecisionThresholds,
    #[serde(default)]
    pub binance: BinanceSettings,
    /// Postgres sink, enabled when set.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Redis sink, enabled when set.
    #[serde(default)]
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceSettings {
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_interval")]
    pub interval: String,
}

fn default_symbols() -> Vec<String> {
    vec!["BTCUSDT".to_string()]
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_rest_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_ws_url() -> String {
    "wss://stream.binance.com:9443".to_string()
}

fn default_interval() -> String {
    "1m".to_string()
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            ws_url: default_ws_url(),
            interval: default_interval(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            initial_capital: default_initial_capital(),
            features: FeatureConfig::default(),
            thresholds: DecisionThresholds::default(),
            binance: BinanceSettings::default(),
            database_url: None,
            redis_url: None,
        }
    }
}

impl Settings {
    /// Load settings from `quantbot.toml` (if present) and the
    /// environment.
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name("quantbot").required(false))
            .add_source(Environment::with_prefix("QUANTBOT").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| TradingError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.symbols, vec!["BTCUSDT".to_string()]);
        assert_eq!(settings.initial_capital, 100_000.0);
        assert_eq!(settings.features.long_window, 50);
        assert_eq!(settings.thresholds.strong_buy, 0.7);
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn test_deserialize_partial_overrides() {
        let settings: Settings = serde_json::from_str(
            r#"{"initial_capital": 5000.0, "features": {"vol_window": 20, "short_window": 10, "long_window": 30, "rsi_period": 14}}"#,
        )
        .unwrap();

        assert_eq!(settings.initial_capital, 5000.0);
        assert_eq!(settings.features.long_window, 30);
        // Untouched sections keep their defaults
        assert_eq!(settings.symbols, vec!["BTCUSDT".to_string()]);
        assert_eq!(settings.binance.interval, "1m");
    }
}
