//! Dashboard configuration loaded from TOML.
//!
//! Every section is optional; missing keys take the built-in defaults.
//!
//! ```toml
//! [index]
//! symbol = "^OMX"
//! volatility_symbol = "^VIX"
//! period = "2y"
//! cache_ttl_secs = 900
//!
//! [regime]
//! short_window = 40
//! long_window = 150
//! exit_window = 5
//! volatility_panic = 35.0
//! rsi_buy_threshold = 25.0
//!
//! [scanner]
//! period = "1y"
//! cache_ttl_secs = 3600
//!
//! [scanner.rules]
//! min_history = 100
//!
//! [scanner.universe.sectors]
//! Industrials = ["ABB.ST", "VOLV-B.ST"]
//!
//! [ledger]
//! leverage = 3.0
//! ```

use crate::data::{TrailingPeriod, Universe};
use crate::regime::RegimeConfig;
use crate::scanner::{DisplayLimits, ScannerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Index and volatility feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub symbol: String,
    pub volatility_symbol: String,
    pub period: TrailingPeriod,
    pub cache_ttl_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            symbol: "^OMX".to_string(),
            volatility_symbol: "^VIX".to_string(),
            period: TrailingPeriod::years(2),
            cache_ttl_secs: 900,
        }
    }
}

impl IndexSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Equity scanner feed and rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub period: TrailingPeriod,
    pub cache_ttl_secs: u64,
    pub rules: ScannerConfig,
    pub limits: DisplayLimits,
    pub universe: Universe,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            period: TrailingPeriod::years(1),
            cache_ttl_secs: 3600,
            rules: ScannerConfig::default(),
            limits: DisplayLimits::default(),
            universe: Universe::default(),
        }
    }
}

impl ScannerSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Return multiplier for the leveraged-index proxy.
    pub leverage: f64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self { leverage: 3.0 }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub index: IndexSettings,
    pub regime: RegimeConfig,
    pub scanner: ScannerSettings,
    pub ledger: LedgerSettings,
}

impl DashboardConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Reject settings the engine and scanner cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.regime;
        let s = &self.scanner.rules;
        let windows = [
            ("regime.short_window", r.short_window),
            ("regime.long_window", r.long_window),
            ("regime.exit_window", r.exit_window),
            ("scanner.rules.fast_window", s.fast_window),
            ("scanner.rules.slow_window", s.slow_window),
            ("scanner.rules.momentum_lookback", s.momentum_lookback),
            ("scanner.rules.min_history", s.min_history),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }

        for (name, value) in [
            ("regime.volatility_panic", r.volatility_panic),
            ("regime.rsi_buy_threshold", r.rsi_buy_threshold),
            ("ledger.leverage", self.ledger.leverage),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        if self.index.symbol.trim().is_empty() || self.index.volatility_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("index symbols must not be empty".into()));
        }

        if r.short_window >= r.long_window {
            warn!(
                short = r.short_window,
                long = r.long_window,
                "short trend window is not shorter than the long window"
            );
        }
        if self.scanner.universe.ticker_count() == 0 {
            warn!("scanner universe is empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.index.symbol, "^OMX");
        assert_eq!(config.index.period, TrailingPeriod::years(2));
        assert_eq!(config.scanner.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.scanner.universe.ticker_count(), 20);
        assert_eq!(config.ledger.leverage, 3.0);
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let config = DashboardConfig::from_toml(
            r#"
            [index]
            period = "6mo"

            [regime]
            rsi_buy_threshold = 10.0

            [scanner.rules]
            min_history = 50

            [scanner.universe.sectors]
            Tech = ["ERIC-B.ST"]
            "#,
        )
        .unwrap();
        assert_eq!(config.index.period, TrailingPeriod::months(6));
        assert_eq!(config.index.symbol, "^OMX");
        assert_eq!(config.regime.rsi_buy_threshold, 10.0);
        assert_eq!(config.regime.long_window, 150);
        assert_eq!(config.scanner.rules.min_history, 50);
        assert_eq!(config.scanner.rules.slow_window, 150);
        assert_eq!(config.scanner.universe.all_tickers(), vec!["ERIC-B.ST"]);
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = DashboardConfig::from_toml("[regime]\nexit_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("exit_window")));
    }

    #[test]
    fn bad_period_is_a_parse_error() {
        let err = DashboardConfig::from_toml("[index]\nperiod = \"forever\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = DashboardConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(DashboardConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/algofond.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
