//! Indicator engine.
//!
//! Input: index and volatility closes (inner-joined on date) plus the five
//! thresholds in [`RegimeConfig`]. Output: one [`IndicatorRow`] per date that
//! has every indicator defined. Rows still in warm-up, or whose RSI is
//! undefined because the smoothed losses are zero, are dropped.

use crate::data::align::{inner_join, JoinedSeries};
use crate::domain::PriceSeries;
use crate::indicators::{defined, Indicator, Rsi, Sma};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tunable thresholds for the index regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// Short trend window (risk-off leg 1).
    pub short_window: usize,
    /// Long trend window (risk-off leg 2).
    pub long_window: usize,
    /// Exit window: a close above this average is a take-profit.
    pub exit_window: usize,
    /// Volatility level above which the market is in panic.
    pub volatility_panic: f64,
    /// RSI below this level is a buy-the-dip entry.
    pub rsi_buy_threshold: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            short_window: 40,
            long_window: 150,
            exit_window: 5,
            volatility_panic: 35.0,
            rsi_buy_threshold: 25.0,
        }
    }
}

/// Derived indicators for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub volatility: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub exit_ma: f64,
    pub rsi: f64,
    /// Below both trend averages, or volatility in panic.
    pub risk_off: bool,
    /// Not risk-off and RSI below the buy threshold.
    pub entry_signal: bool,
}

impl IndicatorRow {
    /// Volatility above the panic threshold.
    pub fn volatility_panic(&self, config: &RegimeConfig) -> bool {
        self.volatility > config.volatility_panic
    }

    /// RSI in the buy zone and the regime allows entries.
    pub fn rsi_buy_zone(&self, config: &RegimeConfig) -> bool {
        self.rsi < config.rsi_buy_threshold && !self.risk_off
    }

    /// Take profit: price has bounced above the exit average, or the regime turned.
    pub fn sell_signal(&self) -> bool {
        self.close > self.exit_ma || self.risk_off
    }
}

/// Precomputes all regime indicators for a joined series.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: RegimeConfig,
    short: Sma,
    long: Sma,
    exit: Sma,
    rsi: Rsi,
}

impl IndicatorEngine {
    /// Build an engine. Window lengths must be at least 1 (see `DashboardConfig::validate`).
    pub fn new(config: RegimeConfig) -> Self {
        Self {
            short: Sma::new(config.short_window),
            long: Sma::new(config.long_window),
            exit: Sma::new(config.exit_window),
            rsi: Rsi::two_period(),
            config,
        }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Join the two raw series on date and compute rows.
    ///
    /// An empty input on either side (failed fetch) yields no rows.
    pub fn compute(&self, index: &PriceSeries, volatility: &PriceSeries) -> Vec<IndicatorRow> {
        self.compute_joined(&inner_join(index, volatility))
    }

    /// Compute rows for an already-joined series.
    pub fn compute_joined(&self, joined: &JoinedSeries) -> Vec<IndicatorRow> {
        if joined.is_empty() {
            return Vec::new();
        }

        let closes = &joined.index;
        let short = self.short.compute(closes);
        let long = self.long.compute(closes);
        let exit = self.exit.compute(closes);
        let rsi = self.rsi.compute(closes);

        (0..joined.len())
            .filter_map(|i| {
                let close = defined(closes[i])?;
                let volatility = defined(joined.volatility[i])?;
                let short_ma = defined(short[i])?;
                let long_ma = defined(long[i])?;
                let exit_ma = defined(exit[i])?;
                let rsi = defined(rsi[i])?;

                let risk_off = (close < short_ma && close < long_ma)
                    || volatility > self.config.volatility_panic;
                let entry_signal = !risk_off && rsi < self.config.rsi_buy_threshold;

                Some(IndicatorRow {
                    date: joined.dates[i],
                    close,
                    volatility,
                    short_ma,
                    long_ma,
                    exit_ma,
                    rsi,
                    risk_off,
                    entry_signal,
                })
            })
            .collect()
    }
}
