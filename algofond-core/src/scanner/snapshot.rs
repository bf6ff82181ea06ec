//! Per-symbol snapshot computation.

use crate::domain::PriceSeries;
use crate::indicators::{latest, Sma};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scanner rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Symbols with fewer sessions are excluded.
    pub min_history: usize,
    /// Sessions back for the 3-month momentum reference.
    pub momentum_lookback: usize,
    /// Fast trend window.
    pub fast_window: usize,
    /// Slow trend window; price above it is an uptrend.
    pub slow_window: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_history: 100,
            momentum_lookback: 63,
            fast_window: 50,
            slow_window: 150,
        }
    }
}

impl ScannerConfig {
    pub(crate) fn check_history(&self, series: &PriceSeries) -> Result<(), ScanError> {
        if series.len() < self.min_history {
            return Err(ScanError::InsufficientHistory {
                symbol: series.symbol().to_string(),
                have: series.len(),
                need: self.min_history,
            });
        }
        Ok(())
    }
}

/// Why a symbol was dropped from a scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("{symbol}: only {have} sessions of history (need {need})")]
    InsufficientHistory {
        symbol: String,
        have: usize,
        need: usize,
    },

    #[error("{symbol}: unusable price {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("fetch failed: {0}")]
    Data(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

/// Scanner output for one equity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Full provider symbol, e.g. `VOLV-B.ST`.
    pub symbol: String,
    /// Symbol without exchange suffix, e.g. `VOLV-B`.
    pub name: String,
    pub price: f64,
    pub momentum_pct: f64,
    pub dividend_yield_pct: f64,
    /// `None` when the series is shorter than the fast window.
    pub fast_ma: Option<f64>,
    /// `None` when the series is shorter than the slow window.
    pub slow_ma: Option<f64>,
    pub trend: Trend,
    pub swing_eligible: bool,
}

/// Strip an exchange suffix such as `.ST`.
pub fn display_name(symbol: &str) -> &str {
    symbol.rsplit_once('.').map(|(name, _)| name).unwrap_or(symbol)
}

/// Build the snapshot for one series.
///
/// An undefined slow average (100–149 sessions) counts as "not above", so
/// such symbols are in a downtrend and not swing-eligible.
pub fn snapshot(
    series: &PriceSeries,
    dividend_yield_pct: f64,
    config: &ScannerConfig,
) -> Result<AssetSnapshot, ScanError> {
    config.check_history(series)?;

    let symbol = series.symbol();
    let closes = series.closes();
    let invalid = |price: f64| ScanError::InvalidPrice {
        symbol: symbol.to_string(),
        price,
    };

    let n = closes.len();
    let price = closes[n - 1];
    // The lookback-th close from the end, or the first when history is shorter.
    let reference = if n >= config.momentum_lookback {
        closes[n - config.momentum_lookback]
    } else {
        closes[0]
    };
    if !(price.is_finite() && price > 0.0) {
        return Err(invalid(price));
    }
    if !(reference.is_finite() && reference > 0.0) {
        return Err(invalid(reference));
    }

    let momentum_pct = (price / reference - 1.0) * 100.0;
    let fast_ma = latest(&Sma::new(config.fast_window), &closes);
    let slow_ma = latest(&Sma::new(config.slow_window), &closes);

    let above = |ma: Option<f64>| ma.is_some_and(|ma| price > ma);
    let trend = if above(slow_ma) { Trend::Up } else { Trend::Down };
    let swing_eligible = above(fast_ma) && above(slow_ma);

    Ok(AssetSnapshot {
        symbol: symbol.to_string(),
        name: display_name(symbol).to_string(),
        price,
        momentum_pct,
        dividend_yield_pct: if dividend_yield_pct.is_finite() {
            dividend_yield_pct
        } else {
            0.0
        },
        fast_ma,
        slow_ma,
        trend,
        swing_eligible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;
    use chrono::NaiveDate;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let pairs: Vec<_> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| (base + chrono::Duration::days(i as i64), c))
            .collect();
        PriceSeries::from_pairs(symbol, &pairs)
    }

    #[test]
    fn constant_series_of_100_sessions() {
        let snap = snapshot(&series("FLAT.ST", &[100.0; 100]), 0.0, &ScannerConfig::default())
            .unwrap();
        assert_approx(snap.momentum_pct, 0.0, 1e-12);
        assert_eq!(snap.trend, Trend::Down);
        assert!(!snap.swing_eligible);
        assert_eq!(snap.fast_ma, Some(100.0));
        assert_eq!(snap.slow_ma, None);
    }

    #[test]
    fn rising_series_is_uptrend_and_swing_eligible() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + i as f64).collect();
        let snap = snapshot(&series("UP.ST", &closes), 2.5, &ScannerConfig::default()).unwrap();
        assert_eq!(snap.trend, Trend::Up);
        assert!(snap.swing_eligible);
        assert_eq!(snap.price, 299.0);
        // reference = closes[200 - 63] = 237
        assert_approx(snap.momentum_pct, (299.0 / 237.0 - 1.0) * 100.0, 1e-9);
        assert_eq!(snap.dividend_yield_pct, 2.5);
        assert_eq!(snap.name, "UP");
    }

    #[test]
    fn falling_series_is_downtrend() {
        let closes: Vec<f64> = (0..200).map(|i| 300.0 - i as f64).collect();
        let snap = snapshot(&series("DOWN.ST", &closes), 6.0, &ScannerConfig::default()).unwrap();
        assert_eq!(snap.trend, Trend::Down);
        assert!(!snap.swing_eligible);
        assert!(snap.momentum_pct < 0.0);
    }

    #[test]
    fn above_slow_but_below_fast_is_uptrend_only() {
        // Long climb, then a pullback below the 50-session mean but above the 150-session mean.
        let mut closes: Vec<f64> = (0..150).map(|i| 100.0 + i as f64).collect();
        closes.extend(std::iter::repeat(200.0).take(10));
        let snap = snapshot(&series("PULL.ST", &closes), 0.0, &ScannerConfig::default()).unwrap();
        let fast = snap.fast_ma.unwrap();
        let slow = snap.slow_ma.unwrap();
        assert!(snap.price < fast, "price {} fast {fast}", snap.price);
        assert!(snap.price > slow, "price {} slow {slow}", snap.price);
        assert_eq!(snap.trend, Trend::Up);
        assert!(!snap.swing_eligible);
    }

    #[test]
    fn short_lookback_uses_first_close() {
        let config = ScannerConfig {
            min_history: 10,
            momentum_lookback: 63,
            fast_window: 5,
            slow_window: 8,
        };
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        let snap = snapshot(&series("S.ST", &closes), 0.0, &config).unwrap();
        assert_approx(snap.momentum_pct, (69.0 / 50.0 - 1.0) * 100.0, 1e-9);
    }

    #[test]
    fn non_finite_dividend_becomes_zero() {
        let snap = snapshot(&series("X.ST", &[10.0; 100]), f64::NAN, &ScannerConfig::default())
            .unwrap();
        assert_eq!(snap.dividend_yield_pct, 0.0);
    }

    #[test]
    fn display_name_strips_suffix() {
        assert_eq!(display_name("VOLV-B.ST"), "VOLV-B");
        assert_eq!(display_name("AAPL"), "AAPL");
    }
}
