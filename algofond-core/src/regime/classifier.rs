//! Signal classifier.
//!
//! Maps the latest [`IndicatorRow`] to one recommendation. Rules are checked
//! in strict priority order and the first match wins:
//! 1. `RiskOff`: the risk-off flag is set
//! 2. `Entry`: RSI below the buy threshold (risk-off is already excluded)
//! 3. `Exit`: close above the exit average
//! 4. `Hold`: none of the above
//!
//! Risk-off suppresses entries even when RSI also signals a dip.

use super::engine::{IndicatorRow, RegimeConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation for the leveraged index position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    /// No indicator rows: the data provider returned nothing usable.
    NoData,
    RiskOff,
    Entry,
    Exit,
    Hold,
}

impl Signal {
    /// One-line guidance for the presentation layer.
    pub fn guidance(&self) -> &'static str {
        match self {
            Signal::NoData => "No index data available. Check the data provider.",
            Signal::RiskOff => "Risk-off: the market is in crash mode. No new entries.",
            Signal::Entry => "Entry: RSI is at the bottom. Buy the leveraged index certificate.",
            Signal::Exit => "Exit: price has bounced above the exit average. Take profit.",
            Signal::Hold => "Hold: no extreme reading on the index right now.",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::NoData => "NO_DATA",
            Signal::RiskOff => "RISK_OFF",
            Signal::Entry => "ENTRY",
            Signal::Exit => "EXIT",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Classify a single row.
pub fn classify(row: &IndicatorRow, config: &RegimeConfig) -> Signal {
    if row.risk_off {
        Signal::RiskOff
    } else if row.rsi < config.rsi_buy_threshold {
        Signal::Entry
    } else if row.close > row.exit_ma {
        Signal::Exit
    } else {
        Signal::Hold
    }
}

/// Classify the most recent row; an empty table is `NoData`.
pub fn classify_latest(rows: &[IndicatorRow], config: &RegimeConfig) -> Signal {
    rows.last()
        .map(|row| classify(row, config))
        .unwrap_or(Signal::NoData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(close: f64, exit_ma: f64, rsi: f64, risk_off: bool) -> IndicatorRow {
        IndicatorRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close,
            volatility: 15.0,
            short_ma: 100.0,
            long_ma: 100.0,
            exit_ma,
            rsi,
            risk_off,
            entry_signal: !risk_off && rsi < 25.0,
        }
    }

    #[test]
    fn risk_off_wins_over_low_rsi() {
        let config = RegimeConfig::default();
        assert_eq!(classify(&row(90.0, 95.0, 5.0, true), &config), Signal::RiskOff);
    }

    #[test]
    fn entry_beats_exit() {
        let config = RegimeConfig::default();
        // Above the exit average and RSI low: entry is checked first.
        assert_eq!(classify(&row(110.0, 100.0, 10.0, false), &config), Signal::Entry);
    }

    #[test]
    fn exit_when_above_exit_average() {
        let config = RegimeConfig::default();
        assert_eq!(classify(&row(110.0, 100.0, 60.0, false), &config), Signal::Exit);
    }

    #[test]
    fn hold_otherwise() {
        let config = RegimeConfig::default();
        assert_eq!(classify(&row(100.0, 100.0, 60.0, false), &config), Signal::Hold);
    }

    #[test]
    fn rsi_at_threshold_is_not_entry() {
        let config = RegimeConfig::default();
        assert_eq!(classify(&row(100.0, 101.0, 25.0, false), &config), Signal::Hold);
    }

    #[test]
    fn empty_rows_are_no_data() {
        assert_eq!(classify_latest(&[], &RegimeConfig::default()), Signal::NoData);
    }

    #[test]
    fn latest_row_decides() {
        let config = RegimeConfig::default();
        let rows = vec![row(90.0, 95.0, 5.0, true), row(110.0, 100.0, 60.0, false)];
        assert_eq!(classify_latest(&rows, &config), Signal::Exit);
    }

    #[test]
    fn display_and_serde_agree() {
        for s in [
            Signal::NoData,
            Signal::RiskOff,
            Signal::Entry,
            Signal::Exit,
            Signal::Hold,
        ] {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{s}\""));
            assert!(!s.guidance().is_empty());
        }
    }
}
