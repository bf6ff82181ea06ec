//! Paper-trading ledger.
//!
//! An append-only log of simulated trades owned by the caller's session.
//! Entries are created by [`Ledger::record`], never edited, and removed only
//! by [`Ledger::reset`] or replaced wholesale by [`Ledger::import_csv`].

pub mod csv_io;
pub mod valuation;

pub use csv_io::CSV_HEADER;
pub use valuation::{PriceLookup, Valuation, ValuationRow};

use crate::domain::AssetLabel;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from ledger persistence.
///
/// Every variant leaves the in-memory ledger unchanged.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger file is missing columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("malformed ledger row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ledger file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One simulated purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Local wall-clock time of the purchase, second precision.
    pub timestamp: NaiveDateTime,
    pub asset: AssetLabel,
    /// Price paid per unit (for the proxy: the index level at entry).
    pub price: f64,
    pub quantity: u32,
    /// price × quantity at entry time.
    pub invested: f64,
}

impl LedgerEntry {
    /// Clamp to what the CSV layout can carry: whole seconds, quantity >= 1
    /// and finite amounts.
    fn normalized(mut self) -> Self {
        self.timestamp = self.timestamp.with_nanosecond(0).unwrap_or(self.timestamp);
        self.quantity = self.quantity.max(1);
        if !self.price.is_finite() {
            warn!(asset = %self.asset, price = self.price, "non-finite price recorded as 0");
            self.price = 0.0;
        }
        if !self.invested.is_finite() {
            self.invested = self.price * self.quantity as f64;
        }
        self
    }
}

/// Session-owned list of paper trades.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from existing entries, normalized the way `record_at`
    /// normalizes new ones.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(LedgerEntry::normalized).collect(),
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a purchase now.
    pub fn record(&mut self, asset: AssetLabel, quantity: u32, price: f64) -> &LedgerEntry {
        self.record_at(chrono::Local::now().naive_local(), asset, quantity, price)
    }

    /// Record a purchase at an explicit time.
    ///
    /// Quantities below 1 are raised to 1. The timestamp is truncated to whole
    /// seconds, the precision the CSV layout carries. A non-finite price is
    /// recorded as 0.
    pub fn record_at(
        &mut self,
        timestamp: NaiveDateTime,
        asset: AssetLabel,
        quantity: u32,
        price: f64,
    ) -> &LedgerEntry {
        let entry = LedgerEntry {
            timestamp,
            invested: price * quantity.max(1) as f64,
            asset,
            price,
            quantity,
        }
        .normalized();
        info!(
            asset = %entry.asset,
            quantity = entry.quantity,
            price = entry.price,
            "paper trade recorded"
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Remove every entry.
    pub fn reset(&mut self) {
        info!(removed = self.entries.len(), "ledger reset");
        self.entries.clear();
    }

    /// Total amount invested across all entries.
    pub fn total_invested(&self) -> f64 {
        self.entries.iter().map(|e| e.invested).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(h, m, s, 750)
            .unwrap()
    }

    #[test]
    fn record_appends_with_invested_amount() {
        let mut ledger = Ledger::new();
        let entry = ledger
            .record_at(at(17, 20, 0), AssetLabel::LeveragedIndex, 10, 2_400.5)
            .clone();
        assert_eq!(entry.invested, 24_005.0);
        assert_eq!(entry.quantity, 10);
        assert_eq!(ledger.len(), 1);

        ledger.record_at(at(17, 21, 0), AssetLabel::equity("SAAB-B.ST"), 3, 150.0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[1].asset, AssetLabel::equity("SAAB-B.ST"));
        assert_eq!(ledger.total_invested(), 24_005.0 + 450.0);
    }

    #[test]
    fn zero_quantity_is_raised_to_one() {
        let mut ledger = Ledger::new();
        let entry = ledger.record_at(at(9, 0, 0), AssetLabel::equity("ABB.ST"), 0, 500.0);
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.invested, 500.0);
    }

    #[test]
    fn timestamp_is_truncated_to_seconds() {
        let mut ledger = Ledger::new();
        let entry = ledger.record_at(at(9, 0, 5), AssetLabel::equity("ABB.ST"), 1, 1.0);
        assert_eq!(entry.timestamp.nanosecond(), 0);
        assert_eq!(entry.timestamp.second(), 5);
    }

    #[test]
    fn record_uses_current_time() {
        let before = chrono::Local::now().naive_local().with_nanosecond(0).unwrap();
        let mut ledger = Ledger::new();
        let ts = ledger.record(AssetLabel::LeveragedIndex, 1, 100.0).timestamp;
        assert!(ts >= before);
    }

    #[test]
    fn reset_clears_everything() {
        let mut ledger = Ledger::new();
        ledger.record_at(at(9, 0, 0), AssetLabel::LeveragedIndex, 1, 100.0);
        ledger.record_at(at(9, 1, 0), AssetLabel::LeveragedIndex, 2, 101.0);
        ledger.reset();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_invested(), 0.0);
    }

    #[test]
    fn non_finite_price_is_recorded_as_zero() {
        let mut ledger = Ledger::new();
        let entry = ledger
            .record_at(at(9, 0, 0), AssetLabel::equity("ABB.ST"), 2, f64::NAN)
            .clone();
        assert_eq!(entry.price, 0.0);
        assert_eq!(entry.invested, 0.0);
        ledger.record_at(at(9, 1, 0), AssetLabel::equity("ABB.ST"), 2, f64::INFINITY);
        assert_eq!(ledger.entries()[1].price, 0.0);
        assert_eq!(ledger.total_invested(), 0.0);
    }

    #[test]
    fn from_entries_matches_record_at() {
        let raw = LedgerEntry {
            timestamp: at(10, 15, 30),
            asset: AssetLabel::equity("VOLV-B.ST"),
            price: 250.0,
            quantity: 0,
            invested: f64::NAN,
        };
        let ledger = Ledger::from_entries(vec![raw]);

        let mut recorded = Ledger::new();
        recorded.record_at(at(10, 15, 30), AssetLabel::equity("VOLV-B.ST"), 0, 250.0);
        assert_eq!(ledger, recorded);
        assert_eq!(ledger.entries()[0].timestamp.nanosecond(), 0);
        assert_eq!(ledger.entries()[0].quantity, 1);
    }
}
