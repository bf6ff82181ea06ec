//! Mark-to-market valuation of ledger entries.

use super::{Ledger, LedgerEntry};
use crate::domain::AssetLabel;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Resolves a live price for an asset label.
pub trait PriceLookup {
    fn live_price(&self, asset: &AssetLabel) -> Option<f64>;
}

impl<F> PriceLookup for F
where
    F: Fn(&AssetLabel) -> Option<f64>,
{
    fn live_price(&self, asset: &AssetLabel) -> Option<f64> {
        self(asset)
    }
}

impl PriceLookup for HashMap<AssetLabel, f64> {
    fn live_price(&self, asset: &AssetLabel) -> Option<f64> {
        self.get(asset).copied()
    }
}

/// One entry valued at the live price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationRow {
    pub entry: LedgerEntry,
    /// Live price used; the entry price when the lookup failed.
    pub live_price: f64,
    /// Fractional return, leverage applied for the proxy.
    pub return_ratio: f64,
    pub profit: f64,
    /// False when the lookup could not resolve a price.
    pub price_resolved: bool,
}

impl ValuationRow {
    pub fn return_pct(&self) -> f64 {
        self.return_ratio * 100.0
    }
}

/// Valuation table parallel to the ledger, plus totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Valuation {
    pub rows: Vec<ValuationRow>,
    pub total_invested: f64,
    pub total_profit: f64,
}

impl Valuation {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total profit relative to total invested, as a fraction.
    pub fn total_return_ratio(&self) -> f64 {
        if self.total_invested > 0.0 {
            self.total_profit / self.total_invested
        } else {
            0.0
        }
    }
}

/// Value one entry. `leverage` applies only to the leveraged-index proxy.
pub fn value_entry(entry: &LedgerEntry, lookup: &dyn PriceLookup, leverage: f64) -> ValuationRow {
    let resolved = lookup
        .live_price(&entry.asset)
        .filter(|p| p.is_finite() && *p > 0.0);
    let live_price = resolved.unwrap_or(entry.price);

    let raw = if entry.price > 0.0 {
        live_price / entry.price - 1.0
    } else {
        0.0
    };
    let return_ratio = if entry.asset.is_leveraged() {
        raw * leverage
    } else {
        raw
    };

    if resolved.is_none() {
        debug!(asset = %entry.asset, "no live price; valuing at entry price");
    }

    ValuationRow {
        entry: entry.clone(),
        live_price,
        return_ratio,
        profit: entry.invested * return_ratio,
        price_resolved: resolved.is_some(),
    }
}

impl Ledger {
    /// Value every entry against live prices. Never fails: unresolved prices
    /// fall back to the entry price.
    pub fn value(&self, lookup: &dyn PriceLookup, leverage: f64) -> Valuation {
        let rows: Vec<ValuationRow> = self
            .entries()
            .iter()
            .map(|e| value_entry(e, lookup, leverage))
            .collect();
        Valuation {
            total_invested: rows.iter().map(|r| r.entry.invested).sum(),
            total_profit: rows.iter().map(|r| r.profit).sum(),
            rows,
        }
    }
}
