//! Presentation partitions of a scan batch.

use super::snapshot::{AssetSnapshot, Trend};
use super::ScanBatch;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How many rows each list shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayLimits {
    pub winners: usize,
    pub losers: usize,
    pub dividend_leaders: usize,
    pub value_traps: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            winners: 5,
            losers: 5,
            dividend_leaders: 8,
            value_traps: 5,
        }
    }
}

impl DisplayLimits {
    /// No truncation.
    pub fn unlimited() -> Self {
        Self {
            winners: usize::MAX,
            losers: usize::MAX,
            dividend_leaders: usize::MAX,
            value_traps: usize::MAX,
        }
    }
}

/// The four lists the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Swing-eligible, strongest momentum first.
    pub winners: Vec<AssetSnapshot>,
    /// Not swing-eligible, weakest momentum first.
    pub losers: Vec<AssetSnapshot>,
    /// Uptrend only, highest yield first.
    pub dividend_leaders: Vec<AssetSnapshot>,
    /// Downtrend with yield, highest yield first.
    pub value_traps: Vec<AssetSnapshot>,
}

impl ScanReport {
    pub fn from_batch(batch: &ScanBatch, limits: &DisplayLimits) -> Self {
        let snaps = &batch.snapshots;
        Self {
            winners: pick(
                snaps,
                |s| s.swing_eligible,
                |a, b| b.momentum_pct.total_cmp(&a.momentum_pct),
                limits.winners,
            ),
            losers: pick(
                snaps,
                |s| !s.swing_eligible,
                |a, b| a.momentum_pct.total_cmp(&b.momentum_pct),
                limits.losers,
            ),
            dividend_leaders: pick(
                snaps,
                |s| s.trend == Trend::Up,
                |a, b| b.dividend_yield_pct.total_cmp(&a.dividend_yield_pct),
                limits.dividend_leaders,
            ),
            value_traps: pick(
                snaps,
                |s| s.trend == Trend::Down,
                |a, b| b.dividend_yield_pct.total_cmp(&a.dividend_yield_pct),
                limits.value_traps,
            ),
        }
    }
}

fn pick(
    snapshots: &[AssetSnapshot],
    keep: impl Fn(&AssetSnapshot) -> bool,
    order: impl Fn(&AssetSnapshot, &AssetSnapshot) -> Ordering,
    limit: usize,
) -> Vec<AssetSnapshot> {
    let mut list: Vec<AssetSnapshot> = snapshots.iter().filter(|s| keep(s)).cloned().collect();
    // Ties fall back to symbol so the output is stable across refreshes.
    list.sort_by(|a, b| order(a, b).then_with(|| a.symbol.cmp(&b.symbol)));
    list.truncate(limit);
    list
}
