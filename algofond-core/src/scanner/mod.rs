//! Per-asset scanner.
//!
//! Turns a batch of equity close series into [`AssetSnapshot`]s: momentum,
//! trend and swing eligibility per symbol. Each symbol is evaluated
//! independently; a failure drops that symbol into [`ScanBatch::excluded`]
//! and the batch carries on.

pub mod report;
pub mod snapshot;

pub use report::{DisplayLimits, ScanReport};
pub use snapshot::{snapshot, AssetSnapshot, ScanError, ScannerConfig, Trend};

use crate::data::period::TrailingPeriod;
use crate::data::provider::{dividend_yield_or_zero, DataError, MarketDataProvider};
use crate::domain::PriceSeries;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Source of trailing dividend yields (percent).
pub trait DividendSource {
    /// Yield in percent; implementations return 0 when unknown.
    fn dividend_yield_pct(&self, symbol: &str) -> f64;
}

impl DividendSource for HashMap<String, f64> {
    fn dividend_yield_pct(&self, symbol: &str) -> f64 {
        self.get(symbol).copied().unwrap_or(0.0)
    }
}

/// Adapter: ask the market data provider, defaulting to 0.
pub struct ProviderDividends<'a>(pub &'a dyn MarketDataProvider);

impl DividendSource for ProviderDividends<'_> {
    fn dividend_yield_pct(&self, symbol: &str) -> f64 {
        dividend_yield_or_zero(self.0, symbol)
    }
}

/// A symbol that did not make it into the batch, and why.
#[derive(Debug, Clone)]
pub struct Excluded {
    pub symbol: String,
    pub reason: ScanError,
}

/// Result of one scan: surviving snapshots plus the exclusion set.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    pub snapshots: Vec<AssetSnapshot>,
    pub excluded: Vec<Excluded>,
}

impl ScanBatch {
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Look up a snapshot by full symbol or display name.
    pub fn find(&self, symbol: &str) -> Option<&AssetSnapshot> {
        self.snapshots
            .iter()
            .find(|s| s.symbol == symbol || s.name == symbol)
    }

    /// Symbols that were excluded.
    pub fn excluded_symbols(&self) -> Vec<&str> {
        self.excluded.iter().map(|e| e.symbol.as_str()).collect()
    }

    fn push(&mut self, symbol: &str, outcome: Result<AssetSnapshot, ScanError>) {
        match outcome {
            Ok(snap) => {
                debug!(symbol, momentum = snap.momentum_pct, "scanned");
                self.snapshots.push(snap);
            }
            Err(reason) => {
                warn!(symbol, %reason, "symbol excluded from scan");
                self.excluded.push(Excluded {
                    symbol: symbol.to_string(),
                    reason,
                });
            }
        }
    }
}

/// Scan already-fetched series.
///
/// The dividend lookup is only consulted for symbols with enough history.
pub fn scan_batch(
    batch: &[PriceSeries],
    dividends: &dyn DividendSource,
    config: &ScannerConfig,
) -> ScanBatch {
    let mut out = ScanBatch::default();
    for series in batch {
        let outcome = config.check_history(series).and_then(|()| {
            let yield_pct = dividends.dividend_yield_pct(series.symbol());
            snapshot(series, yield_pct, config)
        });
        out.push(series.symbol(), outcome);
    }
    out
}

/// Fetch and scan every ticker through a provider.
///
/// Fetch failures are recorded as exclusions rather than aborting the batch.
pub fn scan_universe(
    provider: &dyn MarketDataProvider,
    tickers: &[&str],
    period: TrailingPeriod,
    config: &ScannerConfig,
) -> ScanBatch {
    let dividends = ProviderDividends(provider);
    let mut out = ScanBatch::default();

    for &symbol in tickers {
        let outcome = provider
            .fetch(symbol, period)
            .map_err(ScanError::from)
            .and_then(|fetched| {
                let series = fetched.series;
                config.check_history(&series)?;
                snapshot(&series, dividends.dividend_yield_pct(symbol), config)
            });
        out.push(symbol, outcome);
    }

    info!(
        scanned = out.snapshots.len(),
        excluded = out.excluded.len(),
        "scan complete"
    );
    out
}

impl From<DataError> for ScanError {
    fn from(e: DataError) -> Self {
        ScanError::Data(e.to_string())
    }
}
