//! Market data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance,
//! synthetic random walks) so we can swap implementations and mock for tests.
//! Callers that must never fail (the engine and scanner refresh) go through
//! [`fetch_or_empty`] and [`dividend_yield_or_zero`], which degrade errors to
//! an empty series / zero yield and log them.

use super::period::TrailingPeriod;
use crate::domain::PriceSeries;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output and logs.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid trailing period '{0}' (expected e.g. 90d, 6mo, 1y)")]
    InvalidPeriod(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub series: PriceSeries,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Synthetic,
}

/// Trait for market data providers.
///
/// Implementations are blocking: a call either returns data or fails. There
/// are no retries at this layer or above it.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily closes for a symbol over a trailing period ending today.
    fn fetch(&self, symbol: &str, period: TrailingPeriod) -> Result<FetchResult, DataError>;

    /// Trailing dividend yield in percent, `None` when the provider has none.
    fn dividend_yield(&self, symbol: &str) -> Result<Option<f64>, DataError>;
}

/// Fetch a series, degrading any failure to an empty series.
pub fn fetch_or_empty(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    period: TrailingPeriod,
) -> PriceSeries {
    match provider.fetch(symbol, period) {
        Ok(result) => {
            debug!(
                symbol,
                provider = provider.name(),
                rows = result.series.len(),
                "fetched series"
            );
            result.series
        }
        Err(e) => {
            warn!(symbol, provider = provider.name(), error = %e, "data unavailable");
            PriceSeries::empty(symbol)
        }
    }
}

/// Dividend yield in percent; 0 on absence or error.
pub fn dividend_yield_or_zero(provider: &dyn MarketDataProvider, symbol: &str) -> f64 {
    match provider.dividend_yield(symbol) {
        Ok(Some(pct)) if pct.is_finite() => pct,
        Ok(_) => 0.0,
        Err(e) => {
            debug!(symbol, error = %e, "dividend yield unavailable, using 0");
            0.0
        }
    }
}
