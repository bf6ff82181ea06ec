//! Synthetic data provider for offline runs and tests.
//!
//! Produces a deterministic random walk per symbol: the RNG is seeded from a
//! BLAKE3 hash of the symbol, so repeated fetches return identical series.
//! Results built on this provider are clearly fake and tagged
//! `DataSource::Synthetic`.

use super::period::TrailingPeriod;
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::{PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random-walk provider.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
    start_price: f64,
    daily_range: f64,
}

impl SyntheticProvider {
    /// Walks end on `end`, start at 100.0 and move up to ±3% a session.
    pub fn new(end: NaiveDate) -> Self {
        Self {
            end,
            start_price: 100.0,
            daily_range: 0.03,
        }
    }

    /// Provider whose walks end today.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    fn rng_for(symbol: &str, salt: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(salt.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Generate the weekday-only walk for a symbol over `[start, end]`.
    pub fn generate(&self, symbol: &str, start: NaiveDate) -> PriceSeries {
        let mut rng = Self::rng_for(symbol, "closes");
        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= self.end {
            let weekday = current.weekday();
            if weekday != Weekday::Sat && weekday != Weekday::Sun {
                let daily_return: f64 = rng.gen_range(-self.daily_range..self.daily_range);
                price *= 1.0 + daily_return;
                points.push(PricePoint {
                    date: current,
                    close: price,
                });
            }
            current += chrono::Duration::days(1);
        }

        PriceSeries::new(symbol, points)
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, period: TrailingPeriod) -> Result<FetchResult, DataError> {
        let start = period.start_from(self.end);
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series: self.generate(symbol, start),
            source: DataSource::Synthetic,
        })
    }

    fn dividend_yield(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        let mut rng = Self::rng_for(symbol, "dividend");
        // Roughly one in four synthetic names pays nothing.
        if rng.gen_bool(0.25) {
            return Ok(None);
        }
        let pct: f64 = rng.gen_range(0.5..7.0);
        Ok(Some((pct * 100.0).round() / 100.0))
    }
}
