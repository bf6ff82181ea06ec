//! Market data gateway: providers, trailing periods, alignment, universe.

pub mod align;
pub mod period;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use align::{inner_join, JoinedSeries};
pub use period::{PeriodUnit, TrailingPeriod};
pub use provider::{
    dividend_yield_or_zero, fetch_or_empty, DataError, DataSource, FetchResult,
    MarketDataProvider,
};
pub use synthetic::SyntheticProvider;
pub use universe::Universe;
pub use yahoo::YahooProvider;
