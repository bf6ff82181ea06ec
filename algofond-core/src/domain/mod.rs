//! Domain types for Algofond

pub mod asset;
pub mod series;

pub use asset::{AssetLabel, LEVERAGED_PROXY_LABEL};
pub use series::{PricePoint, PriceSeries};

/// Symbol type alias
pub type Symbol = String;
