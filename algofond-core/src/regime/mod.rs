//! Index regime: indicator engine and signal classifier.
//!
//! The engine turns the joined index/volatility closes into a table of
//! [`IndicatorRow`]s; the classifier maps the latest row to a [`Signal`].

pub mod classifier;
pub mod engine;

pub use classifier::{classify, classify_latest, Signal};
pub use engine::{IndicatorEngine, IndicatorRow, RegimeConfig};
