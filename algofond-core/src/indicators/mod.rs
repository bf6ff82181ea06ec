//! Indicator trait and concrete implementations.
//!
//! Indicators are pure functions: close history in, numeric series out. They
//! produce a series of the same length as the input with `f64::NAN` during
//! warm-up; the regime engine converts those to `None` and drops the rows, so
//! NaN never reaches a threshold comparison.

pub mod ewm;
pub mod rsi;
pub mod sma;

pub use ewm::ewm_mean;
pub use rsi::Rsi;
pub use sma::Sma;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at index t may depend on a close at t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_40", "rsi_2").
    fn name(&self) -> &str;

    /// Number of leading values that are always `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire close series.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Turn a NaN-warm-up value into an explicit option.
pub fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Value of a rolling-window indicator at the last close, if defined.
pub fn latest<I: Indicator + ?Sized>(indicator: &I, closes: &[f64]) -> Option<f64> {
    indicator.compute(closes).last().copied().and_then(defined)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
