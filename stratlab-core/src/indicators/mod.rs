//! Rolling indicators over a close-price slice.
//!
//! Indicators are pure functions: close history in, same-length numeric
//! series out. The first `lookback()` values are `f64::NAN` (warmup).
//!
//! # Look-ahead contamination guard
//! No value at index t may depend on a close at t+1 or later. `Lagged`
//! goes one step further and excludes the close at t itself, which is what
//! the strategies compare against.

pub mod lagged;
pub mod sma;

pub use lagged::Lagged;
pub use sma::Sma;

/// Trait for indicators computed once over a whole close series.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "lag1_sma_20").
    fn name(&self) -> &str;

    /// Number of leading values that are NaN by construction.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire close series.
    ///
    /// Returns a `Vec<f64>` of the same length as `closes`.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Rolling mean of the `window` closes strictly before each period.
pub fn shifted_rolling_mean(window: usize) -> Lagged<Sma> {
    Lagged::new(Sma::new(window))
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
