//! Windowed indicator math shared by both layouts.
//!
//! Every function here is parametrized by an inclusive index range
//! `[start, end]` and one or more [`Series`] accessors. The row store passes
//! closures that project a field out of each record; the column store passes
//! its contiguous slices directly. Both layouts therefore run the exact same
//! floating-point operations in the same order, which is what makes their
//! outputs bit-identical.
//!
//! Window statistics are recomputed from scratch at every index (O(n·W)).
//! There is no sliding-window amortization, so the two layouts differ only in
//! memory traversal order.

pub mod bands;
pub mod mfi;
pub mod rsi;
pub mod stochastic;

pub use bands::{bands, mean_stdev, Bands, BAND_WIDTH};
pub use mfi::{money_flow_index, FLOW_DEAD_ZONE};
pub use rsi::rsi;
pub use stochastic::stochastic;

/// Read access to a numeric series by index.
pub trait Series {
    fn at(&self, index: usize) -> f64;
}

impl Series for [f64] {
    #[inline]
    fn at(&self, index: usize) -> f64 {
        self[index]
    }
}

impl<F> Series for F
where
    F: Fn(usize) -> f64,
{
    #[inline]
    fn at(&self, index: usize) -> f64 {
        self(index)
    }
}

/// First index of the trailing window ending at `index`: `max(0, index - window + 1)`.
///
/// `window` must be at least 1; the engines reject zero before any loop runs.
#[inline]
pub fn window_start(index: usize, window: usize) -> usize {
    (index + 1).saturating_sub(window)
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

/// Default epsilon for kernel tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
