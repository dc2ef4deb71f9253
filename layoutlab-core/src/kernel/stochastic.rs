//! Stochastic %K: where the current close sits in the window's high-low range.
//!
//! %K = 100 * (close - lowest low) / (highest high - lowest low)
//! Flat range → 0.

use super::Series;

/// %K at `end` over the window `[start, end]`.
pub fn stochastic<C, H, L>(close: &C, high: &H, low: &L, start: usize, end: usize) -> f64
where
    C: Series + ?Sized,
    H: Series + ?Sized,
    L: Series + ?Sized,
{
    let mut highest = f64::NEG_INFINITY;
    let mut lowest = f64::INFINITY;
    for j in start..=end {
        let h = high.at(j);
        let l = low.at(j);
        if h > highest {
            highest = h;
        }
        if l < lowest {
            lowest = l;
        }
    }

    let range = highest - lowest;
    if range == 0.0 {
        return 0.0;
    }
    100.0 * (close.at(end) - lowest) / range
}
