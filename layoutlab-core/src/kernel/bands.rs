//! Bollinger-style bands via Welford's online mean/variance.
//!
//! - Average: window mean
//! - Upper: mean + 2 * stddev
//! - Lower: mean - 2 * stddev
//!
//! Uses sample variance (divide by count - 1); a single-value window has
//! zero variance.

use super::Series;

/// Standard-deviation multiplier for the upper and lower bands.
pub const BAND_WIDTH: f64 = 2.0;

/// Band triple for one index.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bands {
    pub mean: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Mean and sample standard deviation of `values[start..=end]`, single pass.
pub fn mean_stdev<S: Series + ?Sized>(values: &S, start: usize, end: usize) -> (f64, f64) {
    let mut count = 0.0;
    let mut mean = 0.0;
    let mut m2 = 0.0;

    for j in start..=end {
        let x = values.at(j);
        count += 1.0;
        let delta = x - mean;
        mean += delta / count;
        m2 += delta * (x - mean);
    }

    let variance = if count > 1.0 { m2 / (count - 1.0) } else { 0.0 };
    (mean, variance.sqrt())
}

/// Average and upper/lower bands of `values[start..=end]`.
#[inline]
pub fn bands<S: Series + ?Sized>(values: &S, start: usize, end: usize) -> Bands {
    let (mean, stdev) = mean_stdev(values, start, end);
    Bands {
        mean,
        upper: mean + BAND_WIDTH * stdev,
        lower: mean - BAND_WIDTH * stdev,
    }
}
