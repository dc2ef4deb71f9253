//! Relative Strength Index over a trailing window.
//!
//! Within the window, each close-to-close change feeds an exponentially
//! weighted up/down accumulator with weight `(periods - 1) / periods`, where
//! `periods` is the window length at that index.
//!
//! RSI = 100 - 100 / (1 + up / down)
//!
//! Edge case: down == 0 → rs = 0 → RSI = 0 (not 100). This differs from the
//! textbook convention and is kept so results stay comparable with earlier
//! benchmark runs.

use super::Series;

/// RSI of `close[start..=end]`.
pub fn rsi<S: Series + ?Sized>(close: &S, start: usize, end: usize) -> f64 {
    let periods = (end - start + 1) as f64;
    let weight = (periods - 1.0) / periods;

    let mut up = 0.0;
    let mut down = 0.0;
    let mut prev = close.at(start);
    for j in (start + 1)..=end {
        let curr = close.at(j);
        let change = curr - prev;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        up = up * weight + gain / periods;
        down = down * weight + loss / periods;
        prev = curr;
    }

    let rs = if down != 0.0 { up / down } else { 0.0 };
    100.0 - 100.0 / (1.0 + rs)
}
