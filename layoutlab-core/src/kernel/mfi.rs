//! Money Flow Index over a trailing window.
//!
//! Raw flow per index is typical price × volume. Successive flow deltas in
//! the window are split into positive and negative sums; deltas inside the
//! ±[`FLOW_DEAD_ZONE`] band count as neither.
//!
//! MFI = 100 - 100 / (1 + positive / negative)
//!
//! Edge case: negative == 0 → ratio = 0 → MFI = 0, the same asymmetry as RSI.

use super::Series;

/// Flow deltas with magnitude at or below this are treated as unchanged.
pub const FLOW_DEAD_ZONE: f64 = 1e-5;

/// MFI at `end` over `[start, end]`, from typical price and volume series.
pub fn money_flow_index<T, V>(typical: &T, volume: &V, start: usize, end: usize) -> f64
where
    T: Series + ?Sized,
    V: Series + ?Sized,
{
    let mut positive = 0.0;
    let mut negative = 0.0;
    let mut prev_flow = typical.at(start) * volume.at(start);

    for j in (start + 1)..=end {
        let flow = typical.at(j) * volume.at(j);
        let delta = flow - prev_flow;
        if delta > FLOW_DEAD_ZONE {
            positive += delta;
        } else if delta < -FLOW_DEAD_ZONE {
            negative -= delta;
        }
        prev_flow = flow;
    }

    let ratio = if negative != 0.0 { positive / negative } else { 0.0 };
    100.0 - 100.0 / (1.0 + ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{assert_approx, window_start, DEFAULT_EPSILON};

    #[test]
    fn rising_flow_only_is_zero() {
        let typical = [10.0, 11.0, 12.0, 13.0];
        let volume = [100.0; 4];
        assert_eq!(money_flow_index(&typical[..], &volume[..], 0, 3), 0.0);
    }

    #[test]
    fn balanced_flow_is_fifty() {
        // flows: 1000, 1200, 1000 → +200, -200
        let typical = [10.0, 12.0, 10.0];
        let volume = [100.0; 3];
        assert_approx(
            money_flow_index(&typical[..], &volume[..], 0, 2),
            50.0,
            DEFAULT_EPSILON,
        );
    }

    #[test]
    fn dead_zone_ignores_tiny_deltas() {
        // flows: 1.0, 1.000001 (+1e-6, ignored), 0.5 (-0.500001)
        let typical = [1.0, 1.000001, 0.5];
        let volume = [1.0; 3];
        // positive stays 0 → ratio 0 → MFI 0
        assert_eq!(money_flow_index(&typical[..], &volume[..], 0, 2), 0.0);
    }

    #[test]
    fn volume_weights_the_flow() {
        // flows: 1000, 3000 (+2000), 2000 (-1000) → ratio 2 → 100 - 100/3
        let typical = [10.0, 10.0, 10.0];
        let volume = [100.0, 300.0, 200.0];
        assert_approx(
            money_flow_index(&typical[..], &volume[..], 0, 2),
            100.0 - 100.0 / 3.0,
            DEFAULT_EPSILON,
        );
    }

    #[test]
    fn mfi_bounds() {
        let typical = [10.0, 12.0, 9.0, 14.0, 8.0, 15.0];
        let volume = [5.0, 7.0, 3.0, 9.0, 4.0, 6.0];
        for i in 0..typical.len() {
            let v = money_flow_index(&typical[..], &volume[..], window_start(i, 3), i);
            assert!((0.0..=100.0).contains(&v), "MFI out of bounds at {i}: {v}");
        }
    }
}
