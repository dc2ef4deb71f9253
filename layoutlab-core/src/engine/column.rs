//! Field-major engine over a [`ColumnStore`].
//!
//! Sweep order: the three midpoints, the three band triples, RSI,
//! stochastic, MFI. Each sweep reads earlier arena regions and writes its
//! own, so no region is ever read and written at once.

use super::{preflight, EngineError, EngineParams, Layout, MedianSummary};
use crate::domain::{Field, TypicalPrice};
use crate::kernel::{bands, money_flow_index, rsi, stochastic, window_start};
use crate::store::{Arena, ColumnStore};

/// Fill every derived region of `arena` over its first `len` entries.
///
/// `window` must be at least 1.
pub fn compute_columns(arena: &mut Arena, len: usize, window: usize) {
    for variant in TypicalPrice::ALL {
        let (cols, out) = arena.split_derived(variant.field(), 1, len);
        let open = cols.get(Field::Open);
        let high = cols.get(Field::High);
        let low = cols.get(Field::Low);
        let close = cols.get(Field::Close);
        let out = out.single();
        for i in 0..len {
            out[i] = variant.of(open[i], high[i], low[i], close[i]);
        }
    }

    for variant in TypicalPrice::ALL {
        let [first, ..] = variant.band_fields();
        let (cols, out) = arena.split_derived(first, 3, len);
        let values = cols.get(variant.field());
        let [avg, upper, lower] = out.triple();
        for i in 0..len {
            let b = bands(values, window_start(i, window), i);
            avg[i] = b.mean;
            upper[i] = b.upper;
            lower[i] = b.lower;
        }
    }

    {
        let (cols, out) = arena.split_derived(Field::Rsi, 1, len);
        let close = cols.get(Field::Close);
        let out = out.single();
        for i in 0..len {
            out[i] = rsi(close, window_start(i, window), i);
        }
    }

    {
        let (cols, out) = arena.split_derived(Field::Stochastic, 1, len);
        let close = cols.get(Field::Close);
        let high = cols.get(Field::High);
        let low = cols.get(Field::Low);
        let out = out.single();
        for i in 0..len {
            out[i] = stochastic(close, high, low, window_start(i, window), i);
        }
    }

    // Money flow is always driven by hlc3, whatever the reported variant.
    let (cols, out) = arena.split_derived(Field::Mfi, 1, len);
    let typical = cols.get(Field::Hlc3);
    let volume = cols.get(Field::Volume);
    let out = out.single();
    for i in 0..len {
        out[i] = money_flow_index(typical, volume, window_start(i, window), i);
    }
}

impl Layout for ColumnStore {
    fn name(&self) -> &'static str {
        "column"
    }

    fn compute(&mut self, params: &EngineParams) -> Result<MedianSummary, EngineError> {
        let len = self.len();
        preflight(params, len)?;
        compute_columns(self.arena_mut(), len, params.window);
        Ok(MedianSummary::from_source(self, params.typical_price))
    }
}
