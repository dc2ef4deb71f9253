//! Record-major engine over a [`RowStore`].

use super::{preflight, EngineError, EngineParams, Layout, MedianSummary};
use crate::domain::{Record, TypicalPrice};
use crate::kernel::{bands, money_flow_index, rsi, stochastic, window_start};
use crate::store::RowStore;

/// Fill every derived field of `records`, one record at a time.
///
/// `window` must be at least 1.
pub fn compute_records(records: &mut [Record], window: usize) {
    for i in 0..records.len() {
        {
            let r = &mut records[i];
            r.hl2 = TypicalPrice::Hl2.of(r.open, r.high, r.low, r.close);
            r.hlc3 = TypicalPrice::Hlc3.of(r.open, r.high, r.low, r.close);
            r.ohlc4 = TypicalPrice::Ohlc4.of(r.open, r.high, r.low, r.close);
        }

        let start = window_start(i, window);
        let view: &[Record] = records;
        let hl2 = bands(&|j: usize| view[j].hl2, start, i);
        let hlc3 = bands(&|j: usize| view[j].hlc3, start, i);
        let ohlc4 = bands(&|j: usize| view[j].ohlc4, start, i);
        let rsi = rsi(&|j: usize| view[j].close, start, i);
        let stochastic = stochastic(
            &|j: usize| view[j].close,
            &|j: usize| view[j].high,
            &|j: usize| view[j].low,
            start,
            i,
        );
        let mfi = money_flow_index(&|j: usize| view[j].hlc3, &|j: usize| view[j].volume, start, i);

        let r = &mut records[i];
        r.hl2_avg = hl2.mean;
        r.hl2_upper = hl2.upper;
        r.hl2_lower = hl2.lower;
        r.hlc3_avg = hlc3.mean;
        r.hlc3_upper = hlc3.upper;
        r.hlc3_lower = hlc3.lower;
        r.ohlc4_avg = ohlc4.mean;
        r.ohlc4_upper = ohlc4.upper;
        r.ohlc4_lower = ohlc4.lower;
        r.rsi = rsi;
        r.stochastic = stochastic;
        r.mfi = mfi;
    }
}

impl Layout for RowStore {
    fn name(&self) -> &'static str {
        "row"
    }

    fn compute(&mut self, params: &EngineParams) -> Result<MedianSummary, EngineError> {
        preflight(params, self.len())?;
        compute_records(self.records_mut(), params.window);
        Ok(MedianSummary::from_source(self, params.typical_price))
    }
}
