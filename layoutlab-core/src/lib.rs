//! LayoutLab Core — OHLCV ingestion, the two dataset layouts, and their engines.
//!
//! This crate contains everything that touches the data:
//! - Domain types (observations, records, field and typical-price enums)
//! - Windowed indicator kernel shared by both layouts
//! - Streaming chunked CSV scanner and a `csv`-crate reference parser
//! - Row store (array of records) and column store (one arena, one region per field)
//! - Record-major and field-major engines producing identical results
//! - Median and evenly strided sampling over either layout

pub mod domain;
pub mod engine;
pub mod kernel;
pub mod parser;
pub mod sampling;
pub mod store;

pub use domain::{Field, Ohlcv, Record, TypicalPrice};
pub use engine::{EngineError, EngineParams, Layout, MedianSummary};
pub use parser::{NumberPolicy, ParseError, ParseOptions, ParserKind, ScanStats};
pub use sampling::FieldSource;
pub use store::{ColumnStore, RowStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: datasets and results can move to a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<RowStore>();
        require_sync::<RowStore>();
        require_send::<ColumnStore>();
        require_sync::<ColumnStore>();
        require_send::<MedianSummary>();
        require_sync::<MedianSummary>();
        require_send::<ParseOptions>();
        require_sync::<ParseOptions>();
        require_send::<parser::Scanner>();
        require_send::<ParseError>();
        require_send::<StoreError>();
        require_sync::<StoreError>();
    }

    /// Architecture contract: the engine trait takes no parser or I/O handle.
    ///
    /// Computation only ever sees an already-ingested dataset.
    #[test]
    fn layout_trait_object_builds() {
        fn _check(
            layout: &mut dyn Layout,
            params: &EngineParams,
        ) -> Result<MedianSummary, EngineError> {
            layout.compute(params)
        }
    }
}
