//! Domain types for LayoutLab

pub mod field;
pub mod record;

pub use field::{Field, TypicalPrice};
pub use record::{Ohlcv, Record};
