//! The two dataset layouts.
//!
//! - [`RowStore`]: one [`Record`](crate::domain::Record) per observation
//!   (array of structs).
//! - [`ColumnStore`]: one contiguous array per field inside a single
//!   [`Arena`] (struct of arrays).
//!
//! Both are [`RowSink`](crate::parser::RowSink)s, so either parser fills
//! either layout, and both are [`FieldSource`](crate::sampling::FieldSource)s
//! for medians and chart samples.

pub mod arena;
pub mod column;
pub mod row;

use thiserror::Error;

use crate::parser::ParseError;

pub use arena::{Arena, Columns, DerivedMut};
pub use column::ColumnStore;
pub use row::RowStore;

/// Errors building a dataset.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset capacity must be at least 1")]
    ZeroCapacity,

    #[error("dataset capacity {0} is too large to allocate")]
    CapacityTooLarge(usize),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
