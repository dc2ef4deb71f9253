//! Indicator engines — one per layout, sharing the [`kernel`](crate::kernel).
//!
//! Both engines fill all 15 derived fields of their dataset and return the
//! same [`MedianSummary`]. They differ only in traversal order:
//!
//! - [`RowStore`](crate::store::RowStore): record-major. Every derived field
//!   of observation `i` is computed before observation `i + 1` is touched.
//! - [`ColumnStore`](crate::store::ColumnStore): field-major. Each derived
//!   field is swept across the whole index range before the next one starts.
//!
//! For a given input and window the two produce bit-identical fields.

pub mod column;
pub mod row;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Field, TypicalPrice};
use crate::sampling::{field_median, FieldSource};

/// Default trailing window, in periods.
pub const DEFAULT_WINDOW: usize = 14;

/// Per-run parameters shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Trailing window length in periods. Must be at least 1.
    pub window: usize,
    /// Typical-price variant reported in the summary.
    pub typical_price: TypicalPrice,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            typical_price: TypicalPrice::default(),
        }
    }
}

/// Pre-flight failures. Nothing is computed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("window must be at least 1 period, got {0}")]
    InvalidWindow(usize),

    #[error("dataset is empty")]
    EmptyDataset,
}

/// Reject parameters no computation loop can run with.
pub fn preflight(params: &EngineParams, len: usize) -> Result<(), EngineError> {
    if params.window == 0 {
        return Err(EngineError::InvalidWindow(params.window));
    }
    if len == 0 {
        return Err(EngineError::EmptyDataset);
    }
    Ok(())
}

/// Median of each reported field across the whole series, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MedianSummary(BTreeMap<String, f64>);

impl MedianSummary {
    /// The fields a summary reports for a given typical-price choice.
    pub fn fields(typical: TypicalPrice) -> [Field; 6] {
        [
            Field::Close,
            Field::Volume,
            typical.field(),
            Field::Rsi,
            Field::Stochastic,
            Field::Mfi,
        ]
    }

    /// Summarize a computed, non-empty dataset.
    pub fn from_source<S: FieldSource + ?Sized>(source: &S, typical: TypicalPrice) -> Self {
        let entries = Self::fields(typical)
            .into_iter()
            .filter_map(|field| field_median(source, field).map(|m| (field.name().to_string(), m)))
            .collect();
        Self(entries)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Bitwise equality of every entry. NaN matches NaN with the same bits.
    pub fn matches(&self, other: &MedianSummary) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|((ka, va), (kb, vb))| ka == kb && va.to_bits() == vb.to_bits())
    }

    /// Keys whose values differ between the two summaries.
    pub fn mismatches<'a>(&'a self, other: &'a MedianSummary) -> Vec<&'a str> {
        self.0
            .iter()
            .filter(|(key, value)| {
                other
                    .0
                    .get(key.as_str())
                    .map_or(true, |v| v.to_bits() != value.to_bits())
            })
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

/// A dataset layout with an indicator engine.
pub trait Layout: FieldSource {
    /// Short identifier used in logs and exports.
    fn name(&self) -> &'static str;

    /// Compute every derived field and summarize.
    ///
    /// Idempotent: running twice overwrites the same values.
    fn compute(&mut self, params: &EngineParams) -> Result<MedianSummary, EngineError>;
}
