//! Median and representative sampling over either layout's output.
//!
//! [`FieldSource`] abstracts "give me field X as a series" so summaries and
//! chart samples are computed the same way whether the data lives in
//! records or in columns.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Field;

/// Read-only view of a computed dataset, field by field.
pub trait FieldSource {
    /// Number of populated observations.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calendar day of observation `index`.
    fn date(&self, index: usize) -> &str;

    /// The populated values of `field`, in chronological order.
    ///
    /// Columnar sources borrow; record sources collect.
    fn field(&self, field: Field) -> Cow<'_, [f64]>;
}

/// Median as the element at `floor(n / 2)` of the ascending-sorted values.
///
/// For even `n` this is the upper of the two middle elements, not their
/// average. NaN sorts last (`f64::total_cmp`). Returns `None` for empty input.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

/// Median of one field of a source.
pub fn field_median<S: FieldSource + ?Sized>(source: &S, field: Field) -> Option<f64> {
    median(&source.field(field))
}

/// Up to `max_points` evenly spaced indices in `0..len`, always including
/// the first and last index when more than one point is requested.
pub fn sample_indices(len: usize, max_points: usize) -> Vec<usize> {
    if len == 0 || max_points == 0 {
        return Vec::new();
    }
    if len <= max_points {
        return (0..len).collect();
    }
    if max_points == 1 {
        return vec![0];
    }
    (0..max_points)
        .map(|k| k * (len - 1) / (max_points - 1))
        .collect()
}

/// A chart-ready sample: dates plus the chosen fields at the same indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sample {
    pub indices: Vec<usize>,
    pub dates: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
}

/// Sample `fields` of `source` at up to `max_points` evenly spaced indices.
pub fn sample_fields<S: FieldSource + ?Sized>(
    source: &S,
    fields: &[Field],
    max_points: usize,
) -> Sample {
    let indices = sample_indices(source.len(), max_points);
    let dates = indices.iter().map(|&i| source.date(i).to_string()).collect();
    let series = fields
        .iter()
        .map(|&field| {
            let values = source.field(field);
            let picked = indices.iter().map(|&i| values[i]).collect();
            (field.name().to_string(), picked)
        })
        .collect();
    Sample {
        indices,
        dates,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_length() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn median_even_length_takes_upper_middle() {
        // sorted [1, 2, 3, 4] → index 2, not (2 + 3) / 2
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(3.0));
    }

    #[test]
    fn median_empty_is_none() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_does_not_reorder_input() {
        let values = [3.0, 1.0, 2.0];
        let _ = median(&values);
        assert_eq!(values, [3.0, 1.0, 2.0]);
    }

    #[test]
    fn median_sorts_nan_last() {
        assert_eq!(median(&[f64::NAN, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn sample_indices_short_series_keeps_everything() {
        assert_eq!(sample_indices(3, 10), vec![0, 1, 2]);
    }

    #[test]
    fn sample_indices_spans_first_to_last() {
        let idx = sample_indices(101, 5);
        assert_eq!(idx, vec![0, 25, 50, 75, 100]);
    }

    #[test]
    fn sample_indices_degenerate() {
        assert!(sample_indices(0, 5).is_empty());
        assert!(sample_indices(5, 0).is_empty());
        assert_eq!(sample_indices(5, 1), vec![0]);
    }

    #[test]
    fn sample_indices_are_evenly_strided() {
        assert_eq!(sample_indices(10, 4), vec![0, 3, 6, 9]);
    }
}
