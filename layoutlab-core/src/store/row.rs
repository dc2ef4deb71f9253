//! Row store: an ordered `Vec<Record>`, chronological ascending.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use super::StoreError;
use crate::domain::{Field, Ohlcv, Record};
use crate::parser::{self, reverse_prefix, ParseOptions, RowSink, ScanStats};
use crate::sampling::FieldSource;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowStore {
    records: Vec<Record>,
}

impl RowStore {
    /// Empty store pre-sized for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        let mut records = Vec::new();
        records
            .try_reserve_exact(capacity)
            .map_err(|_| StoreError::CapacityTooLarge(capacity))?;
        Ok(Self { records })
    }

    /// Build from observations already in chronological order.
    pub fn from_observations<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Ohlcv>,
    {
        Self {
            records: rows.into_iter().map(Record::from).collect(),
        }
    }

    /// Parse `path` with the configured parser.
    pub fn from_path(path: &Path, opts: &ParseOptions) -> Result<(Self, ScanStats), StoreError> {
        let mut store = Self::with_capacity(opts.capacity)?;
        let stats = parser::parse_path(path, opts, &mut store)?;
        Ok((store, stats))
    }

    /// Parse any byte source with the configured parser.
    pub fn from_reader<R: Read>(
        reader: R,
        opts: &ParseOptions,
    ) -> Result<(Self, ScanStats), StoreError> {
        let mut store = Self::with_capacity(opts.capacity)?;
        let stats = parser::parse_reader(reader, opts, &mut store)?;
        Ok((store, stats))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RowSink for RowStore {
    fn push_row(&mut self, row: Ohlcv) {
        self.records.push(Record::from(row));
    }

    fn finish(&mut self) {
        let len = self.records.len();
        reverse_prefix(&mut self.records, len);
    }
}

impl FieldSource for RowStore {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn date(&self, index: usize) -> &str {
        &self.records[index].date
    }

    fn field(&self, field: Field) -> Cow<'_, [f64]> {
        Cow::Owned(self.records.iter().map(|r| r.get(field)).collect())
    }
}
