//! Column store: one arena region per field plus a parallel date list.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use super::arena::Arena;
use super::StoreError;
use crate::domain::{Field, Ohlcv};
use crate::parser::{self, reverse_prefix, ParseOptions, RowSink, ScanStats};
use crate::sampling::FieldSource;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStore {
    arena: Arena,
    dates: Vec<String>,
    len: usize,
}

impl ColumnStore {
    /// Empty store with room for `capacity` observations before it grows.
    pub fn with_capacity(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        let arena = Arena::try_new(capacity).ok_or(StoreError::CapacityTooLarge(capacity))?;
        let mut dates = Vec::new();
        dates
            .try_reserve_exact(capacity)
            .map_err(|_| StoreError::CapacityTooLarge(capacity))?;
        Ok(Self {
            arena,
            dates,
            len: 0,
        })
    }

    /// Build from observations already in chronological order.
    pub fn from_observations<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Ohlcv>,
    {
        let rows = rows.into_iter();
        let mut store = Self {
            arena: Arena::new(rows.size_hint().0.max(1)),
            dates: Vec::new(),
            len: 0,
        };
        for row in rows {
            store.push_row(row);
        }
        store
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

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Populated values of `field`.
    pub fn column(&self, field: Field) -> &[f64] {
        &self.arena.region(field)[..self.len]
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }
}

impl RowSink for ColumnStore {
    fn push_row(&mut self, row: Ohlcv) {
        if self.len == self.arena.capacity() {
            let grown = (self.len * 2).max(1);
            self.arena.grow(grown, self.len);
        }
        let i = self.len;
        self.arena.region_mut(Field::Open)[i] = row.open;
        self.arena.region_mut(Field::High)[i] = row.high;
        self.arena.region_mut(Field::Low)[i] = row.low;
        self.arena.region_mut(Field::Close)[i] = row.close;
        self.arena.region_mut(Field::Volume)[i] = row.volume;
        self.dates.push(row.date);
        self.len += 1;
    }

    fn finish(&mut self) {
        let len = self.len;
        for field in Field::ALL {
            reverse_prefix(self.arena.region_mut(field), len);
        }
        reverse_prefix(&mut self.dates, len);
    }
}

impl FieldSource for ColumnStore {
    fn len(&self) -> usize {
        self.len
    }

    fn date(&self, index: usize) -> &str {
        &self.dates[index]
    }

    fn field(&self, field: Field) -> Cow<'_, [f64]> {
        Cow::Borrowed(self.column(field))
    }
}
