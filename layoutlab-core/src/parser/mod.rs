//! CSV ingestion: a hand-rolled streaming scanner and a `csv`-crate reference.
//!
//! Both parsers honor the same contract:
//! - rows are comma-delimited with exactly [`COLUMN_COUNT`] columns;
//! - columns 1 (date), 3..=7 (open, high, low, close, volume) are consumed,
//!   columns 0 and 2 are ignored;
//! - the first `start_line` physical lines are skipped without validation;
//! - fields are trimmed, the date is cut at its first space, numbers are
//!   parsed per [`NumberPolicy`];
//! - a data row with the wrong column count aborts with
//!   [`ParseError::ColumnCount`] carrying the 1-based line number;
//! - a blank line (empty, or a lone `\r`) between data rows is a
//!   [`ParseError::ColumnCount`] with `found: 0`; blank lines after the last
//!   row are ignored;
//! - on end of input the sink's `finish` reverses the rows (the source file
//!   is newest-first).
//!
//! Parsed rows go to a [`RowSink`]; the row store and the column store are
//! both sinks, so the same scan feeds either layout.

pub mod reference;
pub mod scanner;

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Ohlcv;

pub use scanner::Scanner;

/// Columns per row.
pub const COLUMN_COUNT: usize = 8;
pub const DATE_COLUMN: usize = 1;
pub const OPEN_COLUMN: usize = 3;
pub const HIGH_COLUMN: usize = 4;
pub const LOW_COLUMN: usize = 5;
pub const CLOSE_COLUMN: usize = 6;
pub const VOLUME_COLUMN: usize = 7;

/// Which parser implementation drives ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// Chunked byte scanner (see [`scanner`]).
    #[default]
    Custom,
    /// `csv` crate reader, for cross-checking.
    Reference,
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserKind::Custom => f.write_str("custom"),
            ParserKind::Reference => f.write_str("reference"),
        }
    }
}

impl FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "custom" => Ok(ParserKind::Custom),
            "reference" | "csv" => Ok(ParserKind::Reference),
            other => Err(format!(
                "unknown parser '{other}' (expected custom or reference)"
            )),
        }
    }
}

/// What to do with a numeric token that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberPolicy {
    /// Store NaN and carry on. NaN then flows silently through every window
    /// statistic that touches it.
    #[default]
    Lenient,
    /// Fail with [`ParseError::InvalidNumber`].
    Strict,
}

/// Options shared by both parsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Physical lines to skip before data starts (header rows).
    pub start_line: usize,
    /// Expected row count; stores pre-size to this and grow past it.
    pub capacity: usize,
    /// Initial size of the scanner's carry-over buffer.
    pub scratch_bytes: usize,
    /// Bytes requested from the reader per chunk.
    pub chunk_bytes: usize,
    pub parser: ParserKind,
    pub numbers: NumberPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            start_line: 1,
            capacity: 4096,
            scratch_bytes: 256,
            chunk_bytes: 64 * 1024,
            parser: ParserKind::Custom,
            numbers: NumberPolicy::Lenient,
        }
    }
}

/// Errors from ingestion. All are fatal; no partial dataset is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected 8 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}, column {column}: invalid number {token:?}")]
    InvalidNumber {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for parsed rows.
pub trait RowSink {
    /// Append one row in file order.
    fn push_row(&mut self, row: Ohlcv);

    /// Called once after the last row; restores chronological order.
    fn finish(&mut self);
}

impl RowSink for Vec<Ohlcv> {
    fn push_row(&mut self, row: Ohlcv) {
        self.push(row);
    }

    fn finish(&mut self) {
        let len = self.len();
        reverse_prefix(self, len);
    }
}

/// Counters reported by a completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Data rows delivered to the sink.
    pub rows: usize,
    /// Physical lines seen, including skipped and blank ones.
    pub lines: usize,
    /// Bytes consumed from the source.
    pub bytes: u64,
}

/// Reverse the first `len` elements in place; anything past `len` is untouched.
///
/// Used by every sink's finishing step so that a partially filled,
/// capacity-sized array only swaps its populated prefix.
pub fn reverse_prefix<T>(values: &mut [T], len: usize) {
    let len = len.min(values.len());
    values[..len].reverse();
}

/// Run the configured parser over `reader`, delivering rows to `sink`.
pub fn parse_reader<R, S>(
    reader: R,
    opts: &ParseOptions,
    sink: &mut S,
) -> Result<ScanStats, ParseError>
where
    R: Read,
    S: RowSink + ?Sized,
{
    match opts.parser {
        ParserKind::Custom => scanner::scan_reader(reader, opts, sink),
        ParserKind::Reference => reference::parse_reader(reader, opts, sink),
    }
}

/// Open `path` and run the configured parser over it.
pub fn parse_path<S>(
    path: &Path,
    opts: &ParseOptions,
    sink: &mut S,
) -> Result<ScanStats, ParseError>
where
    S: RowSink + ?Sized,
{
    let file = File::open(path)?;
    parse_reader(file, opts, sink)
}

// ── Field decoding shared by both parsers ────────────────────────────

/// Strip leading and trailing ASCII whitespace (including `\r`).
pub(crate) fn trim_bytes(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &bytes[start..end]
}

/// Calendar-day part of a date token: everything before the first space.
pub(crate) fn date_part(token: &[u8]) -> &[u8] {
    match token.iter().position(|&b| b == b' ') {
        Some(p) => &token[..p],
        None => token,
    }
}

/// Accumulates the consumed columns of one row.
#[derive(Debug, Default)]
pub(crate) struct RowBuilder {
    numbers: NumberPolicy,
    date: String,
    values: [f64; 5],
}

impl RowBuilder {
    pub(crate) fn new(numbers: NumberPolicy) -> Self {
        Self {
            numbers,
            ..Self::default()
        }
    }

    /// Decode one raw field. Columns that are not consumed are ignored.
    pub(crate) fn set(&mut self, column: usize, raw: &[u8], line: usize) -> Result<(), ParseError> {
        match column {
            DATE_COLUMN => {
                let day = date_part(trim_bytes(raw));
                self.date.clear();
                self.date.push_str(&String::from_utf8_lossy(day));
            }
            OPEN_COLUMN..=VOLUME_COLUMN => {
                self.values[column - OPEN_COLUMN] = self.number(trim_bytes(raw), line, column)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn number(&self, token: &[u8], line: usize, column: usize) -> Result<f64, ParseError> {
        let parsed = std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<f64>().ok());
        match (parsed, self.numbers) {
            (Some(v), _) => Ok(v),
            (None, NumberPolicy::Lenient) => Ok(f64::NAN),
            (None, NumberPolicy::Strict) => Err(ParseError::InvalidNumber {
                line,
                column,
                token: String::from_utf8_lossy(token).into_owned(),
            }),
        }
    }

    /// Hand over the completed row and reset for the next one.
    pub(crate) fn take(&mut self) -> Ohlcv {
        let [open, high, low, close, volume] = std::mem::take(&mut self.values);
        Ohlcv {
            date: std::mem::take(&mut self.date),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_prefix_only_touches_populated_part() {
        let mut values = [1, 2, 3, 0, 0];
        reverse_prefix(&mut values, 3);
        assert_eq!(values, [3, 2, 1, 0, 0]);
    }

    #[test]
    fn reverse_prefix_clamps_len() {
        let mut values = vec![1, 2];
        reverse_prefix(&mut values, 10);
        assert_eq!(values, vec![2, 1]);
    }

    #[test]
    fn trim_bytes_strips_crlf_and_spaces() {
        assert_eq!(trim_bytes(b"  12.5\r"), b"12.5");
        assert_eq!(trim_bytes(b"   "), b"");
        assert_eq!(trim_bytes(b""), b"");
    }

    #[test]
    fn date_part_drops_time_of_day() {
        assert_eq!(date_part(b"2024-01-02 16:00:00"), b"2024-01-02");
        assert_eq!(date_part(b"2024-01-02"), b"2024-01-02");
    }

    #[test]
    fn row_builder_decodes_consumed_columns() {
        let mut b = RowBuilder::new(NumberPolicy::Lenient);
        let fields: [&[u8]; 8] = [
            b"BTC", b" 2024-01-02 00:00 ", b"x", b"1", b"2", b"0.5", b"1.5", b"100",
        ];
        for (column, raw) in fields.iter().enumerate() {
            b.set(column, raw, 1).unwrap();
        }
        let row = b.take();
        assert_eq!(row.date, "2024-01-02");
        assert_eq!(
            (row.open, row.high, row.low, row.close, row.volume),
            (1.0, 2.0, 0.5, 1.5, 100.0)
        );
        // builder is reset
        assert_eq!(b.take(), Ohlcv::default());
    }

    #[test]
    fn lenient_number_becomes_nan() {
        let mut b = RowBuilder::new(NumberPolicy::Lenient);
        b.set(CLOSE_COLUMN, b"12,x", 4).unwrap();
        assert!(b.take().close.is_nan());
    }

    #[test]
    fn strict_number_is_an_error() {
        let mut b = RowBuilder::new(NumberPolicy::Strict);
        let err = b.set(VOLUME_COLUMN, b" abc ", 9).unwrap_err();
        match err {
            ParseError::InvalidNumber {
                line,
                column,
                token,
            } => {
                assert_eq!(line, 9);
                assert_eq!(column, VOLUME_COLUMN);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parser_kind_from_str() {
        assert_eq!("custom".parse::<ParserKind>().unwrap(), ParserKind::Custom);
        assert_eq!("CSV".parse::<ParserKind>().unwrap(), ParserKind::Reference);
        assert!("fast".parse::<ParserKind>().is_err());
    }
}
