//! Chunked, state-carrying CSV scanner.
//!
//! Input arrives as arbitrary byte chunks; nothing assumes a field or a row
//! ends on a chunk boundary. The scanner keeps:
//! - a carry-over buffer with the unterminated tail of the current field,
//! - the column index within the current row,
//! - the physical line number,
//!
//! all of which survive from one [`Scanner::feed`] call to the next.
//!
//! Within a chunk it tracks the next `,` and the next `\n` and always
//! advances to whichever comes first. A `\n` closes the row's last field and
//! then the row itself. Each byte is searched at most twice (once per
//! delimiter kind).

use std::io::{ErrorKind, Read};

use super::{ParseError, ParseOptions, RowBuilder, RowSink, ScanStats, COLUMN_COUNT};

#[derive(Debug)]
pub struct Scanner {
    carry: Vec<u8>,
    column: usize,
    /// 0-based index of the line currently being scanned.
    line: usize,
    start_line: usize,
    row: RowBuilder,
    rows: usize,
    bytes: u64,
    /// First blank data line not yet followed by a row. Blank lines are only
    /// tolerated at the end of input.
    pending_blank: Option<usize>,
}

impl Scanner {
    pub fn new(opts: &ParseOptions) -> Self {
        Self {
            carry: Vec::with_capacity(opts.scratch_bytes),
            column: 0,
            line: 0,
            start_line: opts.start_line,
            row: RowBuilder::new(opts.numbers),
            rows: 0,
            bytes: 0,
            pending_blank: None,
        }
    }

    /// Whether fields on the current line are decoded (false for header lines).
    #[inline]
    fn materializing(&self) -> bool {
        self.line >= self.start_line
    }

    /// Scan one chunk, pushing every row it completes into `sink`.
    pub fn feed<S: RowSink + ?Sized>(
        &mut self,
        chunk: &[u8],
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let mut cursor = 0;
        let mut next_comma = find(chunk, b',', 0);
        let mut next_newline = find(chunk, b'\n', 0);

        loop {
            match (next_comma, next_newline) {
                (Some(comma), newline) if newline.map_or(true, |nl| comma < nl) => {
                    self.end_field(&chunk[cursor..comma])?;
                    cursor = comma + 1;
                    next_comma = find(chunk, b',', cursor);
                }
                (_, Some(newline)) => {
                    // A pending comma, if any, lies beyond this newline and stays valid.
                    self.end_line(&chunk[cursor..newline], sink)?;
                    cursor = newline + 1;
                    next_newline = find(chunk, b'\n', cursor);
                }
                (_, None) => {
                    // Header tails are never decoded, so they are not carried.
                    if self.materializing() {
                        self.carry.extend_from_slice(&chunk[cursor..]);
                    }
                    break;
                }
            }
        }

        self.bytes += chunk.len() as u64;
        Ok(())
    }

    /// Signal end of input. An unterminated final row is closed as if a
    /// newline followed it; then the sink restores chronological order.
    /// Trailing blank lines are ignored.
    pub fn finish<S: RowSink + ?Sized>(
        mut self,
        sink: &mut S,
    ) -> Result<ScanStats, ParseError> {
        if self.column > 0 || !self.carry.is_empty() {
            self.end_line(&[], sink)?;
        }
        sink.finish();
        Ok(ScanStats {
            rows: self.rows,
            lines: self.line,
            bytes: self.bytes,
        })
    }

    /// Close the current field with its final `segment` (prefixed by any carry).
    fn end_field(&mut self, segment: &[u8]) -> Result<(), ParseError> {
        if self.materializing() {
            if self.carry.is_empty() {
                self.row.set(self.column, segment, self.line + 1)?;
            } else {
                self.carry.extend_from_slice(segment);
                let field = std::mem::take(&mut self.carry);
                let result = self.row.set(self.column, &field, self.line + 1);
                self.carry = field;
                self.carry.clear();
                result?;
            }
        }
        self.column += 1;
        Ok(())
    }

    /// Close the current line: its last field, then the row.
    fn end_line<S: RowSink + ?Sized>(
        &mut self,
        segment: &[u8],
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let line = self.line + 1;

        if !self.materializing() {
            self.column = 0;
            self.line += 1;
            return Ok(());
        }

        if self.column == 0 && is_blank(&self.carry, segment) {
            self.carry.clear();
            self.line += 1;
            self.pending_blank.get_or_insert(line);
            return Ok(());
        }

        if let Some(blank) = self.pending_blank {
            return Err(ParseError::ColumnCount {
                line: blank,
                found: 0,
            });
        }

        self.end_field(segment)?;
        let found = std::mem::replace(&mut self.column, 0);
        self.line += 1;
        if found != COLUMN_COUNT {
            return Err(ParseError::ColumnCount { line, found });
        }

        sink.push_row(self.row.take());
        self.rows += 1;
        Ok(())
    }
}

/// Feed `reader` to a fresh scanner one `chunk_bytes` chunk at a time.
///
/// The next chunk is only requested after the previous one is fully scanned.
pub fn scan_reader<R, S>(
    mut reader: R,
    opts: &ParseOptions,
    sink: &mut S,
) -> Result<ScanStats, ParseError>
where
    R: Read,
    S: RowSink + ?Sized,
{
    let mut scanner = Scanner::new(opts);
    let mut buf = vec![0u8; opts.chunk_bytes.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        scanner.feed(&buf[..n], sink)?;
    }
    scanner.finish(sink)
}

#[inline]
fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|p| p + from)
}

/// A line is blank when it holds no bytes at all, or only a `\r`.
fn is_blank(carry: &[u8], segment: &[u8]) -> bool {
    match carry.len() + segment.len() {
        0 => true,
        1 => carry.first().or(segment.first()) == Some(&b'\r'),
        _ => false,
    }
}
