//! Reference parser built on the `csv` crate.
//!
//! Same contract as the streaming scanner, used to cross-check it. Speed is
//! not a goal here. Only `\n` terminates a record and quotes are literal, so
//! every record is exactly one physical line and a CRLF line keeps its `\r`
//! until field trimming.

use std::io::{self, Read};

use csv::{ByteRecord, ReaderBuilder, Terminator};

use super::{ParseError, ParseOptions, RowBuilder, RowSink, ScanStats, COLUMN_COUNT};

pub fn parse_reader<R, S>(
    reader: R,
    opts: &ParseOptions,
    sink: &mut S,
) -> Result<ScanStats, ParseError>
where
    R: Read,
    S: RowSink + ?Sized,
{
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(Terminated::new(reader));

    let mut record = ByteRecord::new();
    let mut row = RowBuilder::new(opts.numbers);
    let mut rows = 0;
    let mut pending_blank: Option<usize> = None;

    loop {
        // 1-based line of the next unread byte. csv silently skips empty
        // lines, so any gap up to the record's own line was blank.
        let from = csv.position().line() as usize;
        if !csv.read_byte_record(&mut record)? {
            break;
        }
        // Every record ends in `\n`, which has already been counted.
        let line = csv.position().line() as usize - 1;

        let first_data_blank = from.max(opts.start_line + 1);
        if first_data_blank < line {
            pending_blank.get_or_insert(first_data_blank);
        }
        if line <= opts.start_line {
            continue;
        }
        if record.len() == 1 && &record[0] == b"\r" {
            pending_blank.get_or_insert(line);
            continue;
        }
        if let Some(blank) = pending_blank {
            return Err(ParseError::ColumnCount {
                line: blank,
                found: 0,
            });
        }
        if record.len() != COLUMN_COUNT {
            return Err(ParseError::ColumnCount {
                line,
                found: record.len(),
            });
        }
        for (column, field) in record.iter().enumerate() {
            row.set(column, field, line)?;
        }
        sink.push_row(row.take());
        rows += 1;
    }

    let lines = csv.position().line().saturating_sub(1) as usize;
    sink.finish();
    Ok(ScanStats {
        rows,
        lines,
        bytes: csv.get_ref().bytes,
    })
}

/// Forwards `inner` and supplies a final `\n` when the source does not end
/// with one, so the last record is terminated like every other.
struct Terminated<R> {
    inner: R,
    /// Bytes read from `inner`; the supplied newline is not counted.
    bytes: u64,
    last: Option<u8>,
    done: bool,
}

impl<R> Terminated<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            bytes: 0,
            last: None,
            done: false,
        }
    }
}

impl<R: Read> Read for Terminated<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.bytes += n as u64;
            self.last = Some(buf[n - 1]);
            return Ok(n);
        }
        self.done = true;
        match self.last {
            Some(b) if b != b'\n' => {
                buf[0] = b'\n';
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ohlcv;
    use crate::parser::scanner::scan_reader;
    use crate::parser::{NumberPolicy, ParserKind};

    fn opts() -> ParseOptions {
        ParseOptions {
            parser: ParserKind::Reference,
            ..ParseOptions::default()
        }
    }

    fn both(input: &str) -> (Result<Vec<Ohlcv>, ParseError>, Result<Vec<Ohlcv>, ParseError>) {
        let mut reference: Vec<Ohlcv> = Vec::new();
        let mut custom: Vec<Ohlcv> = Vec::new();
        let r = parse_reader(input.as_bytes(), &opts(), &mut reference);
        let c = scan_reader(input.as_bytes(), &ParseOptions::default(), &mut custom);
        (r.map(|_| reference), c.map(|_| custom))
    }

    fn assert_same_rows(reference: &[Ohlcv], custom: &[Ohlcv]) {
        assert_eq!(reference.len(), custom.len());
        for (r, c) in reference.iter().zip(custom) {
            assert_eq!(r.date, c.date);
            assert_eq!(r.open.to_bits(), c.open.to_bits());
            assert_eq!(r.high.to_bits(), c.high.to_bits());
            assert_eq!(r.low.to_bits(), c.low.to_bits());
            assert_eq!(r.close.to_bits(), c.close.to_bits());
            assert_eq!(r.volume.to_bits(), c.volume.to_bits());
        }
    }

    #[test]
    fn parses_and_reverses() {
        let input = "h\nx,2024-01-02 09:30,x,2,3,1,2.5,20\nx,2024-01-01,x,1,2,0.5,1.5,10\n";
        let mut rows: Vec<Ohlcv> = Vec::new();
        let stats = parse_reader(input.as_bytes(), &opts(), &mut rows).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.bytes, input.len() as u64);
        assert_eq!(rows[0].date, "2024-01-01");
        assert_eq!(rows[1].date, "2024-01-02");
        assert_eq!(rows[1].close, 2.5);
    }

    #[test]
    fn crlf_keeps_the_first_data_row() {
        let input = "h,h\r\n\
                     A,2024-02-03,3,3,4,2,3.5,30\r\n\
                     A,2024-02-02,2,2,3,1,2.5,20\r\n";
        let mut rows: Vec<Ohlcv> = Vec::new();
        let stats = parse_reader(input.as_bytes(), &opts(), &mut rows).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.lines, 3);
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-02-02", "2024-02-03"]);
        assert_eq!(rows[1].volume, 30.0);
    }

    #[test]
    fn reports_column_count_with_line() {
        let input = "h\nx,2024-01-02,x,2,3,1,2.5,20\nx,2024-01-01,x,1,2\n";
        let mut rows: Vec<Ohlcv> = Vec::new();
        let err = parse_reader(input.as_bytes(), &opts(), &mut rows).unwrap_err();
        assert!(matches!(err, ParseError::ColumnCount { line: 3, found: 5 }));

        let crlf = input.replace('\n', "\r\n");
        let err = parse_reader(crlf.as_bytes(), &opts(), &mut rows).unwrap_err();
        assert!(matches!(err, ParseError::ColumnCount { line: 3, found: 5 }));
    }

    #[test]
    fn blank_line_between_rows_is_malformed() {
        for input in [
            "h\nx,2024-01-02,x,2,2,2,2,2\n\nx,2024-01-01,x,1,1,1,1,1\n",
            "h\r\nx,2024-01-02,x,2,2,2,2,2\r\n\r\nx,2024-01-01,x,1,1,1,1,1\r\n",
        ] {
            let (reference, custom) = both(input);
            assert!(matches!(reference, Err(ParseError::ColumnCount { line: 3, found: 0 })));
            assert!(matches!(custom, Err(ParseError::ColumnCount { line: 3, found: 0 })));
        }
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let input = "h\nx,2024-01-02,x,2,2,2,2,2\nx,2024-01-01,x,1,1,1,1,1\n\n\r\n";
        let mut rows: Vec<Ohlcv> = Vec::new();
        let stats = parse_reader(input.as_bytes(), &opts(), &mut rows).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.lines, 5);
    }

    #[test]
    fn blank_header_lines_are_skipped() {
        let input = "\n\nx,2024-01-01,x,1,1,1,1,1\n";
        let o = ParseOptions {
            start_line: 2,
            ..opts()
        };
        let mut rows: Vec<Ohlcv> = Vec::new();
        parse_reader(input.as_bytes(), &o, &mut rows).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn agrees_with_streaming_scanner() {
        let input = "symbol,date,unix,open,high,low,close,volume\r\n\
                     ETH, 2024-02-03 00:00 ,3, 3.25 ,4,2,3.5,30\r\n\
                     ETH,2024-02-02,2,2,3,1,bad,20\r\n\
                     ETH,\"2024-02-01\",1,1,2,0.5,1.5,10";
        let (reference, custom) = both(input);
        let (reference, custom) = (reference.unwrap(), custom.unwrap());

        assert_eq!(reference.len(), 3);
        assert_same_rows(&reference, &custom);
        assert!(reference[1].close.is_nan());
        assert_eq!(reference[2].open, 3.25);
        assert_eq!(reference[0].date, "\"2024-02-01\"");
    }

    #[test]
    fn missing_trailing_newline_keeps_last_row() {
        let input = "h\nx,2024-01-02,x,2,2,2,2,2\nx,2024-01-01,x,1,1,1,1,1";
        let mut rows: Vec<Ohlcv> = Vec::new();
        let stats = parse_reader(input.as_bytes(), &opts(), &mut rows).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.bytes, input.len() as u64);
        assert_eq!(rows[0].date, "2024-01-01");
    }

    #[test]
    fn strict_numbers_fail_in_reference_too() {
        let input = "h\nx,2024-01-01,x,1,2,0.5,oops,10\n";
        let o = ParseOptions {
            numbers: NumberPolicy::Strict,
            ..opts()
        };
        let mut rows: Vec<Ohlcv> = Vec::new();
        let err = parse_reader(input.as_bytes(), &o, &mut rows).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 2, column: 6, .. }));
    }
}
