//! Property tests for ingestion and engine invariants.
//!
//! Uses proptest to verify:
//! 1. Chunk-boundary invariance — any split of the input yields the same rows
//! 2. Parser agreement — the streaming scanner and the `csv` reader agree
//! 3. Layout parity — row and column engines agree bit for bit
//! 4. Band mean — equals the arithmetic mean of the trailing window

use proptest::prelude::*;

use layoutlab_core::domain::{Field, Ohlcv};
use layoutlab_core::engine::{EngineParams, Layout};
use layoutlab_core::parser::{self, ParseOptions, ParserKind, Scanner};
use layoutlab_core::sampling::FieldSource;
use layoutlab_core::store::{ColumnStore, RowStore};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_bar() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (arb_price(), arb_price(), 0.0..20.0_f64, 0.0..20.0_f64, 0.0..1e6_f64).prop_map(
        |(open, close, up, down, volume)| {
            let high = open.max(close) + up;
            let low = open.min(close) - down;
            (open, high, low, close, volume.round())
        },
    )
}

fn arb_bars(max: usize) -> impl Strategy<Value = Vec<Ohlcv>> {
    prop::collection::vec(arb_bar(), 1..max).prop_map(|bars| {
        bars.into_iter()
            .enumerate()
            .map(|(i, (open, high, low, close, volume))| Ohlcv {
                date: format!("2024-{:02}-{:02}", i / 28 + 1, i % 28 + 1),
                open,
                high,
                low,
                close,
                volume,
            })
            .collect()
    })
}

/// Render chronological bars as a newest-first CSV file with a header.
fn to_csv(bars: &[Ohlcv], crlf: bool) -> String {
    let eol = if crlf { "\r\n" } else { "\n" };
    let mut out = format!("symbol,date,unix,open,high,low,close,volume{eol}");
    for (i, b) in bars.iter().enumerate().rev() {
        out.push_str(&format!(
            "TEST,{} 00:00:00,{},{},{},{},{},{}{eol}",
            b.date, i, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}

fn scan_in_pieces(input: &[u8], cuts: &[usize]) -> Vec<Ohlcv> {
    let opts = ParseOptions::default();
    let mut scanner = Scanner::new(&opts);
    let mut rows: Vec<Ohlcv> = Vec::new();
    let mut cursor = 0;
    for &cut in cuts {
        scanner.feed(&input[cursor..cut], &mut rows).unwrap();
        cursor = cut;
    }
    scanner.feed(&input[cursor..], &mut rows).unwrap();
    scanner.finish(&mut rows).unwrap();
    rows
}

// ── 1. Chunk-boundary invariance ─────────────────────────────────────

proptest! {
    /// Splitting the byte stream anywhere, including mid-field, changes nothing.
    #[test]
    fn chunk_boundaries_do_not_matter(
        bars in arb_bars(40),
        crlf in any::<bool>(),
        raw_cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
    ) {
        let csv = to_csv(&bars, crlf);
        let input = csv.as_bytes();
        let mut cuts: Vec<usize> = raw_cuts.iter().map(|ix| ix.index(input.len() + 1)).collect();
        cuts.sort_unstable();

        let whole = scan_in_pieces(input, &[]);
        let pieces = scan_in_pieces(input, &cuts);
        prop_assert_eq!(&whole, &pieces);
        prop_assert_eq!(whole, bars);
    }

    /// Reading through `scan_reader` with any chunk size gives the same rows.
    #[test]
    fn chunk_size_does_not_matter(bars in arb_bars(30), chunk in 1usize..64) {
        let csv = to_csv(&bars, false);
        let opts = ParseOptions { chunk_bytes: chunk, ..ParseOptions::default() };
        let mut rows: Vec<Ohlcv> = Vec::new();
        let stats = parser::parse_reader(csv.as_bytes(), &opts, &mut rows).unwrap();
        prop_assert_eq!(stats.rows, bars.len());
        prop_assert_eq!(stats.bytes, csv.len() as u64);
        prop_assert_eq!(rows, bars);
    }
}

// ── 2. Parser agreement ──────────────────────────────────────────────

proptest! {
    #[test]
    fn scanner_and_reference_agree(bars in arb_bars(40), crlf in any::<bool>()) {
        let csv = to_csv(&bars, crlf);
        let custom_opts = ParseOptions::default();
        let reference_opts = ParseOptions {
            parser: ParserKind::Reference,
            ..ParseOptions::default()
        };

        let (custom, custom_stats) = RowStore::from_reader(csv.as_bytes(), &custom_opts).unwrap();
        let (reference, reference_stats) =
            RowStore::from_reader(csv.as_bytes(), &reference_opts).unwrap();
        prop_assert_eq!(custom.len(), bars.len());
        prop_assert_eq!(custom_stats, reference_stats);
        prop_assert_eq!(custom, reference);
    }
}

// ── 3. Layout parity ─────────────────────────────────────────────────

proptest! {
    /// Both engines produce identical bits in every derived field.
    #[test]
    fn row_and_column_engines_agree(bars in arb_bars(60), window in 1usize..30) {
        let params = EngineParams { window, ..EngineParams::default() };
        let mut rows = RowStore::from_observations(bars.clone());
        let mut cols = ColumnStore::from_observations(bars);

        let a = rows.compute(&params).unwrap();
        let b = cols.compute(&params).unwrap();
        prop_assert!(a.matches(&b));

        for field in Field::ALL {
            let r = rows.field(field);
            let c = cols.field(field);
            prop_assert_eq!(r.len(), c.len());
            for i in 0..r.len() {
                prop_assert_eq!(r[i].to_bits(), c[i].to_bits(), "{}[{}]", field, i);
            }
        }
    }
}

// ── 4. Band mean ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn band_mean_is_trailing_average(bars in arb_bars(50), window in 1usize..20) {
        let mut cols = ColumnStore::from_observations(bars);
        cols.compute(&EngineParams { window, ..EngineParams::default() }).unwrap();
        let hl2 = cols.column(Field::Hl2);
        let avg = cols.column(Field::Hl2Avg);
        for i in 0..hl2.len() {
            let start = (i + 1).saturating_sub(window);
            let slice = &hl2[start..=i];
            let mean = slice.iter().sum::<f64>() / slice.len() as f64;
            prop_assert!((avg[i] - mean).abs() <= 1e-9 * mean.abs().max(1.0));
        }
    }

    /// Oscillators stay in [0, 100].
    #[test]
    fn oscillators_are_bounded(bars in arb_bars(50), window in 1usize..20) {
        let mut rows = RowStore::from_observations(bars);
        rows.compute(&EngineParams { window, ..EngineParams::default() }).unwrap();
        for field in [Field::Rsi, Field::Stochastic, Field::Mfi] {
            for &v in rows.field(field).iter() {
                prop_assert!((0.0..=100.0 + 1e-9).contains(&v), "{} = {}", field, v);
            }
        }
    }
}
