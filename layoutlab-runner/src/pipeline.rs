//! Benchmark pipeline — ingest, compute, compare.
//!
//! Two entry points:
//! - `run_pipeline()`: ingests the file into each layout (one scan per
//!   layout), times each engine over `iterations` passes and checks that both
//!   layouts agree. Used by `layoutlab run`.
//! - `cross_check()`: parses the file with both parsers and reports the first
//!   row where they disagree. Used by `layoutlab check`.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use layoutlab_core::domain::{Field, Ohlcv};
use layoutlab_core::engine::{EngineError, EngineParams, Layout, MedianSummary};
use layoutlab_core::parser::{self, ParseError, ParseOptions, ParserKind, ScanStats};
use layoutlab_core::sampling::FieldSource;
use layoutlab_core::store::{ColumnStore, RowStore, StoreError};

use crate::config::{BenchConfig, ConfigError};
use crate::profiling::{millis, profile, ProfileScope, Timing};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("ingest error: {0}")]
    Store(#[from] StoreError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("layouts ingested different row counts: row store {row}, column store {column}")]
    RowCountMismatch { row: usize, column: usize },
}

impl From<ParseError> for RunError {
    fn from(err: ParseError) -> Self {
        RunError::Store(StoreError::Parse(err))
    }
}

/// Timings and summary for one layout.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutRun {
    pub layout: &'static str,
    pub ingest_ms: f64,
    pub compute: Timing,
    pub summary: MedianSummary,
}

/// Complete result of one pipeline run.
///
/// The computed datasets are kept so callers can sample or inspect them.
#[derive(Debug)]
pub struct PipelineResult {
    pub rows: usize,
    pub scan: ScanStats,
    /// Observations with an unparseable raw number (stored as NaN).
    pub nan_rows: usize,
    pub dataset_hash: String,
    pub row: LayoutRun,
    pub column: LayoutRun,
    /// Both summaries and every derived field match bit for bit.
    pub parity: bool,
    /// Fields whose values differ between layouts.
    pub divergent_fields: Vec<Field>,
    pub row_store: RowStore,
    pub column_store: ColumnStore,
}

/// Run the full benchmark described by `config`.
pub fn run_pipeline(config: &BenchConfig) -> Result<PipelineResult, RunError> {
    let _scope = ProfileScope::new("run_pipeline");
    config.validate()?;
    let opts = config.parse_options();
    let params = config.engine_params()?;

    info!(
        input = %config.input.display(),
        parser = %opts.parser,
        window = params.window,
        typical_price = %params.typical_price,
        iterations = config.iterations,
        "starting pipeline"
    );

    let (ingested, row_ingest) =
        profile("ingest_row_store", || RowStore::from_path(&config.input, &opts));
    let (mut row_store, scan) = ingested?;
    let (ingested, column_ingest) =
        profile("ingest_column_store", || ColumnStore::from_path(&config.input, &opts));
    let (mut column_store, _) = ingested?;

    if row_store.len() != column_store.len() {
        return Err(RunError::RowCountMismatch {
            row: row_store.len(),
            column: column_store.len(),
        });
    }
    info!(
        rows = scan.rows,
        lines = scan.lines,
        bytes = scan.bytes,
        row_ms = millis(row_ingest),
        column_ms = millis(column_ingest),
        "ingested"
    );

    let nan_rows = row_store.records().iter().filter(|r| r.has_nan()).count();
    if nan_rows > 0 {
        warn!(nan_rows, "observations with unparseable numbers stored as NaN");
    }

    let (row_summary, row_timing) = compute_repeatedly(&mut row_store, &params, config.iterations)?;
    let (column_summary, column_timing) =
        compute_repeatedly(&mut column_store, &params, config.iterations)?;

    let divergent_fields = divergent_fields(&row_store, &column_store);
    let parity = row_summary.matches(&column_summary) && divergent_fields.is_empty();
    if parity {
        info!("row and column layouts agree");
    } else {
        warn!(
            summary = ?row_summary.mismatches(&column_summary),
            fields = ?divergent_fields,
            "row and column layouts disagree"
        );
    }

    let dataset_hash = compute_dataset_hash(&row_store);

    Ok(PipelineResult {
        rows: row_store.len(),
        scan,
        nan_rows,
        dataset_hash,
        row: LayoutRun {
            layout: row_store.name(),
            ingest_ms: millis(row_ingest),
            compute: row_timing,
            summary: row_summary,
        },
        column: LayoutRun {
            layout: column_store.name(),
            ingest_ms: millis(column_ingest),
            compute: column_timing,
            summary: column_summary,
        },
        parity,
        divergent_fields,
        row_store,
        column_store,
    })
}

/// Compute `layout` `iterations` times; every pass recomputes all derived fields.
fn compute_repeatedly<L: Layout>(
    layout: &mut L,
    params: &EngineParams,
    iterations: usize,
) -> Result<(MedianSummary, Timing), RunError> {
    let mut durations: Vec<Duration> = Vec::with_capacity(iterations);
    let mut summary = None;
    for pass in 0..iterations.max(1) {
        let (result, elapsed) = profile("compute", || layout.compute(params));
        summary = Some(result?);
        debug!(layout = layout.name(), pass, elapsed_ms = millis(elapsed), "compute pass");
        durations.push(elapsed);
    }
    let timing = Timing::from_durations(&durations);
    info!(
        layout = layout.name(),
        best_ms = timing.best_ms,
        mean_ms = timing.mean_ms,
        "computed"
    );
    Ok((summary.unwrap_or_default(), timing))
}

/// Fields whose values are not bitwise identical across the two layouts.
pub fn divergent_fields<A, B>(a: &A, b: &B) -> Vec<Field>
where
    A: FieldSource + ?Sized,
    B: FieldSource + ?Sized,
{
    Field::ALL
        .into_iter()
        .filter(|&field| !same_bits(&a.field(field), &b.field(field)))
        .collect()
}

fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Compute a deterministic BLAKE3 hash over dates and raw OHLCV, oldest first.
pub fn compute_dataset_hash(store: &RowStore) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in store.records() {
        hasher.update(r.date.as_bytes());
        hasher.update(&r.open.to_le_bytes());
        hasher.update(&r.high.to_le_bytes());
        hasher.update(&r.low.to_le_bytes());
        hasher.update(&r.close.to_le_bytes());
        hasher.update(&r.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

// ─── Parser cross-check ─────────────────────────────────────────────

/// First row on which the two parsers disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDifference {
    /// Chronological index (0 = oldest).
    pub index: usize,
    pub custom: Option<Ohlcv>,
    pub reference: Option<Ohlcv>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCheck {
    pub custom_rows: usize,
    pub reference_rows: usize,
    pub first_difference: Option<RowDifference>,
}

impl CrossCheck {
    pub fn agrees(&self) -> bool {
        self.first_difference.is_none()
    }
}

/// Parse the configured input with both parsers and compare row by row.
pub fn cross_check(config: &BenchConfig) -> Result<CrossCheck, RunError> {
    let _scope = ProfileScope::new("cross_check");
    config.validate()?;
    let base = config.parse_options();

    let custom = parse_all(config, &base, ParserKind::Custom)?;
    let reference = parse_all(config, &base, ParserKind::Reference)?;

    let first_difference = (0..custom.len().max(reference.len()))
        .find(|&i| !same_row(custom.get(i), reference.get(i)))
        .map(|index| RowDifference {
            index,
            custom: custom.get(index).cloned(),
            reference: reference.get(index).cloned(),
        });

    let check = CrossCheck {
        custom_rows: custom.len(),
        reference_rows: reference.len(),
        first_difference,
    };
    match &check.first_difference {
        None => info!(rows = check.custom_rows, "parsers agree"),
        Some(diff) => warn!(index = diff.index, "parsers disagree"),
    }
    Ok(check)
}

fn parse_all(
    config: &BenchConfig,
    base: &ParseOptions,
    kind: ParserKind,
) -> Result<Vec<Ohlcv>, RunError> {
    let opts = ParseOptions {
        parser: kind,
        ..base.clone()
    };
    let mut rows: Vec<Ohlcv> = Vec::new();
    rows.try_reserve_exact(opts.capacity)
        .map_err(|_| StoreError::CapacityTooLarge(opts.capacity))?;
    let stats = parser::parse_path(&config.input, &opts, &mut rows)?;
    debug!(parser = %kind, rows = stats.rows, lines = stats.lines, "parsed");
    Ok(rows)
}

fn same_row(a: Option<&Ohlcv>, b: Option<&Ohlcv>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.date == b.date
                && [a.open, a.high, a.low, a.close, a.volume]
                    .iter()
                    .zip([b.open, b.high, b.low, b.close, b.volume])
                    .all(|(x, y)| x.to_bits() == y.to_bits())
        }
        (None, None) => true,
        _ => false,
    }
}
