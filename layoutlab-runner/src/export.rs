//! JSON export of a pipeline run.
//!
//! Two artifacts per run, both under the configured output directory:
//! - **summary.json**: configuration echo, row count, dataset hash, per-layout
//!   timings and median summaries, parity verdict
//! - **series.json**: evenly strided samples of the summary fields per layout,
//!   ready for charting
//!
//! Every artifact carries a `schema_version` field. Writes are atomic: write
//! to `.tmp`, then rename into place.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use layoutlab_core::domain::Field;
use layoutlab_core::engine::MedianSummary;
use layoutlab_core::parser::ScanStats;
use layoutlab_core::sampling::{sample_fields, Sample};

use crate::config::BenchConfig;
use crate::pipeline::{LayoutRun, PipelineResult};

/// Current schema version for exported artifacts.
pub const SCHEMA_VERSION: u32 = 1;

pub const SUMMARY_FILE: &str = "summary.json";
pub const SERIES_FILE: &str = "series.json";

/// Contents of `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub schema_version: u32,
    pub generated_at: String,
    pub config: &'a BenchConfig,
    pub rows: usize,
    pub scan: ScanStats,
    pub nan_rows: usize,
    pub dataset_hash: &'a str,
    pub layouts: [&'a LayoutRun; 2],
    pub parity: bool,
    pub divergent_fields: Vec<&'static str>,
}

/// Contents of `series.json`.
#[derive(Debug, Serialize)]
pub struct SeriesReport {
    pub schema_version: u32,
    pub fields: Vec<&'static str>,
    pub layouts: BTreeMap<&'static str, Sample>,
}

/// Where a run's artifacts were written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub summary: PathBuf,
    pub series: PathBuf,
}

pub fn summary_report<'a>(
    config: &'a BenchConfig,
    result: &'a PipelineResult,
) -> SummaryReport<'a> {
    SummaryReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        config,
        rows: result.rows,
        scan: result.scan,
        nan_rows: result.nan_rows,
        dataset_hash: &result.dataset_hash,
        layouts: [&result.row, &result.column],
        parity: result.parity,
        divergent_fields: result.divergent_fields.iter().map(|f| f.name()).collect(),
    }
}

pub fn series_report(config: &BenchConfig, result: &PipelineResult) -> SeriesReport {
    let fields: [Field; 6] = MedianSummary::fields(config.typical_price);
    let mut layouts = BTreeMap::new();
    layouts.insert(
        result.row.layout,
        sample_fields(&result.row_store, &fields, config.sample_points),
    );
    layouts.insert(
        result.column.layout,
        sample_fields(&result.column_store, &fields, config.sample_points),
    );
    SeriesReport {
        schema_version: SCHEMA_VERSION,
        fields: fields.iter().map(|f| f.name()).collect(),
        layouts,
    }
}

/// Write both artifacts into `config.output_dir`, creating it if needed.
pub fn export_run(config: &BenchConfig, result: &PipelineResult) -> Result<ExportPaths> {
    let dir = &config.output_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let paths = ExportPaths {
        summary: dir.join(SUMMARY_FILE),
        series: dir.join(SERIES_FILE),
    };
    write_json_atomic(&paths.summary, &summary_report(config, result))?;
    write_json_atomic(&paths.series, &series_report(config, result))?;

    info!(
        summary = %paths.summary.display(),
        series = %paths.series.display(),
        "exported"
    );
    Ok(paths)
}

/// Serialize `value` as pretty JSON to `path` via a temp file and rename.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report to JSON")?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).with_context(|| format!("failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        anyhow::anyhow!("atomic rename to {} failed: {e}", path.display())
    })?;
    Ok(())
}
