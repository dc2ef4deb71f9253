//! LayoutLab Runner — benchmark orchestration around `layoutlab-core`.
//!
//! This crate builds on `layoutlab-core` to provide:
//! - Layered configuration (TOML file, `LAYOUTLAB_*` environment, flags)
//! - The benchmark pipeline: ingest each layout, time each engine, check parity
//! - Parser cross-checking (streaming scanner vs `csv` reader)
//! - JSON export of summaries and sampled series
//! - Deterministic synthetic input files

pub mod config;
pub mod export;
pub mod pipeline;
pub mod profiling;
pub mod synthetic;

pub use config::{BenchConfig, ConfigError};
pub use export::{export_run, ExportPaths, SCHEMA_VERSION};
pub use pipeline::{cross_check, run_pipeline, CrossCheck, LayoutRun, PipelineResult, RunError};
pub use profiling::Timing;
pub use synthetic::generate_csv;
