//! LayoutLab CLI — run, generate, and check commands.
//!
//! Commands:
//! - `run` — ingest a file into both layouts, time the engines, export JSON
//! - `generate` — write a deterministic synthetic OHLCV file
//! - `check` — parse a file with both parsers and report the first difference

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use layoutlab_core::{ParserKind, TypicalPrice};
use layoutlab_runner::{
    cross_check, export_run, generate_csv, run_pipeline, BenchConfig, PipelineResult,
};

#[derive(Parser)]
#[command(
    name = "layoutlab",
    about = "LayoutLab — row vs column layouts for windowed OHLCV indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a file into both layouts, compute, compare, and export JSON.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input CSV (newest-first, 8 columns).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Trailing window in periods.
        #[arg(long, allow_negative_numbers = true)]
        window: Option<i64>,

        /// Parser: custom or reference.
        #[arg(long)]
        parser: Option<ParserKind>,

        /// Typical price used in the summary: hl2, hlc3, or ohlc4.
        #[arg(long)]
        typical_price: Option<TypicalPrice>,

        /// Output directory for summary.json and series.json.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Compute passes per layout.
        #[arg(long)]
        iterations: Option<usize>,
    },
    /// Write a deterministic synthetic OHLCV file.
    Generate {
        /// Number of observations.
        #[arg(long)]
        rows: usize,

        /// Destination CSV.
        #[arg(long)]
        out: PathBuf,

        /// Seed string; the same seed always yields the same file.
        #[arg(long, default_value = "layoutlab")]
        seed: String,
    },
    /// Parse a file with both parsers and report where they disagree.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input CSV.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input,
            window,
            parser,
            typical_price,
            output_dir,
            iterations,
        } => {
            let mut bench = load_config(config, input)?;
            if let Some(window) = window {
                bench.window = window;
            }
            if let Some(parser) = parser {
                bench.parser = parser;
            }
            if let Some(typical_price) = typical_price {
                bench.typical_price = typical_price;
            }
            if let Some(dir) = output_dir {
                bench.output_dir = dir;
            }
            if let Some(iterations) = iterations {
                bench.iterations = iterations;
            }
            run_cmd(&bench)
        }
        Commands::Generate { rows, out, seed } => {
            if rows == 0 {
                bail!("--rows must be at least 1");
            }
            generate_csv(&out, rows, &seed)?;
            println!("Wrote {rows} rows to {}", out.display());
            Ok(())
        }
        Commands::Check { config, input } => {
            let bench = load_config(config, input)?;
            check_cmd(&bench)
        }
    }
}

/// File, then environment, then the `--input` flag.
fn load_config(path: Option<PathBuf>, input: Option<PathBuf>) -> Result<BenchConfig> {
    let mut config = BenchConfig::load(path.as_deref()).context("failed to load configuration")?;
    if let Some(input) = input {
        config.input = input;
    }
    Ok(config)
}

fn run_cmd(config: &BenchConfig) -> Result<()> {
    info!(
        input = %config.input.display(),
        window = config.window,
        parser = %config.parser,
        "starting run"
    );
    let result = run_pipeline(config)
        .with_context(|| format!("run failed for {}", config.input.display()))?;

    print_summary(&result);

    let paths = export_run(config, &result)?;
    println!("Summary saved to: {}", paths.summary.display());
    println!("Series saved to:  {}", paths.series.display());

    if !result.parity {
        bail!("layouts disagree on the median summary");
    }
    Ok(())
}

fn check_cmd(config: &BenchConfig) -> Result<()> {
    let check = cross_check(config)
        .with_context(|| format!("cross-check failed for {}", config.input.display()))?;

    println!("custom rows:    {}", check.custom_rows);
    println!("reference rows: {}", check.reference_rows);

    match &check.first_difference {
        None => {
            println!("Parsers agree.");
            Ok(())
        }
        Some(diff) => {
            println!("First difference at row {}:", diff.index);
            println!("  custom:    {:?}", diff.custom);
            println!("  reference: {:?}", diff.reference);
            bail!("parsers disagree")
        }
    }
}

fn print_summary(result: &PipelineResult) {
    println!();
    println!("=== LayoutLab Run ===");
    println!("Rows:         {}", result.rows);
    println!("Lines seen:   {}", result.scan.lines);
    if result.nan_rows > 0 {
        println!("NaN rows:     {}", result.nan_rows);
    }
    println!("Dataset hash: {}", result.dataset_hash);
    println!();
    println!(
        "{:<8} {:>12} {:>12} {:>12}",
        "layout", "ingest ms", "best ms", "mean ms"
    );
    for run in [&result.row, &result.column] {
        println!(
            "{:<8} {:>12.3} {:>12.3} {:>12.3}",
            run.layout, run.ingest_ms, run.compute.best_ms, run.compute.mean_ms
        );
    }
    println!();
    println!("{:<10} {:>18} {:>18}", "field", "row median", "column median");
    for (name, value) in result.row.summary.iter() {
        let other = result.column.summary.get(name).unwrap_or(f64::NAN);
        println!("{name:<10} {value:>18.6} {other:>18.6}");
    }
    println!();
    if result.parity {
        println!("Parity: OK");
    } else {
        let names: Vec<&str> = result.divergent_fields.iter().map(|f| f.name()).collect();
        println!("Parity: MISMATCH ({})", names.join(", "));
    }
}
