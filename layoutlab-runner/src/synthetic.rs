//! Deterministic synthetic OHLCV files for development and benchmarking.
//!
//! Produces a random walk from a starting price of 100.0 on weekdays only,
//! written newest-first in the 8-column layout the parsers expect
//! (`symbol,date,unix,open,high,low,close,volume`) with one header line.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use layoutlab_core::domain::Ohlcv;

/// Symbol written in column 0 of every generated row.
pub const SYNTHETIC_SYMBOL: &str = "SYNTH";

/// Deterministic RNG seeded from a BLAKE3 hash of `seed`.
fn seeded_rng(seed: &str) -> StdRng {
    let seed_bytes = blake3::hash(seed.as_bytes());
    StdRng::from_seed(*seed_bytes.as_bytes())
}

/// `rows` chronological observations; the same seed always yields the same walk.
pub fn generate_bars(rows: usize, seed: &str) -> Vec<Ohlcv> {
    let mut rng = seeded_rng(seed);
    let mut bars = Vec::with_capacity(rows);
    let mut price = 100.0_f64;
    let mut day = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or_default();

    while bars.len() < rows {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Ohlcv {
            date: day.format("%Y-%m-%d").to_string(),
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        day += Duration::days(1);
    }

    bars
}

/// Write chronological `bars` newest-first, with a header, to `writer`.
pub fn write_csv<W: Write>(writer: W, bars: &[Ohlcv]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["symbol", "date", "unix", "open", "high", "low", "close", "volume"])?;

    for bar in bars.iter().rev() {
        let unix = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(0, |dt| dt.and_utc().timestamp());
        wtr.write_record([
            SYNTHETIC_SYMBOL.to_string(),
            format!("{} 00:00:00", bar.date),
            unix.to_string(),
            format!("{:.6}", bar.open),
            format!("{:.6}", bar.high),
            format!("{:.6}", bar.low),
            format!("{:.6}", bar.close),
            format!("{:.0}", bar.volume),
        ])?;
    }

    wtr.flush().context("failed to flush synthetic CSV")?;
    Ok(())
}

/// Generate `rows` observations from `seed` and write them to `path`.
pub fn generate_csv(path: &Path, rows: usize, seed: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(file, &generate_bars(rows, seed))
        .with_context(|| format!("failed to write {}", path.display()))
}
