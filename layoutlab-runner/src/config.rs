//! Benchmark configuration: TOML file, then `LAYOUTLAB_*` environment
//! overrides, then command-line flags (applied by the caller).
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! [`BenchConfig::validate`] runs before any ingestion.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use layoutlab_core::domain::TypicalPrice;
use layoutlab_core::engine::{EngineParams, DEFAULT_WINDOW};
use layoutlab_core::parser::{NumberPolicy, ParseOptions, ParserKind};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "LAYOUTLAB_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{var}={value:?}: {reason}")]
    Env {
        var: String,
        value: String,
        reason: String,
    },

    #[error("input path is empty")]
    EmptyInput,

    #[error("window must be a positive number of periods, got {0}")]
    InvalidWindow(i64),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything one benchmark run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Newest-first OHLCV CSV file.
    pub input: PathBuf,
    /// Header lines before the first data row.
    pub skip_lines: usize,
    /// Trailing window in periods. Signed so that a negative value in a
    /// file or the environment is reported rather than wrapped.
    pub window: i64,
    /// Initial size of the streaming scanner's carry-over buffer.
    pub buffer_bytes: usize,
    /// Bytes read from the file per chunk.
    pub chunk_bytes: usize,
    pub parser: ParserKind,
    pub typical_price: TypicalPrice,
    /// Fail on malformed numbers instead of storing NaN.
    pub strict_numbers: bool,
    /// Expected row count; stores pre-size to this.
    pub capacity: usize,
    pub output_dir: PathBuf,
    /// Upper bound on points per exported series.
    pub sample_points: usize,
    /// Timed compute passes per layout.
    pub iterations: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        let parse = ParseOptions::default();
        Self {
            input: PathBuf::from("data/ohlcv.csv"),
            skip_lines: parse.start_line,
            window: DEFAULT_WINDOW as i64,
            buffer_bytes: parse.scratch_bytes,
            chunk_bytes: parse.chunk_bytes,
            parser: parse.parser,
            typical_price: TypicalPrice::default(),
            strict_numbers: false,
            capacity: parse.capacity,
            output_dir: PathBuf::from("output"),
            sample_points: 500,
            iterations: 1,
        }
    }
}

impl BenchConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Defaults or `path`, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `LAYOUTLAB_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay overrides from any key lookup. Unset keys leave fields alone.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let var = format!("{ENV_PREFIX}{name}");
            lookup(&var).map(|value| (var, value))
        };

        if let Some((_, v)) = get("INPUT") {
            self.input = PathBuf::from(v);
        }
        if let Some((k, v)) = get("SKIP_LINES") {
            self.skip_lines = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("WINDOW") {
            self.window = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("BUFFER_BYTES") {
            self.buffer_bytes = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("CHUNK_BYTES") {
            self.chunk_bytes = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("PARSER") {
            self.parser = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("TYPICAL_PRICE") {
            self.typical_price = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("STRICT_NUMBERS") {
            self.strict_numbers = parse_flag(&k, &v)?;
        }
        if let Some((k, v)) = get("CAPACITY") {
            self.capacity = parse_env(&k, &v)?;
        }
        if let Some((_, v)) = get("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        Ok(())
    }

    /// Reject values no run can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::EmptyInput);
        }
        if self.window <= 0 {
            return Err(ConfigError::InvalidWindow(self.window));
        }
        for (name, value) in [
            ("buffer_bytes", self.buffer_bytes),
            ("chunk_bytes", self.chunk_bytes),
            ("capacity", self.capacity),
            ("sample_points", self.sample_points),
            ("iterations", self.iterations),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            start_line: self.skip_lines,
            capacity: self.capacity,
            scratch_bytes: self.buffer_bytes,
            chunk_bytes: self.chunk_bytes,
            parser: self.parser,
            numbers: if self.strict_numbers {
                NumberPolicy::Strict
            } else {
                NumberPolicy::Lenient
            },
        }
    }

    pub fn engine_params(&self) -> Result<EngineParams, ConfigError> {
        let window = usize::try_from(self.window)
            .ok()
            .filter(|&w| w > 0)
            .ok_or(ConfigError::InvalidWindow(self.window))?;
        Ok(EngineParams {
            window,
            typical_price: self.typical_price,
        })
    }
}

fn parse_env<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env {
            var: var.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}
