//! Numeric fields of an observation, in arena order.
//!
//! Raw OHLCV fields come first, then derived fields. Every derived field is
//! computed only from fields that precede it in this order, which is what
//! lets the column store hand out read access to earlier regions while one
//! later region is being written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the 20 numeric fields carried per observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
    Hl2,
    Hlc3,
    Ohlc4,
    Hl2Avg,
    Hl2Upper,
    Hl2Lower,
    Hlc3Avg,
    Hlc3Upper,
    Hlc3Lower,
    Ohlc4Avg,
    Ohlc4Upper,
    Ohlc4Lower,
    Rsi,
    Stochastic,
    Mfi,
}

impl Field {
    /// Total number of numeric fields (raw + derived).
    pub const COUNT: usize = 20;

    /// Number of raw fields read from the input file.
    pub const RAW_COUNT: usize = 5;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::Hl2,
        Field::Hlc3,
        Field::Ohlc4,
        Field::Hl2Avg,
        Field::Hl2Upper,
        Field::Hl2Lower,
        Field::Hlc3Avg,
        Field::Hlc3Upper,
        Field::Hlc3Lower,
        Field::Ohlc4Avg,
        Field::Ohlc4Upper,
        Field::Ohlc4Lower,
        Field::Rsi,
        Field::Stochastic,
        Field::Mfi,
    ];

    /// Position of this field in arena order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::Hl2 => "hl2",
            Field::Hlc3 => "hlc3",
            Field::Ohlc4 => "ohlc4",
            Field::Hl2Avg => "hl2_avg",
            Field::Hl2Upper => "hl2_upper",
            Field::Hl2Lower => "hl2_lower",
            Field::Hlc3Avg => "hlc3_avg",
            Field::Hlc3Upper => "hlc3_upper",
            Field::Hlc3Lower => "hlc3_lower",
            Field::Ohlc4Avg => "ohlc4_avg",
            Field::Ohlc4Upper => "ohlc4_upper",
            Field::Ohlc4Lower => "ohlc4_lower",
            Field::Rsi => "rsi",
            Field::Stochastic => "stochastic",
            Field::Mfi => "mfi",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// Typical-price variant: a per-observation combination of OHLC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypicalPrice {
    /// (high + low) / 2
    Hl2,
    /// (high + low + close) / 3
    #[default]
    Hlc3,
    /// (open + high + low + close) / 4
    Ohlc4,
}

impl TypicalPrice {
    pub const ALL: [TypicalPrice; 3] = [TypicalPrice::Hl2, TypicalPrice::Hlc3, TypicalPrice::Ohlc4];

    /// The field holding this variant's value.
    pub fn field(self) -> Field {
        match self {
            TypicalPrice::Hl2 => Field::Hl2,
            TypicalPrice::Hlc3 => Field::Hlc3,
            TypicalPrice::Ohlc4 => Field::Ohlc4,
        }
    }

    /// The band triple (average, upper, lower) computed over this variant.
    ///
    /// The three fields are adjacent in arena order.
    pub fn band_fields(self) -> [Field; 3] {
        match self {
            TypicalPrice::Hl2 => [Field::Hl2Avg, Field::Hl2Upper, Field::Hl2Lower],
            TypicalPrice::Hlc3 => [Field::Hlc3Avg, Field::Hlc3Upper, Field::Hlc3Lower],
            TypicalPrice::Ohlc4 => [Field::Ohlc4Avg, Field::Ohlc4Upper, Field::Ohlc4Lower],
        }
    }

    pub fn name(self) -> &'static str {
        self.field().name()
    }

    /// Combine one observation's prices into this variant.
    #[inline]
    pub fn of(self, open: f64, high: f64, low: f64, close: f64) -> f64 {
        match self {
            TypicalPrice::Hl2 => (high + low) / 2.0,
            TypicalPrice::Hlc3 => (high + low + close) / 3.0,
            TypicalPrice::Ohlc4 => (open + high + low + close) / 4.0,
        }
    }
}

impl fmt::Display for TypicalPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypicalPrice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hl2" => Ok(TypicalPrice::Hl2),
            "hlc3" => Ok(TypicalPrice::Hlc3),
            "ohlc4" => Ok(TypicalPrice::Ohlc4),
            other => Err(format!(
                "unknown typical price '{other}' (expected hl2, hlc3 or ohlc4)"
            )),
        }
    }
}
