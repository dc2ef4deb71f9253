//! Record — one OHLCV observation plus its derived indicator fields.

use serde::{Deserialize, Serialize};

use super::field::Field;

/// Raw observation as produced by the parsers, before any derivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Calendar day; any time-of-day suffix is already stripped.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Row-store element. Derived fields stay zero until an engine pass runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub hl2: f64,
    pub hlc3: f64,
    pub ohlc4: f64,
    pub hl2_avg: f64,
    pub hl2_upper: f64,
    pub hl2_lower: f64,
    pub hlc3_avg: f64,
    pub hlc3_upper: f64,
    pub hlc3_lower: f64,
    pub ohlc4_avg: f64,
    pub ohlc4_upper: f64,
    pub ohlc4_lower: f64,
    pub rsi: f64,
    pub stochastic: f64,
    pub mfi: f64,
}

impl Record {
    /// Read any numeric field by name.
    ///
    /// The engines access fields directly; this is for sampling, summaries and
    /// cross-layout comparison.
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
            Field::Volume => self.volume,
            Field::Hl2 => self.hl2,
            Field::Hlc3 => self.hlc3,
            Field::Ohlc4 => self.ohlc4,
            Field::Hl2Avg => self.hl2_avg,
            Field::Hl2Upper => self.hl2_upper,
            Field::Hl2Lower => self.hl2_lower,
            Field::Hlc3Avg => self.hlc3_avg,
            Field::Hlc3Upper => self.hlc3_upper,
            Field::Hlc3Lower => self.hlc3_lower,
            Field::Ohlc4Avg => self.ohlc4_avg,
            Field::Ohlc4Upper => self.ohlc4_upper,
            Field::Ohlc4Lower => self.ohlc4_lower,
            Field::Rsi => self.rsi,
            Field::Stochastic => self.stochastic,
            Field::Mfi => self.mfi,
        }
    }

    /// Whether any raw field is NaN (a malformed token under the lenient
    /// number policy).
    pub fn has_nan(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }
}

impl From<Ohlcv> for Record {
    fn from(row: Ohlcv) -> Self {
        Record {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            ..Record::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Ohlcv {
        Ohlcv {
            date: "2024-01-02".into(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn derived_fields_default_to_zero() {
        let record = Record::from(sample_row());
        for field in &Field::ALL[Field::RAW_COUNT..] {
            assert_eq!(record.get(*field), 0.0, "{field} should start at zero");
        }
    }

    #[test]
    fn raw_fields_carry_over() {
        let record = Record::from(sample_row());
        assert_eq!(record.get(Field::Open), 100.0);
        assert_eq!(record.get(Field::High), 105.0);
        assert_eq!(record.get(Field::Low), 98.0);
        assert_eq!(record.get(Field::Close), 103.0);
        assert_eq!(record.get(Field::Volume), 50_000.0);
        assert_eq!(record.date, "2024-01-02");
    }

    #[test]
    fn nan_detection() {
        let mut record = Record::from(sample_row());
        assert!(!record.has_nan());
        record.rsi = f64::NAN;
        assert!(!record.has_nan(), "derived fields are not inspected");
        record.volume = f64::NAN;
        assert!(record.has_nan());
    }
}
