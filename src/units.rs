//! Weight input conventions
//!
//! Stored weights are always the total load in pounds. What the user types may be
//! kilograms, or the load on one side of a barbell; both are linear transforms
//! applied once at input time.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

pub const KG_PER_LB: f64 = 0.45359237;

/// Empty olympic bar, in pounds
pub const BAR_WEIGHT_LB: f64 = 45.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum WeightUnit {
    #[default]
    #[value(name = "lb")]
    Pounds,
    #[value(name = "kg")]
    Kilograms,
}

impl WeightUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            WeightUnit::Pounds => "lb",
            WeightUnit::Kilograms => "kg",
        }
    }

    fn to_pounds(self, value: f64) -> f64 {
        match self {
            WeightUnit::Pounds => value,
            WeightUnit::Kilograms => value / KG_PER_LB,
        }
    }

    fn from_pounds(self, value: f64) -> f64 {
        match self {
            WeightUnit::Pounds => value,
            WeightUnit::Kilograms => value * KG_PER_LB,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadingMode {
    /// Number is the whole load
    #[default]
    Total,
    /// Number is the plates on one side of the bar
    PerSide,
}

/// How a raw weight number should be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub unit: WeightUnit,
    pub loading: LoadingMode,
}

impl WeightEntry {
    pub fn new(unit: WeightUnit, loading: LoadingMode) -> Self {
        Self { unit, loading }
    }

    /// Raw input to stored total pounds
    pub fn to_canonical(&self, raw: f64) -> Result<f64> {
        if !raw.is_finite() || raw < 0.0 {
            return Err(TrackerError::InvalidWeight(format!("{}", raw)));
        }
        let pounds = self.unit.to_pounds(raw);
        Ok(match self.loading {
            LoadingMode::Total => pounds,
            LoadingMode::PerSide => 2.0 * pounds + BAR_WEIGHT_LB,
        })
    }

    /// Stored total pounds back to the number the user would type
    pub fn from_canonical(&self, stored: f64) -> f64 {
        let pounds = match self.loading {
            LoadingMode::Total => stored,
            LoadingMode::PerSide => (stored - BAR_WEIGHT_LB) / 2.0,
        };
        self.unit.from_pounds(pounds)
    }

    /// Parse and convert user text
    pub fn parse(&self, raw: &str) -> Result<f64> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| TrackerError::InvalidWeight(raw.to_string()))?;
        self.to_canonical(value)
    }

    pub fn format(&self, stored: f64) -> String {
        let shown = self.from_canonical(stored);
        match self.loading {
            LoadingMode::Total => format!("{:.1} {}", shown, self.unit.suffix()),
            LoadingMode::PerSide => format!("{:.1} {} per side", shown.max(0.0), self.unit.suffix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_entries() -> Vec<WeightEntry> {
        let mut entries = Vec::new();
        for unit in [WeightUnit::Pounds, WeightUnit::Kilograms] {
            for loading in [LoadingMode::Total, LoadingMode::PerSide] {
                entries.push(WeightEntry::new(unit, loading));
            }
        }
        entries
    }

    #[test]
    fn test_per_side_pounds() {
        let entry = WeightEntry::new(WeightUnit::Pounds, LoadingMode::PerSide);
        assert_eq!(entry.to_canonical(45.0).unwrap(), 135.0);
        assert_eq!(entry.to_canonical(0.0).unwrap(), BAR_WEIGHT_LB);
        assert_eq!(entry.from_canonical(225.0), 90.0);
    }

    #[test]
    fn test_kilograms_to_pounds() {
        let entry = WeightEntry::new(WeightUnit::Kilograms, LoadingMode::Total);
        let stored = entry.to_canonical(100.0).unwrap();
        assert!((stored - 220.462_262).abs() < 1e-5);
    }

    #[test]
    fn test_round_trip_all_modes() {
        for entry in all_entries() {
            for raw in [0.0, 2.5, 20.0, 61.25, 142.5, 500.0] {
                let back = entry.from_canonical(entry.to_canonical(raw).unwrap());
                assert!((back - raw).abs() < 1e-9, "{:?}: {} -> {}", entry, raw, back);
            }
        }
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let entry = WeightEntry::default();
        assert!(entry.to_canonical(-5.0).is_err());
        assert!(entry.to_canonical(f64::NAN).is_err());
        assert!(entry.to_canonical(f64::INFINITY).is_err());
        assert!(entry.parse("heavy").is_err());
        assert_eq!(entry.parse(" 135 ").unwrap(), 135.0);
    }

    #[test]
    fn test_format() {
        let entry = WeightEntry::new(WeightUnit::Pounds, LoadingMode::PerSide);
        assert_eq!(entry.format(225.0), "90.0 lb per side");
        assert_eq!(WeightEntry::default().format(225.0), "225.0 lb");
    }
}
