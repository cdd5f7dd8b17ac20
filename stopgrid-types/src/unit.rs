use serde::{Deserialize, Serialize};
use std::fmt;

/// Named length units, all integer multiples of a millimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Mm,
    Cm,
    M,
    Km,
}

impl Unit {
    /// Number of millimeters in one of this unit.
    pub const fn millis(self) -> u64 {
        match self {
            Unit::Mm => 1,
            Unit::Cm => 10,
            Unit::M => 1_000,
            Unit::Km => 1_000_000,
        }
    }

    /// How many whole `unit`s fit in one of this unit, 0 if `unit` is larger.
    pub const fn contains_no(self, unit: Unit) -> u64 {
        if self.millis() >= unit.millis() {
            self.millis() / unit.millis()
        } else {
            0
        }
    }

    /// Convert `value` of this unit to `target`.
    pub fn to(self, target: Unit, value: u64) -> f64 {
        value.saturating_mul(self.millis()) as f64 / target.millis() as f64
    }

    pub fn to_meters(self, value: u64) -> f64 {
        self.to(Unit::M, value)
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::M => "m",
            Unit::Km => "km",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
