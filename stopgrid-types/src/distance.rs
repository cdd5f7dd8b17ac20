use crate::error::{GeoError, Result};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative physical length, stored as whole millimeters.
///
/// Conversions between units are integer arithmetic on the millimeter count;
/// a floating value is only produced by [`Distance::to`].
///
/// # Examples
///
/// ```
/// use stopgrid_types::{Distance, Unit};
///
/// let d = Distance::of(350, Unit::Cm).unwrap();
/// assert_eq!(d.to_meters(), 3.5);
/// assert!(Distance::of(-1, Unit::M).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Distance {
    mm: u64,
}

impl Distance {
    pub const ZERO: Distance = Distance { mm: 0 };

    pub const fn from_millis(mm: u64) -> Self {
        Self { mm }
    }

    /// Create a distance of `count` whole `unit`s.
    pub fn of(count: i64, unit: Unit) -> Result<Self> {
        if count < 0 {
            return Err(GeoError::InvalidDistance(format!(
                "negative distance: {}{}",
                count, unit
            )));
        }
        (count as u64)
            .checked_mul(unit.millis())
            .map(Self::from_millis)
            .ok_or_else(|| GeoError::InvalidDistance(format!("overflow: {}{}", count, unit)))
    }

    /// Create a distance from a fractional count, rounded to the millimeter.
    pub fn of_f64(count: f64, unit: Unit) -> Result<Self> {
        if !count.is_finite() {
            return Err(GeoError::InvalidDistance(format!(
                "distance must be finite, got: {}",
                count
            )));
        }
        let mm = (count * unit.millis() as f64).round();
        if mm < 0.0 {
            return Err(GeoError::InvalidDistance(format!(
                "negative distance: {}{}",
                count, unit
            )));
        }
        if mm >= u64::MAX as f64 {
            return Err(GeoError::InvalidDistance(format!("overflow: {}{}", count, unit)));
        }
        Ok(Self::from_millis(mm as u64))
    }

    pub fn millis(&self) -> u64 {
        self.mm
    }

    pub fn to(&self, unit: Unit) -> f64 {
        self.mm as f64 / unit.millis() as f64
    }

    pub fn to_meters(&self) -> f64 {
        self.to(Unit::M)
    }

    /// Scale by `factor`, rounded to the millimeter. Fails for negative or non-finite factors.
    pub fn mult(&self, factor: f64) -> Result<Self> {
        Self::of_f64(self.mm as f64 * factor, Unit::Mm)
    }

    pub fn saturating_add(self, other: Distance) -> Self {
        Self::from_millis(self.mm.saturating_add(other.mm))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.to_meters())
    }
}
