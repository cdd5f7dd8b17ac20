use crate::error::GeoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid resolution: divisions per degree of latitude and of longitude.
///
/// A cell of `Scale::of(100, 50)` spans `1/100°` of latitude and `1/50°` of
/// longitude. [`Scale::INTEGER`] snaps to whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ScaleRepr", into = "ScaleRepr")]
pub struct Scale {
    lat: u32,
    lon: u32,
}

#[derive(Serialize, Deserialize)]
struct ScaleRepr {
    lat: u32,
    lon: u32,
}

impl Scale {
    /// System-wide indexing resolution.
    pub const DEFAULT: Scale = Scale { lat: 100, lon: 50 };

    /// Snap to whole degrees.
    pub const INTEGER: Scale = Scale { lat: 0, lon: 0 };

    pub fn of(lat: i64, lon: i64) -> Result<Self, GeoError> {
        match (u32::try_from(lat), u32::try_from(lon)) {
            (Ok(lat), Ok(lon)) if lat > 0 && lon > 0 => Ok(Self { lat, lon }),
            _ => Err(GeoError::InvalidScale { lat, lon }),
        }
    }

    pub fn is_integer(&self) -> bool {
        *self == Self::INTEGER
    }

    /// Divisions per degree of latitude, 1 for [`Scale::INTEGER`].
    pub fn lat_divisions(&self) -> u32 {
        self.lat.max(1)
    }

    /// Divisions per degree of longitude, 1 for [`Scale::INTEGER`].
    pub fn lon_divisions(&self) -> u32 {
        self.lon.max(1)
    }

    /// Height of one cell in degrees.
    pub fn cell_lat_span(&self) -> f64 {
        1.0 / self.lat_divisions() as f64
    }

    /// Width of one cell in degrees.
    pub fn cell_lon_span(&self) -> f64 {
        1.0 / self.lon_divisions() as f64
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<ScaleRepr> for Scale {
    type Error = GeoError;

    fn try_from(repr: ScaleRepr) -> Result<Self, Self::Error> {
        if repr.lat == 0 && repr.lon == 0 {
            Ok(Self::INTEGER)
        } else {
            Self::of(repr.lat as i64, repr.lon as i64)
        }
    }
}

impl From<Scale> for ScaleRepr {
    fn from(scale: Scale) -> Self {
        Self {
            lat: scale.lat,
            lon: scale.lon,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            f.write_str("Scale[integer]")
        } else {
            write!(f, "Scale[lat=1:{} lon=1:{}]", self.lat, self.lon)
        }
    }
}

/// Value of grid line `index` for `divisions` per degree.
pub(crate) fn grid_line(index: i64, divisions: u32) -> f64 {
    index as f64 / divisions as f64
}

/// Index of the grid line at or below `value`.
///
/// The product `value * divisions` may land a hair off an integer; the result
/// is corrected so that `grid_line(k) <= value < grid_line(k + 1)` holds for the
/// values `grid_line` actually produces.
pub(crate) fn floor_index(value: f64, divisions: u32) -> i64 {
    let mut index = (value * divisions as f64).floor() as i64;
    if grid_line(index.saturating_add(1), divisions) <= value {
        index = index.saturating_add(1);
    } else if grid_line(index, divisions) > value {
        index = index.saturating_sub(1);
    }
    index
}

/// Index of the grid line at or above `value`.
pub(crate) fn ceil_index(value: f64, divisions: u32) -> i64 {
    let index = floor_index(value, divisions);
    if grid_line(index, divisions) == value {
        index
    } else {
        index.saturating_add(1)
    }
}
