//! Coding of decimal coordinates into integer points.
//!
//! Position lists arrive as whitespace separated decimal text
//! (`"lat lon lat lon ..."`). Up to the coder's digit count the text is turned
//! into scaled integers digit by digit, so no floating rounding is involved.

use crate::bbox::BoundingBox;
use crate::error::{GeoError, Result};
use crate::point::{CodedPoint, DEFAULT_DIMENSION, Point};
use crate::scale::Scale;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most decimal digits a coded point may carry.
pub const MAX_DIGITS: u32 = 6;

/// Produces coded points of one dimension, `10^digits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointCoder {
    digits: u32,
    dimension: i32,
}

impl PointCoder {
    /// Create a coder for `digits` decimals, checking that every coordinate in
    /// `region` (widened to whole degrees) fits a 32-bit coded value.
    pub fn new(digits: u32, region: &BoundingBox) -> Result<Self> {
        if digits > MAX_DIGITS {
            return Err(GeoError::TooManyDigits {
                digits,
                max: MAX_DIGITS,
            });
        }
        let dimension = 10_i32.pow(digits);
        let min = region.min().down_to(Scale::INTEGER);
        let max = region.max().up_to(Scale::INTEGER);

        for (axis, low, high) in [("lat", min.lat(), max.lat()), ("lon", min.lon(), max.lon())] {
            let extreme = low.abs().max(high.abs()) * dimension as f64;
            if !extreme.is_finite() || extreme > i32::MAX as f64 {
                return Err(GeoError::CoderOverflow(format!(
                    "too many {}'s: {} digits {} -> {}",
                    axis, digits, min, max
                )));
            }
        }
        Ok(Self { digits, dimension })
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    /// Code a pair of degrees, rounding to the coder's precision.
    pub fn code(&self, lat: f64, lon: f64) -> Result<Point> {
        Ok(Point::Coded(CodedPoint::from_raw(
            self.dimension,
            self.scaled(lat)?,
            self.scaled(lon)?,
        )))
    }

    /// Parse a latitude and a longitude given as decimal text.
    pub fn parse(&self, lat: &str, lon: &str) -> Result<Point> {
        Ok(Point::Coded(CodedPoint::from_raw(
            self.dimension,
            self.parse_value(lat)?,
            self.parse_value(lon)?,
        )))
    }

    /// Parse a whitespace separated list of `lat lon` pairs.
    ///
    /// Blank input gives an empty list. A dangling latitude is an error.
    pub fn parse_pos_list(&self, text: &str) -> Result<Vec<Point>> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() % 2 != 0 {
            return Err(GeoError::InvalidCoordinate(format!(
                "odd number of values in position list: {}",
                tokens.len()
            )));
        }
        tokens
            .chunks_exact(2)
            .map(|pair| self.parse(pair[0], pair[1]))
            .collect()
    }

    fn scaled(&self, value: f64) -> Result<i32> {
        let scaled = (value * self.dimension as f64).round();
        if !scaled.is_finite() || scaled.abs() > i32::MAX as f64 {
            return Err(GeoError::InvalidCoordinate(format!(
                "{} does not fit {}",
                value, self
            )));
        }
        Ok(scaled as i32)
    }

    fn parse_value(&self, text: &str) -> Result<i32> {
        let invalid = || GeoError::InvalidCoordinate(format!("not a decimal number: {:?}", text));

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, decimals) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && decimals.is_empty()) || !all_digits(whole) || !all_digits(decimals)
        {
            return Err(invalid());
        }

        if decimals.len() > self.digits as usize {
            let value: f64 = text.parse().map_err(|_| invalid())?;
            return self.scaled(value);
        }

        let overflow = || GeoError::InvalidCoordinate(format!("{} does not fit {}", text, self));
        let mut magnitude: i64 = 0;
        for byte in whole.bytes().chain(decimals.bytes()) {
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add(i64::from(byte - b'0')))
                .filter(|m| *m <= i64::from(i32::MAX))
                .ok_or_else(overflow)?;
        }
        let padding = 10_i64.pow(self.digits - decimals.len() as u32);
        let magnitude = magnitude
            .checked_mul(padding)
            .filter(|m| *m <= i64::from(i32::MAX))
            .ok_or_else(overflow)?;

        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value).map_err(|_| overflow())
    }
}

impl Default for PointCoder {
    fn default() -> Self {
        Self {
            digits: MAX_DIGITS,
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl fmt::Display for PointCoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointCoder[{}]", self.dimension)
    }
}

/// Parse a position list with six-decimal coded points.
///
/// # Examples
///
/// ```
/// use stopgrid_types::{Point, parse_pos_list};
///
/// let points = parse_pos_list("59.911 10.75 59.9133 10.7511")?;
/// assert_eq!(points, vec![Point::new(59.911, 10.75)?, Point::new(59.9133, 10.7511)?]);
/// assert!(parse_pos_list("  ")?.is_empty());
/// # Ok::<(), stopgrid_types::GeoError>(())
/// ```
pub fn parse_pos_list(text: &str) -> Result<Vec<Point>> {
    PointCoder::default().parse_pos_list(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norway() -> BoundingBox {
        Point::new(57.0, 4.0).unwrap().box_to(&Point::new(72.0, 32.0).unwrap())
    }

    #[test]
    fn test_parse_sequence() {
        let sequence = parse_pos_list(
            "54.3 10.71 54.2 10.76 55.123123123 10.789789789789 54.678678678 10 54.567567567 10.0",
        )
        .unwrap();

        assert_eq!(
            sequence,
            vec![
                Point::new(54.3, 10.71).unwrap(),
                Point::new(54.2, 10.76).unwrap(),
                Point::new(55.123123, 10.789790).unwrap(),
                Point::new(54.678679, 10.0).unwrap(),
                Point::new(54.567568, 10.0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_is_exact() {
        let coder = PointCoder::default();
        match coder.parse("59.913130", "-10.7").unwrap() {
            Point::Coded(p) => {
                assert_eq!(p.raw_lat(), 59_913_130);
                assert_eq!(p.raw_lon(), -10_700_000);
            }
            Point::Float(_) => panic!("expected a coded point"),
        }
    }

    #[test]
    fn test_parse_tabs_and_newlines() {
        let points = parse_pos_list("\t59.1\t10.2\n59.3   10.4 ").unwrap();
        assert_eq!(
            points,
            vec![Point::new(59.1, 10.2).unwrap(), Point::new(59.3, 10.4).unwrap()]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_pos_list("59.1 10.2 59.3").is_err());
        assert!(parse_pos_list("59.1 ten").is_err());
        assert!(parse_pos_list("59..1 10").is_err());
        assert!(parse_pos_list("- 10").is_err());
        assert!(parse_pos_list("99999 10").is_err());
    }

    #[test]
    fn test_too_many_digits() {
        assert_eq!(
            PointCoder::new(7, &norway()),
            Err(GeoError::TooManyDigits { digits: 7, max: 6 })
        );
    }

    #[test]
    fn test_region_must_fit() {
        let coder = PointCoder::new(6, &norway()).unwrap();
        assert_eq!(coder.dimension(), 1_000_000);

        let world = Point::float(-90.0, -180.0).box_to(&Point::float(90.0, 180.0));
        assert!(PointCoder::new(6, &world).is_ok());

        let wide = Point::float(0.0, 0.0).box_to(&Point::float(10.0, 3000.0));
        assert!(matches!(
            PointCoder::new(6, &wide),
            Err(GeoError::CoderOverflow(_))
        ));
    }

    #[test]
    fn test_lower_precision() {
        let coder = PointCoder::new(2, &norway()).unwrap();
        let point = coder.parse("59.9161303", "10.7").unwrap();
        assert_eq!(point, Point::float(59.92, 10.7));
        assert_eq!(coder.code(59.914, 10.736).unwrap(), Point::float(59.91, 10.74));
    }
}
