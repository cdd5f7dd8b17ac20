use crate::distance::Distance;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// The eight compass directions a point can be translated towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Share of a distance moved along latitude and longitude.
    ///
    /// Diagonals move `1/√2` of the distance along each axis.
    pub fn factors(self) -> (f64, f64) {
        match self {
            Direction::North => (1.0, 0.0),
            Direction::NorthEast => (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            Direction::East => (0.0, 1.0),
            Direction::SouthEast => (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            Direction::South => (-1.0, 0.0),
            Direction::SouthWest => (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            Direction::West => (0.0, -1.0),
            Direction::NorthWest => (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        };
        f.write_str(name)
    }
}

/// A direction paired with a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Translation {
    direction: Direction,
    distance: Distance,
}

impl Translation {
    pub fn towards(direction: Direction, distance: Distance) -> Self {
        Self {
            direction,
            distance,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.distance, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use crate::unit::Unit;

    #[test]
    fn test_factors_have_unit_length() {
        for direction in Direction::ALL {
            let (lat, lon) = direction.factors();
            assert!(((lat * lat + lon * lon) - 1.0).abs() < 1e-12, "{}", direction);
        }
    }

    #[test]
    fn test_translation() {
        let origin = Point::float(59.9, 10.7);
        let hop = Translation::towards(Direction::NorthEast, Distance::of(250, Unit::M).unwrap());
        let there = origin.translated(hop);
        assert!(there.lat() > origin.lat() && there.lon() > origin.lon());
        assert!((origin.distance_to(&there).to_meters() - 250.0).abs() < 0.5);
        assert_eq!(hop.to_string(), "250m NE");
    }
}
