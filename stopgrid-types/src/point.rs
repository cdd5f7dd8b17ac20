use crate::bbox::BoundingBox;
use crate::coder::PointCoder;
use crate::direction::{Direction, Translation};
use crate::distance::Distance;
use crate::error::{GeoError, Result};
use crate::grid;
use crate::scale::{Scale, ceil_index, floor_index, grid_line};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Coded points store degrees multiplied by this unless a coder says otherwise.
pub const DEFAULT_DIMENSION: i32 = 1_000_000;

/// Mean earth radius used by the haversine formula.
const EARTH_RADIUS_MM: f64 = 6_371_000_000.0;

/// Length of one degree of latitude.
const DEGREE_LAT: Distance = Distance::from_millis(110_574_235);

/// Length of one degree of longitude at the equator.
const DEGREE_LON: Distance = Distance::from_millis(110_572_833);

/// A coordinate stored as two `f64` degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FloatPoint {
    lat: f64,
    lon: f64,
}

impl FloatPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    fn down_to(&self, scale: Scale) -> Self {
        let (lat_div, lon_div) = (scale.lat_divisions(), scale.lon_divisions());
        Self::new(
            grid_line(floor_index(self.lat, lat_div), lat_div),
            grid_line(floor_index(self.lon, lon_div), lon_div),
        )
    }

    fn up_to(&self, scale: Scale) -> Self {
        let (lat_div, lon_div) = (scale.lat_divisions(), scale.lon_divisions());
        Self::new(
            grid_line(ceil_index(self.lat, lat_div), lat_div),
            grid_line(ceil_index(self.lon, lon_div), lon_div),
        )
    }

    fn grid_index(&self, scale: Scale) -> (i64, i64) {
        (
            floor_index(self.lat, scale.lat_divisions()),
            floor_index(self.lon, scale.lon_divisions()),
        )
    }
}

/// A coordinate stored as integers: `round(degrees * dimension)`.
///
/// Snapping to a scale whose divisions divide the dimension is done entirely
/// in integer space, so grid alignment is exact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CodedPoint {
    dimension: i32,
    lat: i32,
    lon: i32,
}

impl CodedPoint {
    pub(crate) fn from_raw(dimension: i32, lat: i32, lon: i32) -> Self {
        Self {
            dimension,
            lat,
            lon,
        }
    }

    /// `None` when either value is not finite or does not fit 32 bits.
    fn try_code(dimension: i32, lat: f64, lon: f64) -> Option<Self> {
        let fit = |value: f64| {
            let scaled = (value * dimension as f64).round();
            (scaled.is_finite() && scaled.abs() <= i32::MAX as f64).then_some(scaled as i32)
        };
        Some(Self::from_raw(dimension, fit(lat)?, fit(lon)?))
    }

    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    /// Latitude as the stored integer.
    pub fn raw_lat(&self) -> i32 {
        self.lat
    }

    /// Longitude as the stored integer.
    pub fn raw_lon(&self) -> i32 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat as f64 / self.dimension as f64
    }

    pub fn lon(&self) -> f64 {
        self.lon as f64 / self.dimension as f64
    }

    fn down_to(&self, scale: Scale) -> Self {
        Self::from_raw(
            self.dimension,
            snap(self.lat, self.dimension, scale.lat_divisions(), false),
            snap(self.lon, self.dimension, scale.lon_divisions(), false),
        )
    }

    fn up_to(&self, scale: Scale) -> Self {
        Self::from_raw(
            self.dimension,
            snap(self.lat, self.dimension, scale.lat_divisions(), true),
            snap(self.lon, self.dimension, scale.lon_divisions(), true),
        )
    }

    fn grid_index(&self, scale: Scale) -> (i64, i64) {
        (
            coded_index(self.lat, self.dimension, scale.lat_divisions()),
            coded_index(self.lon, self.dimension, scale.lon_divisions()),
        )
    }
}

/// A grid line in coded units. Grid lines next to a coded value always fit.
fn code_value(value: f64, dimension: i32) -> i32 {
    (value * dimension as f64).round() as i32
}

fn check_degrees(axis: &str, value: f64, limit: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(GeoError::InvalidCoordinate(format!(
            "{} must be finite, got: {}",
            axis, value
        )));
    }
    if value.abs() > limit {
        return Err(GeoError::InvalidCoordinate(format!(
            "{} must be within [-{limit}, {limit}], got: {}",
            axis, value
        )));
    }
    Ok(())
}

/// Coded units per grid step, when the grid lines fall on whole coded units.
fn exact_step(dimension: i32, divisions: u32) -> Option<i32> {
    let divisions = i32::try_from(divisions).ok()?;
    (divisions > 0 && dimension > 0 && dimension % divisions == 0).then(|| dimension / divisions)
}

fn snap(value: i32, dimension: i32, divisions: u32, up: bool) -> i32 {
    match exact_step(dimension, divisions) {
        Some(step) => {
            let down = value.div_euclid(step) * step;
            if up && down != value {
                down.saturating_add(step)
            } else {
                down
            }
        }
        None => {
            let degrees = value as f64 / dimension as f64;
            let index = if up {
                ceil_index(degrees, divisions)
            } else {
                floor_index(degrees, divisions)
            };
            code_value(grid_line(index, divisions), dimension)
        }
    }
}

fn coded_index(value: i32, dimension: i32, divisions: u32) -> i64 {
    match exact_step(dimension, divisions) {
        Some(step) => value.div_euclid(step) as i64,
        None => floor_index(value as f64 / dimension as f64, divisions),
    }
}

/// A geographic coordinate in decimal degrees.
///
/// Both representations honour the same contract. Equality, ordering and
/// hashing go by decimal value (`lat()`, then `lon()`), never by representation.
///
/// # Examples
///
/// ```
/// use stopgrid_types::{Point, Unit, Distance};
///
/// let p1 = Point::new(59.00, 10.00)?;
/// let p2 = Point::new(59.01, 10.00)?;
/// let d = p1.distance_to(&p2);
/// assert!((d.to_meters() - 1111.95).abs() < 0.01);
/// assert!(p1 < p2);
///
/// assert!(Point::new(f64::NAN, 10.0).is_err());
/// assert!(Point::new(91.0, 10.0).is_err());
/// # Ok::<(), stopgrid_types::GeoError>(())
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Point {
    Float(FloatPoint),
    Coded(CodedPoint),
}

impl Point {
    /// A coded point with six decimals of precision.
    ///
    /// Fails when a coordinate is not finite, or when the latitude is outside
    /// ±90 or the longitude outside ±180 degrees.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        check_degrees("latitude", lat, 90.0)?;
        check_degrees("longitude", lon, 180.0)?;
        PointCoder::default().code(lat, lon)
    }

    pub fn float(lat: f64, lon: f64) -> Self {
        Point::Float(FloatPoint::new(lat, lon))
    }

    pub fn lat(&self) -> f64 {
        match self {
            Point::Float(p) => p.lat(),
            Point::Coded(p) => p.lat(),
        }
    }

    pub fn lon(&self) -> f64 {
        match self {
            Point::Float(p) => p.lon(),
            Point::Coded(p) => p.lon(),
        }
    }

    pub fn is_coded(&self) -> bool {
        matches!(self, Point::Coded(_))
    }

    pub fn is_finite(&self) -> bool {
        self.lat().is_finite() && self.lon().is_finite()
    }

    /// A point at the given degrees, coded like `self` when the degrees fit
    /// its dimension and a float point otherwise.
    fn at(&self, lat: f64, lon: f64) -> Point {
        match self {
            Point::Coded(p) => match CodedPoint::try_code(p.dimension, lat, lon) {
                Some(coded) => Point::Coded(coded),
                None => Point::float(lat, lon),
            },
            Point::Float(_) => Point::float(lat, lon),
        }
    }

    /// This point moved to the latitude of `other`.
    pub fn with_lat_of(&self, other: &Point) -> Point {
        match (self, other) {
            (Point::Coded(a), Point::Coded(b)) if a.dimension == b.dimension => {
                Point::Coded(CodedPoint::from_raw(a.dimension, b.lat, a.lon))
            }
            _ => self.at(other.lat(), self.lon()),
        }
    }

    /// This point moved to the longitude of `other`.
    pub fn with_lon_of(&self, other: &Point) -> Point {
        match (self, other) {
            (Point::Coded(a), Point::Coded(b)) if a.dimension == b.dimension => {
                Point::Coded(CodedPoint::from_raw(a.dimension, a.lat, b.lon))
            }
            _ => self.at(self.lat(), other.lon()),
        }
    }

    /// Snap south-west onto the scale's grid.
    pub fn down_to(&self, scale: Scale) -> Point {
        match self {
            Point::Float(p) => Point::Float(p.down_to(scale)),
            Point::Coded(p) => Point::Coded(p.down_to(scale)),
        }
    }

    /// Snap north-east onto the scale's grid. Points already on the grid stay put.
    pub fn up_to(&self, scale: Scale) -> Point {
        match self {
            Point::Float(p) => Point::Float(p.up_to(scale)),
            Point::Coded(p) => Point::Coded(p.up_to(scale)),
        }
    }

    /// The box between this point snapped down and snapped up.
    pub fn scaled_box(&self, scale: Scale) -> BoundingBox {
        self.down_to(scale).box_to(&self.up_to(scale))
    }

    /// Row and column of the grid cell containing this point.
    ///
    /// Cells are half-open: a point on a grid line belongs to the cell north
    /// (or east) of it.
    pub fn grid_index(&self, scale: Scale) -> (i64, i64) {
        match self {
            Point::Float(p) => p.grid_index(scale),
            Point::Coded(p) => p.grid_index(scale),
        }
    }

    /// The grid cell containing this point.
    pub fn grid_cell(&self, scale: Scale) -> BoundingBox {
        let (lat_index, lon_index) = self.grid_index(scale);
        grid::cell(scale, lat_index, lon_index)
    }

    /// The box spanned by this point and `other`.
    pub fn box_to(&self, other: &Point) -> BoundingBox {
        BoundingBox::new(*self, *other)
    }

    pub fn is_southwest_of(&self, other: &Point) -> bool {
        self.lat() <= other.lat() && self.lon() <= other.lon()
    }

    /// Great-circle distance, rounded to the millimeter.
    pub fn distance_to(&self, other: &Point) -> Distance {
        let phi1 = self.lat().to_radians();
        let phi2 = other.lat().to_radians();
        let delta_phi = (other.lat() - self.lat()).to_radians();
        let delta_lambda = (other.lon() - self.lon()).to_radians();

        let a = (delta_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        Distance::from_millis((EARTH_RADIUS_MM * c).round() as u64)
    }

    /// Move `distance` towards `direction`, keeping the representation.
    ///
    /// Uses flat per-degree lengths, so this is only meant for short hops.
    pub fn translate(&self, direction: Direction, distance: Distance) -> Point {
        let (lat_factor, lon_factor) = direction.factors();
        let meters = distance.to_meters();

        let delta_lat = meters * lat_factor / DEGREE_LAT.to_meters();
        let degree_lon =
            DEGREE_LON.to_meters() * self.lat().to_radians().cos().abs().max(f64::EPSILON);
        let delta_lon = meters * lon_factor / degree_lon;

        self.at(self.lat() + delta_lat, self.lon() + delta_lon)
    }

    pub fn translated(&self, translation: Translation) -> Point {
        self.translate(translation.direction(), translation.distance())
    }

    /// A box with this point as its south-west corner and sides of `side`.
    pub fn square_box(&self, side: Distance) -> BoundingBox {
        let max = self
            .translate(Direction::North, side)
            .translate(Direction::East, side);
        self.box_to(&max)
    }
}

/// `-0.0` and `0.0` are the same coordinate.
fn canonical(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Point::Coded(a), Point::Coded(b)) if a.dimension == b.dimension => {
                (a.lat, a.lon).cmp(&(b.lat, b.lon))
            }
            _ => canonical(self.lat())
                .total_cmp(&canonical(other.lat()))
                .then_with(|| canonical(self.lon()).total_cmp(&canonical(other.lon()))),
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical(self.lat()).to_bits().hash(state);
        canonical(self.lon()).to_bits().hash(state);
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat(), self.lon())
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        geo::Point::new(point.lon(), point.lat())
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Point::float(point.y(), point.x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;
    use std::collections::HashSet;

    type Make = fn(f64, f64) -> Point;

    fn coded(lat: f64, lon: f64) -> Point {
        Point::new(lat, lon).unwrap().unwrap()
    }

    const BOTH: [(&str, Make); 2] = [("coded", coded), ("float", Point::float)];

    fn scale(lat: i64, lon: i64) -> Scale {
        Scale::of(lat, lon).unwrap()
    }

    fn assert_meters(actual: Distance, expected: f64) {
        assert!(
            (actual.to_meters() - expected).abs() < 0.01,
            "expected ~{}m, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_distances() {
        for (name, p) in BOTH {
            assert_meters(p(59.00, 10.00).distance_to(&p(59.01, 10.00)), 1111.95);
            assert_meters(p(59.00, 10.00).distance_to(&p(59.00, 10.02)), 1145.39);
            assert_meters(p(59.00, 10.00).distance_to(&p(59.01, 10.02)), 1596.24);
            let d = p(59.913130, 10.737579).distance_to(&p(59.916325, 10.728577));
            assert!((d.to_meters() - 614.81).abs() < 0.01, "{}: {}", name, d);
        }
    }

    #[test]
    fn test_distance_symmetric_and_zero() {
        for (_, p) in BOTH {
            let a = p(59.913130, 10.737579);
            let b = p(63.4305, 10.3951);
            assert_eq!(a.distance_to(&b), b.distance_to(&a));
            assert_eq!(a.distance_to(&a), Distance::ZERO);
            assert!(a.distance_to(&b) > Distance::ZERO);
        }
    }

    #[test]
    fn test_scaled_box() {
        for (_, p) in BOTH {
            let p1 = p(59.9131303, 10.7375788);
            assert_eq!(
                p1.scaled_box(scale(100, 100)),
                p(59.91, 10.73).box_to(&p(59.92, 10.74))
            );
        }
    }

    #[test]
    fn test_down() {
        for (_, p) in BOTH {
            let p1 = p(59.9161303, 10.7375788);
            assert_eq!(p1.down_to(scale(100, 50)), p(59.91, 10.72));
            assert_eq!(p1.down_to(scale(100, 100)), p(59.91, 10.73));
            assert_eq!(p1.down_to(scale(10, 100)), p(59.9, 10.73));
        }
    }

    #[test]
    fn test_up() {
        for (_, p) in BOTH {
            let p1 = p(59.9361303, 10.7235788);
            assert_eq!(p1.up_to(scale(100, 50)), p(59.94, 10.74));
            assert_eq!(p1.up_to(scale(100, 100)), p(59.94, 10.73));
            assert_eq!(p1.up_to(scale(100, 10)), p(59.94, 10.8));
            assert_eq!(p1.up_to(scale(50, 50)), p(59.94, 10.74));
            assert_eq!(p1.up_to(scale(10, 100)), p(60.0, 10.73));
        }
    }

    #[test]
    fn test_integer_scale() {
        for (_, p) in BOTH {
            let p1 = p(59.9361303, 10.7235788);
            assert_eq!(p1.up_to(Scale::INTEGER), p(60.0, 11.0));
            assert_eq!(p1.down_to(Scale::INTEGER), p(59.0, 10.0));
        }
    }

    #[test]
    fn test_negative_coordinates_snap_down() {
        for (_, p) in BOTH {
            let p1 = p(-33.8675, -70.6483);
            assert_eq!(p1.down_to(Scale::INTEGER), p(-34.0, -71.0));
            assert_eq!(p1.up_to(Scale::INTEGER), p(-33.0, -70.0));
            assert_eq!(p1.down_to(Scale::DEFAULT), p(-33.87, -70.66));
        }
    }

    #[test]
    fn test_snapping_brackets_point() {
        let scales = [Scale::DEFAULT, Scale::INTEGER, scale(3, 7), scale(1000, 250)];
        let coords = [(59.9361303, 10.7235788), (-12.5, 100.0), (0.29, -0.01)];
        for (_, p) in BOTH {
            for s in scales {
                for (lat, lon) in coords {
                    let point = p(lat, lon);
                    let down = point.down_to(s);
                    let up = point.up_to(s);
                    assert!(down.is_southwest_of(&point), "{} {} {}", point, s, down);
                    assert!(point.is_southwest_of(&up), "{} {} {}", point, s, up);
                }
            }
        }
    }

    #[test]
    fn test_snapping_is_idempotent_on_exact_grids() {
        let scales = [Scale::DEFAULT, Scale::INTEGER, scale(8, 250), scale(1000, 40)];
        for (_, p) in BOTH {
            for s in scales {
                let point = p(-12.3456789, 100.987654);
                let down = point.down_to(s);
                let up = point.up_to(s);
                assert_eq!(down.down_to(s), down);
                assert_eq!(up.up_to(s), up);
                assert_eq!(down.up_to(s), down);
            }
        }
    }

    #[test]
    fn test_comparison() {
        for (_, p) in BOTH {
            assert!(p(3.0, 4.0) < p(4.0, 5.0));
            assert!(p(3.0, 4.0) < p(3.0, 5.0));
            assert!(p(3.0, 4.0) < p(4.0, 2.0));
        }
    }

    #[test]
    fn test_equal_by_value_across_representations() {
        let coded_point = coded(59.13, 10.12);
        let float = Point::float(59.13, 10.12);
        assert_eq!(coded_point, float);

        let mut set = HashSet::new();
        set.insert(coded_point);
        assert!(set.contains(&float));
        assert_eq!(Point::float(0.0, -0.0), coded(0.0, 0.0));
    }

    #[test]
    fn test_coded_round_trip() {
        let p = coded(59.91313034, 10.73757881);
        assert!((p.lat() - 59.913130).abs() < 1e-9);
        assert!((p.lon() - 10.737579).abs() < 1e-9);
        match p {
            Point::Coded(c) => {
                assert_eq!(c.raw_lat(), 59_913_130);
                assert_eq!(c.raw_lon(), 10_737_579);
            }
            Point::Float(_) => panic!("expected a coded point"),
        }
    }

    #[test]
    fn test_translate() {
        for (_, p) in BOTH {
            let origin = p(59.0, 10.0);
            let hundred = Distance::of(100, Unit::M).unwrap();

            let north = origin.translate(Direction::North, hundred);
            assert!(north.lat() > origin.lat());
            assert_eq!(north.lon(), origin.lon());
            assert!((origin.distance_to(&north).to_meters() - 100.0).abs() < 1.0);

            let south_west = origin.translate(Direction::SouthWest, hundred);
            assert!(south_west.lat() < origin.lat());
            assert!(south_west.lon() < origin.lon());
            assert!((origin.distance_to(&south_west).to_meters() - 100.0).abs() < 1.0);
        }
    }

    #[test]
    fn test_square_box() {
        let corner = coded(59.913916, 10.734865);
        let side = Distance::of(10, Unit::M).unwrap();
        let square = corner.square_box(side);
        assert_eq!(square.min(), &corner);
        assert!((square.height().to_meters() - 10.0).abs() < 0.2);
        assert!((square.width().to_meters() - 10.0).abs() < 0.2);
    }

    #[test]
    fn test_new_rejects_bad_coordinates() {
        for (lat, lon) in [
            (f64::NAN, 10.0),
            (59.0, f64::NAN),
            (f64::INFINITY, 10.0),
            (59.0, f64::NEG_INFINITY),
            (90.000001, 10.0),
            (-3000.0, 10.0),
            (59.0, 180.5),
            (59.0, -181.0),
        ] {
            assert!(
                matches!(Point::new(lat, lon).unwrap(), Err(GeoError::InvalidCoordinate(_))),
                "{} {}",
                lat,
                lon
            );
        }
    }

    #[test]
    fn test_new_accepts_the_limits() {
        assert_eq!(coded(90.0, 180.0).lat(), 90.0);
        assert_eq!(coded(-90.0, -180.0).lon(), -180.0);
    }

    #[test]
    fn test_translate_past_coded_range_keeps_value() {
        let far = Distance::of(300_000, Unit::Km).unwrap();
        let moved = coded(89.0, 10.0).translate(Direction::North, far);
        assert!(!moved.is_coded());
        assert!(moved.lat() > 89.0);
    }

    #[test]
    fn test_geo_conversion() {
        let p = Point::float(59.9, 10.7);
        let g: geo::Point<f64> = p.into();
        assert_eq!(g.x(), 10.7);
        assert_eq!(g.y(), 59.9);
        assert_eq!(Point::from(g), p);
    }
}
