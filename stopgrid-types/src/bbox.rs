use crate::distance::Distance;
use crate::error::{GeoError, Result};
use crate::grid::ScaledBoxes;
use crate::point::Point;
use crate::scale::Scale;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An axis-aligned rectangle in latitude/longitude space.
///
/// Corners are normalized on construction, so `min` is south-west of `max`
/// whatever order they were given in. Equality, ordering and hashing use the
/// two corners only.
///
/// # Examples
///
/// ```
/// use stopgrid_types::{BoundingBox, Point, Scale};
///
/// let bbox = BoundingBox::new(Point::float(1.0, 200.0), Point::float(2.0, 100.0));
/// assert_eq!(bbox.min(), &Point::float(1.0, 100.0));
/// assert_eq!(bbox.max(), &Point::float(2.0, 200.0));
///
/// let scaled = Point::new(59.134, 10.123)?
///     .box_to(&Point::new(60.234, 12.234)?)
///     .scaled_to(Scale::DEFAULT);
/// assert_eq!(scaled, Point::new(59.13, 10.12)?.box_to(&Point::new(60.24, 12.24)?));
/// # Ok::<(), stopgrid_types::GeoError>(())
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Corners", into = "Corners")]
pub struct BoundingBox {
    min: Point,
    max: Point,
    area: OnceCell<f64>,
}

#[derive(Serialize, Deserialize)]
struct Corners {
    min: Point,
    max: Point,
}

impl BoundingBox {
    /// Box spanned by two corners, in any order.
    pub fn new(a: Point, b: Point) -> Self {
        if a.is_southwest_of(&b) {
            return Self::from_corners(a, b);
        }
        let south = if a.lat() <= b.lat() { a } else { b };
        let north = if a.lat() <= b.lat() { b } else { a };
        let west = if a.lon() <= b.lon() { a } else { b };
        let east = if a.lon() <= b.lon() { b } else { a };
        Self::from_corners(south.with_lon_of(&west), north.with_lon_of(&east))
    }

    /// Like [`BoundingBox::new`], failing on corners that are not finite.
    pub fn try_new(a: Point, b: Point) -> Result<Self> {
        for point in [a, b] {
            if !point.is_finite() {
                return Err(GeoError::InvalidCoordinate(format!(
                    "box corner is not finite: {}",
                    point
                )));
            }
        }
        Ok(Self::new(a, b))
    }

    /// Corners already known to be ordered.
    pub(crate) fn from_corners(min: Point, max: Point) -> Self {
        Self {
            min,
            max,
            area: OnceCell::new(),
        }
    }

    pub fn min(&self) -> &Point {
        &self.min
    }

    pub fn max(&self) -> &Point {
        &self.max
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Height in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max.lat() - self.min.lat()
    }

    /// Width in degrees.
    pub fn lon_span(&self) -> f64 {
        self.max.lon() - self.min.lon()
    }

    /// This box snapped outwards to the scale's grid lines.
    pub fn scaled_to(&self, scale: Scale) -> BoundingBox {
        Self::from_corners(self.min.down_to(scale), self.max.up_to(scale))
    }

    /// The smallest box containing both boxes.
    pub fn combined(&self, other: &BoundingBox) -> BoundingBox {
        let south = lower(&self.min, &other.min, Point::lat);
        let west = lower(&self.min, &other.min, Point::lon);
        let north = higher(&self.max, &other.max, Point::lat);
        let east = higher(&self.max, &other.max, Point::lon);
        Self::from_corners(south.with_lon_of(west), north.with_lon_of(east))
    }

    /// Union of all boxes, `None` for none.
    pub fn union_all<'a, I>(boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        boxes.into_iter().fold(None, |acc, next| match acc {
            None => Some(next.clone()),
            Some(total) => Some(total.combined(next)),
        })
    }

    /// North-south extent measured along the western edge.
    pub fn height(&self) -> Distance {
        self.min.distance_to(&self.min.with_lat_of(&self.max))
    }

    /// East-west extent measured along the southern edge.
    pub fn width(&self) -> Distance {
        self.min.distance_to(&self.min.with_lon_of(&self.max))
    }

    pub fn area_sq_meters(&self) -> f64 {
        *self
            .area
            .get_or_init(|| self.height().to_meters() * self.width().to_meters())
    }

    /// Half-open containment: `min <= point < max` on both axes.
    pub fn contains(&self, point: &Point) -> bool {
        self.min.lat() <= point.lat()
            && point.lat() < self.max.lat()
            && self.min.lon() <= point.lon()
            && point.lon() < self.max.lon()
    }

    /// Whether the boxes intersect.
    ///
    /// True when a corner of either box lies inside the other, or when the
    /// boxes cross each other without any corner inside.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.has_corner_in(other)
            || other.has_corner_in(self)
            || self.crosses(other)
            || other.crosses(self)
    }

    fn corners(&self) -> [Point; 4] {
        [
            self.min,
            self.max,
            self.min.with_lat_of(&self.max),
            self.min.with_lon_of(&self.max),
        ]
    }

    fn has_corner_in(&self, other: &BoundingBox) -> bool {
        self.corners().iter().any(|corner| other.contains(corner))
    }

    /// Taller and narrower than `other`, passing straight through it.
    fn crosses(&self, other: &BoundingBox) -> bool {
        self.min.lat() < other.min.lat()
            && other.max.lat() < self.max.lat()
            && other.min.lon() < self.min.lon()
            && self.max.lon() < other.max.lon()
    }

    /// The grid cells covering this box, from the cell holding `min` to the
    /// cell holding `max`, both ends inclusive.
    ///
    /// A corner on a grid line belongs to the cell above it, so the cover is
    /// not `span / cell` rounded: a box of exactly one cell whose corners sit
    /// on grid lines covers that cell and its neighbours to the north, east
    /// and north-east, 4 cells in all.
    ///
    /// The cells are produced lazily; use [`ScaledBoxes::cell_count`] (or
    /// [`BoundingBox::cell_count`]) to learn how many there are first.
    pub fn scaled_boxes(&self, scale: Scale) -> ScaledBoxes {
        let (lat_start, lon_start) = self.min.grid_index(scale);
        let (lat_end, lon_end) = self.max.grid_index(scale);
        ScaledBoxes::new(scale, lat_start..=lat_end, lon_start..=lon_end)
    }

    pub fn cell_count(&self, scale: Scale) -> u64 {
        self.scaled_boxes(scale).cell_count()
    }
}

fn lower<'a>(a: &'a Point, b: &'a Point, axis: fn(&Point) -> f64) -> &'a Point {
    if axis(a) <= axis(b) { a } else { b }
}

fn higher<'a>(a: &'a Point, b: &'a Point, axis: fn(&Point) -> f64) -> &'a Point {
    if axis(a) >= axis(b) { a } else { b }
}

impl From<Corners> for BoundingBox {
    fn from(corners: Corners) -> Self {
        BoundingBox::new(corners.min, corners.max)
    }
}

impl From<BoundingBox> for Corners {
    fn from(bbox: BoundingBox) -> Self {
        Corners {
            min: bbox.min,
            max: bbox.max,
        }
    }
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max
    }
}

impl Eq for BoundingBox {}

impl Hash for BoundingBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.min.hash(state);
        self.max.hash(state);
    }
}

/// South-west corner first, then north-east.
impl Ord for BoundingBox {
    fn cmp(&self, other: &Self) -> Ordering {
        self.min
            .cmp(&other.min)
            .then_with(|| self.max.cmp(&other.max))
    }
}

impl PartialOrd for BoundingBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundingBox")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} / {}]", self.min, self.max)
    }
}

impl From<&BoundingBox> for geo::Rect<f64> {
    fn from(bbox: &BoundingBox) -> Self {
        geo::Rect::new(
            geo::coord! { x: bbox.min.lon(), y: bbox.min.lat() },
            geo::coord! { x: bbox.max.lon(), y: bbox.max.lat() },
        )
    }
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        BoundingBox::new(
            Point::float(rect.min().y, rect.min().x),
            Point::float(rect.max().y, rect.max().x),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    fn bbox(a: (f64, f64), b: (f64, f64)) -> BoundingBox {
        Point::new(a.0, a.1).unwrap().box_to(&Point::new(b.0, b.1).unwrap())
    }

    /// Float corners, for plane geometry outside the geographic range.
    fn fbox(a: (f64, f64), b: (f64, f64)) -> BoundingBox {
        Point::float(a.0, a.1).box_to(&Point::float(b.0, b.1))
    }

    fn assert_overlap(a: &BoundingBox, b: &BoundingBox) {
        assert!(a.overlaps(b), "{} should overlap {}", a, b);
        assert!(b.overlaps(a), "{} should overlap {}", b, a);
    }

    #[test]
    fn test_build() {
        let b = fbox((1.0, 200.0), (2.0, 100.0));
        assert_eq!(b.min(), &Point::float(1.0, 100.0));
        assert_eq!(b.max(), &Point::float(2.0, 200.0));

        let reversed = BoundingBox::new(Point::float(2.0, 200.0), Point::float(1.0, 100.0));
        assert_eq!(reversed, b);
    }

    #[test]
    fn test_try_new_rejects_nan() {
        assert!(BoundingBox::try_new(Point::float(f64::NAN, 1.0), Point::float(1.0, 1.0)).is_err());
        assert!(BoundingBox::try_new(Point::float(0.0, 1.0), Point::float(1.0, 2.0)).is_ok());
    }

    #[test]
    fn test_size() {
        let b = bbox((0.0001, 0.0), (0.0002, 0.0));
        assert!(b.height() > Distance::ZERO);
        assert_eq!(b.width(), Distance::ZERO);
        assert_eq!(b.area_sq_meters(), 0.0);
    }

    #[test]
    fn test_height_and_width() {
        let height = bbox((59.00, 10.00), (59.01, 10.00)).height();
        assert_eq!(height, Distance::of_f64(1_111.949, Unit::M).unwrap());

        let width = bbox((59.00, 10.00), (59.00, 10.02)).width();
        assert_eq!(width, Distance::of_f64(1_145.392, Unit::M).unwrap());
    }

    #[test]
    fn test_area() {
        let b = fbox((1.0, 200.0), (2.0, 100.0));
        let expected = b.height().to_meters() * b.width().to_meters();
        assert_eq!(b.area_sq_meters(), expected);
        assert_eq!(b.area_sq_meters(), expected);
    }

    #[test]
    fn test_scale() {
        let scaled = bbox((59.134, 10.123), (60.234, 12.234)).scaled_to(Scale::DEFAULT);
        assert_eq!(scaled, bbox((59.13, 10.12), (60.24, 12.24)));

        let float = BoundingBox::new(Point::float(59.134, 10.123), Point::float(60.234, 12.234));
        assert_eq!(float.scaled_to(Scale::DEFAULT), scaled);
    }

    #[test]
    fn test_overlap() {
        assert_overlap(
            &fbox((1.0, 100.0), (2.0, 200.0)),
            &fbox((1.5, 50.0), (2.5, 250.0)),
        );
        assert_overlap(&bbox((1.0, 1.0), (3.0, 3.0)), &bbox((2.0, 0.0), (4.0, 4.0)));
        assert_overlap(
            &bbox((59.912, 10.720), (59.915, 10.732)),
            &bbox((59.914, 10.729), (59.915, 10.733)),
        );
    }

    #[test]
    fn test_overlap_crossing() {
        let tall = bbox((0.0, 2.0), (10.0, 3.0));
        let wide = bbox((4.0, 0.0), (5.0, 10.0));
        assert!(!tall.has_corner_in(&wide) && !wide.has_corner_in(&tall));
        assert_overlap(&tall, &wide);
    }

    #[test]
    fn test_overlap_self_and_contained() {
        let outer = bbox((0.0, 0.0), (10.0, 10.0));
        let inner = bbox((2.0, 2.0), (3.0, 3.0));
        assert_overlap(&outer, &outer);
        assert_overlap(&outer, &inner);
    }

    #[test]
    fn test_no_overlap() {
        let b1 = bbox((1.0, 1.0), (2.0, 2.0));
        let b2 = bbox((3.0, 3.0), (4.0, 4.0));
        assert!(!b1.overlaps(&b2));
        assert!(!b2.overlaps(&b1));
    }

    #[test]
    fn test_contains_is_half_open() {
        let b = bbox((1.0, 1.0), (2.0, 2.0));
        assert!(b.contains(&Point::new(1.0, 1.0).unwrap()));
        assert!(b.contains(&Point::new(1.5, 1.999999).unwrap()));
        assert!(!b.contains(&Point::new(2.0, 1.5).unwrap()));
        assert!(!b.contains(&Point::new(1.5, 2.0).unwrap()));
    }

    #[test]
    fn test_cover_is_inclusive() {
        let aligned = bbox((59.0, 10.0), (59.01, 10.02));
        assert_eq!(aligned.cell_count(Scale::DEFAULT), 4);
        let cells: Vec<BoundingBox> = aligned.scaled_boxes(Scale::DEFAULT).collect();
        assert_eq!(cells[0], aligned);
        assert!(cells[3].contains(aligned.max()));

        let inside = bbox((59.001, 10.001), (59.009, 10.019));
        assert_eq!(inside.cell_count(Scale::DEFAULT), 1);
        assert_eq!(bbox((59.0, 10.0), (59.0, 10.0)).cell_count(Scale::DEFAULT), 1);
    }

    #[test]
    fn test_combine() {
        let b1 = fbox((1.0, 100.0), (2.0, 200.0));
        let b2 = fbox((1.5, 50.0), (2.5, 250.0));
        assert_eq!(b1.combined(&b2), fbox((1.0, 50.0), (2.5, 250.0)));

        let b3 = bbox((1.0, 1.0), (2.0, 2.0));
        let b4 = bbox((3.0, 3.0), (5.0, 5.0));
        assert_eq!(b3.combined(&b4), bbox((1.0, 1.0), (5.0, 5.0)));
    }

    #[test]
    fn test_combine_laws() {
        let a = bbox((1.0, 1.0), (2.0, 2.0));
        let b = bbox((1.5, -3.0), (4.0, 1.5));
        let c = bbox((-1.0, 0.5), (0.0, 8.0));
        assert_eq!(a.combined(&b), b.combined(&a));
        assert_eq!(a.combined(&b).combined(&c), a.combined(&b.combined(&c)));
        assert_eq!(a.combined(&a), a);
        assert_eq!(
            BoundingBox::union_all([&a, &b, &c]),
            Some(a.combined(&b).combined(&c))
        );
        assert_eq!(BoundingBox::union_all(std::iter::empty()), None);
    }

    #[test]
    fn test_order_by_min_corner() {
        let a = bbox((1.0, 1.0), (2.0, 2.0));
        let b = bbox((1.0, 2.0), (1.5, 2.5));
        let c = bbox((0.5, 9.0), (9.0, 9.5));
        let mut boxes = vec![a.clone(), b.clone(), c.clone()];
        boxes.sort();
        assert_eq!(boxes, vec![c, a, b]);
    }

    #[test]
    fn test_serde_normalizes() {
        let json = r#"{"min":{"Float":{"lat":2.0,"lon":3.0}},"max":{"Float":{"lat":1.0,"lon":4.0}}}"#;
        let b: BoundingBox = serde_json::from_str(json).unwrap();
        assert_eq!(b.min(), &Point::float(1.0, 3.0));
        assert_eq!(b.max(), &Point::float(2.0, 4.0));

        let back: BoundingBox = serde_json::from_str(&serde_json::to_string(&b).unwrap()).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_geo_rect() {
        let b = bbox((59.0, 10.0), (60.0, 11.0));
        let rect: geo::Rect<f64> = (&b).into();
        assert_eq!(rect.min().x, 10.0);
        assert_eq!(rect.max().y, 60.0);
        assert_eq!(BoundingBox::from(rect), b);
    }
}
