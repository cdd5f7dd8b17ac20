//! Grid cells of a [`Scale`].
//!
//! A cell is addressed by its row and column index: cell `(i, j)` spans
//! latitudes `i/lat_div .. (i+1)/lat_div` and longitudes
//! `j/lon_div .. (j+1)/lon_div`. Building cells from integer indices (rather
//! than by stepping a floating offset) means the same cell always has the same
//! corners, bit for bit, which is what lets cells act as map keys.

use crate::bbox::BoundingBox;
use crate::point::Point;
use crate::scale::{Scale, grid_line};
use std::iter::FusedIterator;
use std::ops::RangeInclusive;

/// The cell at row `lat_index`, column `lon_index`.
pub fn cell(scale: Scale, lat_index: i64, lon_index: i64) -> BoundingBox {
    let (lat_div, lon_div) = (scale.lat_divisions(), scale.lon_divisions());
    BoundingBox::from_corners(
        Point::float(grid_line(lat_index, lat_div), grid_line(lon_index, lon_div)),
        Point::float(
            grid_line(lat_index.saturating_add(1), lat_div),
            grid_line(lon_index.saturating_add(1), lon_div),
        ),
    )
}

/// Lazily produced cells covering a rectangle of grid indices, row by row.
#[derive(Debug, Clone)]
pub struct ScaledBoxes {
    scale: Scale,
    lat_start: i64,
    lon_start: i64,
    columns: u64,
    next: u64,
    end: u64,
}

impl ScaledBoxes {
    pub(crate) fn new(scale: Scale, lats: RangeInclusive<i64>, lons: RangeInclusive<i64>) -> Self {
        let rows = span(&lats);
        let columns = span(&lons);
        Self {
            scale,
            lat_start: *lats.start(),
            lon_start: *lons.start(),
            columns,
            next: 0,
            end: rows.saturating_mul(columns),
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Cells not yet produced.
    pub fn cell_count(&self) -> u64 {
        self.end - self.next
    }
}

fn span(range: &RangeInclusive<i64>) -> u64 {
    let count = i128::from(*range.end()) - i128::from(*range.start()) + 1;
    u64::try_from(count.max(0)).unwrap_or(u64::MAX)
}

impl Iterator for ScaledBoxes {
    type Item = BoundingBox;

    fn next(&mut self) -> Option<BoundingBox> {
        if self.next >= self.end {
            return None;
        }
        let row = self.next / self.columns;
        let column = self.next % self.columns;
        self.next += 1;
        Some(cell(
            self.scale,
            self.lat_start.saturating_add_unsigned(row),
            self.lon_start.saturating_add_unsigned(column),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.cell_count()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScaledBoxes {}

impl FusedIterator for ScaledBoxes {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn scale(lat: i64, lon: i64) -> Scale {
        Scale::of(lat, lon).unwrap()
    }

    #[test]
    fn test_single_cell_for_point_box() {
        let p = Point::new(59.9161303, 10.7375788).unwrap();
        let cells: Vec<_> = p.box_to(&p).scaled_boxes(Scale::DEFAULT).collect();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0], p.scaled_box(Scale::DEFAULT));
        assert_eq!(cells[0], p.grid_cell(Scale::DEFAULT));
    }

    #[test]
    fn test_cells_tile_box() {
        let scales = [Scale::DEFAULT, Scale::INTEGER, scale(7, 3), scale(1000, 250)];
        let boxes = [
            Point::new(59.134, 10.123).unwrap().box_to(&Point::new(59.234, 10.334).unwrap()),
            Point::float(-0.35, -1.2).box_to(&Point::float(0.4, 0.01)),
            Point::new(60.0, 11.0).unwrap().box_to(&Point::new(60.02, 11.04).unwrap()),
        ];
        for s in scales {
            for b in &boxes {
                let cells: Vec<_> = b.scaled_boxes(s).collect();
                assert_eq!(cells.len() as u64, b.cell_count(s));

                let union = BoundingBox::union_all(&cells).unwrap();
                assert!(union.min().is_southwest_of(b.min()), "{} {}", s, b);
                assert!(b.max().is_southwest_of(union.max()), "{} {}", s, b);

                for c in &cells {
                    assert!((c.lat_span() - s.cell_lat_span()).abs() < 1e-9);
                    assert!((c.lon_span() - s.cell_lon_span()).abs() < 1e-9);
                    assert_eq!(c.scaled_to(s), *c, "{} is not grid aligned", c);
                    assert!(c.min().is_southwest_of(b.max()), "{} beyond {}", c, b);
                    assert!(b.min().lat() < c.max().lat() && b.min().lon() < c.max().lon());
                }

                let unique: HashSet<_> = cells.iter().cloned().collect();
                assert_eq!(unique.len(), cells.len());
            }
        }
    }

    #[test]
    fn test_cell_counts() {
        let b = Point::new(59.134, 10.123).unwrap().box_to(&Point::new(60.234, 12.234).unwrap());
        // rows 5913..=6023, columns 506..=611
        assert_eq!(b.cell_count(Scale::DEFAULT), 111 * 106);
        assert_eq!(b.scaled_boxes(Scale::INTEGER).len(), 2 * 3);
    }

    #[test]
    fn test_touching_boxes_share_a_cell() {
        let west = Point::new(59.0, 10.0).unwrap().box_to(&Point::new(59.01, 10.02).unwrap());
        let east = Point::new(59.0, 10.02).unwrap().box_to(&Point::new(59.01, 10.04).unwrap());
        let west_cells: HashSet<_> = west.scaled_boxes(Scale::DEFAULT).collect();
        assert!(east.scaled_boxes(Scale::DEFAULT).any(|c| west_cells.contains(&c)));
    }

    #[test]
    fn test_deterministic() {
        let b = Point::float(59.9, 10.7).box_to(&Point::float(59.95, 10.79));
        let first: Vec<_> = b.scaled_boxes(Scale::DEFAULT).collect();
        let second: Vec<_> = b.clone().scaled_boxes(Scale::DEFAULT).collect();
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.min().lat().to_bits(), b.min().lat().to_bits());
            assert_eq!(a.max().lon().to_bits(), b.max().lon().to_bits());
        }
    }

    #[test]
    fn test_exact_size() {
        let b = Point::new(1.0, 1.0).unwrap().box_to(&Point::new(1.5, 1.5).unwrap());
        let mut cells = b.scaled_boxes(scale(10, 10));
        assert_eq!(cells.len(), 36);
        cells.next();
        assert_eq!(cells.len(), 35);
        assert_eq!(cells.count(), 35);
    }
}
