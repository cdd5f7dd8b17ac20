//! Validation for geographic input.

use crate::error::{Result, StopgridError};
use stopgrid_types::{BoundingBox, Point};

/// Validates a point has a finite latitude in [-90, 90] and longitude in
/// [-180, 180].
///
/// # Examples
///
/// ```
/// use stopgrid::validation::validate_point;
/// use stopgrid_types::Point;
///
/// assert!(validate_point(&Point::new(59.91, 10.75).unwrap()).is_ok());
/// assert!(validate_point(&Point::float(95.0, 10.0)).is_err());
/// assert!(validate_point(&Point::float(59.0, f64::NAN)).is_err());
/// ```
pub fn validate_point(point: &Point) -> Result<()> {
    let (lat, lon) = (point.lat(), point.lon());

    if !lat.is_finite() {
        return Err(StopgridError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !lon.is_finite() {
        return Err(StopgridError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(StopgridError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(StopgridError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    Ok(())
}

/// Validates a region: both corners in range.
pub fn validate_region(region: &BoundingBox) -> Result<()> {
    validate_point(region.min())?;
    validate_point(region.max())
}

/// Validates a query box has finite corners.
///
/// Ranges are not checked; a box is only ever compared with other boxes.
pub fn validate_query_box(query: &BoundingBox) -> Result<()> {
    if query.is_finite() {
        Ok(())
    } else {
        Err(StopgridError::InvalidInput(format!(
            "Query box must be finite, got: {}",
            query
        )))
    }
}

/// Validates every point of a trajectory, reporting the first bad one.
pub fn validate_points(points: &[Point]) -> Result<()> {
    for (i, point) in points.iter().enumerate() {
        validate_point(point).map_err(|e| {
            StopgridError::InvalidInput(format!("Point {} of trajectory: {}", i, e))
        })?;
    }
    Ok(())
}
