//! # stopgrid-types
//!
//! Geodetic value types for the stopgrid transit index.
//!
//! This crate provides the immutable primitives the index is built from:
//!
//! - **Lengths**: [`Unit`], [`Distance`] (integer millimeters, never negative)
//! - **Points**: [`Point`], a closed choice between [`FloatPoint`] and the
//!   integer-coded [`CodedPoint`], plus the [`PointCoder`] that makes them
//! - **Grids**: [`Scale`] and the [`ScaledBoxes`] cell producer
//! - **Boxes**: [`BoundingBox`], an axis-aligned lat/lon rectangle
//!
//! All types are serializable with Serde. Coded points and scales round-trip
//! bit-exact, since grid cells built from them are used as map keys.
//!
//! ## Examples
//!
//! ```rust
//! use stopgrid_types::{Point, Scale};
//!
//! let oslo = Point::new(59.9131303, 10.7375788).unwrap();
//! let cell = oslo.scaled_box(Scale::of(100, 100).unwrap());
//! assert_eq!(cell.min(), &Point::new(59.91, 10.73).unwrap());
//! assert_eq!(cell.max(), &Point::new(59.92, 10.74).unwrap());
//! ```

pub mod bbox;
pub mod coder;
pub mod direction;
pub mod distance;
pub mod error;
pub mod grid;
pub mod point;
pub mod scale;
pub mod unit;

pub use bbox::BoundingBox;
pub use coder::{PointCoder, parse_pos_list};
pub use direction::{Direction, Translation};
pub use distance::Distance;
pub use error::{GeoError, Result};
pub use grid::ScaledBoxes;
pub use point::{CodedPoint, FloatPoint, Point};
pub use scale::Scale;
pub use unit::Unit;
