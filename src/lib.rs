//! Grid-indexed, read-only database of a transit network.
//!
//! Service legs and trip definitions are filed under the grid cells their
//! bounding boxes cover, so range queries over lat/lon rectangles touch only
//! nearby entities.
//!
//! ```rust
//! use stopgrid::prelude::*;
//!
//! let link = ServiceLink::new(
//!     "RUT:ServiceLink:1".parse()?,
//!     "RUT:ScheduledStopPoint:1".parse()?,
//!     "RUT:ScheduledStopPoint:2".parse()?,
//!     vec![LinkSequenceProjection::from_pos_list(
//!         "RUT:LinkSequenceProjection:1".parse()?,
//!         "59.9111 10.7503 59.9127 10.7412",
//!     )?],
//! );
//! let db = DatabaseBuilder::new().scale(Scale::DEFAULT).entity(link).build()?;
//!
//! let around = Point::new(59.9111, 10.7503)?.square_box(Distance::of(200, Unit::M)?);
//! assert_eq!(db.service_legs(&[around]).len(), 1);
//! # Ok::<(), stopgrid::StopgridError>(())
//! ```

pub mod builder;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod hash;
pub mod id;
pub mod index;
pub mod leg;
pub mod model;
pub mod trip;
pub mod validation;

#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use builder::DatabaseBuilder;
pub use config::{Config, Region};
pub use db::{Database, DbStats};
pub use entity::{Entity, EntityKind, EntityType};
pub use error::{Result, StopgridError};
pub use hash::{ContentHash, ContentHasher};
pub use id::Id;
pub use index::{Boxed, GridIndex, IndexStats};
pub use leg::ServiceLeg;
pub use model::{
    JourneyPattern, Line, LinkSequenceProjection, Route, ScheduledStopPoint, ServiceJourney,
    ServiceLink, ServiceLinkInJourneyPattern, StopPointInJourneyPattern, TimetabledPassingTime,
    parse_departure,
};
pub use trip::{Journey, PatternStop, ScheduledStop, TripDefinition};

#[cfg(feature = "snapshot")]
pub use snapshot::{SnapshotContents, SnapshotFile};

pub use stopgrid_types::{
    BoundingBox, CodedPoint, Direction, Distance, FloatPoint, GeoError, Point, PointCoder, Scale,
    ScaledBoxes, Translation, Unit, parse_pos_list,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Database, DatabaseBuilder, Result, StopgridError};

    pub use crate::{BoundingBox, Distance, Point, Scale, Unit};

    pub use crate::{Boxed, Config, Entity, Id, Region};

    pub use crate::{
        JourneyPattern, Line, LinkSequenceProjection, Route, ScheduledStopPoint, ServiceJourney,
        ServiceLink,
    };

    pub use crate::{Journey, ServiceLeg, TripDefinition};
}
