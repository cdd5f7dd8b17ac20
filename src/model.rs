//! Transit network records.
//!
//! These are the typed records an ingestion layer produces from the source
//! documents. They reference each other by [`Id`]; the
//! [`Database`](crate::Database) resolves the references when it is built.

use crate::error::{Result, StopgridError};
use crate::hash::{ContentHash, ContentHasher, content_identity};
use crate::id::Id;
use crate::validation::validate_points;
use chrono::NaiveTime;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use stopgrid_types::{BoundingBox, Distance, Point, parse_pos_list};

fn non_blank(text: impl Into<String>) -> Option<String> {
    let text = text.into();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a departure time of day, `HH:MM:SS` or `HH:MM`. Blank text is no time.
pub fn parse_departure(text: &str) -> Result<Option<NaiveTime>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map(Some)
        .map_err(|e| StopgridError::InvalidInput(format!("bad departure time {:?}: {}", text, e)))
}

/// A named stop that journeys call at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledStopPoint {
    pub id: Id,
    pub name: Option<String>,
}

impl ScheduledStopPoint {
    /// Blank names are stored as no name; others are trimmed.
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: non_blank(name),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl ContentHash for ScheduledStopPoint {
    const KIND: &'static str = "ScheduledStopPoint";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id).opt_str(self.name());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: Id,
    pub name: Option<String>,
    pub transport_mode: Option<String>,
}

impl Line {
    pub fn new(id: Id, name: impl Into<String>, transport_mode: impl Into<String>) -> Self {
        Self {
            id,
            name: non_blank(name),
            transport_mode: non_blank(transport_mode),
        }
    }
}

impl ContentHash for Line {
    const KIND: &'static str = "Line";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .opt_str(self.name.as_deref())
            .opt_str(self.transport_mode.as_deref());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Id,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub line_ref: Option<Id>,
    pub direction_type: Option<String>,
}

impl Route {
    pub fn new(id: Id, name: impl Into<String>, line_ref: Option<Id>) -> Self {
        Self {
            id,
            name: non_blank(name),
            short_name: None,
            line_ref,
            direction_type: None,
        }
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = non_blank(short_name);
        self
    }

    pub fn with_direction_type(mut self, direction_type: impl Into<String>) -> Self {
        self.direction_type = non_blank(direction_type);
        self
    }
}

impl ContentHash for Route {
    const KIND: &'static str = "Route";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .opt_str(self.name.as_deref())
            .opt_str(self.short_name.as_deref())
            .opt_id(self.line_ref.as_ref())
            .opt_str(self.direction_type.as_deref());
    }
}

/// The drawn geometry of a service link: a trajectory of points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSequenceProjection {
    pub id: Id,
    trajectory: Vec<Point>,
    #[serde(skip)]
    bbox: OnceCell<Option<BoundingBox>>,
}

impl LinkSequenceProjection {
    pub fn new(id: Id, trajectory: Vec<Point>) -> Self {
        Self {
            id,
            trajectory,
            bbox: OnceCell::new(),
        }
    }

    /// Build from a `lat lon lat lon ...` position list. Every position must
    /// be a geographic coordinate.
    pub fn from_pos_list(id: Id, pos_list: &str) -> Result<Self> {
        let trajectory = parse_pos_list(pos_list)?;
        validate_points(&trajectory)?;
        Ok(Self::new(id, trajectory))
    }

    pub fn trajectory(&self) -> &[Point] {
        &self.trajectory
    }

    pub fn start(&self) -> Option<&Point> {
        self.trajectory.first()
    }

    pub fn end(&self) -> Option<&Point> {
        self.trajectory.last()
    }

    /// Box through the southern-, western-, northern- and eastern-most points.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bbox
            .get_or_init(|| {
                let by_lat = |a: &&Point, b: &&Point| a.lat().total_cmp(&b.lat());
                let by_lon = |a: &&Point, b: &&Point| a.lon().total_cmp(&b.lon());
                let south = self.trajectory.iter().min_by(by_lat)?;
                let west = self.trajectory.iter().min_by(by_lon)?;
                let north = self.trajectory.iter().max_by(by_lat)?;
                let east = self.trajectory.iter().max_by(by_lon)?;
                Some(BoundingBox::new(
                    south.with_lon_of(west),
                    north.with_lon_of(east),
                ))
            })
            .as_ref()
    }
}

impl ContentHash for LinkSequenceProjection {
    const KIND: &'static str = "LinkSequenceProjection";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id).u32(self.trajectory.len() as u32);
        for point in &self.trajectory {
            h.point(point);
        }
    }
}

/// A link between two stop points, with its geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLink {
    pub id: Id,
    pub from_point: Id,
    pub to_point: Id,
    pub distance: Option<Distance>,
    pub projections: Vec<LinkSequenceProjection>,
}

impl ServiceLink {
    pub fn new(
        id: Id,
        from_point: Id,
        to_point: Id,
        projections: Vec<LinkSequenceProjection>,
    ) -> Self {
        Self {
            id,
            from_point,
            to_point,
            distance: None,
            projections,
        }
    }

    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = Some(distance);
        self
    }

    /// First point of the first projection that has one.
    pub fn start_point(&self) -> Option<&Point> {
        self.projections.iter().find_map(LinkSequenceProjection::start)
    }

    /// Last point of the first projection that has one.
    pub fn end_point(&self) -> Option<&Point> {
        self.projections.iter().find_map(LinkSequenceProjection::end)
    }
}

impl ContentHash for ServiceLink {
    const KIND: &'static str = "ServiceLink";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .id(&self.from_point)
            .id(&self.to_point)
            .opt_distance(self.distance)
            .seq(self.projections.iter());
    }
}

/// A stop point's position in a journey pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopPointInJourneyPattern {
    pub id: Id,
    pub order: u32,
    pub scheduled_stop_point_ref: Id,
}

impl StopPointInJourneyPattern {
    pub fn new(id: Id, order: u32, scheduled_stop_point_ref: Id) -> Self {
        Self {
            id,
            order,
            scheduled_stop_point_ref,
        }
    }
}

impl ContentHash for StopPointInJourneyPattern {
    const KIND: &'static str = "StopPointInJourneyPattern";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .u32(self.order)
            .id(&self.scheduled_stop_point_ref);
    }
}

/// A service link's position in a journey pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLinkInJourneyPattern {
    pub id: Id,
    pub order: u32,
    pub service_link_ref: Id,
}

impl ServiceLinkInJourneyPattern {
    pub fn new(id: Id, order: u32, service_link_ref: Id) -> Self {
        Self {
            id,
            order,
            service_link_ref,
        }
    }
}

impl ContentHash for ServiceLinkInJourneyPattern {
    const KIND: &'static str = "ServiceLinkInJourneyPattern";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id).u32(self.order).id(&self.service_link_ref);
    }
}

/// An ordered pattern of stop points and the links between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyPattern {
    pub id: Id,
    pub name: Option<String>,
    pub route_ref: Option<Id>,
    pub points_in_sequence: Vec<StopPointInJourneyPattern>,
    pub links_in_sequence: Vec<ServiceLinkInJourneyPattern>,
}

impl JourneyPattern {
    pub fn new(
        id: Id,
        name: impl Into<String>,
        route_ref: Option<Id>,
        points_in_sequence: Vec<StopPointInJourneyPattern>,
        links_in_sequence: Vec<ServiceLinkInJourneyPattern>,
    ) -> Self {
        Self {
            id,
            name: non_blank(name),
            route_ref,
            points_in_sequence,
            links_in_sequence,
        }
    }
}

impl ContentHash for JourneyPattern {
    const KIND: &'static str = "JourneyPattern";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .opt_str(self.name.as_deref())
            .opt_id(self.route_ref.as_ref())
            .seq(self.points_in_sequence.iter())
            .seq(self.links_in_sequence.iter());
    }
}

/// The time a service journey passes one stop of its pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetabledPassingTime {
    pub id: Id,
    pub stop_point_in_journey_pattern_ref: Id,
    pub departure_time: Option<NaiveTime>,
}

impl TimetabledPassingTime {
    pub fn new(
        id: Id,
        stop_point_in_journey_pattern_ref: Id,
        departure_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            id,
            stop_point_in_journey_pattern_ref,
            departure_time,
        }
    }

    /// Build with the departure given as text, see [`parse_departure`].
    pub fn parse(
        id: Id,
        stop_point_in_journey_pattern_ref: Id,
        departure_time: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            id,
            stop_point_in_journey_pattern_ref,
            parse_departure(departure_time)?,
        ))
    }
}

impl ContentHash for TimetabledPassingTime {
    const KIND: &'static str = "TimetabledPassingTime";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .id(&self.stop_point_in_journey_pattern_ref)
            .opt_time(self.departure_time);
    }
}

/// One scheduled run of a journey pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceJourney {
    pub id: Id,
    pub name: Option<String>,
    pub journey_pattern_ref: Id,
    pub passing_times: Vec<TimetabledPassingTime>,
}

impl ServiceJourney {
    pub fn new(
        id: Id,
        name: impl Into<String>,
        journey_pattern_ref: Id,
        passing_times: Vec<TimetabledPassingTime>,
    ) -> Self {
        Self {
            id,
            name: non_blank(name),
            journey_pattern_ref,
            passing_times,
        }
    }
}

impl ContentHash for ServiceJourney {
    const KIND: &'static str = "ServiceJourney";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.id(&self.id)
            .opt_str(self.name.as_deref())
            .id(&self.journey_pattern_ref)
            .seq(self.passing_times.iter());
    }
}

content_identity!(
    ScheduledStopPoint,
    Line,
    Route,
    LinkSequenceProjection,
    ServiceLink,
    StopPointInJourneyPattern,
    ServiceLinkInJourneyPattern,
    JourneyPattern,
    TimetabledPassingTime,
    ServiceJourney,
);
