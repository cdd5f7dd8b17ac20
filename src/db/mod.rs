//! The transit network database.
//!
//! This module defines the [`Database`] type: every entity of a network,
//! resolved into service legs, trip definitions and journeys, with grid
//! indexes answering range queries over them.

use crate::config::{Config, Region};
use crate::entity::{Entity, EntityKind, EntityType};
use crate::error::{Result, StopgridError};
use crate::id::Id;
use crate::index::{GridIndex, IndexStats};
use crate::leg::ServiceLeg;
use crate::model::ServiceJourney;
use crate::trip::{Journey, TripDefinition};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use stopgrid_types::{BoundingBox, Scale};

mod build;

/// Statistics of a built database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbStats {
    /// Stored entities per kind
    pub entities: BTreeMap<EntityKind, usize>,
    /// Service journeys attached to a trip definition
    pub journeys: usize,
    pub service_legs: IndexStats,
    pub trip_definitions: IndexStats,
}

/// An immutable, indexed transit network.
///
/// The database is built once from the full entity set, see
/// [`DatabaseBuilder`](crate::DatabaseBuilder). Nothing is mutated afterwards,
/// so a `&Database` can be queried from many threads at once.
///
/// # Examples
///
/// ```rust
/// use stopgrid::{Database, LinkSequenceProjection, Point, ServiceLink};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let link = ServiceLink::new(
///     "RUT:ServiceLink:1".parse()?,
///     "RUT:ScheduledStopPoint:1".parse()?,
///     "RUT:ScheduledStopPoint:2".parse()?,
///     vec![LinkSequenceProjection::from_pos_list(
///         "RUT:LinkSequenceProjection:1".parse()?,
///         "59.9111 10.7503 59.9127 10.7412",
///     )?],
/// );
/// let db = Database::builder().entity(link).build()?;
///
/// let query = Point::new(59.912, 10.745)?.box_to(&Point::new(59.913, 10.746)?);
/// let legs = db.service_legs(&[query]);
/// assert_eq!(legs.len(), 1);
/// assert_eq!(legs[0].id().to_string(), "RUT:ServiceLink:1");
/// # Ok(())
/// # }
/// ```
pub struct Database {
    config: Config,
    entities: Vec<Entity>,
    by_id: FxHashMap<Id, usize>,
    service_legs: GridIndex<ServiceLeg>,
    trip_definitions: GridIndex<TripDefinition>,
    trips_by_pattern: FxHashMap<Id, Arc<TripDefinition>>,
    journeys_by_pattern: FxHashMap<Id, Vec<Arc<ServiceJourney>>>,
}

impl Database {
    pub fn builder() -> crate::builder::DatabaseBuilder {
        crate::builder::DatabaseBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The indexing resolution.
    pub fn scale(&self) -> Scale {
        self.config.scale
    }

    /// The covered region.
    pub fn region(&self) -> Region {
        self.config.region_or_default()
    }

    pub fn region_box(&self) -> BoundingBox {
        self.config.region_box()
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All stored entities, in the order they were added.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// All stored entities of one type.
    pub fn entities_of<E: EntityType>(&self) -> impl Iterator<Item = &Arc<E>> {
        self.entities.iter().filter_map(E::from_entity)
    }

    pub fn entity(&self, id: &Id) -> Option<&Entity> {
        self.by_id.get(id).map(|&slot| &self.entities[slot])
    }

    /// Look up an entity by id as type `E`.
    ///
    /// Fails when the id names another type, or when the entity stored under
    /// it is not an `E`. An unknown id of the right type is `Ok(None)`.
    pub fn get<E: EntityType>(&self, id: &Id) -> Result<Option<Arc<E>>> {
        let expected = E::ENTITY_KIND.type_name();
        if !id.is(expected) {
            return Err(StopgridError::TypeMismatch {
                id: id.clone(),
                expected,
            });
        }
        match self.entity(id) {
            None => Ok(None),
            Some(entity) => match E::from_entity(entity) {
                Some(found) => Ok(Some(Arc::clone(found))),
                None => Err(StopgridError::TypeMismatch {
                    id: id.clone(),
                    expected,
                }),
            },
        }
    }

    /// Service legs overlapping at least one of `boxes`.
    pub fn service_legs(&self, boxes: &[BoundingBox]) -> Vec<Arc<ServiceLeg>> {
        self.service_legs.query(boxes)
    }

    /// Trip definitions overlapping at least one of `boxes`.
    pub fn trip_definitions(&self, boxes: &[BoundingBox]) -> Vec<Arc<TripDefinition>> {
        self.trip_definitions.query(boxes)
    }

    /// The journeys running the trip definitions overlapping `boxes`.
    ///
    /// Journeys are grouped by trip definition, in query result order, and
    /// ordered by start time within a trip.
    pub fn journeys(&self, boxes: &[BoundingBox]) -> Vec<Journey> {
        self.trip_definitions(boxes)
            .into_iter()
            .flat_map(|trip| {
                let mut journeys: Vec<Journey> = self
                    .journeys_by_pattern
                    .get(trip.id())
                    .into_iter()
                    .flatten()
                    .map(|service_journey| {
                        Journey::new(Arc::clone(service_journey), Arc::clone(&trip))
                    })
                    .collect();
                journeys.sort();
                journeys
            })
            .collect()
    }

    /// The trip definition of a journey pattern.
    pub fn trip_definition(&self, journey_pattern: &Id) -> Option<&Arc<TripDefinition>> {
        self.trips_by_pattern.get(journey_pattern)
    }

    pub fn stats(&self) -> DbStats {
        let mut entities = BTreeMap::new();
        for entity in &self.entities {
            *entities.entry(entity.kind()).or_insert(0) += 1;
        }
        DbStats {
            entities,
            journeys: self.journeys_by_pattern.values().map(Vec::len).sum(),
            service_legs: self.service_legs.stats(),
            trip_definitions: self.trip_definitions.stats(),
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self.region();
        write!(
            f,
            "Database[({}, {})-({}, {}) /{} entities={}]",
            region.min_lat,
            region.min_lon,
            region.max_lat,
            region.max_lon,
            self.scale(),
            self.entities.len()
        )
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("entities", &self.entities.len())
            .field("service_legs", &self.service_legs.len())
            .field("trip_definitions", &self.trip_definitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Boxed;
    use crate::model::{
        JourneyPattern, Line, LinkSequenceProjection, Route, ScheduledStopPoint, ServiceLink,
        ServiceLinkInJourneyPattern, StopPointInJourneyPattern, TimetabledPassingTime,
    };
    use stopgrid_types::Point;

    fn id(s: &str) -> Id {
        s.parse().unwrap()
    }

    fn stop(n: u32, name: &str) -> Entity {
        ScheduledStopPoint::new(id(&format!("RUT:ScheduledStopPoint:{}", n)), name).into()
    }

    fn link(n: u32, pos_list: &str) -> Entity {
        ServiceLink::new(
            id(&format!("RUT:ServiceLink:{}", n)),
            id(&format!("RUT:ScheduledStopPoint:{}", n)),
            id(&format!("RUT:ScheduledStopPoint:{}", n + 1)),
            vec![
                LinkSequenceProjection::from_pos_list(
                    id(&format!("RUT:LinkSequenceProjection:{}", n)),
                    pos_list,
                )
                .unwrap(),
            ],
        )
        .into()
    }

    fn pattern(n: u32, links: &[u32]) -> Entity {
        let points = (0..=links.len() as u32)
            .map(|i| {
                StopPointInJourneyPattern::new(
                    id(&format!("RUT:StopPointInJourneyPattern:{}-{}", n, i + 1)),
                    i + 1,
                    id(&format!("RUT:ScheduledStopPoint:{}", links.first().copied().unwrap_or(1) + i)),
                )
            })
            .collect();
        let links = links
            .iter()
            .enumerate()
            .map(|(i, l)| {
                ServiceLinkInJourneyPattern::new(
                    id(&format!("RUT:ServiceLinkInJourneyPattern:{}-{}", n, i + 1)),
                    i as u32 + 1,
                    id(&format!("RUT:ServiceLink:{}", l)),
                )
            })
            .collect();
        JourneyPattern::new(
            id(&format!("RUT:JourneyPattern:{}", n)),
            format!("Pattern {}", n),
            Some(id("RUT:Route:1")),
            points,
            links,
        )
        .into()
    }

    fn service_journey(n: u32, pattern: u32, start: &str) -> Entity {
        ServiceJourney::new(
            id(&format!("RUT:ServiceJourney:{}", n)),
            "",
            id(&format!("RUT:JourneyPattern:{}", pattern)),
            vec![
                TimetabledPassingTime::parse(
                    id(&format!("RUT:TimetabledPassingTime:{}", n)),
                    id(&format!("RUT:StopPointInJourneyPattern:{}-1", pattern)),
                    start,
                )
                .unwrap(),
            ],
        )
        .into()
    }

    fn network() -> Database {
        Database::builder()
            .entities(vec![
                stop(1, "Jernbanetorget"),
                stop(2, "Stortinget"),
                stop(3, "Nationaltheatret"),
                stop(10, "Bergen"),
                stop(11, "Arna"),
                Line::new(id("RUT:Line:1"), "1", "metro").into(),
                Route::new(id("RUT:Route:1"), "Eastbound", Some(id("RUT:Line:1"))).into(),
                link(1, "59.9111 10.7503 59.9127 10.7412"),
                link(2, "59.9127 10.7412 59.9149 10.7319"),
                link(10, "60.3900 5.3330 60.4200 5.4600"),
                pattern(1, &[1, 2]),
                pattern(2, &[10]),
                service_journey(1, 1, "08:10"),
                service_journey(2, 1, "07:40"),
                service_journey(3, 2, "09:00"),
            ])
            .build()
            .unwrap()
    }

    fn oslo() -> BoundingBox {
        Point::new(59.90, 10.70).unwrap().box_to(&Point::new(59.92, 10.76).unwrap())
    }

    #[test]
    fn test_service_legs_in_box() {
        let db = network();
        let legs = db.service_legs(&[oslo()]);
        let ids: Vec<_> = legs.iter().map(|l| l.id().local().to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(legs[0].from().and_then(|s| s.name()), Some("Jernbanetorget"));
        assert!(db.service_legs(&[]).is_empty());
    }

    #[test]
    fn test_trip_definitions_in_box() {
        let db = network();
        let trips = db.trip_definitions(&[oslo()]);
        assert_eq!(trips.len(), 1);
        let trip = &trips[0];
        assert_eq!(trip.id(), &id("RUT:JourneyPattern:1"));
        assert_eq!(trip.legs().len(), 2);
        assert_eq!(trip.line().and_then(|l| l.name.as_deref()), Some("1"));
        let bbox = trip.bounding_box().unwrap();
        assert_eq!(bbox.min(), &Point::new(59.9111, 10.7319).unwrap());
        assert_eq!(bbox.max(), &Point::new(59.9149, 10.7503).unwrap());
    }

    #[test]
    fn test_journeys_sorted_within_trip() {
        let db = network();
        let journeys = db.journeys(&[oslo()]);
        let ids: Vec<_> = journeys.iter().map(|j| j.id().local().to_string()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(
            journeys[0].scheduled_stops()[0]
                .stop_point
                .as_ref()
                .and_then(|s| s.name()),
            Some("Jernbanetorget")
        );

        let bergen = Point::new(60.0, 5.0).unwrap().box_to(&Point::new(61.0, 6.0).unwrap());
        let journeys = db.journeys(&[oslo(), bergen]);
        assert_eq!(journeys.len(), 3);
    }

    #[test]
    fn test_typed_lookup() {
        let db = network();
        let line = db.get::<Line>(&id("RUT:Line:1")).unwrap().unwrap();
        assert_eq!(line.name.as_deref(), Some("1"));
        assert!(db.get::<Line>(&id("RUT:Line:99")).unwrap().is_none());

        let err = db.get::<Route>(&id("RUT:Line:1")).unwrap_err();
        assert!(matches!(err, StopgridError::TypeMismatch { expected: "Route", .. }));
    }

    #[test]
    fn test_stats_and_accessors() {
        let db = network();
        assert_eq!(db.len(), 15);
        assert_eq!(db.scale(), Scale::DEFAULT);
        assert_eq!(db.region(), Region::NORWAY);
        let stats = db.stats();
        assert_eq!(stats.entities[&EntityKind::ScheduledStopPoint], 5);
        assert_eq!(stats.entities[&EntityKind::ServiceJourney], 3);
        assert_eq!(stats.journeys, 3);
        assert_eq!(stats.service_legs.entries, 3);
        assert_eq!(stats.trip_definitions.entries, 2);
        assert_eq!(db.entities_of::<ServiceLink>().count(), 3);
        assert!(db.trip_definition(&id("RUT:JourneyPattern:2")).is_some());
        assert!(db.to_string().starts_with("Database[(57, 4)-(72, 32)"));
    }
}
