//! Building a [`Database`] from entities.

use super::Database;
use crate::config::Config;
use crate::entity::{Entity, EntityKind, EntityType};
use crate::error::{Result, StopgridError};
use crate::id::Id;
use crate::index::GridIndex;
use crate::leg::ServiceLeg;
use crate::model::{JourneyPattern, Line, Route, ScheduledStopPoint, ServiceJourney, ServiceLink};
use crate::trip::{PatternStop, TripDefinition};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Entities keyed by id while references are resolved.
struct Entities {
    list: Vec<Entity>,
    by_id: FxHashMap<Id, usize>,
}

impl Entities {
    /// Keep the first entity of each id. Repeats with the same content are
    /// dropped quietly, repeats with other content are dropped with a warning.
    fn collect<I: IntoIterator<Item = Entity>>(entities: I) -> Self {
        let mut list: Vec<Entity> = Vec::new();
        let mut by_id: FxHashMap<Id, usize> = FxHashMap::default();

        for entity in entities {
            if EntityKind::of(entity.id()) != Some(entity.kind()) {
                warn!("{} has an id naming another type", entity);
            }
            match by_id.get(entity.id()) {
                Some(&slot) if list[slot].content_id() == entity.content_id() => {
                    debug!("Skipping repeated {}", entity);
                }
                Some(&slot) => {
                    warn!(
                        "Conflicting definitions of {}, keeping {}",
                        entity.id(),
                        list[slot]
                    );
                }
                None => {
                    by_id.insert(entity.id().clone(), list.len());
                    list.push(entity);
                }
            }
        }
        Self { list, by_id }
    }

    /// Resolve a reference, `None` when it is unknown or of another type.
    fn find<E: EntityType>(&self, id: &Id) -> Option<Arc<E>> {
        let entity = &self.list[*self.by_id.get(id)?];
        let found = E::from_entity(entity).cloned();
        if found.is_none() {
            warn!("Not a {}: {}", E::ENTITY_KIND, entity);
        }
        found
    }

    fn all<E: EntityType>(&self) -> impl Iterator<Item = &Arc<E>> {
        self.list.iter().filter_map(E::from_entity)
    }

    fn leg(&self, link: &Arc<ServiceLink>) -> ServiceLeg {
        ServiceLeg::new(
            Arc::clone(link),
            self.find::<ScheduledStopPoint>(&link.from_point),
            self.find::<ScheduledStopPoint>(&link.to_point),
        )
    }

    fn trip_definition(&self, pattern: &Arc<JourneyPattern>) -> TripDefinition {
        let route = pattern.route_ref.as_ref().and_then(|route_ref| {
            let route = self.find::<Route>(route_ref);
            if route.is_none() {
                warn!("No route found: {} => {}", pattern.id, route_ref);
            }
            route
        });
        let line = route
            .as_ref()
            .and_then(|route| route.line_ref.as_ref())
            .and_then(|line_ref| self.find::<Line>(line_ref));

        let stops = pattern
            .points_in_sequence
            .iter()
            .map(|stop_in_pattern| {
                let stop_point =
                    self.find::<ScheduledStopPoint>(&stop_in_pattern.scheduled_stop_point_ref);
                if stop_point.is_none() {
                    warn!(
                        "No stop point found: {} => {}",
                        pattern.id, stop_in_pattern.scheduled_stop_point_ref
                    );
                }
                PatternStop {
                    stop_in_pattern: stop_in_pattern.clone(),
                    stop_point,
                }
            })
            .collect();

        let legs = pattern
            .links_in_sequence
            .iter()
            .filter_map(|link_in_pattern| {
                match self.find::<ServiceLink>(&link_in_pattern.service_link_ref) {
                    Some(link) => Some(Arc::new(self.leg(&link).with_order(link_in_pattern.order))),
                    None => {
                        warn!(
                            "No service link found: {} => {}",
                            pattern.id, link_in_pattern.service_link_ref
                        );
                        None
                    }
                }
            })
            .collect();

        TripDefinition::new(Arc::clone(pattern), route, line, stops, legs)
    }
}

impl Database {
    /// Build from the full entity set.
    ///
    /// The configuration is validated first. Entities are resolved against
    /// each other; a dangling reference is logged and leaves the referring
    /// leg, stop or journey without its target.
    pub fn new<I>(config: Config, entities: I) -> Result<Self>
    where
        I: IntoIterator<Item = Entity>,
    {
        config.validate().map_err(StopgridError::Config)?;

        let entities = Entities::collect(entities);
        info!(
            "Building database at {} from {} entities",
            config.scale,
            entities.list.len()
        );

        let service_legs = GridIndex::build(
            config.scale,
            config.max_cells_per_entity,
            entities
                .all::<ServiceLink>()
                .map(|link| Arc::new(entities.leg(link))),
        );
        info!(
            "Indexed {} service legs in {} cells",
            service_legs.len(),
            service_legs.stats().cells
        );

        let trips: Vec<Arc<TripDefinition>> = entities
            .all::<JourneyPattern>()
            .map(|pattern| Arc::new(entities.trip_definition(pattern)))
            .collect();
        let trips_by_pattern: FxHashMap<Id, Arc<TripDefinition>> = trips
            .iter()
            .map(|trip| (trip.id().clone(), Arc::clone(trip)))
            .collect();
        let trip_definitions =
            GridIndex::build(config.scale, config.max_cells_per_entity, trips);
        info!(
            "Indexed {} trips in {} cells",
            trip_definitions.len(),
            trip_definitions.stats().cells
        );

        let mut journeys_by_pattern: FxHashMap<Id, Vec<Arc<ServiceJourney>>> =
            FxHashMap::default();
        for journey in entities.all::<ServiceJourney>() {
            if trips_by_pattern.contains_key(&journey.journey_pattern_ref) {
                journeys_by_pattern
                    .entry(journey.journey_pattern_ref.clone())
                    .or_default()
                    .push(Arc::clone(journey));
            } else {
                warn!(
                    "No journey pattern found: {} => {}",
                    journey.id, journey.journey_pattern_ref
                );
            }
        }
        info!(
            "Collected {} scheduled journeys",
            journeys_by_pattern.values().map(Vec::len).sum::<usize>()
        );

        let Entities { list, by_id } = entities;
        Ok(Self {
            config,
            entities: list,
            by_id,
            service_legs,
            trip_definitions,
            trips_by_pattern,
            journeys_by_pattern,
        })
    }
}
