//! Trip definitions and the journeys that run them.
//!
//! A [`TripDefinition`] is a journey pattern with every reference resolved:
//! its route and line, its stop points in order and a [`ServiceLeg`] per
//! link in sequence. A [`Journey`] is one service journey running a trip
//! definition, with its passing times attached to the pattern's stops.

use crate::hash::{ContentHash, ContentHasher, content_identity};
use crate::id::Id;
use crate::index::Boxed;
use crate::leg::ServiceLeg;
use crate::model::{
    JourneyPattern, Line, Route, ScheduledStopPoint, ServiceJourney, StopPointInJourneyPattern,
};
use chrono::NaiveTime;
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use stopgrid_types::{BoundingBox, Scale};
use uuid::Uuid;

/// A stop of a journey pattern and the stop point it names, if known.
#[derive(Debug, Clone)]
pub struct PatternStop {
    pub stop_in_pattern: StopPointInJourneyPattern,
    pub stop_point: Option<Arc<ScheduledStopPoint>>,
}

impl PatternStop {
    pub fn name(&self) -> Option<&str> {
        self.stop_point.as_ref().and_then(|stop| stop.name())
    }
}

impl ContentHash for PatternStop {
    const KIND: &'static str = "PatternStop";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.content(&self.stop_in_pattern);
        match &self.stop_point {
            Some(stop) => h.flag(true).content(&**stop),
            None => h.flag(false),
        };
    }
}

/// A resolved journey pattern.
pub struct TripDefinition {
    pattern: Arc<JourneyPattern>,
    route: Option<Arc<Route>>,
    line: Option<Arc<Line>>,
    stops: Vec<PatternStop>,
    legs: Vec<Arc<ServiceLeg>>,
    bbox: OnceCell<Option<BoundingBox>>,
    content_id: OnceCell<Uuid>,
}

impl TripDefinition {
    /// Stops and legs are put in pattern order; equal orders keep their
    /// given order.
    pub fn new(
        pattern: Arc<JourneyPattern>,
        route: Option<Arc<Route>>,
        line: Option<Arc<Line>>,
        mut stops: Vec<PatternStop>,
        mut legs: Vec<Arc<ServiceLeg>>,
    ) -> Self {
        stops.sort_by_key(|stop| stop.stop_in_pattern.order);
        legs.sort_by_key(|leg| leg.order().unwrap_or(u32::MAX));
        Self {
            pattern,
            route,
            line,
            stops,
            legs,
            bbox: OnceCell::new(),
            content_id: OnceCell::new(),
        }
    }

    /// Id of the journey pattern.
    pub fn id(&self) -> &Id {
        &self.pattern.id
    }

    pub fn name(&self) -> Option<&str> {
        self.pattern.name.as_deref()
    }

    pub fn journey_pattern(&self) -> &Arc<JourneyPattern> {
        &self.pattern
    }

    pub fn route(&self) -> Option<&Arc<Route>> {
        self.route.as_ref()
    }

    pub fn line(&self) -> Option<&Arc<Line>> {
        self.line.as_ref()
    }

    pub fn stop_points(&self) -> &[PatternStop] {
        &self.stops
    }

    pub fn legs(&self) -> &[Arc<ServiceLeg>] {
        &self.legs
    }

    /// The pattern stop with the given id.
    pub fn stop(&self, stop_in_pattern: &Id) -> Option<&PatternStop> {
        self.stops
            .iter()
            .find(|stop| &stop.stop_in_pattern.id == stop_in_pattern)
    }

    /// The distinct cells the trajectory points of all legs fall in, sorted.
    pub fn scaled_boxes(&self, scale: Scale) -> Vec<BoundingBox> {
        let mut cells: Vec<BoundingBox> = self
            .legs
            .iter()
            .flat_map(|leg| leg.scaled_boxes(scale))
            .collect();
        cells.sort();
        cells.dedup();
        cells
    }
}

impl Boxed for TripDefinition {
    fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bbox
            .get_or_init(|| {
                BoundingBox::union_all(self.legs.iter().filter_map(|leg| leg.bounding_box()))
            })
            .as_ref()
    }
}

impl ContentHash for TripDefinition {
    const KIND: &'static str = "TripDefinition";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.content(&*self.pattern);
        match &self.route {
            Some(route) => h.flag(true).content(&**route),
            None => h.flag(false),
        };
        match &self.line {
            Some(line) => h.flag(true).content(&**line),
            None => h.flag(false),
        };
        h.seq(self.stops.iter())
            .seq(self.legs.iter().map(|leg| &**leg));
    }

    fn content_id(&self) -> Uuid {
        *self.content_id.get_or_init(|| {
            let mut hasher = ContentHasher::new(Self::KIND);
            self.hash_fields(&mut hasher);
            hasher.finish()
        })
    }
}

content_identity!(TripDefinition);

impl fmt::Debug for TripDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripDefinition")
            .field("id", self.id())
            .field("stops", &self.stops.len())
            .field("legs", &self.legs.len())
            .finish()
    }
}

impl fmt::Display for TripDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .stops
            .iter()
            .map(|stop| stop.name().unwrap_or("?"))
            .collect();
        write!(f, "TripDefinition[{} stopPoints:", self.name().unwrap_or("?"))?;
        if names.len() > 6 {
            write!(
                f,
                "{} ({} more) {}",
                names[..3].join(" => "),
                names.len() - 6,
                names[names.len() - 3..].join(" => ")
            )?;
        } else {
            f.write_str(&names.join(" => "))?;
        }
        f.write_str("]")
    }
}

/// A passing time resolved against its trip's stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStop {
    pub passing_time_id: Id,
    pub stop_point: Option<Arc<ScheduledStopPoint>>,
    pub departure: Option<NaiveTime>,
}

/// One service journey running a trip definition.
#[derive(Debug, Clone)]
pub struct Journey {
    service_journey: Arc<ServiceJourney>,
    trip: Arc<TripDefinition>,
    stops: Vec<ScheduledStop>,
}

impl Journey {
    /// Attach the journey's passing times to the trip's stops, in pattern
    /// order. Passing times naming a stop the pattern lacks come last.
    pub fn new(service_journey: Arc<ServiceJourney>, trip: Arc<TripDefinition>) -> Self {
        let mut timed: Vec<(u32, ScheduledStop)> = service_journey
            .passing_times
            .iter()
            .map(|passing| {
                let stop = trip.stop(&passing.stop_point_in_journey_pattern_ref);
                (
                    stop.map_or(u32::MAX, |stop| stop.stop_in_pattern.order),
                    ScheduledStop {
                        passing_time_id: passing.id.clone(),
                        stop_point: stop.and_then(|stop| stop.stop_point.clone()),
                        departure: passing.departure_time,
                    },
                )
            })
            .collect();
        timed.sort_by_key(|(order, _)| *order);

        Self {
            service_journey,
            trip,
            stops: timed.into_iter().map(|(_, stop)| stop).collect(),
        }
    }

    /// Id of the service journey.
    pub fn id(&self) -> &Id {
        &self.service_journey.id
    }

    pub fn service_journey(&self) -> &Arc<ServiceJourney> {
        &self.service_journey
    }

    pub fn trip(&self) -> &Arc<TripDefinition> {
        &self.trip
    }

    pub fn scheduled_stops(&self) -> &[ScheduledStop] {
        &self.stops
    }

    /// Departure from the first stop.
    pub fn start_time(&self) -> Option<NaiveTime> {
        self.stops.first().and_then(|stop| stop.departure)
    }

    /// Departure from the last stop.
    pub fn end_time(&self) -> Option<NaiveTime> {
        self.stops.last().and_then(|stop| stop.departure)
    }
}

impl Boxed for Journey {
    fn bounding_box(&self) -> Option<&BoundingBox> {
        self.trip.bounding_box()
    }
}

/// Journeys order by start time, unknown start times last.
impl Ord for Journey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.start_time(), other.start_time()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.id().cmp(other.id()))
        .then_with(|| {
            self.service_journey
                .content_id()
                .cmp(&other.service_journey.content_id())
        })
    }
}

impl PartialOrd for Journey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Journey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Journey {}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self
            .trip
            .line()
            .and_then(|line| line.name.as_deref())
            .unwrap_or("?");
        match self.start_time() {
            Some(start) => write!(f, "Journey[{} {} @{}]", self.id().local(), line, start),
            None => write!(f, "Journey[{} {} @unknown]", self.id().local(), line),
        }
    }
}
