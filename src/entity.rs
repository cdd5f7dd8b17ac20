//! Typed entities held by the database.

use crate::hash::ContentHash;
use crate::id::Id;
use crate::model::{
    JourneyPattern, Line, Route, ScheduledStopPoint, ServiceJourney, ServiceLink,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The kinds of entity the database stores, named as in their ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    ScheduledStopPoint,
    Line,
    Route,
    ServiceLink,
    JourneyPattern,
    ServiceJourney,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::ScheduledStopPoint,
        EntityKind::Line,
        EntityKind::Route,
        EntityKind::ServiceLink,
        EntityKind::JourneyPattern,
        EntityKind::ServiceJourney,
    ];

    /// The type segment ids of this kind carry.
    pub const fn type_name(self) -> &'static str {
        match self {
            EntityKind::ScheduledStopPoint => "ScheduledStopPoint",
            EntityKind::Line => "Line",
            EntityKind::Route => "Route",
            EntityKind::ServiceLink => "ServiceLink",
            EntityKind::JourneyPattern => "JourneyPattern",
            EntityKind::ServiceJourney => "ServiceJourney",
        }
    }

    /// The kind an id declares, if it is one of ours.
    pub fn of(id: &Id) -> Option<EntityKind> {
        Self::ALL.into_iter().find(|kind| id.is(kind.type_name()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One entity of any kind, shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    ScheduledStopPoint(Arc<ScheduledStopPoint>),
    Line(Arc<Line>),
    Route(Arc<Route>),
    ServiceLink(Arc<ServiceLink>),
    JourneyPattern(Arc<JourneyPattern>),
    ServiceJourney(Arc<ServiceJourney>),
}

impl Entity {
    pub fn id(&self) -> &Id {
        match self {
            Entity::ScheduledStopPoint(e) => &e.id,
            Entity::Line(e) => &e.id,
            Entity::Route(e) => &e.id,
            Entity::ServiceLink(e) => &e.id,
            Entity::JourneyPattern(e) => &e.id,
            Entity::ServiceJourney(e) => &e.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::ScheduledStopPoint(_) => EntityKind::ScheduledStopPoint,
            Entity::Line(_) => EntityKind::Line,
            Entity::Route(_) => EntityKind::Route,
            Entity::ServiceLink(_) => EntityKind::ServiceLink,
            Entity::JourneyPattern(_) => EntityKind::JourneyPattern,
            Entity::ServiceJourney(_) => EntityKind::ServiceJourney,
        }
    }

    pub fn content_id(&self) -> Uuid {
        match self {
            Entity::ScheduledStopPoint(e) => e.content_id(),
            Entity::Line(e) => e.content_id(),
            Entity::Route(e) => e.content_id(),
            Entity::ServiceLink(e) => e.content_id(),
            Entity::JourneyPattern(e) => e.content_id(),
            Entity::ServiceJourney(e) => e.content_id(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind(), self.id())
    }
}

/// A record type that can be looked up by id.
pub trait EntityType: ContentHash + Send + Sync + Sized + 'static {
    const ENTITY_KIND: EntityKind;

    fn id(&self) -> &Id;

    fn from_entity(entity: &Entity) -> Option<&Arc<Self>>;
}

macro_rules! entity_type {
    ($($ty:ident),+ $(,)?) => {$(
        impl EntityType for $ty {
            const ENTITY_KIND: EntityKind = EntityKind::$ty;

            fn id(&self) -> &Id {
                &self.id
            }

            fn from_entity(entity: &Entity) -> Option<&Arc<Self>> {
                match entity {
                    Entity::$ty(e) => Some(e),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Entity {
            fn from(record: $ty) -> Self {
                Entity::$ty(Arc::new(record))
            }
        }

        impl From<Arc<$ty>> for Entity {
            fn from(record: Arc<$ty>) -> Self {
                Entity::$ty(record)
            }
        }
    )+};
}

entity_type!(
    ScheduledStopPoint,
    Line,
    Route,
    ServiceLink,
    JourneyPattern,
    ServiceJourney,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_id() {
        let id: Id = "RUT:ServiceLink:1".parse().unwrap();
        assert_eq!(EntityKind::of(&id), Some(EntityKind::ServiceLink));
        let other: Id = "RUT:DayType:1".parse().unwrap();
        assert_eq!(EntityKind::of(&other), None);
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let id: Id = "RUT:Line:31".parse().unwrap();
        let entity: Entity = Line::new(id.clone(), "31", "bus").into();
        assert_eq!(entity.kind(), EntityKind::Line);
        assert_eq!(entity.id(), &id);
        assert!(Line::from_entity(&entity).is_some());
        assert!(Route::from_entity(&entity).is_none());
        assert_eq!(entity.to_string(), "Line[RUT:Line:31]");
    }

    #[test]
    fn test_equal_by_content() {
        let id: Id = "RUT:ScheduledStopPoint:7".parse().unwrap();
        let a: Entity = ScheduledStopPoint::new(id.clone(), "Storo").into();
        let b: Entity = ScheduledStopPoint::new(id, "Storo").into();
        assert_eq!(a, b);
        assert_eq!(a.content_id(), b.content_id());
    }
}
