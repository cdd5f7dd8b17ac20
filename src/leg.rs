//! Service legs: a service link resolved against its stop points.

use crate::hash::{ContentHash, ContentHasher, content_identity};
use crate::id::Id;
use crate::index::Boxed;
use crate::model::{ScheduledStopPoint, ServiceLink};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use stopgrid_types::{BoundingBox, Point, Scale};
use uuid::Uuid;

/// The geometric edge between two stop points.
///
/// The box is the union of the link's projection boxes, computed on first
/// access. A leg whose link has no trajectory points has no box.
pub struct ServiceLeg {
    service_link: Arc<ServiceLink>,
    from: Option<Arc<ScheduledStopPoint>>,
    to: Option<Arc<ScheduledStopPoint>>,
    order: Option<u32>,
    bbox: OnceCell<Option<BoundingBox>>,
    content_id: OnceCell<Uuid>,
}

impl ServiceLeg {
    pub fn new(
        service_link: Arc<ServiceLink>,
        from: Option<Arc<ScheduledStopPoint>>,
        to: Option<Arc<ScheduledStopPoint>>,
    ) -> Self {
        Self {
            service_link,
            from,
            to,
            order: None,
            bbox: OnceCell::new(),
            content_id: OnceCell::new(),
        }
    }

    /// Position of the leg within a journey pattern.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self.content_id = OnceCell::new();
        self
    }

    /// Id of the underlying service link.
    pub fn id(&self) -> &Id {
        &self.service_link.id
    }

    pub fn service_link(&self) -> &Arc<ServiceLink> {
        &self.service_link
    }

    pub fn from(&self) -> Option<&Arc<ScheduledStopPoint>> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&Arc<ScheduledStopPoint>> {
        self.to.as_ref()
    }

    pub fn order(&self) -> Option<u32> {
        self.order
    }

    pub fn start_point(&self) -> Option<&Point> {
        self.service_link.start_point()
    }

    pub fn end_point(&self) -> Option<&Point> {
        self.service_link.end_point()
    }

    /// The distinct grid cells the leg's trajectory points fall in, sorted.
    pub fn scaled_boxes(&self, scale: Scale) -> Vec<BoundingBox> {
        let mut cells: Vec<BoundingBox> = self
            .service_link
            .projections
            .iter()
            .flat_map(|projection| projection.trajectory())
            .map(|point| point.grid_cell(scale))
            .collect();
        cells.sort();
        cells.dedup();
        cells
    }
}

impl Boxed for ServiceLeg {
    fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bbox
            .get_or_init(|| {
                BoundingBox::union_all(
                    self.service_link
                        .projections
                        .iter()
                        .filter_map(|projection| projection.bounding_box()),
                )
            })
            .as_ref()
    }
}

impl ContentHash for ServiceLeg {
    const KIND: &'static str = "ServiceLeg";

    fn hash_fields(&self, h: &mut ContentHasher) {
        h.content(&*self.service_link);
        for stop in [&self.from, &self.to] {
            match stop {
                Some(stop) => h.flag(true).content(&**stop),
                None => h.flag(false),
            };
        }
        match self.order {
            Some(order) => h.flag(true).u32(order),
            None => h.flag(false),
        };
    }

    fn content_id(&self) -> Uuid {
        *self.content_id.get_or_init(|| {
            let mut hasher = ContentHasher::new(Self::KIND);
            self.hash_fields(&mut hasher);
            hasher.finish()
        })
    }
}

content_identity!(ServiceLeg);

fn stop_name(stop: Option<&Arc<ScheduledStopPoint>>) -> String {
    match stop {
        Some(stop) => match stop.name() {
            Some(name) => name.to_string(),
            None => stop.id.to_string(),
        },
        None => "?".to_string(),
    }
}

impl fmt::Debug for ServiceLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLeg")
            .field("service_link", &self.service_link.id)
            .field("from", &self.from.as_ref().map(|s| &s.id))
            .field("to", &self.to.as_ref().map(|s| &s.id))
            .field("order", &self.order)
            .finish()
    }
}

impl fmt::Display for ServiceLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ServiceLeg[{} => {}",
            stop_name(self.from.as_ref()),
            stop_name(self.to.as_ref())
        )?;
        if let Some(distance) = self.service_link.distance {
            write!(f, ": {}", distance)?;
        }
        f.write_str("]")
    }
}
