//! Grid index over boxed entities.
//!
//! Every entity with a bounding box is filed under each grid cell (at one
//! fixed [`Scale`]) its box covers. A range query collects the buckets of the
//! cells covering the query boxes, then keeps only the entities whose own box
//! overlaps one of the query boxes. Entities covering more cells than the
//! configured ceiling are not bucketed; they are checked exactly on every
//! query instead.
//!
//! The index is built once and never mutated, so shared references can be
//! queried from any number of threads.

use crate::validation::validate_query_box;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use stopgrid_types::{BoundingBox, Scale};

/// Something that may have a bounding box.
pub trait Boxed {
    /// The box, computed once. `None` when there is no geometry.
    fn bounding_box(&self) -> Option<&BoundingBox>;

    fn overlaps_any(&self, boxes: &[BoundingBox]) -> bool {
        self.bounding_box()
            .is_some_and(|own| boxes.iter().any(|query| own.overlaps(query)))
    }
}

impl<T: Boxed + ?Sized> Boxed for Arc<T> {
    fn bounding_box(&self) -> Option<&BoundingBox> {
        (**self).bounding_box()
    }
}

/// Bucket statistics of one index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexStats {
    /// Entities held, boxed or not.
    pub entries: usize,
    /// Entities with a bounding box.
    pub boxed: usize,
    /// Boxed entities over the cell ceiling, checked on every query.
    pub oversized: usize,
    /// Non-empty cells.
    pub cells: usize,
    pub avg_bucket_len: f64,
    pub max_bucket_len: usize,
}

/// Cell to entity multimap for one entity type.
pub struct GridIndex<T> {
    scale: Scale,
    max_cells: u64,
    entries: Vec<Arc<T>>,
    cells: FxHashMap<BoundingBox, Vec<usize>>,
    oversized: Vec<usize>,
    boxed: usize,
}

impl<T: Boxed> GridIndex<T> {
    /// File every item under the cells its box covers.
    pub fn build<I>(scale: Scale, max_cells: u64, items: I) -> Self
    where
        I: IntoIterator<Item = Arc<T>>,
    {
        let entries: Vec<Arc<T>> = items.into_iter().collect();
        let mut cells: FxHashMap<BoundingBox, Vec<usize>> = FxHashMap::default();
        let mut oversized = Vec::new();
        let mut boxed = 0;

        for (slot, entry) in entries.iter().enumerate() {
            let Some(bbox) = entry.bounding_box() else {
                continue;
            };
            boxed += 1;

            let covering = bbox.scaled_boxes(scale);
            if covering.cell_count() > max_cells {
                warn!(
                    "Box {} covers {} cells at {}, above the ceiling of {}; checking it on every query",
                    bbox,
                    covering.cell_count(),
                    scale,
                    max_cells
                );
                oversized.push(slot);
                continue;
            }
            for cell in covering {
                cells.entry(cell).or_default().push(slot);
            }
        }

        Self {
            scale,
            max_cells,
            entries,
            cells,
            oversized,
            boxed,
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn max_cells(&self) -> u64 {
        self.max_cells
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.iter()
    }

    /// Entities whose box overlaps at least one of `boxes`, each once, in
    /// insertion order.
    ///
    /// Query boxes that are not finite are skipped. An empty slice gives an
    /// empty result.
    pub fn query(&self, boxes: &[BoundingBox]) -> Vec<Arc<T>> {
        let queries: Vec<BoundingBox> = boxes
            .iter()
            .filter(|query| match validate_query_box(query) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Rejecting query box: {}", e);
                    false
                }
            })
            .cloned()
            .collect();
        if queries.is_empty() {
            return Vec::new();
        }

        let mut slots: Vec<usize> = Vec::new();
        let mut full_scan = false;
        for query in &queries {
            let covering = query.scaled_boxes(self.scale);
            if covering.cell_count() > self.cells.len() as u64 {
                debug!(
                    "Query box {} covers {} cells, more than the {} occupied; scanning",
                    query,
                    covering.cell_count(),
                    self.cells.len()
                );
                full_scan = true;
                break;
            }
            for cell in covering {
                if let Some(bucket) = self.cells.get(&cell) {
                    slots.extend_from_slice(bucket);
                }
            }
        }

        if full_scan {
            return self
                .entries
                .iter()
                .filter(|entry| entry.overlaps_any(&queries))
                .cloned()
                .collect();
        }

        slots.extend_from_slice(&self.oversized);
        slots.sort_unstable();
        slots.dedup();
        slots
            .into_iter()
            .map(|slot| &self.entries[slot])
            .filter(|entry| entry.overlaps_any(&queries))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let total: usize = self.cells.values().map(Vec::len).sum();
        IndexStats {
            entries: self.entries.len(),
            boxed: self.boxed,
            oversized: self.oversized.len(),
            cells: self.cells.len(),
            avg_bucket_len: if self.cells.is_empty() {
                0.0
            } else {
                total as f64 / self.cells.len() as f64
            },
            max_bucket_len: self.cells.values().map(Vec::len).max().unwrap_or(0),
        }
    }
}
