use geo::Rect;
use rstar::{RTree, AABB};
use tracing::debug;

use crate::building::{BuildingId, BuildingRepository};
use crate::error::IndexQueryError;
use crate::geom::BoundingBox;

/// R-tree over the bounding boxes of all footprints in a repository.
///
/// Built once before counting starts and read-only afterwards, so concurrent
/// queries need no synchronization.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<BoundingBox>,
}

impl SpatialIndex {
    /// Bulk-load the index from every footprint's cached bounding box.
    pub fn build(repository: &BuildingRepository) -> Self {
        let rtree = RTree::bulk_load(
            repository.all().iter()
                .map(|b| BoundingBox::new(b.id(), *b.footprint().bbox()))
                .collect()
        );
        debug!(entries = rtree.size(), "built spatial index");
        Self { rtree }
    }

    /// Number of indexed footprints.
    #[inline] pub fn len(&self) -> usize { self.rtree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.rtree.size() == 0 }

    /// Ids of every footprint whose bounding box overlaps `query`, boundary
    /// contact included. May contain false positives, never false negatives.
    pub fn query(&self, query: Rect<f64>) -> Result<impl Iterator<Item = BuildingId> + '_, IndexQueryError> {
        let (min, max) = (query.min(), query.max());
        if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
            return Err(IndexQueryError::NonFiniteBounds {
                min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y,
            });
        }

        let envelope = AABB::from_corners(min.into(), max.into());
        Ok(self.rtree.locate_in_envelope_intersecting(&envelope).map(|bb| bb.id()))
    }
}
