mod id;
mod repository;

pub use id::BuildingId;
pub use repository::{polygon_centroid, BuildingRecord, BuildingRepository, LoadOutcome, Rejected};

use geo::Coord;

use crate::geom::Footprint;

/// A building: its footprint and the externally supplied centroid.
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    id: BuildingId,
    source_id: u64,
    footprint: Footprint,
    centroid: Coord<f64>,
}

impl Building {
    pub(crate) fn new(id: BuildingId, source_id: u64, footprint: Footprint, centroid: Coord<f64>) -> Self {
        Self { id, source_id, footprint, centroid }
    }

    #[inline] pub fn id(&self) -> BuildingId { self.id }

    /// Identifier of the input record this building was loaded from.
    #[inline] pub fn source_id(&self) -> u64 { self.source_id }

    #[inline] pub fn footprint(&self) -> &Footprint { &self.footprint }

    #[inline] pub fn centroid(&self) -> Coord<f64> { self.centroid }
}
