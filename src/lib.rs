#![doc = "Line-of-sight obstruction counts between building footprints"]
mod building;
mod config;
mod counter;
mod error;
mod geom;
mod index;
mod matrix;
mod result;

pub mod io;

#[doc(inline)]
pub use building::{polygon_centroid, Building, BuildingId, BuildingRecord, BuildingRepository, LoadOutcome, Rejected};

#[doc(inline)]
pub use config::CrossingConfig;

#[doc(inline)]
pub use counter::{CancelToken, CountOutcome, CountStats, ObstructionCounter};

#[doc(inline)]
pub use error::{CrossingError, GeometryError, IndexQueryError, InvariantError};

#[doc(inline)]
pub use geom::{boxes_overlap, derived_tolerance, inflate, segment_intersects_footprint, Footprint, Segment};

#[doc(inline)]
pub use index::SpatialIndex;

#[doc(inline)]
pub use matrix::CrossingMatrix;

#[doc(inline)]
pub use result::{compute_crossings, CoordinateTable, CrossingResult};
