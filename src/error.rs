use thiserror::Error;

use crate::building::BuildingId;

/// A footprint failed the validity precondition and was excluded at load time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("footprint has {distinct} distinct vertices, at least 3 are required")]
    TooFewVertices { distinct: usize },

    #[error("footprint vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate { vertex: usize },
}

/// An internal invariant was violated. These are defects in the core, never bad input,
/// and always abort the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantError {
    #[error("building {0} has no centroid")]
    MissingCentroid(BuildingId),

    #[error("building {0} is not in the repository")]
    UnknownBuilding(BuildingId),

    #[error("matrix cell ({row}, {col}) written more than once")]
    DuplicateWrite { row: BuildingId, col: BuildingId },

    #[error("matrix cell ({row}, {col}) was never written")]
    UnsetCell { row: BuildingId, col: BuildingId },

    #[error("diagonal cell of {id} is {value}, expected 0")]
    NonZeroDiagonal { id: BuildingId, value: u32 },

    #[error("matrix is asymmetric at ({row}, {col}): {forward} != {backward}")]
    Asymmetric { row: BuildingId, col: BuildingId, forward: u32, backward: u32 },

    #[error("count {count} at ({row}, {col}) exceeds the maximum of {max}")]
    CountOutOfBounds { row: BuildingId, col: BuildingId, count: u32, max: u32 },

    #[error("matrix covers {matrix} buildings but the repository holds {repository}")]
    SizeMismatch { matrix: usize, repository: usize },
}

/// The spatial index could not answer a query. Callers fall back to a full scan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexQueryError {
    #[error("query box has non-finite bounds: ({min_x}, {min_y}) - ({max_x}, {max_y})")]
    NonFiniteBounds { min_x: f64, min_y: f64, max_x: f64, max_y: f64 },
}

/// Run-level failure of the obstruction computation. No output is produced.
#[derive(Error, Debug)]
pub enum CrossingError {
    #[error(transparent)]
    Invariant(#[from] InvariantError),

    #[error("computation was cancelled before all pairs completed")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
