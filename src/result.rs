use std::collections::BTreeMap;

use geo::Coord;
use tracing::info;

use crate::building::{BuildingId, BuildingRepository};
use crate::config::CrossingConfig;
use crate::counter::{CancelToken, CountStats, ObstructionCounter};
use crate::error::{CrossingError, InvariantError};
use crate::matrix::CrossingMatrix;

/// Centroid of every building, keyed by id. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTable {
    entries: BTreeMap<BuildingId, Coord<f64>>,
}

impl CoordinateTable {
    /// Project the repository onto `id -> centroid`.
    pub fn from_repository(repository: &BuildingRepository) -> Self {
        Self {
            entries: repository.all().iter().map(|b| (b.id(), b.centroid())).collect(),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[inline]
    pub fn get(&self, id: BuildingId) -> Option<Coord<f64>> {
        self.entries.get(&id).copied()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BuildingId, Coord<f64>)> + '_ {
        self.entries.iter().map(|(&id, &c)| (id, c))
    }

    /// Export shape: `{id: (x, y)}`.
    pub fn to_rows(&self) -> BTreeMap<u32, (f64, f64)> {
        self.iter().map(|(id, c)| (id.0, (c.x, c.y))).collect()
    }
}

/// The two outputs of a completed run. Only constructed from a fully
/// populated matrix whose size matches the repository.
#[derive(Debug, Clone)]
pub struct CrossingResult {
    coordinates: CoordinateTable,
    matrix: CrossingMatrix,
    stats: CountStats,
}

impl CrossingResult {
    /// Pair a finished matrix with the repository's coordinate table,
    /// re-checking the matrix postconditions.
    pub fn assemble(
        repository: &BuildingRepository,
        matrix: CrossingMatrix,
        stats: CountStats,
    ) -> Result<Self, InvariantError> {
        if matrix.len() != repository.count() {
            return Err(InvariantError::SizeMismatch { matrix: matrix.len(), repository: repository.count() });
        }
        matrix.verify()?;

        Ok(Self { coordinates: CoordinateTable::from_repository(repository), matrix, stats })
    }

    #[inline] pub fn coordinates(&self) -> &CoordinateTable { &self.coordinates }

    #[inline] pub fn matrix(&self) -> &CrossingMatrix { &self.matrix }

    #[inline] pub fn stats(&self) -> CountStats { self.stats }
}

/// Build the index, count every pair and assemble the outputs.
///
/// Either every pair completes and both outputs are returned, or an error is
/// returned and nothing is produced.
pub fn compute_crossings(
    repository: &BuildingRepository,
    config: &CrossingConfig,
    cancel: &CancelToken,
) -> Result<CrossingResult, CrossingError> {
    let outcome = ObstructionCounter::new(repository, config)?
        .with_cancel(cancel.clone())
        .run()?;

    let result = CrossingResult::assemble(repository, outcome.matrix, outcome.stats)?;
    info!(buildings = result.coordinates.len(), edges = result.matrix.edges().count(), "assembled results");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn square(x: f64, y: f64) -> Polygon<f64> {
        Polygon::new(LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]), vec![])
    }

    fn repository(n: usize) -> BuildingRepository {
        BuildingRepository::from_polygons((0..n).map(|i| square(i as f64 * 4.0, 0.0))).unwrap().repository
    }

    #[test]
    fn coordinate_table_covers_every_id() {
        let repo = repository(3);
        let table = CoordinateTable::from_repository(&repo);
        assert_eq!(table.len(), 3);
        assert_eq!(table.to_rows().keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(table.get(BuildingId(2)), Some(repo.get(BuildingId(2)).unwrap().centroid()));
        assert_eq!(table.get(BuildingId(4)), None);
    }

    #[test]
    fn compute_produces_consistent_outputs() {
        let repo = repository(4);
        let result = compute_crossings(&repo, &CrossingConfig::default(), &CancelToken::new()).unwrap();

        assert_eq!(result.coordinates().len(), 4);
        assert_eq!(result.matrix().len(), 4);
        assert_eq!(result.matrix().get(BuildingId(1), BuildingId(4)), Some(2));
        assert_eq!(result.stats().pairs, 6);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let small = repository(2);
        let large = repository(3);
        let outcome = ObstructionCounter::new(&small, &CrossingConfig::default()).unwrap().run().unwrap();

        assert_eq!(
            CrossingResult::assemble(&large, outcome.matrix, outcome.stats).unwrap_err(),
            InvariantError::SizeMismatch { matrix: 2, repository: 3 },
        );
    }

    #[test]
    fn cancelled_pipeline_returns_no_result() {
        let repo = repository(3);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            compute_crossings(&repo, &CrossingConfig::default(), &cancel),
            Err(CrossingError::Cancelled),
        ));
    }

    #[test]
    fn empty_repository_gives_empty_outputs() {
        let repo = BuildingRepository::default();
        let result = compute_crossings(&repo, &CrossingConfig::default(), &CancelToken::new()).unwrap();
        assert!(result.coordinates().is_empty());
        assert!(result.matrix().is_empty());
    }
}
