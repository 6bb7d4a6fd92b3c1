use geo::{Centroid, Coord, Polygon, Rect};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::building::{Building, BuildingId};
use crate::error::{GeometryError, InvariantError};
use crate::geom::Footprint;

/// One input building as supplied by the host: an identifier, the footprint
/// ring as `(x, y)` pairs and the centroid computed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: u64,
    pub polygon: Vec<(f64, f64)>,
    #[serde(default)]
    pub centroid: Option<(f64, f64)>,
}

/// An input footprint excluded from the repository, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub source_id: u64,
    pub error: GeometryError,
}

/// The loaded repository together with every excluded footprint.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub repository: BuildingRepository,
    pub rejected: Vec<Rejected>,
}

/// The ordered, immutable set of buildings of one run.
#[derive(Debug, Clone, Default)]
pub struct BuildingRepository {
    buildings: Vec<Building>,
}

/// Centroid of a polygon, via `geo`. `None` for empty geometries.
pub fn polygon_centroid(polygon: &Polygon<f64>) -> Option<Coord<f64>> {
    polygon.centroid().map(|p| p.0)
}

impl BuildingRepository {
    /// Load footprints in enumeration order, pairing each with the centroid
    /// reported by `centroid_of`.
    ///
    /// Accepted footprints receive ids `1..=n` in order; `source_id` is the
    /// 1-based position in the input. Invalid footprints are excluded and
    /// reported. A valid footprint without a finite centroid is fatal.
    pub fn load<I, F>(polygons: I, centroid_of: F) -> Result<LoadOutcome, InvariantError>
    where
        I: IntoIterator<Item = Polygon<f64>>,
        F: Fn(&Polygon<f64>) -> Option<Coord<f64>>,
    {
        let mut loader = Loader::default();
        for (i, polygon) in polygons.into_iter().enumerate() {
            let footprint = Footprint::from_polygon(&polygon);
            loader.accept(i as u64 + 1, footprint, || centroid_of(&polygon))?;
        }
        Ok(loader.finish())
    }

    /// Load footprints using `geo` centroids.
    pub fn from_polygons<I>(polygons: I) -> Result<LoadOutcome, InvariantError>
    where
        I: IntoIterator<Item = Polygon<f64>>,
    {
        Self::load(polygons, polygon_centroid)
    }

    /// Load host records, keeping their order. Record ids are kept as `source_id`.
    pub fn from_records<I>(records: I) -> Result<LoadOutcome, InvariantError>
    where
        I: IntoIterator<Item = BuildingRecord>,
    {
        let mut loader = Loader::default();
        for record in records {
            let footprint = Footprint::new(
                record.polygon.iter().map(|&(x, y)| Coord { x, y }).collect()
            );
            let centroid = record.centroid.map(|(x, y)| Coord { x, y });
            loader.accept(record.id, footprint, || centroid)?;
        }
        Ok(loader.finish())
    }

    /// Look up a building by id.
    #[inline]
    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.index())
    }

    /// All buildings in id order.
    #[inline] pub fn all(&self) -> &[Building] { &self.buildings }

    /// Number of buildings.
    #[inline] pub fn count(&self) -> usize { self.buildings.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.buildings.is_empty() }

    /// Iterate over all building ids in order.
    pub fn ids(&self) -> impl Iterator<Item = BuildingId> + '_ {
        (0..self.count()).map(BuildingId::from_index)
    }

    /// Bounding rectangle of all footprints and centroids.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.buildings.iter()
            .flat_map(|b| [*b.footprint().bbox(), Rect::new(b.centroid(), b.centroid())])
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}

#[derive(Default)]
struct Loader {
    buildings: Vec<Building>,
    rejected: Vec<Rejected>,
}

impl Loader {
    fn accept(
        &mut self,
        source_id: u64,
        footprint: Result<Footprint, GeometryError>,
        centroid: impl FnOnce() -> Option<Coord<f64>>,
    ) -> Result<(), InvariantError> {
        let footprint = match footprint {
            Ok(footprint) => footprint,
            Err(error) => {
                warn!(source_id, %error, "excluding building footprint");
                self.rejected.push(Rejected { source_id, error });
                return Ok(());
            }
        };

        let id = BuildingId::from_index(self.buildings.len());
        let centroid = centroid()
            .filter(|c| c.x.is_finite() && c.y.is_finite())
            .ok_or(InvariantError::MissingCentroid(id))?;

        self.buildings.push(Building::new(id, source_id, footprint, centroid));
        Ok(())
    }

    fn finish(self) -> LoadOutcome {
        info!(accepted = self.buildings.len(), rejected = self.rejected.len(), "loaded buildings");
        LoadOutcome {
            repository: BuildingRepository { buildings: self.buildings },
            rejected: self.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    fn square(x: f64, y: f64) -> Polygon<f64> {
        Polygon::new(LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]), vec![])
    }

    fn sliver() -> Polygon<f64> {
        Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]), vec![])
    }

    #[test]
    fn ids_are_assigned_in_enumeration_order() {
        let outcome = BuildingRepository::from_polygons(vec![square(0.0, 0.0), square(5.0, 0.0)]).unwrap();
        let repo = outcome.repository;

        assert_eq!(repo.count(), 2);
        assert_eq!(repo.ids().collect::<Vec<_>>(), vec![BuildingId(1), BuildingId(2)]);
        let centroid = repo.get(BuildingId(2)).unwrap().centroid();
        assert!((centroid.x - 5.5).abs() < 1e-12 && (centroid.y - 0.5).abs() < 1e-12);
        assert!(repo.get(BuildingId(3)).is_none());
        assert!(repo.get(BuildingId(0)).is_none());
    }

    #[test]
    fn degenerate_footprints_are_reported_and_skipped() {
        let outcome = BuildingRepository::from_polygons(vec![square(0.0, 0.0), sliver(), square(5.0, 0.0)]).unwrap();

        assert_eq!(outcome.repository.count(), 2);
        assert_eq!(outcome.rejected, vec![Rejected {
            source_id: 2,
            error: GeometryError::TooFewVertices { distinct: 2 },
        }]);

        // Ids stay contiguous after the excluded footprint.
        let third = outcome.repository.get(BuildingId(2)).unwrap();
        assert_eq!(third.source_id(), 3);
    }

    #[test]
    fn missing_centroid_is_fatal() {
        let err = BuildingRepository::load(vec![square(0.0, 0.0)], |_| None).unwrap_err();
        assert_eq!(err, InvariantError::MissingCentroid(BuildingId(1)));
    }

    #[test]
    fn non_finite_centroid_is_fatal() {
        let err = BuildingRepository::load(vec![square(0.0, 0.0)], |_| Some(Coord { x: f64::NAN, y: 0.0 }))
            .unwrap_err();
        assert_eq!(err, InvariantError::MissingCentroid(BuildingId(1)));
    }

    #[test]
    fn records_keep_source_ids() {
        let records = vec![
            BuildingRecord { id: 10, polygon: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], centroid: Some((0.6, 0.3)) },
            BuildingRecord { id: 20, polygon: vec![(0.0, 0.0), (1.0, 0.0)], centroid: Some((0.5, 0.0)) },
            BuildingRecord { id: 30, polygon: vec![(4.0, 0.0), (5.0, 0.0), (5.0, 1.0)], centroid: Some((4.6, 0.3)) },
        ];
        let outcome = BuildingRepository::from_records(records).unwrap();

        assert_eq!(outcome.repository.all().iter().map(|b| b.source_id()).collect::<Vec<_>>(), vec![10, 30]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].source_id, 20);
    }

    #[test]
    fn record_without_centroid_is_fatal() {
        let records = vec![
            BuildingRecord { id: 10, polygon: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], centroid: None },
        ];
        assert_eq!(
            BuildingRepository::from_records(records).unwrap_err(),
            InvariantError::MissingCentroid(BuildingId(1)),
        );
    }

    #[test]
    fn bounds_cover_all_footprints() {
        let repo = BuildingRepository::from_polygons(vec![square(0.0, 0.0), square(5.0, 3.0)]).unwrap().repository;
        let bounds = repo.bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), Coord { x: 6.0, y: 4.0 });
    }

    #[test]
    fn empty_repository_has_no_bounds() {
        let repo = BuildingRepository::from_polygons(Vec::<Polygon<f64>>::new()).unwrap().repository;
        assert!(repo.is_empty());
        assert!(repo.bounds().is_none());
    }
}
