use geo::{Coord, LineString, Polygon, Rect};

use crate::error::GeometryError;

/// A validated building footprint: an open ring of at least three distinct
/// vertices with a cached bounding box.
///
/// The ring is stored without the repeated closing vertex; the closing edge
/// from the last vertex back to the first is implied.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    ring: Vec<Coord<f64>>,
    bbox: Rect<f64>,
}

impl Footprint {
    /// Validate a ring of vertices and build a footprint from it.
    ///
    /// Consecutive duplicate vertices and the closing vertex are dropped.
    /// Rings with fewer than 3 distinct vertices or with non-finite
    /// coordinates are rejected.
    pub fn new(vertices: Vec<Coord<f64>>) -> Result<Self, GeometryError> {
        if let Some(vertex) = vertices.iter().position(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate { vertex });
        }

        let mut ring = vertices;
        ring.dedup();
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        let distinct = count_distinct(&ring);
        if distinct < 3 {
            return Err(GeometryError::TooFewVertices { distinct });
        }

        let bbox = bounding_box(&ring);
        Ok(Self { ring, bbox })
    }

    /// Build a footprint from the exterior ring of a polygon. Interior rings are ignored.
    pub fn from_polygon(polygon: &Polygon<f64>) -> Result<Self, GeometryError> {
        Self::new(polygon.exterior().coords().copied().collect())
    }

    /// Get the ring vertices (without the closing vertex).
    #[inline] pub fn vertices(&self) -> &[Coord<f64>] { &self.ring }

    /// Get the cached bounding box.
    #[inline] pub fn bbox(&self) -> &Rect<f64> { &self.bbox }

    /// Iterate over the edges of the ring, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        self.ring.iter().copied()
            .zip(self.ring.iter().copied().cycle().skip(1))
    }

    /// Ray-casting point-in-polygon test. Points exactly on the boundary may
    /// fall either way; callers needing boundary contact test the edges.
    pub fn contains_point(&self, p: Coord<f64>) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Convert back to a closed `geo::Polygon`.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.ring.clone()), vec![])
    }
}

/// Count exactly-distinct vertices.
fn count_distinct(ring: &[Coord<f64>]) -> usize {
    let mut sorted = ring.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    sorted.len()
}

/// Axis-aligned box of a non-empty ring.
fn bounding_box(ring: &[Coord<f64>]) -> Rect<f64> {
    let first = ring[0];
    let (min, max) = ring.iter().skip(1).fold((first, first), |(min, max), c| (
        Coord { x: min.x.min(c.x), y: min.y.min(c.y) },
        Coord { x: max.x.max(c.x), y: max.y.max(c.y) },
    ));
    Rect::new(min, max)
}
