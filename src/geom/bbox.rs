use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

use crate::building::BuildingId;

/// A bounding box in an R-tree, associated with a building footprint by id.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    id: BuildingId,
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(id: BuildingId, bbox: Rect<f64>) -> Self {
        Self { id, bbox }
    }

    /// Get the id of the corresponding building.
    #[inline] pub(crate) fn id(&self) -> BuildingId { self.id }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Axis-aligned overlap test. Boxes that share only an edge or corner overlap.
#[inline]
pub fn boxes_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x
        && a.min().y <= b.max().y && b.min().y <= a.max().y
}

/// Grow `rect` by `eps` on every side.
#[inline]
pub fn inflate(rect: &Rect<f64>, eps: f64) -> Rect<f64> {
    Rect::new(
        Coord { x: rect.min().x - eps, y: rect.min().y - eps },
        Coord { x: rect.max().x + eps, y: rect.max().y + eps },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn overlapping_boxes() {
        assert!(boxes_overlap(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 1.0, 3.0, 3.0)));
        assert!(boxes_overlap(&rect(0.0, 0.0, 4.0, 4.0), &rect(1.0, 1.0, 2.0, 2.0)));
    }

    #[test]
    fn touching_boxes_overlap() {
        assert!(boxes_overlap(&rect(0.0, 0.0, 1.0, 1.0), &rect(1.0, 0.0, 2.0, 1.0)));
        assert!(boxes_overlap(&rect(0.0, 0.0, 1.0, 1.0), &rect(1.0, 1.0, 2.0, 2.0)));
    }

    #[test]
    fn disjoint_boxes() {
        assert!(!boxes_overlap(&rect(0.0, 0.0, 1.0, 1.0), &rect(1.5, 0.0, 2.0, 1.0)));
        assert!(!boxes_overlap(&rect(0.0, 0.0, 1.0, 1.0), &rect(0.0, 1.5, 1.0, 2.0)));
    }

    #[test]
    fn degenerate_box_of_a_vertical_segment() {
        let line = rect(0.5, -1.0, 0.5, 2.0);
        assert!(boxes_overlap(&line, &rect(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn inflate_grows_every_side() {
        let grown = inflate(&rect(0.0, 0.0, 1.0, 1.0), 0.25);
        assert_eq!(grown.min(), Coord { x: -0.25, y: -0.25 });
        assert_eq!(grown.max(), Coord { x: 1.25, y: 1.25 });
    }

    #[test]
    fn envelope_matches_rect() {
        let bb = BoundingBox::new(BuildingId(3), rect(1.0, 2.0, 3.0, 4.0));
        let env = bb.envelope();
        assert_eq!(env.lower(), [1.0, 2.0]);
        assert_eq!(env.upper(), [3.0, 4.0]);
        assert_eq!(bb.id(), BuildingId(3));
    }
}
