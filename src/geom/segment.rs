use geo::{Coord, Rect};

use crate::geom::{boxes_overlap, inflate, Footprint};

/// A straight segment between two points. Built per pair, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
}

impl Segment {
    pub fn new(start: Coord<f64>, end: Coord<f64>) -> Self {
        Self { start, end }
    }

    /// Axis-aligned box spanned by the two endpoints.
    #[inline]
    pub fn bbox(&self) -> Rect<f64> {
        Rect::new(self.start, self.end)
    }
}

/// Returns true iff `segment` touches the boundary or interior of `footprint`.
///
/// Any contact counts: crossing an edge, touching a vertex, running along an
/// edge, or having an endpoint inside the ring. Contact within `eps` of the
/// boundary is treated as touching.
pub fn segment_intersects_footprint(segment: &Segment, footprint: &Footprint, eps: f64) -> bool {
    if !boxes_overlap(&inflate(&segment.bbox(), eps), footprint.bbox()) {
        return false;
    }

    if footprint.contains_point(segment.start) || footprint.contains_point(segment.end) {
        return true;
    }

    footprint.edges().any(|(a, b)| segments_touch(segment.start, segment.end, a, b, eps))
}

/// Twice the signed area of triangle (a, b, c); positive when counter-clockwise.
#[inline]
fn orient(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Segments p1-p2 and q1-q2 cross, share a point, or come within `eps` of each other.
fn segments_touch(p1: Coord<f64>, p2: Coord<f64>, q1: Coord<f64>, q2: Coord<f64>, eps: f64) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if opposite(d1, d2) && opposite(d3, d4) {
        return true;
    }

    // Without a proper crossing, the closest approach is at one of the four endpoints.
    let eps2 = eps * eps;
    point_segment_distance_squared(p1, q1, q2) <= eps2
        || point_segment_distance_squared(p2, q1, q2) <= eps2
        || point_segment_distance_squared(q1, p1, p2) <= eps2
        || point_segment_distance_squared(q2, p1, p2) <= eps2
}

#[inline]
fn opposite(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

/// Squared distance from `p` to segment a-b, handling zero-length segments.
fn point_segment_distance_squared(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;

    let (cx, cy) = if len2 == 0.0 {
        (a.x, a.y)
    } else {
        let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
        (a.x + t * dx, a.y + t * dy)
    };

    (p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment { Segment::new(c(x0, y0), c(x1, y1)) }

    fn unit_square_at(x: f64, y: f64) -> Footprint {
        Footprint::new(vec![c(x, y), c(x + 1.0, y), c(x + 1.0, y + 1.0), c(x, y + 1.0)]).unwrap()
    }

    #[test]
    fn segment_crossing_through_square() {
        assert!(segment_intersects_footprint(&seg(-1.0, 0.5, 2.0, 0.5), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn segment_missing_square() {
        assert!(!segment_intersects_footprint(&seg(-1.0, 1.5, 2.0, 1.5), &unit_square_at(0.0, 0.0), EPS));
        assert!(!segment_intersects_footprint(&seg(-1.0, 0.0, -0.5, 3.0), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn diagonal_miss_with_overlapping_boxes() {
        // Bounding boxes overlap but the segment passes beyond the corner.
        assert!(!segment_intersects_footprint(&seg(0.0, 2.5, 2.5, 0.0), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn segment_fully_inside() {
        assert!(segment_intersects_footprint(&seg(0.2, 0.2, 0.8, 0.8), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn endpoint_inside() {
        assert!(segment_intersects_footprint(&seg(0.5, 0.5, 5.0, 5.0), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn touching_a_vertex_counts() {
        assert!(segment_intersects_footprint(&seg(0.0, 2.0, 2.0, 0.0), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn running_along_an_edge_counts() {
        assert!(segment_intersects_footprint(&seg(-1.0, 0.0, 3.0, 0.0), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn ending_on_an_edge_counts() {
        assert!(segment_intersects_footprint(&seg(-1.0, 0.5, 0.0, 0.5), &unit_square_at(0.0, 0.0), EPS));
    }

    #[test]
    fn near_touch_within_tolerance_counts() {
        let square = unit_square_at(0.0, 0.0);
        assert!(segment_intersects_footprint(&seg(-1.0, 1.0 + 1e-12, 3.0, 1.0 + 1e-12), &square, EPS));
        assert!(!segment_intersects_footprint(&seg(-1.0, 1.0 + 1e-6, 3.0, 1.0 + 1e-6), &square, EPS));
    }

    #[test]
    fn degenerate_segment_behaves_as_a_point() {
        let square = unit_square_at(0.0, 0.0);
        assert!(segment_intersects_footprint(&seg(0.5, 0.5, 0.5, 0.5), &square, EPS));
        assert!(!segment_intersects_footprint(&seg(2.0, 2.0, 2.0, 2.0), &square, EPS));
    }

    #[test]
    fn crossing_through_concave_notch() {
        // U shape: a horizontal segment through the notch still crosses the arms.
        let u = Footprint::new(vec![
            c(0.0, 0.0), c(3.0, 0.0), c(3.0, 3.0), c(2.0, 3.0), c(2.0, 1.0), c(1.0, 1.0), c(1.0, 3.0), c(0.0, 3.0),
        ]).unwrap();
        assert!(segment_intersects_footprint(&seg(-1.0, 2.0, 4.0, 2.0), &u, EPS));
        // Vertical segment inside the notch never reaches the footprint.
        assert!(!segment_intersects_footprint(&seg(1.5, 1.5, 1.5, 5.0), &u, EPS));
    }

    #[test]
    fn distance_to_zero_length_segment() {
        assert_eq!(point_segment_distance_squared(c(3.0, 4.0), c(0.0, 0.0), c(0.0, 0.0)), 25.0);
    }

    #[test]
    fn collinear_disjoint_segments_do_not_touch() {
        assert!(!segments_touch(c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), EPS));
        assert!(segments_touch(c(0.0, 0.0), c(2.0, 0.0), c(1.0, 0.0), c(3.0, 0.0), EPS));
    }
}
