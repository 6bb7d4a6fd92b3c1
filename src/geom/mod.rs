mod bbox;
mod footprint;
mod segment;

pub(crate) use bbox::BoundingBox;
pub use bbox::{boxes_overlap, inflate};
pub use footprint::Footprint;
pub use segment::{segment_intersects_footprint, Segment};

use geo::Rect;

/// Relative factor applied to the coordinate scale when deriving a tolerance.
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Derive an absolute tolerance from the coordinate scale of `bounds`.
///
/// Projected coordinates far from the origin lose absolute precision, so the
/// scale is the largest of the absolute coordinate values and the extent.
pub fn derived_tolerance(bounds: &Rect<f64>) -> f64 {
    let scale = [
        bounds.min().x.abs(), bounds.min().y.abs(),
        bounds.max().x.abs(), bounds.max().y.abs(),
        bounds.width(), bounds.height(),
    ]
    .into_iter()
    .fold(1.0_f64, f64::max);

    scale * RELATIVE_TOLERANCE
}
