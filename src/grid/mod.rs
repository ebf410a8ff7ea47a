//! Coordinate grids and reference lines drawn through the tessellator.
//!
//! Everything here produces screen-space line strips plus label anchors; text
//! is left to the caller.

mod frame;
mod label;
mod sky_grid;
mod sky_line;
mod step;

pub use frame::{FrameType, Observer};
pub use label::{GridLabel, LabelValue};
pub use sky_grid::{GridSettings, SkyGrid};
pub use sky_line::{SkyLine, SkyLineKind};
pub use step::{closest_resolution, sample_pixel_per_rad, StepLadder};

use crate::sphere::{rotate_about, SphericalCap};
use crate::tessellate::{EdgeCrossing, Tessellator, VertexArray};
use glam::DVec3;

const THIRD_TURN: f64 = 2.0 * std::f64::consts::PI / 3.0;

/// Draw the boundary circle of `circle` where it passes through `view`.
///
/// A circle crossing the view boundary is drawn as two arcs meeting inside the
/// view. A circle entirely inside is drawn as three arcs starting at
/// `first_point`, which must lie on the circle. Returns `None` when the circle
/// is not visible at all.
fn visible_circle_arcs<F>(
    tess: &Tessellator<'_>,
    view: &SphericalCap,
    circle: &SphericalCap,
    first_point: DVec3,
    mut on_edge: F,
) -> Option<Vec<VertexArray>>
where
    F: FnMut(EdgeCrossing),
{
    let rot_center = circle.n * circle.d;
    if let Some((p1, p2)) = view.intersection_points(circle) {
        let radius = (p1 - rot_center).length();
        let mut offset = (p1 + p2 - 2.0 * rot_center).normalize_or_zero();
        if offset == DVec3::ZERO {
            offset = circle.n.cross(p1 - rot_center).normalize_or_zero();
        }
        let mut middle = rot_center + offset * radius;
        if !view.contains(middle) {
            middle = rot_center - offset * radius;
        }
        let mut strips = tess.small_circle_arc(p1, middle, rot_center, &mut on_edge);
        strips.extend(tess.small_circle_arc(p2, middle, rot_center, &mut on_edge));
        return Some(strips);
    }

    let inside = (view.d < circle.d && view.contains(circle.n))
        || (view.d < -circle.d && view.contains(-circle.n));
    if !inside {
        return None;
    }
    let second = rotate_about(first_point, circle.n, THIRD_TURN);
    let third = rotate_about(second, circle.n, THIRD_TURN);
    let mut strips = tess.small_circle_arc(first_point, second, rot_center, &mut on_edge);
    strips.extend(tess.small_circle_arc(second, third, rot_center, &mut on_edge));
    strips.extend(tess.small_circle_arc(third, first_point, rot_center, &mut on_edge));
    Some(strips)
}
