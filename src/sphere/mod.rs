//! Geometry on the unit sphere: spherical caps and coordinate helpers.

mod cap;
mod coords;

pub use cap::SphericalCap;
pub use coords::{orthogonal, rect_to_sphe, rotate_about, sphe_to_rect};
