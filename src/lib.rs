//! Celestial sphere projections and the adaptive tessellation that turns sky
//! geometry into screen-space vertex buffers.
//!
//! [`Projector`] maps direction vectors to pixels for one of nine projection
//! kinds. [`Tessellator`] subdivides arcs and triangles until they look smooth
//! under that projection. [`grid`] builds coordinate grids and reference lines
//! on top of both.

pub mod grid;
pub mod projector;
pub mod sphere;
pub mod tessellate;

pub use grid::{FrameType, GridLabel, LabelValue, SkyGrid, SkyLine, SkyLineKind};
pub use projector::{MaskType, ModelViewTransform, ProjectionKind, Projector, ProjectorParams};
pub use sphere::SphericalCap;
pub use tessellate::{Tessellator, Topology, VertexArray};
