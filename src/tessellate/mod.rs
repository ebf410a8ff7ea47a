//! Adaptive tessellation of arcs and spherical triangles into screen-space
//! vertex buffers under the active projection.

mod arc;
mod triangle;
mod vertex;

pub use arc::EdgeCrossing;
pub use triangle::remove_discontinuous_triangles;
pub use vertex::{ScreenVertex, Topology, VertexArray};

use crate::projector::Projector;

/// Fidelity limits for subdivision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationSettings {
    /// Squared pixel distance allowed between a chord midpoint and the
    /// projected arc midpoint.
    pub max_sq_distortion: f64,
    /// Recursion cap; reaching it emits the current piece as is.
    pub max_depth: u32,
}

impl Default for TessellationSettings {
    fn default() -> Self {
        Self {
            max_sq_distortion: 5.0,
            max_depth: 10,
        }
    }
}

/// Turns sphere geometry into screen buffers for one projector.
#[derive(Debug, Clone, Copy)]
pub struct Tessellator<'a> {
    projector: &'a Projector,
    settings: TessellationSettings,
}

impl<'a> Tessellator<'a> {
    pub fn new(projector: &'a Projector) -> Self {
        Self::with_settings(projector, TessellationSettings::default())
    }

    pub fn with_settings(projector: &'a Projector, settings: TessellationSettings) -> Self {
        Self { projector, settings }
    }

    pub fn projector(&self) -> &'a Projector {
        self.projector
    }

    pub fn settings(&self) -> TessellationSettings {
        self.settings
    }
}
