use super::label::{GridLabel, LabelValue};
use super::{visible_circle_arcs, FrameType};
use crate::sphere::{orthogonal, SphericalCap};
use crate::tessellate::{Tessellator, VertexArray};
use glam::DVec3;

/// Reference circles with a fixed place in their frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkyLineKind {
    EquatorJ2000,
    EquatorOfDate,
    EclipticJ2000,
    EclipticOfDate,
    GalacticEquator,
    SupergalacticEquator,
    Horizon,
    Meridian,
    PrimeVertical,
    /// Great circle through the celestial poles and the equinoxes.
    Colure1,
    /// Great circle through the celestial poles and the solstices.
    Colure2,
}

impl SkyLineKind {
    pub const ALL: [SkyLineKind; 11] = [
        Self::EquatorJ2000,
        Self::EquatorOfDate,
        Self::EclipticJ2000,
        Self::EclipticOfDate,
        Self::GalacticEquator,
        Self::SupergalacticEquator,
        Self::Horizon,
        Self::Meridian,
        Self::PrimeVertical,
        Self::Colure1,
        Self::Colure2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::EquatorJ2000 => "Equator of J2000.0",
            Self::EquatorOfDate => "Equator",
            Self::EclipticJ2000 => "Ecliptic of J2000.0",
            Self::EclipticOfDate => "Ecliptic of Date",
            Self::GalacticEquator => "Galactic Equator",
            Self::SupergalacticEquator => "Supergalactic Equator",
            Self::Horizon => "Horizon",
            Self::Meridian => "Meridian",
            Self::PrimeVertical => "Prime Vertical",
            Self::Colure1 => "Equinoctial Colure",
            Self::Colure2 => "Solstitial Colure",
        }
    }

    pub fn frame(self) -> FrameType {
        match self {
            Self::EquatorJ2000 | Self::Colure1 | Self::Colure2 => FrameType::EquatorialJ2000,
            Self::EquatorOfDate => FrameType::EquatorialOfDate,
            Self::EclipticJ2000 => FrameType::EclipticJ2000,
            Self::EclipticOfDate => FrameType::EclipticOfDate,
            Self::GalacticEquator => FrameType::Galactic,
            Self::SupergalacticEquator => FrameType::Supergalactic,
            Self::Horizon | Self::Meridian | Self::PrimeVertical => FrameType::AltAz,
        }
    }
}

/// A single great or small circle drawn with a name label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyLine {
    frame: FrameType,
    circle: SphericalCap,
    first_point: DVec3,
    label: &'static str,
}

impl SkyLine {
    pub fn new(kind: SkyLineKind) -> Self {
        let (pole, first_point) = match kind {
            SkyLineKind::Meridian | SkyLineKind::Colure1 => (DVec3::Y, DVec3::X),
            SkyLineKind::PrimeVertical | SkyLineKind::Colure2 => (DVec3::X, DVec3::Z),
            _ => (DVec3::Z, DVec3::X),
        };
        Self {
            frame: kind.frame(),
            circle: SphericalCap { n: pole, d: 0.0 },
            first_point,
            label: kind.label(),
        }
    }

    /// Great circle around `pole`. `first_point` is projected onto the circle.
    pub fn great_circle(
        frame: FrameType,
        pole: DVec3,
        first_point: DVec3,
        label: &'static str,
    ) -> Self {
        let n = pole.normalize();
        let on_circle = (first_point - n * n.dot(first_point)).normalize_or_zero();
        Self {
            frame,
            circle: SphericalCap { n, d: 0.0 },
            first_point: if on_circle == DVec3::ZERO { orthogonal(n) } else { on_circle },
            label,
        }
    }

    /// Circle of constant `latitude` (radians) around `pole`.
    pub fn small_circle(frame: FrameType, pole: DVec3, latitude: f64, label: &'static str) -> Self {
        let n = pole.normalize();
        let (sin_lat, cos_lat) = latitude.sin_cos();
        Self {
            frame,
            circle: SphericalCap { n, d: sin_lat },
            first_point: n * sin_lat + orthogonal(n) * cos_lat,
            label,
        }
    }

    pub fn frame(&self) -> FrameType {
        self.frame
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn circle(&self) -> &SphericalCap {
        &self.circle
    }

    /// Tessellate the visible part of the line.
    ///
    /// The tessellator's projector must map directions of this line's frame.
    pub fn draw<F>(&self, tess: &Tessellator<'_>, mut on_label: F) -> Vec<VertexArray>
    where
        F: FnMut(GridLabel),
    {
        let view = tess.projector().bounding_cap();
        let value = LabelValue::Line(self.label);
        visible_circle_arcs(tess, view, &self.circle, self.first_point, |c| {
            on_label(GridLabel::at_crossing(c, value));
        })
        .unwrap_or_default()
    }
}
