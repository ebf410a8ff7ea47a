use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of sky projections.
///
/// Each kind is a pure strategy: the nonlinear forward/backward step applied in
/// eye coordinates (z pointing away from the viewer, so the view axis is -z),
/// plus the FOV to view-scaling conversion used to size the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectionKind {
    Perspective,
    EqualArea,
    #[default]
    Stereographic,
    Fisheye,
    Hammer,
    Cylinder,
    Mercator,
    Orthographic,
    /// Screen-space passthrough for drawing 2D overlays.
    Planar,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown projection `{0}`")]
pub struct ParseProjectionError(pub String);

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 9] = [
        ProjectionKind::Perspective,
        ProjectionKind::EqualArea,
        ProjectionKind::Stereographic,
        ProjectionKind::Fisheye,
        ProjectionKind::Hammer,
        ProjectionKind::Cylinder,
        ProjectionKind::Mercator,
        ProjectionKind::Orthographic,
        ProjectionKind::Planar,
    ];

    /// Short identifier, accepted by `FromStr`.
    pub fn id(self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::EqualArea => "equal-area",
            Self::Stereographic => "stereographic",
            Self::Fisheye => "fisheye",
            Self::Hammer => "hammer",
            Self::Cylinder => "cylinder",
            Self::Mercator => "mercator",
            Self::Orthographic => "orthographic",
            Self::Planar => "2d",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Perspective => "Perspective",
            Self::EqualArea => "Equal Area",
            Self::Stereographic => "Stereographic",
            Self::Fisheye => "Fish-eye",
            Self::Hammer => "Hammer-Aitoff",
            Self::Cylinder => "Cylinder",
            Self::Mercator => "Mercator",
            Self::Orthographic => "Orthographic",
            Self::Planar => "2d",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Perspective => "Gnomonic projection: every great circle maps to a straight line.",
            Self::EqualArea => "Lambert azimuthal equal-area projection. Preserves area.",
            Self::Stereographic => "Conformal azimuthal projection: preserves angles, not area.",
            Self::Fisheye => {
                "Azimuthal equidistant projection: distance from the center is linear."
            }
            Self::Hammer => "Hammer-Aitoff equal-area projection of the whole sphere.",
            Self::Cylinder => "Cylindrical equidistant projection: parallels equally spaced.",
            Self::Mercator => "Conformal cylindrical projection: sizes grow away from the equator.",
            Self::Orthographic => "Seen from an infinite distance: one hemisphere as a disk.",
            Self::Planar => "Simple 2d projection for screen-space drawing.",
        }
    }

    /// Hard ceiling on the usable field of view, in degrees.
    pub fn max_fov(self) -> f64 {
        match self {
            Self::Perspective => 120.0,
            Self::EqualArea => 360.0,
            Self::Stereographic => 235.0,
            Self::Fisheye => 180.0,
            Self::Hammer => 360.0,
            Self::Cylinder | Self::Mercator => 175.0 * 4.0 / 3.0,
            Self::Orthographic => 179.9999,
            Self::Planar => 360.0,
        }
    }

    /// Whether the projection wraps around with a seam behind the viewer.
    pub fn has_discontinuity(self) -> bool {
        matches!(self, Self::Hammer | Self::Cylinder | Self::Mercator)
    }

    /// Nonlinear sphere to plane step.
    ///
    /// Always returns a finite or saturated vector; the flag tells whether the
    /// direction is representable. The returned z carries the input length.
    pub fn forward(self, v: DVec3, width_stretch: f64) -> (DVec3, bool) {
        let DVec3 { x, y, z } = v;
        match self {
            Self::Perspective => {
                let r = v.length();
                if z < 0.0 {
                    (DVec3::new(x * -width_stretch / z, y / -z, r), true)
                } else if z > 0.0 {
                    (DVec3::new(x * width_stretch / z, y / z, -f64::MAX), false)
                } else {
                    (DVec3::new(f64::MAX, f64::MAX, -f64::MAX), false)
                }
            }
            Self::EqualArea => {
                let r = v.length();
                let f = (2.0 / (r * (r - z))).sqrt();
                (DVec3::new(x * f * width_stretch, y * f, r), true)
            }
            Self::Stereographic => {
                let r = v.length();
                let h = 0.5 * (r - z);
                if h <= 0.0 {
                    return (DVec3::new(f64::MAX, f64::MAX, -f64::MIN_POSITIVE), false);
                }
                let f = 1.0 / h;
                (DVec3::new(x * f * width_stretch, y * f, r), true)
            }
            Self::Fisheye => {
                let rq1 = x * x + y * y;
                if rq1 > 0.0 {
                    let h = rq1.sqrt();
                    let f = h.atan2(-z) / h;
                    (DVec3::new(x * f * width_stretch, y * f, (rq1 + z * z).sqrt()), true)
                } else if z < 0.0 {
                    (DVec3::new(0.0, 0.0, 1.0), true)
                } else {
                    (DVec3::new(f64::MAX, f64::MAX, f64::MIN_POSITIVE), false)
                }
            }
            Self::Hammer => {
                let r = v.length();
                let alpha = x.atan2(-z);
                let cos_delta = (1.0 - y * y / (r * r)).max(0.0).sqrt();
                let zz = (1.0 + cos_delta * (alpha / 2.0).cos()).sqrt();
                (
                    DVec3::new(
                        2.0 * SQRT_2 * cos_delta * (alpha * 0.5).sin() / zz * width_stretch,
                        SQRT_2 * y / r / zz,
                        r,
                    ),
                    true,
                )
            }
            Self::Cylinder => {
                let r = v.length();
                let valid = -r < y && y < r;
                let alpha = x.atan2(-z);
                let delta = (y / r).clamp(-1.0, 1.0).asin();
                (DVec3::new(alpha * width_stretch, delta, r), valid)
            }
            Self::Mercator => {
                let r = v.length();
                let valid = -r < y && y < r;
                let sin_delta = y / r;
                (
                    DVec3::new(
                        x.atan2(-z) * width_stretch,
                        0.5 * ((1.0 + sin_delta) / (1.0 - sin_delta)).ln(),
                        r,
                    ),
                    valid,
                )
            }
            Self::Orthographic => {
                let r = v.length();
                let h = 1.0 / r;
                (DVec3::new(x * h * width_stretch, y * h, r), z <= 0.0)
            }
            Self::Planar => (v, true),
        }
    }

    /// Inverse of [`forward`](Self::forward) for a plane point in view-scaled
    /// units. Returns a direction and whether the point lies in the domain.
    pub fn backward(self, v: DVec3, width_stretch: f64) -> (DVec3, bool) {
        if self == Self::Planar {
            return (v, true);
        }
        let x = v.x / width_stretch;
        let y = v.y;
        match self {
            Self::Perspective => {
                let z = (1.0 / (1.0 + x * x + y * y)).sqrt();
                (DVec3::new(x * z, y * z, -z), true)
            }
            Self::EqualArea => {
                let dq = x * x + y * y;
                let l = 1.0 - 0.25 * dq;
                if l < 0.0 {
                    // Outside the disk: collapse onto the antipode rather than fail
                    (DVec3::new(0.0, 0.0, 1.0), true)
                } else {
                    let l = l.sqrt();
                    (DVec3::new(x * l, y * l, 0.5 * dq - 1.0), true)
                }
            }
            Self::Stereographic => {
                let lqq = 0.25 * (x * x + y * y);
                (DVec3::new(x, y, lqq - 1.0) * (1.0 / (lqq + 1.0)), true)
            }
            Self::Fisheye => {
                let a = (x * x + y * y).sqrt();
                let f = if a > 0.0 { a.sin() / a } else { 1.0 };
                (DVec3::new(x * f, y * f, -a.cos()), a < PI)
            }
            Self::Hammer => {
                let zsq = 1.0 - 0.25 * 0.25 * x * x - 0.5 * 0.5 * y * y;
                let z = if zsq < 0.0 { 0.0 } else { zsq.sqrt() };
                let valid = 0.25 * x * x + y * y < 2.0;
                let alpha = 2.0 * (z * x).atan2(2.0 * (2.0 * zsq - 1.0));
                let delta = (y * z).clamp(-1.0, 1.0).asin();
                let cd = delta.cos();
                (DVec3::new(cd * alpha.sin(), y * z, -cd * alpha.cos()), valid)
            }
            Self::Cylinder => {
                let valid = y < FRAC_PI_2 && y > -FRAC_PI_2 && x > -PI && x < PI;
                let cd = y.cos();
                (DVec3::new(cd * x.sin(), y.sin(), -cd * x.cos()), valid)
            }
            Self::Mercator => {
                let valid = x > -PI && x < PI;
                let e = y.exp();
                let h = e * e;
                let h1 = 1.0 / (1.0 + h);
                let sin_delta = (h - 1.0) * h1;
                let cos_delta = 2.0 * e * h1;
                (DVec3::new(cos_delta * x.sin(), sin_delta, -cos_delta * x.cos()), valid)
            }
            Self::Orthographic => {
                let dq = x * x + y * y;
                let h = 1.0 - dq;
                if h < 0.0 {
                    let h = 1.0 / dq.sqrt();
                    (DVec3::new(x * h, y * h, 0.0), false)
                } else {
                    (DVec3::new(x, y, -h.sqrt()), true)
                }
            }
            Self::Planar => (v, true),
        }
    }

    /// Linear view scaling for a FOV half-angle (radians).
    pub fn fov_to_view_scaling_factor(self, fov: f64) -> f64 {
        match self {
            Self::Perspective => fov.tan(),
            Self::EqualArea => 2.0 * (0.5 * fov).sin(),
            Self::Stereographic => 2.0 * (0.5 * fov).tan(),
            Self::Orthographic => fov.sin(),
            Self::Planar => 1.0,
            Self::Fisheye | Self::Hammer | Self::Cylinder | Self::Mercator => fov,
        }
    }

    /// Inverse of [`fov_to_view_scaling_factor`](Self::fov_to_view_scaling_factor).
    pub fn view_scaling_factor_to_fov(self, vsf: f64) -> f64 {
        match self {
            Self::Perspective => vsf.atan(),
            Self::EqualArea => 2.0 * (0.5 * vsf).clamp(-1.0, 1.0).asin(),
            Self::Stereographic => 2.0 * (0.5 * vsf).atan(),
            Self::Orthographic => vsf.clamp(-1.0, 1.0).asin(),
            Self::Planar => 1.0,
            Self::Fisheye | Self::Hammer | Self::Cylinder | Self::Mercator => vsf,
        }
    }

    /// Zoom increment for small FOV changes, `vsf · d(fov)/d(vsf)`.
    pub fn delta_zoom(self, fov: f64) -> f64 {
        match self {
            Self::Perspective => {
                let vsf = self.fov_to_view_scaling_factor(fov);
                vsf / (1.0 + vsf * vsf)
            }
            Self::Stereographic => {
                let vsf = self.fov_to_view_scaling_factor(fov);
                4.0 * vsf / (4.0 + vsf * vsf)
            }
            _ => fov,
        }
    }

    /// Seam test on points already in eye coordinates.
    #[inline(always)]
    pub fn intersects_discontinuity_internal(self, p1: DVec3, p2: DVec3) -> bool {
        if !self.has_discontinuity() {
            return false;
        }
        if p1.z < 0.0 && p2.z < 0.0 {
            return false;
        }
        // A point sitting exactly on the back seam belongs to both sides
        let on_seam = |p: DVec3| p.x == 0.0 && p.z > 0.0;
        p1.x * p2.x < 0.0 || (on_seam(p1) && p2.x != 0.0) || (on_seam(p2) && p1.x != 0.0)
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectionKind {
    type Err = ParseProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.id() == key || k.name().to_ascii_lowercase().replace(' ', "-") == key)
            .ok_or_else(|| ParseProjectionError(s.to_string()))
    }
}
