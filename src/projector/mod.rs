//! Sky to screen projection: the model-view step, the nonlinear projection
//! kinds, and the viewport bookkeeping that maps them to pixels.

mod kind;
mod modelview;
mod params;

pub use kind::{ParseProjectionError, ProjectionKind};
pub use modelview::{ModelViewTransform, Refraction};
pub use params::{MaskType, ParamsError, ParseMaskError, ProjectorParams};

use crate::sphere::SphericalCap;
use glam::{DMat4, DVec2, DVec3};
use log::debug;
use std::f64::consts::PI;

/// Bisection steps used to locate a viewport edge crossing.
const VIEWPORT_INTERSECT_ITERATIONS: usize = 8;
/// Samples per viewport edge when bounding the visible sky.
const BOUNDARY_SAMPLES_PER_EDGE: usize = 32;
/// Ternary search steps around the lowest boundary sample.
const BOUNDARY_REFINE_ITERATIONS: usize = 24;

/// A configured projection for one viewport.
///
/// Owns its model-view transform and derived constants. Cheap to clone for a
/// separate drawing pass; nothing is shared between clones.
#[derive(Debug, Clone)]
pub struct Projector {
    kind: ProjectionKind,
    model_view: ModelViewTransform,
    viewport_xywh: [i32; 4],
    viewport_center: DVec2,
    viewport_fov_diameter: f64,
    pixel_per_rad: f64,
    flip_horz: f64,
    flip_vert: f64,
    z_near: f64,
    one_over_z_near_minus_z_far: f64,
    gravity_labels: bool,
    default_angle_for_gravity_text: f64,
    mask_type: MaskType,
    device_pixel_ratio: f64,
    width_stretch: f64,
    bounding_cap: SphericalCap,
}

impl Projector {
    pub fn new(
        kind: ProjectionKind,
        model_view: ModelViewTransform,
        params: &ProjectorParams,
    ) -> Self {
        let mut projector = Self {
            kind,
            model_view,
            viewport_xywh: params.viewport_xywh,
            viewport_center: params.viewport_center,
            viewport_fov_diameter: params.viewport_fov_diameter,
            pixel_per_rad: 1.0,
            flip_horz: 1.0,
            flip_vert: 1.0,
            z_near: params.z_near,
            one_over_z_near_minus_z_far: 1.0,
            gravity_labels: params.gravity_labels,
            default_angle_for_gravity_text: params.default_angle_for_gravity_text,
            mask_type: params.mask_type,
            device_pixel_ratio: params.device_pixel_ratio,
            width_stretch: params.width_stretch,
            bounding_cap: SphericalCap::full_sky(),
        };
        projector.reinit(params);
        projector
    }

    /// Reapply viewport and FOV settings, recomputing every derived constant.
    pub fn reinit(&mut self, params: &ProjectorParams) {
        self.viewport_xywh = params.viewport_xywh;
        self.viewport_center = params.viewport_center;
        self.viewport_fov_diameter = params.viewport_fov_diameter;
        self.gravity_labels = params.gravity_labels;
        self.default_angle_for_gravity_text = params.default_angle_for_gravity_text;
        self.mask_type = params.mask_type;
        self.device_pixel_ratio = params.device_pixel_ratio;
        self.width_stretch = params.width_stretch;
        self.z_near = params.z_near;
        self.one_over_z_near_minus_z_far = 1.0 / (params.z_near - params.z_far);
        self.flip_horz = if params.flip_horz { -1.0 } else { 1.0 };
        self.flip_vert = if params.flip_vert { -1.0 } else { 1.0 };
        self.pixel_per_rad = 0.5 * params.viewport_fov_diameter
            / self.kind.fov_to_view_scaling_factor(params.fov * (PI / 360.0));
        debug!(
            "projector {} fov={:.4}° viewport={:?} pixel_per_rad={:.3}",
            self.kind.id(),
            params.fov,
            params.viewport_xywh,
            self.pixel_per_rad
        );
        self.compute_bounding_cap();
    }

    /// Replace the model-view transform, keeping the viewport.
    pub fn set_model_view(&mut self, model_view: ModelViewTransform) {
        self.model_view = model_view;
        self.compute_bounding_cap();
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn model_view(&self) -> &ModelViewTransform {
        &self.model_view
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn max_fov(&self) -> f64 {
        self.kind.max_fov()
    }

    pub fn has_discontinuity(&self) -> bool {
        self.kind.has_discontinuity()
    }

    pub fn fov_to_view_scaling_factor(&self, fov: f64) -> f64 {
        self.kind.fov_to_view_scaling_factor(fov)
    }

    pub fn view_scaling_factor_to_fov(&self, vsf: f64) -> f64 {
        self.kind.view_scaling_factor_to_fov(vsf)
    }

    pub fn delta_zoom(&self, fov: f64) -> f64 {
        self.kind.delta_zoom(fov)
    }

    /// Current field of view in degrees, derived from pixel-per-radian.
    pub fn fov(&self) -> f64 {
        let vsf = 0.5 * self.viewport_fov_diameter / self.pixel_per_rad;
        360.0 / PI * self.kind.view_scaling_factor_to_fov(vsf)
    }

    pub fn pixel_per_rad_at_center(&self) -> f64 {
        self.pixel_per_rad
    }

    pub fn viewport(&self) -> [i32; 4] {
        self.viewport_xywh
    }

    /// Projection center relative to the viewport origin.
    pub fn viewport_center(&self) -> DVec2 {
        let [x, y, _, _] = self.viewport_xywh;
        self.viewport_center - DVec2::new(x as f64, y as f64)
    }

    /// Projection center in absolute pixels.
    pub fn viewport_center_absolute(&self) -> DVec2 {
        self.viewport_center
    }

    pub fn viewport_fov_diameter(&self) -> f64 {
        self.viewport_fov_diameter
    }

    pub fn gravity_labels(&self) -> bool {
        self.gravity_labels
    }

    pub fn default_angle_for_gravity_text(&self) -> f64 {
        self.default_angle_for_gravity_text
    }

    pub fn mask_type(&self) -> MaskType {
        self.mask_type
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn bounding_cap(&self) -> &SphericalCap {
        &self.bounding_cap
    }

    /// Whether mirroring flips triangle winding.
    pub fn need_gl_front_face_cw(&self) -> bool {
        self.flip_horz * self.flip_vert < 0.0
    }

    /// Orthographic matrix from viewport pixels to clip space.
    pub fn projection_matrix(&self) -> DMat4 {
        let [x, y, w, h] = self.viewport_xywh.map(|c| c as f64);
        DMat4::from_cols_array(&[
            2.0 / w,
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / h,
            0.0,
            0.0,
            0.0,
            0.0,
            -1.0,
            0.0,
            -(2.0 * x + w) / w,
            -(2.0 * y + h) / h,
            0.0,
            1.0,
        ])
    }

    /// Project a direction to pixels. z holds depth in `[-1, 0]`: 0 at the
    /// near plane, -1 at the far plane.
    ///
    /// The screen vector is always finished, even when the flag is false.
    #[inline]
    pub fn project(&self, v: DVec3) -> (DVec3, bool) {
        let eye = self.model_view.forward(v);
        let (p, valid) = self.kind.forward(eye, self.width_stretch);
        (self.to_screen(p), valid)
    }

    /// Project several directions into `out`, ignoring validity.
    pub fn project_all(&self, input: &[DVec3], out: &mut Vec<DVec3>) {
        out.clear();
        out.extend(input.iter().map(|&v| self.project(v).0));
    }

    /// Scale a projected point to pixels.
    ///
    /// Depth is `(z - z_near) / (z_near - z_far)`: the near plane maps to 0
    /// and the far plane to -1, so depth decreases with distance.
    #[inline(always)]
    fn to_screen(&self, p: DVec3) -> DVec3 {
        DVec3::new(
            self.viewport_center.x + self.flip_horz * self.pixel_per_rad * p.x,
            self.viewport_center.y + self.flip_vert * self.pixel_per_rad * p.y,
            (p.z - self.z_near) * self.one_over_z_near_minus_z_far,
        )
    }

    /// Project and report whether the result lands in the viewport.
    pub fn project_check(&self, v: DVec3) -> (DVec3, bool) {
        let (win, valid) = self.project(v);
        (win, valid && self.check_in_viewport(win.truncate()))
    }

    /// Both ends project validly and at least one is in the viewport.
    pub fn project_line_check(&self, v1: DVec3, v2: DVec3) -> (DVec3, DVec3, bool) {
        let (w1, ok1) = self.project(v1);
        let (w2, ok2) = self.project(v2);
        let visible = ok1
            && ok2
            && (self.check_in_viewport(w1.truncate()) || self.check_in_viewport(w2.truncate()));
        (w1, w2, visible)
    }

    /// Pixel to direction in the current frame.
    ///
    /// The direction is finished even when the pixel lies outside the
    /// projection's domain; the flag reports validity.
    pub fn un_project(&self, x: f64, y: f64) -> (DVec3, bool) {
        let v = DVec3::new(
            self.flip_horz * (x - self.viewport_center.x) / self.pixel_per_rad,
            self.flip_vert * (y - self.viewport_center.y) / self.pixel_per_rad,
            0.0,
        );
        let (v, valid) = self.kind.backward(v, self.width_stretch);
        (self.model_view.backward(v), valid)
    }

    #[inline(always)]
    pub fn check_in_viewport(&self, pos: DVec2) -> bool {
        let [x, y, w, h] = self.viewport_xywh;
        pos.y >= y as f64 && pos.x >= x as f64 && pos.y <= (y + h) as f64 && pos.x <= (x + w) as f64
    }

    /// Where the segment from `inside` to `outside` crosses the viewport edge.
    pub fn viewport_intersect(&self, inside: DVec2, outside: DVec2) -> DVec2 {
        let mut v1 = inside;
        let mut v2 = outside;
        let mut v = v1;
        for _ in 0..VIEWPORT_INTERSECT_ITERATIONS {
            v = (v1 + v2) * 0.5;
            if self.check_in_viewport(v) {
                v1 = v;
            } else {
                v2 = v;
            }
        }
        v
    }

    /// Whether the segment between two directions crosses the projection seam.
    #[inline]
    pub fn intersects_discontinuity(&self, p1: DVec3, p2: DVec3) -> bool {
        if !self.has_discontinuity() {
            return false;
        }
        let (e1, e2) = (self.model_view.forward(p1), self.model_view.forward(p2));
        self.kind.intersects_discontinuity_internal(e1, e2)
    }

    /// Whether a cap straddles the projection seam.
    pub fn intersects_discontinuity_cap(&self, cap: &SphericalCap) -> bool {
        if !self.has_discontinuity() {
            return false;
        }
        let n = self.model_view.forward(cap.n) - self.model_view.forward(DVec3::ZERO);
        let eye_cap = SphericalCap::new(n, cap.d);
        let left = SphericalCap::new(DVec3::X, 0.0);
        let right = SphericalCap::new(DVec3::NEG_X, 0.0);
        let back = SphericalCap::new(DVec3::Z, 0.0);
        eye_cap.intersects(&left) && eye_cap.intersects(&right) && eye_cap.intersects(&back)
    }

    /// Conservative cap around everything visible in the viewport.
    ///
    /// The direction farthest from the view center lies on the viewport
    /// boundary, so only the boundary is searched.
    fn compute_bounding_cap(&mut self) {
        let (center, center_ok) = self.un_project(self.viewport_center.x, self.viewport_center.y);
        let n = center.normalize_or_zero();
        let d = if center_ok && n != DVec3::ZERO {
            self.boundary_min_dot(n)
        } else {
            None
        };

        self.bounding_cap = match d {
            Some(d) => SphericalCap { n, d },
            None => {
                debug!("bounding cap of {} falls back to the full sky", self.kind.id());
                SphericalCap { n: if n == DVec3::ZERO { DVec3::X } else { n }, d: -1.0 }
            }
        };
    }

    /// Smallest `n · v` over the viewport boundary. `None` when part of the
    /// boundary falls outside the projection's domain.
    fn boundary_min_dot(&self, n: DVec3) -> Option<f64> {
        match self.mask_type {
            MaskType::Disk => {
                let r = 0.5 * self.viewport_fov_diameter;
                let c = self.viewport_center;
                (0..8).try_fold(1.0_f64, |d, i| {
                    let a = i as f64 * PI / 4.0;
                    let (e, valid) = self.un_project(c.x + r * a.cos(), c.y + r * a.sin());
                    valid.then(|| d.min(n.dot(e.normalize_or_zero())))
                })
            }
            MaskType::None => {
                let [x, y, w, h] = self.viewport_xywh.map(|c| c as f64);
                let corners = [
                    DVec2::new(x, y),
                    DVec2::new(x + w, y),
                    DVec2::new(x + w, y + h),
                    DVec2::new(x, y + h),
                ];
                (0..4).try_fold(1.0_f64, |d, i| {
                    Some(d.min(self.edge_min_dot(n, corners[i], corners[(i + 1) % 4])?))
                })
            }
        }
    }

    /// Smallest `n · v` along the viewport edge from `a` to `b`.
    ///
    /// Near the rim of a projection's domain the minimum can sit between
    /// corners, so the edge is sampled and then refined around its lowest
    /// sample.
    fn edge_min_dot(&self, n: DVec3, a: DVec2, b: DVec2) -> Option<f64> {
        let dot_at = |t: f64| {
            let p = a.lerp(b, t);
            let (e, valid) = self.un_project(p.x, p.y);
            valid.then(|| n.dot(e.normalize_or_zero()))
        };
        let step = 1.0 / BOUNDARY_SAMPLES_PER_EDGE as f64;
        let samples = (0..=BOUNDARY_SAMPLES_PER_EDGE)
            .map(|i| dot_at(i as f64 * step))
            .collect::<Option<Vec<_>>>()?;
        let (lowest, d) = samples
            .iter()
            .copied()
            .enumerate()
            .min_by(|l, r| l.1.total_cmp(&r.1))?;

        let mut lo = lowest.saturating_sub(1) as f64 * step;
        let mut hi = (lowest + 1).min(BOUNDARY_SAMPLES_PER_EDGE) as f64 * step;
        for _ in 0..BOUNDARY_REFINE_ITERATIONS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if dot_at(m1)? < dot_at(m2)? {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        Some(d.min(dot_at(0.5 * (lo + hi))?))
    }
}
