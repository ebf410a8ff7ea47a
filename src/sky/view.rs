use glam::{DMat4, DVec3};
use skyproj::grid::{FrameType, Observer};
use skyproj::sphere::{rect_to_sphe, sphe_to_rect};
use skyproj::{ModelViewTransform, ProjectionKind, Projector, ProjectorParams};

/// Smallest field of view the viewer zooms to, degrees.
const MIN_FOV: f64 = 0.001;
const ZOOM_FACTOR: f64 = 1.25;

/// What part of the sky is shown and how.
#[derive(Debug, Clone)]
pub struct SkyView {
    pub kind: ProjectionKind,
    pub frame: FrameType,
    pub observer: Observer,
    /// View direction in `frame`, degrees
    pub center_lon: f64,
    pub center_lat: f64,
    /// Field of view, degrees
    pub fov: f64,
    pub flip_horz: bool,
    pub flip_vert: bool,
    /// Canvas size in Braille dots
    pub width: usize,
    pub height: usize,
}

impl SkyView {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            kind: ProjectionKind::Stereographic,
            frame: FrameType::EquatorialJ2000,
            observer: Observer::default(),
            center_lon: 0.0,
            center_lat: 0.0,
            fov: 90.0,
            flip_horz: false,
            flip_vert: false,
            width,
            height,
        }
    }

    /// Projector parameters for the canvas. Screen y grows downward, so the
    /// vertical axis is flipped unless the user flipped it back.
    pub fn params(&self) -> ProjectorParams {
        let w = self.width.clamp(1, i32::MAX as usize) as i32;
        let h = self.height.clamp(1, i32::MAX as usize) as i32;
        let fov = self.fov.clamp(MIN_FOV, self.kind.max_fov());
        let mut params = ProjectorParams::for_viewport(0, 0, w, h, fov);
        params.flip_horz = self.flip_horz;
        params.flip_vert = !self.flip_vert;
        params
    }

    fn center_dir(&self) -> DVec3 {
        sphe_to_rect(self.center_lon.to_radians(), self.center_lat.to_radians())
    }

    /// Camera looking at the view center with north up.
    pub fn model_view(&self) -> ModelViewTransform {
        let (lon, lat) = (self.center_lon.to_radians(), self.center_lat.to_radians());
        let north = DVec3::new(-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos());
        ModelViewTransform::looking_at(self.center_dir(), north)
    }

    /// Projector for directions given in the view frame.
    pub fn projector(&self) -> Projector {
        Projector::new(self.kind, self.model_view(), &self.params())
    }

    /// Projector for directions given in `frame`.
    pub fn projector_for(&self, frame: FrameType) -> Projector {
        let mut mvt = self.model_view();
        mvt.combine(DMat4::from_mat3(frame.rotation_to(self.frame, &self.observer)));
        Projector::new(self.kind, mvt, &self.params())
    }

    /// Degrees per canvas dot around the center.
    fn degrees_per_dot(&self) -> f64 {
        1.0 / self.projector().pixel_per_rad_at_center().to_radians()
    }

    /// Move the view by a canvas dot offset; positive `dx` looks further right.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.degrees_per_dot();
        let sx = if self.flip_horz { -1.0 } else { 1.0 };
        let sy = if self.flip_vert { -1.0 } else { 1.0 };
        let cos_lat = self.center_lat.to_radians().cos().max(0.01);
        self.center_lon -= sx * dx as f64 * scale / cos_lat;
        self.center_lat -= sy * dy as f64 * scale;

        self.center_lon = (self.center_lon + 180.0).rem_euclid(360.0) - 180.0;
        self.center_lat = self.center_lat.clamp(-90.0, 90.0);
    }

    pub fn zoom_in(&mut self) {
        self.fov = (self.fov / ZOOM_FACTOR).max(MIN_FOV);
    }

    pub fn zoom_out(&mut self) {
        self.fov = (self.fov * ZOOM_FACTOR).min(self.kind.max_fov());
    }

    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, true);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, false);
    }

    /// Zoom while keeping the sky under a canvas dot in place.
    fn zoom_at(&mut self, px: i32, py: i32, zoom_in: bool) {
        let (target, valid) = self.projector().un_project(px as f64, py as f64);
        if zoom_in {
            self.zoom_in();
        } else {
            self.zoom_out();
        }
        if !valid {
            return;
        }
        let (win, visible) = self.projector().project(target);
        if visible {
            self.pan((win.x - px as f64).round() as i32, (win.y - py as f64).round() as i32);
        }
    }

    /// Sky coordinates (degrees, in the view frame) under a canvas dot.
    pub fn unproject(&self, px: i32, py: i32) -> Option<(f64, f64)> {
        let (v, valid) = self.projector().un_project(px as f64, py as f64);
        valid.then(|| {
            let (lon, lat) = rect_to_sphe(v);
            (lon.to_degrees(), lat.to_degrees())
        })
    }

    /// Next projection kind, keeping the field of view within its limit.
    pub fn cycle_projection(&mut self) {
        let kinds: Vec<ProjectionKind> = ProjectionKind::ALL
            .into_iter()
            .filter(|&k| k != ProjectionKind::Planar)
            .collect();
        let idx = kinds.iter().position(|&k| k == self.kind).map_or(0, |i| (i + 1) % kinds.len());
        self.kind = kinds[idx];
        self.fov = self.fov.min(self.kind.max_fov());
    }

    /// Next frame, still looking at the same part of the sky.
    pub fn cycle_frame(&mut self) {
        let idx = FrameType::ALL.iter().position(|&f| f == self.frame).unwrap_or(0);
        let next = FrameType::ALL[(idx + 1) % FrameType::ALL.len()];
        let dir = self.frame.rotation_to(next, &self.observer) * self.center_dir();
        let (lon, lat) = rect_to_sphe(dir);
        self.frame = next;
        self.center_lon = lon.to_degrees();
        self.center_lat = lat.to_degrees();
    }
}
