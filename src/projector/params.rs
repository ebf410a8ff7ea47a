use glam::DVec2;
use std::str::FromStr;
use thiserror::Error;

/// Shape of the visible region inside the viewport rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskType {
    #[default]
    None,
    /// Only a disk of `viewport_fov_diameter` around the center is drawn.
    Disk,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mask type `{0}`")]
pub struct ParseMaskError(pub String);

impl FromStr for MaskType {
    type Err = ParseMaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "disk" => Ok(Self::Disk),
            _ => Err(ParseMaskError(s.to_string())),
        }
    }
}

/// Configuration a projector is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectorParams {
    /// Pixel rectangle: x, y, width, height.
    pub viewport_xywh: [i32; 4],
    /// Center of the projection in absolute pixel coordinates.
    pub viewport_center: DVec2,
    /// Diameter in pixels that the field of view spans.
    pub viewport_fov_diameter: f64,
    /// Field of view in degrees.
    pub fov: f64,
    pub z_near: f64,
    pub z_far: f64,
    pub flip_horz: bool,
    pub flip_vert: bool,
    pub gravity_labels: bool,
    /// Degrees.
    pub default_angle_for_gravity_text: f64,
    pub mask_type: MaskType,
    pub device_pixel_ratio: f64,
    /// Horizontal stretch applied in the projection plane.
    pub width_stretch: f64,
}

impl Default for ProjectorParams {
    fn default() -> Self {
        Self {
            viewport_xywh: [0, 0, 256, 256],
            viewport_center: DVec2::new(128.0, 128.0),
            viewport_fov_diameter: 256.0,
            fov: 60.0,
            z_near: 0.000_001,
            z_far: 50.0,
            flip_horz: false,
            flip_vert: false,
            gravity_labels: false,
            default_angle_for_gravity_text: 0.0,
            mask_type: MaskType::None,
            device_pixel_ratio: 1.0,
            width_stretch: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("viewport must have positive size, got {0}x{1}")]
    EmptyViewport(i32, i32),

    #[error("field of view must be finite and positive, got {0}")]
    BadFov(f64),

    #[error("fov diameter must be finite and positive, got {0}")]
    BadFovDiameter(f64),

    #[error("near and far planes must differ, both are {0}")]
    DegenerateClip(f64),

    #[error("device pixel ratio must be positive, got {0}")]
    BadPixelRatio(f64),

    #[error("width stretch must be finite and non-zero, got {0}")]
    BadWidthStretch(f64),
}

impl ProjectorParams {
    /// Parameters for a `w`×`h` viewport at (`x`, `y`) centered on its middle,
    /// with the FOV spanning the shorter side.
    pub fn for_viewport(x: i32, y: i32, w: i32, h: i32, fov: f64) -> Self {
        Self {
            viewport_xywh: [x, y, w, h],
            viewport_center: DVec2::new(x as f64 + w as f64 / 2.0, y as f64 + h as f64 / 2.0),
            viewport_fov_diameter: w.min(h) as f64,
            fov,
            ..Self::default()
        }
    }

    /// Check the preconditions the projector relies on without enforcing them.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let [_, _, w, h] = self.viewport_xywh;
        if w <= 0 || h <= 0 {
            return Err(ParamsError::EmptyViewport(w, h));
        }
        if !self.fov.is_finite() || self.fov <= 0.0 {
            return Err(ParamsError::BadFov(self.fov));
        }
        if !self.viewport_fov_diameter.is_finite() || self.viewport_fov_diameter <= 0.0 {
            return Err(ParamsError::BadFovDiameter(self.viewport_fov_diameter));
        }
        if self.z_near == self.z_far {
            return Err(ParamsError::DegenerateClip(self.z_near));
        }
        if self.device_pixel_ratio <= 0.0 {
            return Err(ParamsError::BadPixelRatio(self.device_pixel_ratio));
        }
        if !self.width_stretch.is_finite() || self.width_stretch == 0.0 {
            return Err(ParamsError::BadWidthStretch(self.width_stretch));
        }
        Ok(())
    }
}
