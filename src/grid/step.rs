use crate::projector::Projector;
use glam::DVec3;

/// Grid steps for latitude-like axes, in arcseconds.
const STEP_SIZES_DMS: [f64; 10] = [
    1.0, 5.0, 10.0, 60.0, 300.0, 600.0, 1200.0, 3600.0, 18000.0, 36000.0,
];
/// Grid steps for right-ascension axes, in arcseconds of angle (1s of time = 15").
const STEP_SIZES_HMS: [f64; 9] = [1.5, 7.5, 15.0, 75.0, 150.0, 900.0, 4500.0, 9000.0, 54000.0];

/// Which ladder of round values a grid axis picks its step from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepLadder {
    /// Degrees, arcminutes and arcseconds.
    Degrees,
    /// Hours, minutes and seconds of time.
    Hours,
}

impl StepLadder {
    fn steps_arcsec(self) -> &'static [f64] {
        match self {
            Self::Degrees => &STEP_SIZES_DMS,
            Self::Hours => &STEP_SIZES_HMS,
        }
    }

    /// Step used when even the coarsest ladder entry is too fine, in degrees.
    pub fn fallback_deg(self) -> f64 {
        match self {
            Self::Degrees => 10.0,
            Self::Hours => 15.0,
        }
    }
}

/// Smallest ladder step (degrees) spanning more than `min_spacing` pixels at
/// `pixel_per_rad`.
pub fn closest_resolution(pixel_per_rad: f64, min_spacing: f64, ladder: StepLadder) -> f64 {
    let min_size_arcsec = (min_spacing / pixel_per_rad).to_degrees() * 3600.0;
    ladder
        .steps_arcsec()
        .iter()
        .find(|&&step| step > min_size_arcsec)
        .map_or(ladder.fallback_deg(), |step| step / 3600.0)
}

/// Pixels per radian around the viewport center, measured by unprojecting the
/// center pixel and its right and lower neighbours.
///
/// Falls back to the projector's nominal scale when a sample can't be
/// unprojected.
pub fn sample_pixel_per_rad(prj: &Projector) -> f64 {
    let [x, y, w, h] = prj.viewport().map(|c| c as f64);
    let (cx, cy) = (x + w / 2.0, y + h / 2.0);
    let (c, ok0) = prj.un_project(cx, cy);
    let (right, ok1) = prj.un_project(cx + 1.0, cy);
    let (down, ok2) = prj.un_project(cx, cy + 1.0);
    if !(ok0 && ok1 && ok2) {
        return prj.pixel_per_rad_at_center();
    }
    let mean = 0.5 * (angle_between(c, right) + angle_between(c, down));
    if mean > 0.0 && mean.is_finite() {
        1.0 / mean
    } else {
        prj.pixel_per_rad_at_center()
    }
}

#[inline(always)]
fn angle_between(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}
