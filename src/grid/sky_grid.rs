use super::label::{GridLabel, LabelValue};
use super::step::{closest_resolution, sample_pixel_per_rad, StepLadder};
use super::{visible_circle_arcs, FrameType};
use crate::projector::Projector;
use crate::sphere::{rect_to_sphe, rotate_about, sphe_to_rect, SphericalCap};
use crate::tessellate::{EdgeCrossing, Tessellator, VertexArray};
use glam::DVec3;
use log::trace;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Parallels this close to a pole are not drawn.
const POLE_PARALLEL_LIMIT: f64 = 0.999_999_9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    /// Minimum on-screen distance between neighbouring grid lines, pixels.
    pub min_label_spacing: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { min_label_spacing: 80.0 }
    }
}

/// Meridians and parallels of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGrid {
    frame: FrameType,
    settings: GridSettings,
}

impl SkyGrid {
    pub fn new(frame: FrameType) -> Self {
        Self::with_settings(frame, GridSettings::default())
    }

    pub fn with_settings(frame: FrameType, settings: GridSettings) -> Self {
        Self { frame, settings }
    }

    pub fn frame(&self) -> FrameType {
        self.frame
    }

    pub fn settings(&self) -> GridSettings {
        self.settings
    }

    /// Grid steps in radians, (meridians, parallels), for the current view.
    pub fn steps(&self, prj: &Projector) -> (f64, f64) {
        let ppr = sample_pixel_per_rad(prj);
        let (_, lat) = rect_to_sphe(view_center(prj));
        self.steps_at(prj, ppr, lat)
    }

    fn steps_at(&self, prj: &Projector, ppr: f64, center_lat: f64) -> (f64, f64) {
        let spacing = self.settings.min_label_spacing;
        let parallel = closest_resolution(ppr, spacing, StepLadder::Degrees);
        let ladder = self.frame.meridian_ladder();
        let pole_in_view = prj.project_check(DVec3::Z).1 || prj.project_check(DVec3::NEG_Z).1;
        let meridian = if pole_in_view {
            ladder.fallback_deg()
        } else {
            closest_resolution(ppr * center_lat.cos(), spacing, ladder)
        };
        trace!(
            "{} grid: meridian step {meridian}°, parallel step {parallel}°, pole in view: {}",
            self.frame,
            pole_in_view
        );
        (meridian.to_radians(), parallel.to_radians())
    }

    /// Tessellate the visible grid lines.
    ///
    /// The tessellator's projector must map directions of this grid's frame.
    /// `on_label` receives every point where a line leaves the viewport.
    pub fn draw<F>(&self, tess: &Tessellator<'_>, mut on_label: F) -> Vec<VertexArray>
    where
        F: FnMut(GridLabel),
    {
        let prj = tess.projector();
        let ppr = sample_pixel_per_rad(prj);
        let (lon_c, lat_c) = rect_to_sphe(view_center(prj));
        let (meridian_step, parallel_step) = self.steps_at(prj, ppr, lat_c);

        // Grid node closest to the view center
        let lon0 = meridian_step * (lon_c / meridian_step + 0.5).trunc();
        let lat0 = parallel_step * (lat_c / parallel_step + 0.5).trunc();

        let view = *prj.bounding_cap();
        let mut strips = Vec::new();
        self.draw_meridians(tess, &view, lon0, lat0, meridian_step, &mut strips, &mut on_label);
        self.draw_parallels(tess, &view, lon0, lat0, parallel_step, &mut strips, &mut on_label);
        strips
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_meridians<F>(
        &self,
        tess: &Tessellator<'_>,
        view: &SphericalCap,
        lon0: f64,
        lat0: f64,
        step: f64,
        strips: &mut Vec<VertexArray>,
        on_label: &mut F,
    ) where
        F: FnMut(GridLabel),
    {
        let prj = tess.projector();
        // Each great circle holds two meridians, so half a turn covers the sky
        let max_iter = (PI / step).round() as i64;
        let mut draw = |k: i64| {
            let lon = lon0 + k as f64 * step;
            let circle = SphericalCap { n: DVec3::new(lon.sin(), -lon.cos(), 0.0), d: 0.0 };
            let first = sphe_to_rect(lon, lat0);
            let arcs = visible_circle_arcs(tess, view, &circle, first, |c: EdgeCrossing| {
                let (v, _) = prj.un_project(c.point.x, c.point.y);
                let (lon_at, _) = rect_to_sphe(v);
                on_label(GridLabel::at_crossing(c, self.meridian_value(lon, lon_at)));
            });
            match arcs {
                Some(arcs) => {
                    strips.extend(arcs);
                    true
                }
                None => false,
            }
        };

        let mut drawn = 0;
        while drawn < max_iter && draw(drawn) {
            drawn += 1;
        }
        if drawn < max_iter {
            for k in 1..=max_iter - drawn {
                if !draw(-k) {
                    break;
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_parallels<F>(
        &self,
        tess: &Tessellator<'_>,
        view: &SphericalCap,
        lon0: f64,
        lat0: f64,
        step: f64,
        strips: &mut Vec<VertexArray>,
        on_label: &mut F,
    ) where
        F: FnMut(GridLabel),
    {
        // Walk along the meridian through the start node, across the pole if needed
        let axis = DVec3::new(lon0.sin(), -lon0.cos(), 0.0);
        let start = sphe_to_rect(lon0, lat0);
        let max_iter = (PI / step).round() as i64 - 1;
        let mut draw = |k: i64| {
            let point = rotate_about(start, axis, k as f64 * step);
            if point.z.abs() > POLE_PARALLEL_LIMIT {
                return false;
            }
            let (_, lat) = rect_to_sphe(point);
            let circle = SphericalCap { n: DVec3::Z, d: point.z };
            let arcs = visible_circle_arcs(tess, view, &circle, point, |c: EdgeCrossing| {
                on_label(GridLabel::at_crossing(c, LabelValue::Parallel(lat)));
            });
            match arcs {
                Some(arcs) => {
                    strips.extend(arcs);
                    true
                }
                None => false,
            }
        };

        let mut drawn = 0;
        while drawn < max_iter && draw(drawn) {
            drawn += 1;
        }
        if drawn < max_iter {
            for k in 1..=max_iter - drawn {
                if !draw(-k) {
                    break;
                }
            }
        }
    }

    /// Pick which half of the meridian great circle at `lon` passes through a
    /// point at `lon_at`, in this frame's labelling convention.
    fn meridian_value(&self, lon: f64, lon_at: f64) -> LabelValue {
        let offset = (lon_at - lon + PI).rem_euclid(TAU) - PI;
        let mut longitude = if offset.abs() > FRAC_PI_2 { lon + PI } else { lon };
        if self.frame.azimuth_from_north() {
            longitude = PI - longitude;
        }
        let mut longitude = longitude.rem_euclid(TAU);
        if TAU - longitude < 1e-12 {
            longitude = 0.0;
        }
        LabelValue::Meridian {
            longitude,
            hours: self.frame.uses_hour_angle(),
        }
    }
}

/// Direction one pixel off the middle of the viewport.
fn view_center(prj: &Projector) -> DVec3 {
    let [x, y, w, h] = prj.viewport().map(f64::from);
    prj.un_project(x + w / 2.0, y + h / 2.0 + 1.0).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{ModelViewTransform, ProjectionKind, ProjectorParams};
    use approx::assert_abs_diff_eq;

    fn projector(
        kind: ProjectionKind,
        w: i32,
        h: i32,
        fov: f64,
        mvt: ModelViewTransform,
    ) -> Projector {
        let mut params = ProjectorParams::for_viewport(0, 0, w, h, fov);
        params.flip_vert = true;
        Projector::new(kind, mvt, &params)
    }

    fn facing(lon_deg: f64, lat_deg: f64) -> ModelViewTransform {
        let dir = sphe_to_rect(lon_deg.to_radians(), lat_deg.to_radians());
        ModelViewTransform::looking_at(dir, DVec3::Z)
    }

    fn is_multiple(value: f64, step: f64) -> bool {
        let r = (value / step).round();
        (value - r * step).abs() < 1e-6
    }

    #[test]
    fn test_step_selection_at_sixty_degrees() {
        let prj = projector(ProjectionKind::Fisheye, 800, 800, 60.0, facing(30.0, 0.0));
        let grid = SkyGrid::new(FrameType::Galactic);
        let (meridian, parallel) = grid.steps(&prj);
        assert_abs_diff_eq!(parallel.to_degrees(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(meridian.to_degrees(), 10.0, epsilon = 1e-9);

        let equatorial = SkyGrid::new(FrameType::EquatorialJ2000);
        let (meridian, _) = equatorial.steps(&prj);
        assert_abs_diff_eq!(meridian.to_degrees(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zooming_in_refines_steps() {
        let wide = projector(ProjectionKind::Stereographic, 800, 600, 60.0, facing(10.0, 20.0));
        let narrow = projector(ProjectionKind::Stereographic, 800, 600, 0.5, facing(10.0, 20.0));
        let grid = SkyGrid::new(FrameType::EclipticJ2000);
        let (_, coarse) = grid.steps(&wide);
        let (_, fine) = grid.steps(&narrow);
        assert!(fine < coarse);
        assert_abs_diff_eq!(fine.to_degrees(), 5.0 / 60.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_labels_are_on_grid_values() {
        let prj = projector(ProjectionKind::Stereographic, 800, 600, 60.0, facing(40.0, 25.0));
        let tess = Tessellator::new(&prj);
        let grid = SkyGrid::new(FrameType::Galactic);
        let mut labels = Vec::new();
        let strips = grid.draw(&tess, |l| labels.push(l));
        assert!(!strips.is_empty());
        assert!(!labels.is_empty());

        let mut parallels = 0;
        let mut meridians = 0;
        for label in &labels {
            match label.value {
                LabelValue::Parallel(lat) => {
                    parallels += 1;
                    assert!(is_multiple(lat.to_degrees(), 10.0), "{lat}");
                }
                LabelValue::Meridian { longitude, hours } => {
                    meridians += 1;
                    assert!(!hours);
                    assert!(is_multiple(longitude.to_degrees(), 10.0), "{longitude}");
                    assert!((0.0..TAU).contains(&longitude));
                }
                LabelValue::Line(_) => unreachable!(),
            }
        }
        assert!(parallels > 0);
        assert!(meridians > 0);
    }

    #[test]
    fn test_meridian_label_resolves_visible_half() {
        // Looking at longitude 40: the meridian circle through 40 also holds 220
        let prj = projector(ProjectionKind::Stereographic, 800, 600, 60.0, facing(40.0, 0.0));
        let tess = Tessellator::new(&prj);
        let mut longitudes = Vec::new();
        SkyGrid::new(FrameType::Galactic).draw(&tess, |l| {
            if let LabelValue::Meridian { longitude, .. } = l.value {
                longitudes.push(longitude.to_degrees());
            }
        });
        assert!(longitudes.iter().any(|&lon| (lon - 40.0).abs() < 1e-6));
        assert!(longitudes.iter().all(|&lon| (lon - 40.0).abs() < 60.0));
    }

    #[test]
    fn test_pole_in_view() {
        let mvt = ModelViewTransform::looking_at(DVec3::Z, DVec3::X);
        let prj = projector(ProjectionKind::Stereographic, 800, 600, 60.0, mvt);
        assert!(prj.project_check(DVec3::Z).1);
        let tess = Tessellator::new(&prj);
        let grid = SkyGrid::new(FrameType::EquatorialJ2000);
        let (meridian, parallel) = grid.steps(&prj);
        assert_abs_diff_eq!(meridian.to_degrees(), 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(parallel.to_degrees(), 10.0, epsilon = 1e-9);

        let mut labels = Vec::new();
        let strips = grid.draw(&tess, |l| labels.push(l));
        assert!(!strips.is_empty());
        let mut hour_meridians = 0;
        let mut parallels = 0;
        for label in &labels {
            match label.value {
                LabelValue::Meridian { longitude, hours } => {
                    assert!(hours);
                    assert!(is_multiple(longitude.to_degrees(), 15.0));
                    hour_meridians += 1;
                }
                LabelValue::Parallel(lat) => {
                    assert!(is_multiple(lat.to_degrees(), 10.0));
                    assert!(lat > 0.0);
                    parallels += 1;
                }
                LabelValue::Line(_) => unreachable!(),
            }
        }
        assert!(hour_meridians >= 12);
        assert!(parallels > 0);
    }

    #[test]
    fn test_ecliptic_pole_in_view_uses_hour_fallback() {
        let mvt = ModelViewTransform::looking_at(DVec3::Z, DVec3::X);
        let prj = projector(ProjectionKind::Stereographic, 800, 600, 60.0, mvt);
        for frame in [FrameType::EclipticJ2000, FrameType::EclipticOfDate] {
            let (meridian, parallel) = SkyGrid::new(frame).steps(&prj);
            assert_abs_diff_eq!(meridian.to_degrees(), 15.0, epsilon = 1e-9);
            assert_abs_diff_eq!(parallel.to_degrees(), 10.0, epsilon = 1e-9);
        }
        let (meridian, _) = SkyGrid::new(FrameType::Galactic).steps(&prj);
        assert_abs_diff_eq!(meridian.to_degrees(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ecliptic_meridians_follow_hour_ladder() {
        let prj = projector(ProjectionKind::Stereographic, 800, 600, 2.0, facing(30.0, 0.0));
        assert!(!prj.project_check(DVec3::Z).1 && !prj.project_check(DVec3::NEG_Z).1);
        // Minimum spacing of 700": 20' on the degree ladder, 15' on the hour ladder
        let ppr = 80.0 / (700.0f64 / 3600.0).to_radians();

        let ecliptic = SkyGrid::new(FrameType::EclipticJ2000);
        let (meridian, parallel) = ecliptic.steps_at(&prj, ppr, 0.0);
        assert_abs_diff_eq!(meridian.to_degrees() * 60.0, 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(parallel.to_degrees() * 60.0, 20.0, epsilon = 1e-9);

        let (meridian, _) = SkyGrid::new(FrameType::Supergalactic).steps_at(&prj, ppr, 0.0);
        assert_abs_diff_eq!(meridian.to_degrees() * 60.0, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_sky_view_draws_every_line() {
        let prj = projector(ProjectionKind::Orthographic, 600, 600, 179.0, facing(0.0, 0.0));
        assert!(prj.bounding_cap().is_full_sky());
        let tess = Tessellator::new(&prj);
        let strips = SkyGrid::new(FrameType::AltAz).draw(&tess, |_| {});
        assert!(!strips.is_empty());
    }

    #[test]
    fn test_azimuth_counts_from_north() {
        let grid = SkyGrid::new(FrameType::AltAz);
        // Internal longitude 0 points south: azimuth 180
        match grid.meridian_value(0.0, 0.1) {
            LabelValue::Meridian { longitude, hours } => {
                assert!(!hours);
                assert_abs_diff_eq!(longitude, PI, epsilon = 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        match grid.meridian_value(0.0, 3.0) {
            LabelValue::Meridian { longitude, .. } => {
                assert_abs_diff_eq!(longitude, 0.0, epsilon = 1e-12)
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
