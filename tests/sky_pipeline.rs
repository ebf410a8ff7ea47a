//! End-to-end checks of the drawing pipeline: projector, tessellator, grid and
//! reference lines working together through the public API.

use glam::{DMat4, DVec2, DVec3};
use skyproj::grid::Observer;
use skyproj::sphere::sphe_to_rect;
use skyproj::{
    FrameType, ModelViewTransform, ProjectionKind, Projector, ProjectorParams, SkyGrid, SkyLine,
    SkyLineKind, Tessellator, Topology,
};

fn projector(kind: ProjectionKind, fov: f64, mvt: ModelViewTransform) -> Projector {
    let params = ProjectorParams::for_viewport(0, 0, 800, 600, fov);
    Projector::new(kind, mvt, &params)
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let t = if ab.length_squared() > 0.0 {
        ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (a + ab * t - p).length()
}

#[test]
fn grid_draws_for_every_projection() {
    let mvt = ModelViewTransform::looking_at(sphe_to_rect(0.3, 0.5), DVec3::Z);
    for kind in [
        ProjectionKind::Stereographic,
        ProjectionKind::EqualArea,
        ProjectionKind::Fisheye,
        ProjectionKind::Hammer,
        ProjectionKind::Orthographic,
        ProjectionKind::Cylinder,
    ] {
        let prj = projector(kind, 90.0, mvt.clone());
        let tess = Tessellator::new(&prj);
        let mut labels = 0;
        let strips = SkyGrid::new(FrameType::EquatorialJ2000).draw(&tess, |_| labels += 1);
        assert!(!strips.is_empty(), "{kind}: no grid");
        assert!(labels > 0, "{kind}: no labels");
        for strip in &strips {
            assert_eq!(strip.topology, Topology::LineStrip);
            assert!(strip.len() >= 2);
            assert!(strip.vertices.iter().all(|v| !v.is_nan()), "{kind}: NaN vertex");
        }
    }
}

#[test]
fn grid_refines_when_zooming() {
    let mvt = ModelViewTransform::looking_at(sphe_to_rect(1.0, 0.2), DVec3::Z);
    let grid = SkyGrid::new(FrameType::Galactic);
    let mut previous = f64::INFINITY;
    for fov in [60.0, 10.0, 1.0, 0.1] {
        let params = ProjectorParams::for_viewport(0, 0, 800, 800, fov);
        let prj = Projector::new(ProjectionKind::Stereographic, mvt.clone(), &params);
        let (_, parallel) = grid.steps(&prj);
        assert!(parallel < previous, "fov {fov}: {parallel} not finer than {previous}");
        // Lines stay at least the label spacing apart
        assert!(parallel * prj.pixel_per_rad_at_center() >= 79.0, "fov {fov}");
        previous = parallel;
    }
}

#[test]
fn galactic_equator_crosses_galactic_center() {
    let observer = Observer::default();
    let to_j2000 = FrameType::Galactic.rotation_to(FrameType::EquatorialJ2000, &observer);
    let center = to_j2000 * DVec3::X;

    // The view works in J2000; the line's own frame is chained in
    let mut mvt = ModelViewTransform::looking_at(center, DVec3::Z);
    mvt.combine(DMat4::from_mat3(to_j2000));
    let prj = projector(ProjectionKind::Stereographic, 40.0, mvt);
    let tess = Tessellator::new(&prj);

    let mut labels = Vec::new();
    let strips = SkyLine::new(SkyLineKind::GalacticEquator).draw(&tess, |l| labels.push(l));
    assert!(!strips.is_empty());
    assert_eq!(labels.len(), 2);

    let screen_center = prj.viewport_center_absolute();
    let closest = strips
        .iter()
        .flat_map(|s| {
            s.vertices
                .windows(2)
                .map(|w| distance_to_segment(screen_center, w[0], w[1]))
        })
        .fold(f64::INFINITY, f64::min);
    assert!(closest < 1.0, "equator passes {closest}px from the center");
}

#[test]
fn arc_endpoints_survive_tessellation() {
    let prj = projector(ProjectionKind::Fisheye, 120.0, ModelViewTransform::default());
    let tess = Tessellator::new(&prj);
    let a = DVec3::new(-0.5, 0.2, -1.0).normalize();
    let b = DVec3::new(0.6, -0.1, -1.0).normalize();

    let strips = tess.great_circle_arc(a, b, None, |_| {});
    assert_eq!(strips.len(), 1);
    let line = &strips[0].vertices;
    let (wa, _) = prj.project(a);
    let (wb, _) = prj.project(b);
    assert!((line[0] - wa.truncate()).length() < 1e-9);
    assert!((line[line.len() - 1] - wb.truncate()).length() < 1e-9);
}

#[test]
fn filled_fan_around_view_center() {
    let prj = projector(ProjectionKind::Stereographic, 120.0, ModelViewTransform::default());
    let tess = Tessellator::new(&prj);
    // A 40° wide hexagon fan around the view axis
    let mut fan = vec![DVec3::NEG_Z];
    for k in 0..=6 {
        let a = k as f64 * std::f64::consts::TAU / 6.0;
        let r = 20f64.to_radians();
        fan.push(DVec3::new(r.sin() * a.cos(), r.sin() * a.sin(), -r.cos()));
    }
    let out = tess.spherical_triangles(&fan, Topology::TriangleFan, None);
    assert_eq!(out.topology, Topology::Triangles);
    assert!(out.len() >= 18);
    assert_eq!(out.len() % 3, 0);
    let center = prj.viewport_center_absolute();
    for v in &out.vertices {
        assert!((*v - center).length() < 300.0);
    }
}

#[test]
fn fisheye_full_sky_scenario() {
    let prj = projector(ProjectionKind::Fisheye, 180.0, ModelViewTransform::default());
    let (win, valid) = prj.project(DVec3::NEG_Z);
    assert!(valid);
    assert!((win.truncate() - DVec2::new(400.0, 300.0)).length() < 1e-9);
    assert!((prj.max_fov() - 180.0).abs() < 1e-4);
}

#[test]
fn cylinder_seam_scenario() {
    let prj = projector(ProjectionKind::Cylinder, 180.0, ModelViewTransform::default());
    let at = |deg: f64| {
        let a = deg.to_radians();
        DVec3::new(a.sin(), 0.0, -a.cos())
    };
    let (a, b) = (at(179.0), at(-179.0));
    assert!(prj.intersects_discontinuity(a, b));

    let tess = Tessellator::new(&prj);
    let arc = tess.subdivide_arc(a, b, DVec3::ZERO);
    assert!(arc.iter().any(|v| !v.valid), "no break across the seam");
}
