use super::{ScreenVertex, Tessellator, Topology, VertexArray};
use crate::projector::ProjectionKind;
use crate::sphere::{orthogonal, SphericalCap};
use glam::{DVec2, DVec3};

/// Below this squared length a rotation center is treated as the origin.
const GREAT_CIRCLE_EPSILON: f64 = 1e-11;

/// Where a tessellated line leaves or enters the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCrossing {
    /// Point on the viewport edge, in pixels.
    pub point: DVec2,
    /// Screen direction pointing out of the viewport.
    pub direction: DVec2,
}

/// The circle an arc runs along: points are `center + radius·unit`.
#[derive(Debug, Clone, Copy)]
struct Circle {
    center: DVec3,
    radius: f64,
}

impl Circle {
    fn through(start: DVec3, rot_center: DVec3) -> Self {
        if rot_center.length_squared() < GREAT_CIRCLE_EPSILON {
            Self { center: DVec3::ZERO, radius: 1.0 }
        } else {
            let radius = (rot_center.cross(start) / rot_center.length()).length();
            Self { center: rot_center, radius }
        }
    }

    /// Midpoint of two positions relative to the center.
    fn midpoint(&self, p1: DVec3, p2: DVec3) -> DVec3 {
        let sum = p1 + p2;
        let dir = if sum.length_squared() > 1e-24 {
            sum.normalize()
        } else if self.center != DVec3::ZERO {
            // Opposite points on a small circle: step a quarter turn around the center
            self.center.cross(p1).normalize_or_zero()
        } else {
            orthogonal(p1)
        };
        dir * self.radius
    }
}

impl Tessellator<'_> {
    /// Project and subdivide an arc of the circle around `rot_center` from
    /// `start` to `stop`. A zero `rot_center` selects the great circle.
    ///
    /// Vertices are in arc order. Pairs of invalid copies mark places where the
    /// arc jumps across a projection seam.
    pub fn subdivide_arc(&self, start: DVec3, stop: DVec3, rot_center: DVec3) -> Vec<ScreenVertex> {
        let circle = Circle::through(start, rot_center);
        let w1 = self.project_vertex(start);
        let w2 = self.project_vertex(stop);
        let mut out = Vec::with_capacity(64);
        out.push(w1);
        let (p1, p2) = (start - circle.center, stop - circle.center);
        self.subdivide_into(p1, p2, w1, w2, &circle, 0, true, &mut out);
        out.push(w2);
        out
    }

    #[inline(always)]
    fn project_vertex(&self, v: DVec3) -> ScreenVertex {
        let (win, valid) = self.projector.project(v);
        ScreenVertex::new(win.truncate(), valid)
    }

    #[allow(clippy::too_many_arguments)]
    fn subdivide_into(
        &self,
        p1: DVec3,
        p2: DVec3,
        w1: ScreenVertex,
        w2: ScreenVertex,
        circle: &Circle,
        depth: u32,
        check_discontinuity: bool,
        out: &mut Vec<ScreenVertex>,
    ) {
        let crosses = check_discontinuity
            && self
                .projector
                .intersects_discontinuity(p1 + circle.center, p2 + circle.center);
        if crosses && depth >= self.settings.max_depth {
            out.push(w1.broken());
            out.push(w2.broken());
            return;
        }

        let mid = circle.midpoint(p1, p2);
        let w3 = self.project_vertex(mid + circle.center);
        let distorted =
            ((w1.pos + w2.pos) * 0.5 - w3.pos).length_squared() > self.settings.max_sq_distortion;

        if (distorted || crosses) && depth < self.settings.max_depth {
            let check = crosses || distorted;
            self.subdivide_into(p1, mid, w1, w3, circle, depth + 1, check, out);
            out.push(w3);
            self.subdivide_into(mid, p2, w3, w2, circle, depth + 1, check, out);
        }
    }

    /// Tessellate a small circle arc into visible line strips.
    ///
    /// `on_edge` is called wherever the line crosses the viewport border.
    pub fn small_circle_arc<F>(
        &self,
        start: DVec3,
        stop: DVec3,
        rot_center: DVec3,
        mut on_edge: F,
    ) -> Vec<VertexArray>
    where
        F: FnMut(EdgeCrossing),
    {
        let arc = self.subdivide_arc(start, stop, rot_center);
        self.split_runs(&arc, &mut on_edge)
    }

    /// Tessellate a great circle arc, optionally clipped to a cap first.
    pub fn great_circle_arc<F>(
        &self,
        start: DVec3,
        stop: DVec3,
        clip: Option<&SphericalCap>,
        on_edge: F,
    ) -> Vec<VertexArray>
    where
        F: FnMut(EdgeCrossing),
    {
        let (start, stop) = match clip {
            Some(cap) => match cap.clip_great_circle(start, stop) {
                Some(clipped) => clipped,
                None => return Vec::new(),
            },
            None => (start, stop),
        };
        self.small_circle_arc(start, stop, DVec3::ZERO, on_edge)
    }

    /// Tessellate every segment of a line array as a great circle arc.
    pub fn great_circle_arcs(
        &self,
        vertices: &[DVec3],
        topology: Topology,
        clip: Option<&SphericalCap>,
    ) -> Vec<VertexArray> {
        topology
            .segments(vertices.len())
            .into_iter()
            .flat_map(|(a, b)| self.great_circle_arc(vertices[a], vertices[b], clip, |_| {}))
            .collect()
    }

    /// Project a polyline without subdivision, breaking it where a segment
    /// crosses the projection seam.
    pub fn path(&self, points: &[DVec3]) -> Vec<VertexArray> {
        let prj = self.projector;
        // Orthographic clipping is unreliable for hidden points, so drop them
        let skip_hidden = prj.kind() == ProjectionKind::Orthographic;
        let mut strips = Vec::new();
        let mut run = Vec::new();
        for (i, pair) in points.windows(2).enumerate() {
            let (p1, p2) = (pair[0], pair[1]);
            if prj.intersects_discontinuity(p1, p2) {
                if !run.is_empty() {
                    run.push(prj.project(p1).0.truncate());
                }
                flush_run(&mut run, &mut strips);
                continue;
            }
            let (win, visible) = prj.project(p1);
            if !visible && skip_hidden {
                flush_run(&mut run, &mut strips);
                continue;
            }
            run.push(win.truncate());
            if i + 2 == points.len() {
                run.push(prj.project(p2).0.truncate());
                flush_run(&mut run, &mut strips);
            }
        }
        strips
    }

    /// Walk a subdivided arc and keep the runs that are visible.
    fn split_runs<F>(&self, arc: &[ScreenVertex], on_edge: &mut F) -> Vec<VertexArray>
    where
        F: FnMut(EdgeCrossing),
    {
        let prj = self.projector;
        let mut strips = Vec::new();
        let mut run = Vec::new();
        for (i, pair) in arc.windows(2).enumerate() {
            let (p1, p2) = (pair[0], pair[1]);
            let in1 = prj.check_in_viewport(p1.pos);
            let in2 = prj.check_in_viewport(p2.pos);
            if (p1.valid && in1) || (p2.valid && in2) {
                run.push(p1.pos);
                if i + 2 == arc.len() {
                    run.push(p2.pos);
                    flush_run(&mut run, &mut strips);
                }
                if in1 != in2 {
                    let crossing = if in1 {
                        EdgeCrossing {
                            point: prj.viewport_intersect(p1.pos, p2.pos),
                            direction: p2.pos - p1.pos,
                        }
                    } else {
                        EdgeCrossing {
                            point: prj.viewport_intersect(p2.pos, p1.pos),
                            direction: p1.pos - p2.pos,
                        }
                    };
                    on_edge(crossing);
                }
            } else {
                if !run.is_empty() {
                    run.push(p1.pos);
                }
                flush_run(&mut run, &mut strips);
            }
        }
        strips
    }
}

/// Emit the pending run as a line strip; single points are dropped.
fn flush_run(run: &mut Vec<DVec2>, strips: &mut Vec<VertexArray>) {
    if run.len() > 1 {
        strips.push(VertexArray::line_strip(std::mem::take(run)));
    } else {
        run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{ModelViewTransform, Projector, ProjectorParams};
    use crate::sphere::{rect_to_sphe, sphe_to_rect};
    use crate::tessellate::TessellationSettings;
    use approx::assert_abs_diff_eq;

    /// Direction at longitude `deg` from the view axis on the horizon (y = 0).
    fn eye_dir(deg: f64) -> DVec3 {
        let a = deg.to_radians();
        DVec3::new(a.sin(), 0.0, -a.cos())
    }

    fn projector(kind: ProjectionKind, fov: f64) -> Projector {
        let params = ProjectorParams::for_viewport(0, 0, 800, 600, fov);
        Projector::new(kind, ModelViewTransform::default(), &params)
    }

    /// Cylinder showing the whole 360° strip inside an 800x600 viewport.
    fn whole_cylinder() -> Projector {
        let mut params = ProjectorParams::for_viewport(0, 0, 800, 600, 180.0);
        params.viewport_fov_diameter = 300.0;
        Projector::new(ProjectionKind::Cylinder, ModelViewTransform::default(), &params)
    }

    #[test]
    fn test_arc_endpoints_and_order() {
        let prj = projector(ProjectionKind::Stereographic, 120.0);
        let tess = Tessellator::new(&prj);
        let (a, b) = (eye_dir(-40.0), eye_dir(40.0));
        let arc = tess.subdivide_arc(a, b, DVec3::ZERO);
        assert!(arc.len() >= 2);
        let (wa, _) = prj.project(a);
        let (wb, _) = prj.project(b);
        assert_abs_diff_eq!(arc[0].pos.x, wa.x, epsilon = 1e-9);
        assert_abs_diff_eq!(arc[arc.len() - 1].pos.x, wb.x, epsilon = 1e-9);
        // Along the horizon the screen x grows monotonically
        for pair in arc.windows(2) {
            assert!(pair[1].pos.x >= pair[0].pos.x);
        }
        let strips = tess.small_circle_arc(a, b, DVec3::ZERO, |_| {});
        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].topology, Topology::LineStrip);
    }

    #[test]
    fn test_distortion_bound_on_curved_arc() {
        let prj = projector(ProjectionKind::Fisheye, 150.0);
        let tess = Tessellator::new(&prj);
        let a = sphe_to_rect(-1.0, 0.6);
        let b = sphe_to_rect(1.2, -0.2);
        // An off-center great circle bends under the fisheye, forcing subdivision
        let arc = tess.subdivide_arc(a, b, DVec3::ZERO);
        assert!(arc.len() > 2);
        assert!(arc.iter().all(|v| v.valid));
    }

    #[test]
    fn test_termination_on_antipodal_points() {
        for kind in ProjectionKind::ALL {
            let prj = projector(kind, 90.0);
            let tess = Tessellator::new(&prj);
            let a = eye_dir(90.0);
            let arc = tess.subdivide_arc(a, -a, DVec3::ZERO);
            // Depth 10 bounds the buffer to 2^10 segments plus break copies
            assert!(arc.len() >= 2 && arc.len() <= 3 * 1024 + 2, "{kind}: {}", arc.len());
        }
    }

    #[test]
    fn test_termination_and_endpoints_sweep() {
        let depth = TessellationSettings::default().max_depth;
        let bound = 3 * (1usize << depth) + 2;
        let viewports = [(0, 0, 800, 600), (50, 20, 640, 360), (10, 100, 300, 900)];
        let dirs: Vec<DVec3> = (0..8)
            .flat_map(|i| (0..4).map(move |j| sphe_to_rect(i as f64 * 0.83, -1.1 + j as f64 * 0.7)))
            .collect();
        let mvt = ModelViewTransform::looking_at(sphe_to_rect(0.4, 0.3), DVec3::Z);

        for kind in ProjectionKind::ALL.iter().copied().filter(|k| *k != ProjectionKind::Planar) {
            for fov in [30.0, 60.0, 120.0, 180.0, 230.0] {
                let fov = f64::min(fov, kind.max_fov());
                for (x, y, w, h) in viewports {
                    let params = ProjectorParams::for_viewport(x, y, w, h, fov);
                    let prj = Projector::new(kind, mvt.clone(), &params);
                    let tess = Tessellator::new(&prj);
                    for (k, &a) in dirs.iter().enumerate() {
                        let (lon, lat) = rect_to_sphe(a);
                        let arcs = [
                            (dirs[(k * 7 + 3) % dirs.len()], DVec3::ZERO),
                            (-a, DVec3::ZERO),
                            (sphe_to_rect(lon + 2.5, lat), DVec3::new(0.0, 0.0, a.z)),
                        ];
                        for (b, rot_center) in arcs {
                            let arc = tess.subdivide_arc(a, b, rot_center);
                            let viewport = (x, y, w, h);
                            let case = format!("{kind} fov {fov} {viewport:?}: {a} -> {b}");
                            assert!(arc.len() >= 2 && arc.len() <= bound, "{case}: {}", arc.len());
                            let last = arc[arc.len() - 1].pos;
                            assert_eq!(arc[0].pos, prj.project(a).0.truncate(), "{case}");
                            assert_eq!(last, prj.project(b).0.truncate(), "{case}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_cylinder_seam_breaks_line() {
        let prj = whole_cylinder();
        let tess = Tessellator::new(&prj);
        let (a, b) = (eye_dir(179.0), eye_dir(-179.0));
        assert!(prj.intersects_discontinuity(a, b));

        let arc = tess.subdivide_arc(a, b, DVec3::ZERO);
        assert!(arc.iter().any(|v| !v.valid), "no break emitted");

        let strips = tess.small_circle_arc(a, b, DVec3::ZERO, |_| {});
        assert!(!strips.is_empty());
        // The map is 600px wide: no segment may jump across it
        for strip in &strips {
            for pair in strip.vertices.windows(2) {
                assert!((pair[1].x - pair[0].x).abs() < 300.0, "wrap-around chord {pair:?}");
            }
        }
    }

    #[test]
    fn test_front_arc_has_no_break() {
        let prj = whole_cylinder();
        let tess = Tessellator::new(&prj);
        let arc = tess.subdivide_arc(eye_dir(-10.0), eye_dir(10.0), DVec3::ZERO);
        assert!(arc.iter().all(|v| v.valid));
    }

    #[test]
    fn test_edge_callback() {
        let prj = projector(ProjectionKind::Perspective, 60.0);
        let tess = Tessellator::new(&prj);
        let mut crossings = Vec::new();
        let strips =
            tess.great_circle_arc(eye_dir(0.0), eye_dir(60.0), None, |c| crossings.push(c));
        assert_eq!(strips.len(), 1);
        assert_eq!(crossings.len(), 1);
        let c = crossings[0];
        assert!((c.point.x - 800.0).abs() < 4.0, "{c:?}");
        assert!(c.direction.x > 0.0);
    }

    #[test]
    fn test_clip_cap_removes_arc() {
        let prj = projector(ProjectionKind::Stereographic, 90.0);
        let tess = Tessellator::new(&prj);
        let cap = SphericalCap::new(DVec3::Y, 0.5);
        let strips = tess.great_circle_arc(eye_dir(-20.0), eye_dir(20.0), Some(&cap), |_| {});
        assert!(strips.is_empty());
        let half = SphericalCap::new(DVec3::X, 0.0);
        let strips = tess.great_circle_arc(eye_dir(-20.0), eye_dir(20.0), Some(&half), |_| {});
        assert_eq!(strips.len(), 1);
        // Clipped at x = 0, the view center
        assert_abs_diff_eq!(strips[0].vertices[0].x, 400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_great_circle_arcs_loop() {
        let prj = projector(ProjectionKind::Stereographic, 90.0);
        let tess = Tessellator::new(&prj);
        let tri = [
            DVec3::new(-0.2, -0.2, -1.0).normalize(),
            DVec3::new(0.2, -0.2, -1.0).normalize(),
            DVec3::new(0.0, 0.3, -1.0).normalize(),
        ];
        let strips = tess.great_circle_arcs(&tri, Topology::LineLoop, None);
        assert_eq!(strips.len(), 3);
        let strips = tess.great_circle_arcs(&tri, Topology::Lines, None);
        assert_eq!(strips.len(), 1);
    }

    #[test]
    fn test_small_circle_stays_on_circle() {
        let prj = projector(ProjectionKind::EqualArea, 120.0);
        let tess = Tessellator::with_settings(
            &prj,
            TessellationSettings { max_sq_distortion: 0.5, max_depth: 10 },
        );
        let center = DVec3::new(0.0, 0.0, -0.5);
        let start = DVec3::new(0.866_025_403_784_438_6, 0.0, -0.5);
        let stop = DVec3::new(0.0, 0.866_025_403_784_438_6, -0.5);
        let strips = tess.small_circle_arc(start, stop, center, |_| {});
        assert_eq!(strips.len(), 1);
        for p in &strips[0].vertices {
            let (v, ok) = prj.un_project(p.x, p.y);
            assert!(ok);
            assert_abs_diff_eq!(v.normalize().z, -0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_path_breaks_on_seam() {
        let prj = whole_cylinder();
        let tess = Tessellator::new(&prj);
        let points = [eye_dir(150.0), eye_dir(170.0), eye_dir(-170.0), eye_dir(-150.0)];
        let strips = tess.path(&points);
        assert_eq!(strips.len(), 2);
        assert!(strips.iter().all(|s| s.len() == 2 || s.len() == 3));
        for strip in &strips {
            for pair in strip.vertices.windows(2) {
                assert!((pair[1].x - pair[0].x).abs() < 300.0);
            }
        }
    }

    #[test]
    fn test_path_skips_hidden_points_in_orthographic() {
        let prj = projector(ProjectionKind::Orthographic, 120.0);
        let tess = Tessellator::new(&prj);
        let points = [-30.0, 0.0, 120.0, 150.0, 30.0, 10.0].map(eye_dir);
        let strips = tess.path(&points);
        assert_eq!(strips.len(), 2);
    }
}
