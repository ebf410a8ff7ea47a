use super::{Tessellator, Topology, VertexArray};
use crate::projector::Projector;
use crate::sphere::SphericalCap;
use glam::{DVec2, DVec3};

impl Tessellator<'_> {
    /// Project spherical triangles, splitting the ones whose edges bend too
    /// much on screen or cross the projection seam.
    ///
    /// `topology` describes how `vertices` form triangles (list, strip or fan).
    /// Vertices are expected on the unit sphere.
    pub fn spherical_triangles(
        &self,
        vertices: &[DVec3],
        topology: Topology,
        clip: Option<&SphericalCap>,
    ) -> VertexArray {
        let mut out = Vec::with_capacity(vertices.len());
        for [a, b, c] in topology.triangles(vertices.len()) {
            let tri = [vertices[a], vertices[b], vertices[c]];
            self.project_triangle(clip, tri, 0, [true; 3], &mut out);
        }
        VertexArray { topology: Topology::Triangles, vertices: out }
    }

    /// Edge `checks` are (v0-v1, v1-v2, v0-v2); unchecked edges are known clean.
    fn project_triangle(
        &self,
        clip: Option<&SphericalCap>,
        v: [DVec3; 3],
        depth: u32,
        checks: [bool; 3],
        out: &mut Vec<DVec2>,
    ) {
        let clip = match clip {
            Some(cap) if cap.contains_triangle(&v) => None,
            Some(cap) if !cap.intersects_triangle(&v) => return,
            other => other,
        };

        let prj = self.projector;
        const EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];
        let seam = EDGES.map(|(i, j)| prj.intersects_discontinuity(v[i], v[j]));
        let seam = [checks[0] && seam[0], checks[1] && seam[1], checks[2] && seam[2]];

        let (e0, ok0) = prj.project(v[0]);
        let (e1, ok1) = prj.project(v[1]);
        let (e2, ok2) = prj.project(v[2]);
        if !(ok0 || ok1 || ok2) {
            // Entirely behind the viewer
            return;
        }
        let e = [e0.truncate(), e1.truncate(), e2.truncate()];

        let mut split = seam;
        for (k, &(i, j)) in EDGES.iter().enumerate() {
            if checks[k] && !seam[k] {
                let (mid, _) = prj.project((v[i] + v[j]).normalize_or_zero());
                let sq_distortion = (mid.truncate() - (e[i] + e[j]) * 0.5).length_squared();
                split[k] = sq_distortion > self.settings.max_sq_distortion;
            }
        }

        if split == [false; 3] {
            out.extend_from_slice(&e);
            return;
        }

        if depth >= self.settings.max_depth {
            // Out of depth: a distorted triangle is drawn, one still on the seam is not
            if !seam.contains(&true) {
                out.extend_from_slice(&e);
            }
            return;
        }

        let m01 = (v[0] + v[1]).normalize();
        let m12 = (v[1] + v[2]).normalize();
        let m02 = (v[0] + v[2]).normalize();
        let d = depth + 1;
        let all = [true; 3];
        match split {
            [true, false, false] => {
                self.project_triangle(clip, [v[0], m01, v[2]], d, [true, true, false], out);
                self.project_triangle(clip, [m01, v[1], v[2]], d, [true, false, true], out);
            }
            [false, true, false] => {
                self.project_triangle(clip, [v[0], v[1], m12], d, [false, true, true], out);
                self.project_triangle(clip, [v[0], m12, v[2]], d, [true, true, false], out);
            }
            [false, false, true] => {
                self.project_triangle(clip, [v[0], v[1], m02], d, [false, true, true], out);
                self.project_triangle(clip, [m02, v[1], v[2]], d, [true, false, true], out);
            }
            [true, true, false] => {
                self.project_triangle(clip, [v[0], m01, m12], d, all, out);
                self.project_triangle(clip, [m01, v[1], m12], d, all, out);
                self.project_triangle(clip, [v[0], m12, v[2]], d, [true, true, false], out);
            }
            [true, false, true] => {
                self.project_triangle(clip, [v[0], m01, m02], d, all, out);
                self.project_triangle(clip, [m01, v[2], m02], d, all, out);
                self.project_triangle(clip, [m01, v[1], v[2]], d, [true, false, true], out);
            }
            [false, true, true] => {
                self.project_triangle(clip, [v[0], v[1], m12], d, [false, true, true], out);
                self.project_triangle(clip, [m12, v[2], m02], d, all, out);
                self.project_triangle(clip, [v[0], m12, m02], d, all, out);
            }
            _ => {
                self.project_triangle(clip, [v[0], m01, m02], d, all, out);
                self.project_triangle(clip, [m01, v[1], m12], d, all, out);
                self.project_triangle(clip, [m02, m12, v[2]], d, all, out);
                self.project_triangle(clip, [m01, m12, m02], d, all, out);
            }
        }
    }
}

/// Drop the triangles of a sphere triangle list with an edge on the seam.
pub fn remove_discontinuous_triangles(projector: &Projector, vertices: &[DVec3]) -> Vec<DVec3> {
    vertices
        .chunks_exact(3)
        .filter(|t| {
            !(projector.intersects_discontinuity(t[0], t[1])
                || projector.intersects_discontinuity(t[1], t[2])
                || projector.intersects_discontinuity(t[2], t[0]))
        })
        .flatten()
        .copied()
        .collect()
}
