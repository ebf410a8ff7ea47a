use glam::DVec3;

/// A spherical cap: every unit vector `v` with `n·v >= d`.
///
/// `n` is a unit normal and `d` the cosine of the angular radius. `d = 0` is a
/// hemisphere bounded by a great circle; `d = -1` covers the whole sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCap {
    pub n: DVec3,
    pub d: f64,
}

impl Default for SphericalCap {
    fn default() -> Self {
        Self::full_sky()
    }
}

impl SphericalCap {
    /// Build a cap around `n` (normalized here) with cosine radius `d`.
    pub fn new(n: DVec3, d: f64) -> Self {
        Self { n: n.normalize_or_zero(), d }
    }

    /// The cap covering the whole sphere.
    pub fn full_sky() -> Self {
        Self { n: DVec3::X, d: -1.0 }
    }

    /// The hemisphere on the left of the great circle through `v1` then `v2`.
    pub fn half_space(v1: DVec3, v2: DVec3) -> Self {
        Self::new(v1.cross(v2), 0.0)
    }

    pub fn is_full_sky(&self) -> bool {
        self.d <= -1.0
    }

    /// Angular radius in radians.
    pub fn radius(&self) -> f64 {
        self.d.clamp(-1.0, 1.0).acos()
    }

    /// The region outside this cap.
    pub fn complement(&self) -> Self {
        Self { n: -self.n, d: -self.d }
    }

    /// Whether the unit vector `v` lies in the cap.
    #[inline(always)]
    pub fn contains(&self, v: DVec3) -> bool {
        self.n.dot(v) >= self.d
    }

    /// Whether `other` is fully inside this cap.
    pub fn contains_cap(&self, other: &SphericalCap) -> bool {
        let a = self.n.dot(other.n) - self.d * other.d;
        let sines_sq = (1.0 - self.d * self.d) * (1.0 - other.d * other.d);
        self.d <= other.d && (a >= 1.0 || (a >= 0.0 && a * a >= sines_sq))
    }

    /// Whether the two caps share at least one point.
    pub fn intersects(&self, other: &SphericalCap) -> bool {
        let a = self.d * other.d - self.n.dot(other.n);
        self.d + other.d <= 0.0
            || a <= 0.0
            || (a <= 1.0 && a * a <= (1.0 - self.d * self.d) * (1.0 - other.d * other.d))
    }

    /// The two points where the boundary circles of both caps cross.
    ///
    /// Returns `None` if the caps don't intersect, touch in a single point, or
    /// their planes are parallel.
    pub fn intersection_points(&self, other: &SphericalCap) -> Option<(DVec3, DVec3)> {
        if !self.intersects(other) {
            return None;
        }
        let n1 = self.n;
        let n2 = other.n;
        // Planes n·p + d' = 0
        let d1 = -self.d;
        let d2 = -other.d;

        let u = n1.cross(n2);
        if u == DVec3::ZERO {
            return None;
        }
        let u = u.normalize();

        // Anchor the line on the plane orthogonal to its dominant axis
        let a = u.abs();
        let mut p0 = DVec3::ZERO;
        if a.x >= a.y && a.x >= a.z {
            let denom = n1.y * n2.z - n2.y * n1.z;
            p0.y = (d2 * n1.z - d1 * n2.z) / denom;
            p0.z = (d1 * n2.y - d2 * n1.y) / denom;
        } else if a.z > a.y {
            let denom = n1.x * n2.y - n2.x * n1.y;
            p0.x = (n1.y * d2 - n2.y * d1) / denom;
            p0.y = (n2.x * d1 - n1.x * d2) / denom;
        } else {
            let denom = n1.x * n2.z - n2.x * n1.z;
            p0.x = (n1.z * d2 - n2.z * d1) / denom;
            p0.z = (n2.x * d1 - d2 * n1.x) / denom;
        }

        // |p0 + t·u|² = 1
        let b = 2.0 * p0.dot(u);
        let c = p0.length_squared() - 1.0;
        let disc = b * b - 4.0 * c;
        if disc <= 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let t1 = (-b + sqrt_disc) / 2.0;
        let t2 = (-b - sqrt_disc) / 2.0;
        Some((p0 + u * t1, p0 + u * t2))
    }

    pub fn contains_triangle(&self, v: &[DVec3; 3]) -> bool {
        self.contains(v[0]) && self.contains(v[1]) && self.contains(v[2])
    }

    /// Conservative triangle test: may report an intersection that isn't there
    /// when every vertex is outside but a corner's half space reaches the cap.
    pub fn intersects_triangle(&self, v: &[DVec3; 3]) -> bool {
        if self.contains(v[0]) || self.contains(v[1]) || self.contains(v[2]) {
            return true;
        }
        if self.d <= 0.0 {
            return false;
        }
        side_half_space_intersects(v[0], v[1], self)
            && side_half_space_intersects(v[1], v[2], self)
            && side_half_space_intersects(v[2], v[0], self)
    }

    /// Clip the great circle arc `v1 → v2` to this cap.
    ///
    /// Returns the clipped endpoints, or `None` if no part of the arc is inside.
    pub fn clip_great_circle(&self, v1: DVec3, v2: DVec3) -> Option<(DVec3, DVec3)> {
        if v1 == v2 {
            return self.contains(v1).then_some((v1, v2));
        }
        let b1 = self.contains(v1);
        let b2 = self.contains(v2);
        if b1 && b2 {
            return Some((v1, v2));
        }

        let (p, pp) = self.intersection_points(&SphericalCap::half_space(v1, v2))?;
        let cos_dist = v1.dot(v2);
        let on_arc = |x: DVec3| v1.dot(x) >= cos_dist && v2.dot(x) >= cos_dist;
        match (b1, b2) {
            (true, false) => Some((v1, if on_arc(p) { p } else { pp })),
            (false, true) => Some((if on_arc(p) { p } else { pp }, v2)),
            _ => (on_arc(p) && on_arc(pp)).then_some((p, pp)),
        }
    }
}

/// Whether the half space left of the great circle `v1 → v2` meets the cap.
#[inline(always)]
fn side_half_space_intersects(v1: DVec3, v2: DVec3, cap: &SphericalCap) -> bool {
    cap.intersects(&SphericalCap::half_space(v1, v2))
}
