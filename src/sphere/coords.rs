use glam::{DMat3, DVec3};

/// Convert longitude/latitude (radians) to a unit direction vector.
#[inline(always)]
pub fn sphe_to_rect(lon: f64, lat: f64) -> DVec3 {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// Convert a direction vector (any length) to longitude/latitude in radians.
/// Longitude is in (-π, π]. The zero vector maps to (0, 0).
pub fn rect_to_sphe(v: DVec3) -> (f64, f64) {
    let r = v.length();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let lat = (v.z / r).clamp(-1.0, 1.0).asin();
    let lon = v.y.atan2(v.x);
    (lon, lat)
}

/// Some unit vector orthogonal to `v`.
pub fn orthogonal(v: DVec3) -> DVec3 {
    // Cross with the axis least aligned with v
    let a = v.abs();
    let axis = if a.x <= a.y && a.x <= a.z {
        DVec3::X
    } else if a.y <= a.z {
        DVec3::Y
    } else {
        DVec3::Z
    };
    v.cross(axis).normalize_or_zero()
}

/// Rotate `v` by `angle` radians around `axis` (right-handed).
#[inline(always)]
pub fn rotate_about(v: DVec3, axis: DVec3, angle: f64) -> DVec3 {
    DMat3::from_axis_angle(axis.normalize(), angle) * v
}
