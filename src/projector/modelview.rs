use glam::{DMat4, DVec3};

/// Lowest geometric altitude (deg) where Saemundsson's formula is applied.
const MIN_GEO_ALTITUDE_DEG: f64 = -3.54;
/// Lowest apparent altitude (deg) where the polynomial inverse is applied.
const MIN_APP_ALTITUDE_DEG: f64 = -3.21783;
const TRANSITION_WIDTH_GEO_DEG: f64 = 1.46;
const TRANSITION_WIDTH_APP_DEG: f64 = 1.78217;

/// Transform from the current coordinate frame into eye coordinates.
///
/// Matrices are assumed orthogonal with unit determinant: `backward` applies the
/// transposed rotation after removing the translation, never a general inverse.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelViewTransform {
    Matrix(DMat4),
    Refraction(Refraction),
}

impl Default for ModelViewTransform {
    fn default() -> Self {
        Self::Matrix(DMat4::IDENTITY)
    }
}

impl ModelViewTransform {
    pub fn from_matrix(m: DMat4) -> Self {
        Self::Matrix(m)
    }

    /// Rotation putting `direction` on the view axis (0,0,-1) with `up` toward +y.
    pub fn looking_at(direction: DVec3, up: DVec3) -> Self {
        Self::Matrix(DMat4::look_to_rh(DVec3::ZERO, direction, up))
    }

    #[inline(always)]
    pub fn forward(&self, v: DVec3) -> DVec3 {
        match self {
            Self::Matrix(m) => m.transform_point3(v),
            Self::Refraction(r) => r.forward(v),
        }
    }

    #[inline(always)]
    pub fn backward(&self, v: DVec3) -> DVec3 {
        match self {
            Self::Matrix(m) => orthogonal_backward(m, v),
            Self::Refraction(r) => r.backward(v),
        }
    }

    /// Right-multiply by `m`, so `m` is applied first.
    pub fn combine(&mut self, m: DMat4) {
        match self {
            Self::Matrix(held) => *held *= m,
            Self::Refraction(r) => r.set_pre_transform(r.pre * m),
        }
    }

    /// The linear part of the transform. Exact for `Matrix`.
    pub fn approximate_linear_transform(&self) -> DMat4 {
        match self {
            Self::Matrix(m) => *m,
            Self::Refraction(r) => r.post * r.pre,
        }
    }
}

#[inline(always)]
fn orthogonal_backward(m: &DMat4, v: DVec3) -> DVec3 {
    let p = v - m.w_axis.truncate();
    DVec3::new(
        m.x_axis.truncate().dot(p),
        m.y_axis.truncate().dot(p),
        m.z_axis.truncate().dot(p),
    )
}

/// Atmospheric refraction applied between two matrices: `post · refract(pre · v)`.
///
/// The nonlinear step operates in horizontal coordinates (z up) and lifts
/// directions by the refraction angle, keeping their length.
#[derive(Debug, Clone, PartialEq)]
pub struct Refraction {
    pre: DMat4,
    pre_inv: DMat4,
    post: DMat4,
    post_inv: DMat4,
    /// Millibar
    pressure: f64,
    /// Celsius
    temperature: f64,
    press_temp_corr: f64,
}

impl Default for Refraction {
    fn default() -> Self {
        Self::new(1013.0, 10.0)
    }
}

impl Refraction {
    pub fn new(pressure: f64, temperature: f64) -> Self {
        let mut r = Self {
            pre: DMat4::IDENTITY,
            pre_inv: DMat4::IDENTITY,
            post: DMat4::IDENTITY,
            post_inv: DMat4::IDENTITY,
            pressure,
            temperature,
            press_temp_corr: 0.0,
        };
        r.update_precomputed();
        r
    }

    pub fn with_transforms(mut self, pre: DMat4, post: DMat4) -> Self {
        self.set_pre_transform(pre);
        self.set_post_transform(post);
        self
    }

    pub fn set_pre_transform(&mut self, m: DMat4) {
        self.pre = m;
        self.pre_inv = m.inverse();
    }

    pub fn set_post_transform(&mut self, m: DMat4) {
        self.post = m;
        self.post_inv = m.inverse();
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
        self.update_precomputed();
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
        self.update_precomputed();
    }

    fn update_precomputed(&mut self) {
        self.press_temp_corr = self.pressure / 1010.0 * 283.0 / (273.0 + self.temperature) / 60.0;
    }

    pub fn forward(&self, v: DVec3) -> DVec3 {
        let v = self.pre.transform_point3(v);
        let v = self.refract_forward(v);
        self.post.transform_point3(v)
    }

    pub fn backward(&self, v: DVec3) -> DVec3 {
        let v = self.post_inv.transform_point3(v);
        let v = self.refract_backward(v);
        self.pre_inv.transform_point3(v)
    }

    /// Saemundsson refraction (arcmin formula scaled to degrees).
    fn saemundsson(&self, alt_deg: f64) -> f64 {
        let r = (alt_deg + 10.3 / (alt_deg + 5.11)).to_radians().tan();
        self.press_temp_corr * (1.02 / r + 0.0019279)
    }

    /// Polynomial inverse of Saemundsson for low apparent altitudes.
    fn low_altitude_fit(alt_deg: f64) -> f64 {
        let a = alt_deg;
        let p = (((0.0444 * a + 0.7662) * a + 4.9746) * a + 13.599) * a + 8.052;
        (p * a - 11.308) * a + 34.341
    }

    /// Geometric to apparent position.
    fn refract_forward(&self, v: DVec3) -> DVec3 {
        let length = v.length();
        if length == 0.0 {
            return v;
        }
        let sin_geo = (v.z / length).clamp(-1.0, 1.0);
        let mut alt_deg = sin_geo.asin().to_degrees();
        if alt_deg > MIN_GEO_ALTITUDE_DEG {
            alt_deg = (alt_deg + self.saemundsson(alt_deg)).min(90.0);
        } else if alt_deg > MIN_GEO_ALTITUDE_DEG - TRANSITION_WIDTH_GEO_DEG {
            let r_min = self.saemundsson(MIN_GEO_ALTITUDE_DEG);
            alt_deg += r_min * (alt_deg - (MIN_GEO_ALTITUDE_DEG - TRANSITION_WIDTH_GEO_DEG))
                / TRANSITION_WIDTH_GEO_DEG;
        } else {
            return v;
        }
        let sin_ref = alt_deg.to_radians().sin();
        let shorten = if sin_geo.abs() >= 1.0 {
            1.0
        } else {
            ((1.0 - sin_ref * sin_ref) / (1.0 - sin_geo * sin_geo)).sqrt()
        };
        DVec3::new(v.x * shorten, v.y * shorten, sin_ref * length)
    }

    /// Apparent to geometric position (Bennett, with a polynomial fit near the horizon).
    fn refract_backward(&self, v: DVec3) -> DVec3 {
        let length = v.length();
        if length == 0.0 {
            return v;
        }
        let sin_obs = (v.z / length).clamp(-1.0, 1.0);
        let mut alt_deg = sin_obs.asin().to_degrees();
        if alt_deg > 0.22879 {
            let r = self.press_temp_corr
                * (1.0 / (alt_deg + 7.31 / (alt_deg + 4.4)).to_radians().tan() + 0.0013515);
            alt_deg -= r;
        } else if alt_deg > MIN_APP_ALTITUDE_DEG {
            alt_deg -= self.press_temp_corr * Self::low_altitude_fit(alt_deg);
        } else if alt_deg > MIN_APP_ALTITUDE_DEG - TRANSITION_WIDTH_APP_DEG {
            let r_min = Self::low_altitude_fit(MIN_APP_ALTITUDE_DEG);
            alt_deg -= r_min * self.press_temp_corr
                * (alt_deg - (MIN_APP_ALTITUDE_DEG - TRANSITION_WIDTH_APP_DEG))
                / TRANSITION_WIDTH_APP_DEG;
        } else {
            return v;
        }
        let sin_geo = alt_deg.to_radians().sin();
        let longer = if sin_obs.abs() >= 1.0 {
            1.0
        } else {
            ((1.0 - sin_geo * sin_geo) / (1.0 - sin_obs * sin_obs)).sqrt()
        };
        DVec3::new(v.x * longer, v.y * longer, sin_geo * length)
    }
}
