use super::step::StepLadder;
use crate::sphere::sphe_to_rect;
use glam::{DMat3, DVec3};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Mean obliquity of the ecliptic at J2000.0, in degrees.
const OBLIQUITY_J2000_DEG: f64 = 23.439_291_1;

/// Equatorial J2000 to galactic, as rows.
const EQUATORIAL_TO_GALACTIC: [[f64; 3]; 3] = [
    [-0.054_875_560_4, -0.873_437_090_2, -0.483_835_015_5],
    [0.494_109_427_9, -0.444_829_630_0, 0.746_982_244_5],
    [-0.867_666_149_0, -0.198_076_373_4, 0.455_983_776_2],
];

/// Galactic coordinates of the supergalactic north pole and zero point, degrees.
const SUPERGALACTIC_POLE_DEG: (f64, f64) = (47.37, 6.32);
const SUPERGALACTIC_ORIGIN_LON_DEG: f64 = 137.37;

/// Reference frame a grid or line is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameType {
    #[default]
    EquatorialJ2000,
    EquatorialOfDate,
    AltAz,
    EclipticJ2000,
    EclipticOfDate,
    Galactic,
    Supergalactic,
}

/// Where and when the sky is seen from; needed to place the horizontal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Geographic latitude, radians.
    pub latitude: f64,
    /// Local sidereal time as an angle, radians.
    pub sidereal_time: f64,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            latitude: 48.85_f64.to_radians(),
            sidereal_time: 0.0,
        }
    }
}

impl FrameType {
    pub const ALL: [FrameType; 7] = [
        Self::EquatorialJ2000,
        Self::EquatorialOfDate,
        Self::AltAz,
        Self::EclipticJ2000,
        Self::EclipticOfDate,
        Self::Galactic,
        Self::Supergalactic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EquatorialJ2000 => "Equatorial J2000",
            Self::EquatorialOfDate => "Equatorial of date",
            Self::AltAz => "Azimuthal",
            Self::EclipticJ2000 => "Ecliptic J2000",
            Self::EclipticOfDate => "Ecliptic of date",
            Self::Galactic => "Galactic",
            Self::Supergalactic => "Supergalactic",
        }
    }

    /// Whether longitude labels in this frame are right ascensions in hours.
    pub fn uses_hour_angle(self) -> bool {
        matches!(self, Self::EquatorialJ2000 | Self::EquatorialOfDate)
    }

    /// Ladder the meridian step is picked from.
    ///
    /// Only the horizon-based and galactic families space meridians in round
    /// degrees. The ecliptic frames share the hour spacing of the equatorial
    /// ones even though their labels are in degrees.
    pub fn meridian_ladder(self) -> StepLadder {
        match self {
            Self::AltAz | Self::Galactic | Self::Supergalactic => StepLadder::Degrees,
            Self::EquatorialJ2000
            | Self::EquatorialOfDate
            | Self::EclipticJ2000
            | Self::EclipticOfDate => StepLadder::Hours,
        }
    }

    /// Whether longitude labels are azimuths counted from north.
    ///
    /// Azimuthal directions store longitude from south, growing toward east.
    pub fn azimuth_from_north(self) -> bool {
        self == Self::AltAz
    }

    /// Rotation taking directions in this frame to equatorial J2000.
    ///
    /// Precession is not modelled: the "of date" frames coincide with J2000.
    pub fn to_j2000(self, observer: &Observer) -> DMat3 {
        match self {
            Self::EquatorialJ2000 | Self::EquatorialOfDate => DMat3::IDENTITY,
            Self::EclipticJ2000 | Self::EclipticOfDate => {
                DMat3::from_rotation_x(OBLIQUITY_J2000_DEG.to_radians())
            }
            Self::AltAz => {
                DMat3::from_rotation_z(observer.sidereal_time)
                    * DMat3::from_rotation_y(FRAC_PI_2 - observer.latitude)
            }
            Self::Galactic => galactic_to_j2000(),
            Self::Supergalactic => galactic_to_j2000() * supergalactic_to_galactic(),
        }
    }

    /// Rotation taking directions in `self` to directions in `other`.
    pub fn rotation_to(self, other: FrameType, observer: &Observer) -> DMat3 {
        other.to_j2000(observer).transpose() * self.to_j2000(observer)
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn galactic_to_j2000() -> DMat3 {
    let [r0, r1, r2] = EQUATORIAL_TO_GALACTIC;
    // The inverse of a rotation is its transpose: rows become columns
    DMat3::from_cols(DVec3::from_array(r0), DVec3::from_array(r1), DVec3::from_array(r2))
}

fn supergalactic_to_galactic() -> DMat3 {
    let (pole_l, pole_b) = SUPERGALACTIC_POLE_DEG;
    let z = sphe_to_rect(pole_l.to_radians(), pole_b.to_radians());
    let x = sphe_to_rect(SUPERGALACTIC_ORIGIN_LON_DEG.to_radians(), 0.0);
    DMat3::from_cols(x, z.cross(x), z)
}
