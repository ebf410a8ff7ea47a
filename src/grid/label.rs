use crate::tessellate::EdgeCrossing;
use glam::DVec2;

/// What a label at a viewport crossing stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelValue {
    /// Latitude of a parallel, radians.
    Parallel(f64),
    /// Longitude of the meridian half crossing the edge, radians in [0, 2π).
    /// `hours` asks for right ascension formatting.
    Meridian { longitude: f64, hours: bool },
    /// A named reference line.
    Line(&'static str),
}

/// Anchor for a label where a grid line leaves the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLabel {
    /// Crossing point on the viewport edge, pixels.
    pub pos: DVec2,
    /// Outward screen direction of the line at the crossing.
    pub direction: DVec2,
    /// Text rotation in degrees, kept within [-90, 90] so text stays upright.
    pub angle_deg: f64,
    /// The rotation was turned half a turn; the text should end at `pos`
    /// instead of starting there.
    pub flipped: bool,
    pub value: LabelValue,
}

impl GridLabel {
    pub fn at_crossing(crossing: EdgeCrossing, value: LabelValue) -> Self {
        let dir = crossing.direction.normalize_or_zero();
        let mut angle_deg = (-dir.y).atan2(-dir.x).to_degrees();
        let flipped = !(-90.0..=90.0).contains(&angle_deg);
        if angle_deg > 90.0 {
            angle_deg -= 180.0;
        } else if angle_deg < -90.0 {
            angle_deg += 180.0;
        }
        Self {
            pos: crossing.point,
            direction: dir,
            angle_deg,
            flipped,
            value,
        }
    }
}
