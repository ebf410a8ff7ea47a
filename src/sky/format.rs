use skyproj::grid::LabelValue;
use std::f64::consts::TAU;

/// Label text for a grid crossing.
pub fn label_text(value: LabelValue, decimal: bool) -> String {
    match value {
        LabelValue::Parallel(lat) if decimal => decimal_deg(lat, true),
        LabelValue::Parallel(lat) => dms_adapt(lat, true),
        LabelValue::Meridian { longitude, .. } if decimal => decimal_deg(longitude, false),
        LabelValue::Meridian { longitude, hours: true } => hms_adapt(longitude),
        LabelValue::Meridian { longitude, hours: false } => dms_adapt(longitude, false),
        LabelValue::Line(name) => name.to_string(),
    }
}

/// Degrees, arcminutes and arcseconds, leaving out trailing zero fields.
pub fn dms_adapt(rad: f64, signed: bool) -> String {
    let total = (rad.to_degrees().abs() * 3600.0).round() as u64;
    let (d, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    let mut out = String::new();
    if signed {
        out.push(if rad < 0.0 && total > 0 { '-' } else { '+' });
    }
    out.push_str(&format!("{d}°"));
    if m != 0 || s != 0 {
        out.push_str(&format!("{m:02}'"));
    }
    if s != 0 {
        out.push_str(&format!("{s:02}\""));
    }
    out
}

/// Hours, minutes and seconds of time, leaving out trailing zero fields.
pub fn hms_adapt(rad: f64) -> String {
    // Tenths of a second of time
    let tenths = (rad.rem_euclid(TAU) / TAU * 864_000.0).round() as u64 % 864_000;
    let (h, m, s10) = (tenths / 36_000, (tenths / 600) % 60, tenths % 600);
    let mut out = format!("{h}h");
    if m != 0 || s10 != 0 {
        out.push_str(&format!("{m:02}m"));
    }
    if s10 != 0 {
        if s10 % 10 == 0 {
            out.push_str(&format!("{:02}s", s10 / 10));
        } else {
            out.push_str(&format!("{:02}.{}s", s10 / 10, s10 % 10));
        }
    }
    out
}

/// Decimal degrees with up to four decimals.
pub fn decimal_deg(rad: f64, signed: bool) -> String {
    let deg = rad.to_degrees();
    let mut text = format!("{:.4}", deg.abs());
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    let sign = match (signed, deg < 0.0 && text != "0") {
        (true, true) => "-",
        (true, false) => "+",
        (false, true) => "-",
        (false, false) => "",
    };
    format!("{sign}{text}°")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms() {
        assert_eq!(dms_adapt(45f64.to_radians(), true), "+45°");
        assert_eq!(dms_adapt((-30.5f64).to_radians(), true), "-30°30'");
        assert_eq!(dms_adapt((10.0 + 1.0 / 3600.0f64).to_radians(), false), "10°00'01\"");
        assert_eq!(dms_adapt(0.0, true), "+0°");
    }

    #[test]
    fn test_hms() {
        assert_eq!(hms_adapt(45f64.to_radians()), "3h");
        assert_eq!(hms_adapt(52.5f64.to_radians()), "3h30m");
        assert_eq!(hms_adapt((-15f64).to_radians()), "23h");
        // 1.5" of angle is a tenth of a second of time
        assert_eq!(hms_adapt((1.5f64 / 3600.0).to_radians()), "0h00m00.1s");
        assert_eq!(hms_adapt(TAU), "0h");
    }

    #[test]
    fn test_decimal() {
        assert_eq!(decimal_deg(22.5f64.to_radians(), true), "+22.5°");
        assert_eq!(decimal_deg((-10f64).to_radians(), true), "-10°");
        assert_eq!(decimal_deg(180f64.to_radians(), false), "180°");
    }

    #[test]
    fn test_label_text() {
        let meridian = LabelValue::Meridian {
            longitude: 90f64.to_radians(),
            hours: true,
        };
        assert_eq!(label_text(meridian, false), "6h");
        assert_eq!(label_text(meridian, true), "90°");
        assert_eq!(label_text(LabelValue::Parallel(0.5f64.to_radians()), false), "+0°30'");
        assert_eq!(label_text(LabelValue::Line("Horizon"), true), "Horizon");
    }
}
