//! Formatting of instrument readings for the meter faces.

use crate::components::NO_READING;

/// SI prefixes in descending order.
const SCALES: [(f64, &str); 7] = [
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "µ"),
    (1e-9, "n"),
];

/// Index of the unprefixed scale.
const UNIT_SCALE: usize = 3;

/// Format a value with an SI prefix, e.g. `0.028125` A -> `"28.1 mA"`.
///
/// The magnitude after scaling gets 0 decimals from 100 up, 1 from 10 up,
/// and 2 below that. Values smaller than a nano stay in nano; zero uses no
/// prefix. Missing or non-finite values render as the no-reading dash.
pub fn format_si(value: Option<f64>, unit: &str) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NO_READING.to_string();
    };
    let magnitude = value.abs();
    let (factor, prefix) = if magnitude == 0.0 {
        SCALES[UNIT_SCALE]
    } else {
        SCALES
            .iter()
            .copied()
            .find(|(f, _)| magnitude >= *f)
            .unwrap_or(SCALES[SCALES.len() - 1])
    };

    let scaled = value / factor;
    let number = if scaled.abs() >= 100.0 {
        format!("{:.0}", scaled)
    } else if scaled.abs() >= 10.0 {
        format!("{:.1}", scaled)
    } else {
        format!("{:.2}", scaled)
    };
    format!("{} {}{}", number, prefix, unit)
}

/// Format a bulb level in `[0, 1]` as a percentage.
pub fn format_brightness(level: f64) -> String {
    if !level.is_finite() {
        return NO_READING.to_string();
    }
    format!("{:.0}%", level.clamp(0.0, 1.0) * 100.0)
}
