//! Number to display-string conversion.
//!
//! Results are shown in their shortest round-trip decimal form, using the same
//! conventions a browser uses when printing a number: `Infinity`, `NaN`, no
//! negative zero, and exponent notation outside `[1e-6, 1e21)`.

const EXP_UPPER: f64 = 1e21;
const EXP_LOWER: f64 = 1e-6;

pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= EXP_UPPER || magnitude < EXP_LOWER {
        let raw = format!("{value:e}");
        return match raw.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => raw,
        };
    }
    format!("{value}")
}

/// Digits after the decimal point in the display form of `value` (0 if none).
pub fn decimal_places(value: f64) -> usize {
    format_number(value)
        .split_once('.')
        .map_or(0, |(_, frac)| frac.len())
}
