//! Distance formatting for on-screen labels
//!
//! This is presentation only: fixed decimal places, no locale handling.
//! Consumers needing the numeric value should read
//! `raw_distance_m * scale` directly.

use crate::core::{INCHES_PER_FOOT, METERS_PER_INCH};
use serde::{Deserialize, Serialize};

/// Display unit system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// The other unit system
    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

/// Converts metric distances into label strings
pub struct UnitFormatter;

impl UnitFormatter {
    /// Format `meters` in the requested unit system.
    ///
    /// Metric: `"1.23 m"` at or above one meter, otherwise `"45.6 cm"`.
    /// Imperial: `"3'3.4\""` from one foot upwards, otherwise `"7.9\""`.
    /// Non-finite input renders as `"--"`.
    pub fn format(meters: f64, unit: UnitSystem) -> String {
        if !meters.is_finite() {
            return "--".to_string();
        }

        match unit {
            UnitSystem::Metric => Self::format_metric(meters),
            UnitSystem::Imperial => Self::format_imperial(meters),
        }
    }

    fn format_metric(meters: f64) -> String {
        let sign = if meters < 0.0 { "-" } else { "" };
        let meters = meters.abs();
        if meters >= 1.0 {
            format!("{}{:.2} m", sign, meters)
        } else {
            format!("{}{:.1} cm", sign, meters * 100.0)
        }
    }

    fn format_imperial(meters: f64) -> String {
        let sign = if meters < 0.0 { "-" } else { "" };
        let total_inches = meters.abs() / METERS_PER_INCH;

        // Below one whole foot the label stays in inches, even when
        // rounding reaches 12.0.
        if (total_inches / INCHES_PER_FOOT).floor() < 1.0 {
            return format!("{}{:.1}\"", sign, total_inches);
        }

        // Whole tenths, so 1'11.96" carries into 2'0.0"
        let tenths = (total_inches * 10.0).round() as i64;
        let tenths_per_foot = (INCHES_PER_FOOT * 10.0) as i64;
        let feet = tenths / tenths_per_foot;
        let rem = tenths % tenths_per_foot;
        format!("{}{}'{}.{}\"", sign, feet, rem / 10, rem % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_centimeters_below_one_meter() {
        assert_eq!(UnitFormatter::format(0.999, UnitSystem::Metric), "99.9 cm");
        assert_eq!(UnitFormatter::format(0.0856, UnitSystem::Metric), "8.6 cm");
        assert_eq!(UnitFormatter::format(0.0, UnitSystem::Metric), "0.0 cm");
    }

    #[test]
    fn test_metric_meters_from_one_meter() {
        assert_eq!(UnitFormatter::format(1.0, UnitSystem::Metric), "1.00 m");
        assert_eq!(UnitFormatter::format(2.347, UnitSystem::Metric), "2.35 m");
    }

    #[test]
    fn test_imperial_feet_and_inches() {
        // 1 m = 39.37 in = 3 ft 3.4 in
        assert_eq!(UnitFormatter::format(1.0, UnitSystem::Imperial), "3'3.4\"");
        assert_eq!(UnitFormatter::format(0.3048, UnitSystem::Imperial), "1'0.0\"");
    }

    #[test]
    fn test_imperial_inches_only() {
        assert_eq!(UnitFormatter::format(0.2, UnitSystem::Imperial), "7.9\"");
        assert_eq!(UnitFormatter::format(0.0254, UnitSystem::Imperial), "1.0\"");
    }

    #[test]
    fn test_imperial_rounding_carries_into_feet() {
        // 23.96 in rounds to 24.0 in
        let meters = 23.96 * METERS_PER_INCH;
        assert_eq!(UnitFormatter::format(meters, UnitSystem::Imperial), "2'0.0\"");
        let meters = 12.96 * METERS_PER_INCH;
        assert_eq!(UnitFormatter::format(meters, UnitSystem::Imperial), "1'1.0\"");
    }

    #[test]
    fn test_imperial_under_a_foot_stays_in_inches() {
        // rounds to 12.0 but is still less than one whole foot
        let meters = 11.97 * METERS_PER_INCH;
        assert_eq!(UnitFormatter::format(meters, UnitSystem::Imperial), "12.0\"");
        let meters = 11.5 * METERS_PER_INCH;
        assert_eq!(UnitFormatter::format(meters, UnitSystem::Imperial), "11.5\"");
    }

    #[test]
    fn test_negative_distances_keep_their_magnitude() {
        assert_eq!(UnitFormatter::format(-1.0, UnitSystem::Imperial), "-3'3.4\"");
        assert_eq!(UnitFormatter::format(-0.2, UnitSystem::Imperial), "-7.9\"");
        assert_eq!(UnitFormatter::format(-2.347, UnitSystem::Metric), "-2.35 m");
        assert_eq!(UnitFormatter::format(-0.5, UnitSystem::Metric), "-50.0 cm");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(UnitFormatter::format(f64::NAN, UnitSystem::Metric), "--");
        assert_eq!(UnitFormatter::format(f64::INFINITY, UnitSystem::Imperial), "--");
    }

    #[test]
    fn test_toggle() {
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggled().toggled(), UnitSystem::Imperial);
    }
}
