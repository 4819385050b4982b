//! Derived clinical features.

/// Days per year, accounting for leap years
const DAYS_PER_YEAR: f64 = 365.25;

/// Convert an age in days to whole years, rounding to the nearest year
#[must_use]
pub fn age_days_to_years(age_days: i64) -> i32 {
    (age_days as f64 / DAYS_PER_YEAR).round() as i32
}

/// Body mass index from height in centimeters and weight in kilograms
#[must_use]
pub fn body_mass_index(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Pulse pressure: the spread between the systolic and diastolic readings
#[must_use]
pub const fn pulse_pressure(ap_hi: i32, ap_lo: i32) -> i32 {
    ap_hi - ap_lo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_rounds_to_nearest_year() {
        assert_eq!(age_days_to_years(18250), 50);
        // 50.4 years rounds down, 50.5 rounds up
        assert_eq!(age_days_to_years(18408), 50);
        assert_eq!(age_days_to_years(18463), 51);
    }

    #[test]
    fn bmi_uses_height_in_meters() {
        let bmi = body_mass_index(170.0, 65.0);
        assert!((bmi - 22.49).abs() < 0.01);
    }

    #[test]
    fn pulse_pressure_is_the_reading_spread() {
        assert_eq!(pulse_pressure(120, 80), 40);
        assert_eq!(pulse_pressure(90, 90), 0);
    }
}
