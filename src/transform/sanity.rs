//! Clinical sanity rules.
//!
//! Implausible records are dropped outright: a record either survives every
//! rule or is absent from the lake dataset. Exclusion is expected behavior,
//! reported as a count, never an error.

use std::fmt;
use std::ops::RangeInclusive;

/// Accepted derived age range, in years
pub const AGE_YEARS: RangeInclusive<i32> = 18..=100;
/// Accepted height range, in centimeters
pub const HEIGHT_CM: RangeInclusive<f64> = 120.0..=220.0;
/// Accepted weight range, in kilograms
pub const WEIGHT_KG: RangeInclusive<f64> = 35.0..=250.0;
/// Accepted systolic pressure range
pub const AP_HI: RangeInclusive<i32> = 80..=250;
/// Accepted diastolic pressure range
pub const AP_LO: RangeInclusive<i32> = 40..=160;

/// The clinical sanity rule a record violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityRule {
    /// Derived age outside [18, 100] years
    AgeYears,
    /// Height outside [120, 220] cm
    Height,
    /// Weight outside [35, 250] kg
    Weight,
    /// Systolic pressure outside [80, 250]
    ApHi,
    /// Diastolic pressure outside [40, 160]
    ApLo,
    /// Systolic reading below the diastolic reading
    BpOrdering,
}

impl SanityRule {
    /// Short rule name for audit logging
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgeYears => "age_years",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::ApHi => "ap_hi",
            Self::ApLo => "ap_lo",
            Self::BpOrdering => "ap_hi_ge_ap_lo",
        }
    }
}

impl fmt::Display for SanityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check the six clinical predicates, returning the first violated rule
#[must_use]
pub fn violated_rule(
    age_years: i32,
    height: f64,
    weight: f64,
    ap_hi: i32,
    ap_lo: i32,
) -> Option<SanityRule> {
    if !AGE_YEARS.contains(&age_years) {
        return Some(SanityRule::AgeYears);
    }
    if !HEIGHT_CM.contains(&height) {
        return Some(SanityRule::Height);
    }
    if !WEIGHT_KG.contains(&weight) {
        return Some(SanityRule::Weight);
    }
    if !AP_HI.contains(&ap_hi) {
        return Some(SanityRule::ApHi);
    }
    if !AP_LO.contains(&ap_lo) {
        return Some(SanityRule::ApLo);
    }
    if ap_hi < ap_lo {
        return Some(SanityRule::BpOrdering);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_plausible_record_passes() {
        assert_eq!(violated_rule(50, 170.0, 70.0, 120, 80), None);
    }

    #[test]
    fn each_bound_is_inclusive() {
        assert_eq!(violated_rule(18, 120.0, 35.0, 80, 40), None);
        assert_eq!(violated_rule(100, 220.0, 250.0, 250, 160), None);
    }

    #[test]
    fn each_rule_fires_on_its_own_field() {
        assert_eq!(violated_rule(17, 170.0, 70.0, 120, 80), Some(SanityRule::AgeYears));
        assert_eq!(violated_rule(50, 119.9, 70.0, 120, 80), Some(SanityRule::Height));
        assert_eq!(violated_rule(50, 170.0, 251.0, 120, 80), Some(SanityRule::Weight));
        assert_eq!(violated_rule(50, 170.0, 70.0, 70, 60), Some(SanityRule::ApHi));
        assert_eq!(violated_rule(50, 170.0, 70.0, 120, 161), Some(SanityRule::ApLo));
        assert_eq!(violated_rule(50, 170.0, 70.0, 90, 95), Some(SanityRule::BpOrdering));
    }
}
