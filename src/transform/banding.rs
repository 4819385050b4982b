//! Banding functions for de-identification.
//!
//! Each function maps an exact clinical value onto a coarse category. All
//! three partition their numeric domain with half-open intervals; a boundary
//! value belongs to the upper band (a systolic reading of exactly 120 is
//! `elevated`, not `normal`).

use std::fmt;

/// Coarse age category, decade-banded from 30 upward
///
/// Ages below 18 or above 100 still map to the edge bands; excluding them is
/// the sanity filter's job, not the banding function's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBand {
    /// 18-29
    Age18To29,
    /// 30-39
    Age30To39,
    /// 40-49
    Age40To49,
    /// 50-59
    Age50To59,
    /// 60-69
    Age60To69,
    /// 70 and above
    Age70Plus,
}

impl AgeBand {
    /// All bands in ascending order
    pub const ALL: [Self; 6] = [
        Self::Age18To29,
        Self::Age30To39,
        Self::Age40To49,
        Self::Age50To59,
        Self::Age60To69,
        Self::Age70Plus,
    ];

    /// Band label as written to the lake dataset
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Age18To29 => "18-29",
            Self::Age30To39 => "30-39",
            Self::Age40To49 => "40-49",
            Self::Age50To59 => "50-59",
            Self::Age60To69 => "60-69",
            Self::Age70Plus => "70+",
        }
    }

    /// Parse a lake-dataset label back into a band
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.as_str() == label)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse BMI category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BmiBand {
    /// BMI below 18.5
    Underweight,
    /// BMI in [18.5, 25)
    Normal,
    /// BMI in [25, 30)
    Overweight,
    /// BMI of 30 and above
    Obese,
}

impl BmiBand {
    /// All bands in ascending order
    pub const ALL: [Self; 4] = [
        Self::Underweight,
        Self::Normal,
        Self::Overweight,
        Self::Obese,
    ];

    /// Band label as written to the lake dataset
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        }
    }

    /// Parse a lake-dataset label back into a band
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.as_str() == label)
    }
}

impl fmt::Display for BmiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blood pressure category derived from the systolic reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BpBand {
    /// Systolic below 120
    Normal,
    /// Systolic in [120, 130)
    Elevated,
    /// Systolic in [130, 140)
    Stage1,
    /// Systolic in [140, 180)
    Stage2,
    /// Systolic of 180 and above
    HypertensiveCrisis,
}

impl BpBand {
    /// All bands in ascending order
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Elevated,
        Self::Stage1,
        Self::Stage2,
        Self::HypertensiveCrisis,
    ];

    /// Band label as written to the warehouse
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::Stage1 => "stage1",
            Self::Stage2 => "stage2",
            Self::HypertensiveCrisis => "hypertensive_crisis",
        }
    }

    /// Parse a warehouse label back into a band
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.as_str() == label)
    }
}

impl fmt::Display for BpBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert exact age in years to a coarse age band
#[must_use]
pub const fn age_to_band(age_years: i32) -> AgeBand {
    if age_years < 30 {
        AgeBand::Age18To29
    } else if age_years < 40 {
        AgeBand::Age30To39
    } else if age_years < 50 {
        AgeBand::Age40To49
    } else if age_years < 60 {
        AgeBand::Age50To59
    } else if age_years < 70 {
        AgeBand::Age60To69
    } else {
        AgeBand::Age70Plus
    }
}

/// Convert continuous BMI to a coarse BMI category
#[must_use]
pub fn bmi_to_band(bmi: f64) -> BmiBand {
    if bmi < 18.5 {
        BmiBand::Underweight
    } else if bmi < 25.0 {
        BmiBand::Normal
    } else if bmi < 30.0 {
        BmiBand::Overweight
    } else {
        BmiBand::Obese
    }
}

/// Rough blood pressure category from the systolic reading
#[must_use]
pub const fn bp_to_band(ap_hi: i32) -> BpBand {
    if ap_hi < 120 {
        BpBand::Normal
    } else if ap_hi < 130 {
        BpBand::Elevated
    } else if ap_hi < 140 {
        BpBand::Stage1
    } else if ap_hi < 180 {
        BpBand::Stage2
    } else {
        BpBand::HypertensiveCrisis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_bands_partition_decades() {
        assert_eq!(age_to_band(18), AgeBand::Age18To29);
        assert_eq!(age_to_band(29), AgeBand::Age18To29);
        assert_eq!(age_to_band(30), AgeBand::Age30To39);
        assert_eq!(age_to_band(49), AgeBand::Age40To49);
        assert_eq!(age_to_band(69), AgeBand::Age60To69);
        assert_eq!(age_to_band(70), AgeBand::Age70Plus);
        assert_eq!(age_to_band(100), AgeBand::Age70Plus);
    }

    #[test]
    fn out_of_range_ages_fall_into_edge_bands() {
        // The sanity filter excludes these upstream; banding stays total.
        assert_eq!(age_to_band(3), AgeBand::Age18To29);
        assert_eq!(age_to_band(140), AgeBand::Age70Plus);
    }

    #[test]
    fn bmi_boundaries_belong_to_the_upper_band() {
        assert_eq!(bmi_to_band(18.4), BmiBand::Underweight);
        assert_eq!(bmi_to_band(18.5), BmiBand::Normal);
        assert_eq!(bmi_to_band(24.9), BmiBand::Normal);
        assert_eq!(bmi_to_band(25.0), BmiBand::Overweight);
        assert_eq!(bmi_to_band(30.0), BmiBand::Obese);
    }

    #[test]
    fn bp_boundaries_belong_to_the_upper_band() {
        assert_eq!(bp_to_band(119), BpBand::Normal);
        assert_eq!(bp_to_band(120), BpBand::Elevated);
        assert_eq!(bp_to_band(130), BpBand::Stage1);
        assert_eq!(bp_to_band(140), BpBand::Stage2);
        assert_eq!(bp_to_band(180), BpBand::HypertensiveCrisis);
    }

    #[test]
    fn every_value_maps_to_exactly_one_band() {
        for age in -5..150 {
            assert!(AgeBand::ALL.contains(&age_to_band(age)));
        }
        for systolic in 0..300 {
            assert!(BpBand::ALL.contains(&bp_to_band(systolic)));
        }
    }

    #[test]
    fn labels_round_trip() {
        for band in AgeBand::ALL {
            assert_eq!(AgeBand::parse(band.as_str()), Some(band));
        }
        for band in BmiBand::ALL {
            assert_eq!(BmiBand::parse(band.as_str()), Some(band));
        }
        for band in BpBand::ALL {
            assert_eq!(BpBand::parse(band.as_str()), Some(band));
        }
        assert_eq!(AgeBand::parse("centenarian"), None);
    }
}
