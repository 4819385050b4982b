//! Composite data-quality scoring.
//!
//! The weighting is a fixed compatibility contract: clinical-range and
//! uniqueness violations are penalized more aggressively than their raw
//! rates, and both penalties are capped so no single rule can zero the
//! composite. Downstream consumers compare scores across runs, so the exact
//! arithmetic must not drift.

use std::collections::BTreeMap;

use serde::Serialize;

use super::report::Checks;

/// Maximum penalty the clinical-range violation rate can incur
const CLINICAL_PENALTY_CAP: f64 = 40.0;
/// Maximum penalty duplicate identifiers can incur
const UNIQUENESS_PENALTY_CAP: f64 = 50.0;
/// Duplicate rate is weighted five-fold before capping
const DUPLICATE_RATE_WEIGHT: f64 = 5.0;

/// The five component scores and the overall composite, all in [0, 100]
/// and rounded to one decimal
#[derive(Debug, Clone, Serialize)]
pub struct DqScores {
    pub missing_score: f64,
    pub clinical_score: f64,
    pub category_score: f64,
    pub logical_score: f64,
    pub uniqueness_score: f64,
    pub overall_score: f64,
}

/// Compute the component and overall scores from completed checks
///
/// The overall score is the unweighted arithmetic mean of the five
/// components, taken before rounding.
#[must_use]
pub fn compute_dq_scores(checks: &Checks, n_rows: usize) -> DqScores {
    let missing_score = (100.0 - checks.missing_values.max_missing_pct()).max(0.0);

    let total_violations = checks.clinical_ranges.total_violations();
    let clinical_score = if total_violations == 0 {
        100.0
    } else {
        let penalty =
            (100.0 * total_violations as f64 / n_rows as f64).min(CLINICAL_PENALTY_CAP);
        (100.0 - penalty).max(0.0)
    };

    let category_score = passing_ratio_score(&checks.category_validity.checks);
    let logical_score = passing_ratio_score(&checks.logical_consistency.checks);

    let duplicates = checks.uniqueness.duplicate_patient_ids;
    let uniqueness_score = if duplicates == 0 {
        100.0
    } else {
        let penalty = (100.0 * duplicates as f64 / n_rows as f64 * DUPLICATE_RATE_WEIGHT)
            .min(UNIQUENESS_PENALTY_CAP);
        (100.0 - penalty).max(0.0)
    };

    let overall_score = (missing_score
        + clinical_score
        + category_score
        + logical_score
        + uniqueness_score)
        / 5.0;

    DqScores {
        missing_score: round_one(missing_score),
        clinical_score: round_one(clinical_score),
        category_score: round_one(category_score),
        logical_score: round_one(logical_score),
        uniqueness_score: round_one(uniqueness_score),
        overall_score: round_one(overall_score),
    }
}

/// Share of passing checks, scaled to [0, 100]
fn passing_ratio_score(checks: &BTreeMap<String, bool>) -> f64 {
    if checks.is_empty() {
        return 100.0;
    }
    100.0 * checks.values().filter(|pass| **pass).count() as f64 / checks.len() as f64
}

/// Round to one decimal place, the report's resolution
fn round_one(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}
