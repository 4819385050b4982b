//! Quality validator scenarios over realistic lake datasets.

mod utils;

use cardio_etl::{DeidRecord, deidentify, run_all_validations};

use crate::utils::plausible_raw;

fn clean_lake(n: usize) -> Vec<DeidRecord> {
    // Cycle ages inside the sane range so every record survives the filter
    let raw: Vec<_> = (0..n)
        .map(|i| plausible_raw(14000 + (i as i64 % 200) * 100))
        .collect();
    let records = deidentify(&raw, 42).records;
    assert_eq!(records.len(), n);
    records
}

#[test]
fn a_dataset_with_zero_violations_scores_exactly_100() {
    let records = clean_lake(200);
    let batch = DeidRecord::to_batch(&records).unwrap();
    let report = run_all_validations(&batch, "lake").unwrap();

    let scores = &report.dq_scores;
    assert_eq!(scores.missing_score, 100.0);
    assert_eq!(scores.clinical_score, 100.0);
    assert_eq!(scores.category_score, 100.0);
    assert_eq!(scores.logical_score, 100.0);
    assert_eq!(scores.uniqueness_score, 100.0);
    assert_eq!(scores.overall_score, 100.0);
}

#[test]
fn hundred_duplicate_ids_among_thousand_rows_score_50() {
    let mut records = clean_lake(1000);
    // Reuse the first hundred identifiers: 1000 rows, 900 distinct ids
    for i in 0..100 {
        records[900 + i].patient_id = i as i64 + 1;
    }
    let batch = DeidRecord::to_batch(&records).unwrap();
    let report = run_all_validations(&batch, "lake").unwrap();

    assert_eq!(report.checks.uniqueness.duplicate_patient_ids, 100);
    assert_eq!(report.dq_scores.uniqueness_score, 50.0);
    assert_eq!(report.dq_scores.overall_score, 90.0);
}

#[test]
fn rule_failures_are_reported_not_raised() {
    let mut records = clean_lake(10);
    // One invalid lab code and one inverted pressure pair
    records[2].cholesterol_level = 9;
    records[7].ap_hi = 60;
    records[7].ap_lo = 90;
    records[7].bp_diff = -30;
    let batch = DeidRecord::to_batch(&records).unwrap();
    let report = run_all_validations(&batch, "lake").unwrap();

    // category: 3 of 4 checks pass
    assert_eq!(report.dq_scores.category_score, 75.0);
    // logical: pressure ordering fails, 2 of 3 checks pass
    assert_eq!(report.checks.logical_consistency.violations["bp_logic_violations"], 1);
    assert_eq!(report.dq_scores.logical_score, 66.7);
    // clinical: one systolic reading below range out of ten rows
    assert_eq!(report.checks.clinical_ranges.violations["ap_hi_out_of_range"], 1);
    assert_eq!(report.dq_scores.clinical_score, 90.0);
}

#[test]
fn clinical_penalty_never_exceeds_its_cap() {
    let mut records = clean_lake(10);
    for record in &mut records {
        record.age_years = 150; // every row out of range
    }
    let batch = DeidRecord::to_batch(&records).unwrap();
    let report = run_all_validations(&batch, "lake").unwrap();
    assert_eq!(report.dq_scores.clinical_score, 60.0);
}

#[test]
fn component_and_overall_scores_stay_in_bounds() {
    let mut records = clean_lake(20);
    for (i, record) in records.iter_mut().enumerate() {
        record.patient_id = 1; // worst-case duplication
        record.glucose_level = 7;
        if i % 2 == 0 {
            record.weight = 1000.0;
        }
    }
    let batch = DeidRecord::to_batch(&records).unwrap();
    let report = run_all_validations(&batch, "lake").unwrap();
    let scores = &report.dq_scores;
    for score in [
        scores.missing_score,
        scores.clinical_score,
        scores.category_score,
        scores.logical_score,
        scores.uniqueness_score,
        scores.overall_score,
    ] {
        assert!((0.0..=100.0).contains(&score), "score {score} out of bounds");
    }
}
