//! Data-quality checks.
//!
//! Five independent, order-insensitive checks over a dataset. A rule failure
//! is the subject of measurement, never an error; only a dataset missing the
//! columns a check needs aborts validation. A null in a checked numeric
//! column counts as a violation for the range and logical rules; the
//! missingness check measures it separately.

use std::collections::BTreeMap;

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::Result;
use crate::transform::banding::{AgeBand, BmiBand};
use crate::utils::arrow::{f64_column, i64_column, string_column};

/// Valid lab codes for cholesterol and glucose levels
pub const VALID_LAB_CODES: [i64; 3] = [1, 2, 3];

/// The five clinical metric ranges:
/// (check name, violation counter name, column, low, high)
const CLINICAL_RANGES: [(&str, &str, &str, f64, f64); 5] = [
    ("age_years_18_100", "age_out_of_range", "age_years", 18.0, 100.0),
    ("height_120_220_cm", "height_out_of_range", "height", 120.0, 220.0),
    ("weight_35_250_kg", "weight_out_of_range", "weight", 35.0, 250.0),
    ("ap_hi_80_250", "ap_hi_out_of_range", "ap_hi", 80.0, 250.0),
    ("ap_lo_40_160", "ap_lo_out_of_range", "ap_lo", 40.0, 160.0),
];

/// Per-column missing-value percentages
#[derive(Debug, Clone, Serialize)]
pub struct MissingValueCheck {
    pub description: String,
    pub percent_missing: BTreeMap<String, f64>,
}

impl MissingValueCheck {
    /// Highest per-column missing percentage; 0 for an empty column set
    #[must_use]
    pub fn max_missing_pct(&self) -> f64 {
        self.percent_missing.values().copied().fold(0.0, f64::max)
    }
}

/// Percentage of null values per column
#[must_use]
pub fn missing_value_checks(batch: &RecordBatch) -> MissingValueCheck {
    let n_rows = batch.num_rows();
    let percent_missing = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let pct = if n_rows == 0 {
                0.0
            } else {
                100.0 * batch.column(idx).null_count() as f64 / n_rows as f64
            };
            (field.name().clone(), pct)
        })
        .collect();
    MissingValueCheck {
        description: "Percentage of missing values per column".to_string(),
        percent_missing,
    }
}

/// Clinical range checks for the key numeric metrics
#[derive(Debug, Clone, Serialize)]
pub struct ClinicalRangeCheck {
    pub description: String,
    pub all_pass: bool,
    pub checks: BTreeMap<String, bool>,
    pub violations: BTreeMap<String, i64>,
}

impl ClinicalRangeCheck {
    /// Total violations across all five metrics
    #[must_use]
    pub fn total_violations(&self) -> i64 {
        self.violations.values().sum()
    }
}

/// Per-metric range pass/fail plus violation counts
pub fn clinical_range_checks(batch: &RecordBatch) -> Result<ClinicalRangeCheck> {
    let mut checks = BTreeMap::new();
    let mut violations = BTreeMap::new();
    for (check_name, counter_name, column, low, high) in CLINICAL_RANGES {
        let values = f64_column(batch, column)?;
        let count = count_out_of_range(&values, low, high);
        checks.insert(check_name.to_string(), count == 0);
        violations.insert(counter_name.to_string(), count);
    }
    let all_pass = checks.values().all(|pass| *pass);
    Ok(ClinicalRangeCheck {
        description: "Clinical range checks for key numeric metrics".to_string(),
        all_pass,
        checks,
        violations,
    })
}

fn count_out_of_range(values: &[Option<f64>], low: f64, high: f64) -> i64 {
    values
        .par_iter()
        .filter(|value| !matches!(value, Some(v) if (low..=high).contains(v)))
        .count() as i64
}

/// Category validity checks for lab codes and banded fields
#[derive(Debug, Clone, Serialize)]
pub struct CategoryValidityCheck {
    pub description: String,
    pub checks: BTreeMap<String, bool>,
}

/// Every observed category value must belong to its fixed enumeration
pub fn category_validity_checks(batch: &RecordBatch) -> Result<CategoryValidityCheck> {
    let cholesterol = i64_column(batch, "cholesterol_level")?;
    let glucose = i64_column(batch, "glucose_level")?;
    let age_bands = string_column(batch, "age_band")?;
    let bmi_bands = string_column(batch, "bmi_band")?;

    let mut checks = BTreeMap::new();
    checks.insert("cholesterol_valid_codes".to_string(), lab_codes_valid(&cholesterol));
    checks.insert("glucose_valid_codes".to_string(), lab_codes_valid(&glucose));
    checks.insert(
        "age_band_valid".to_string(),
        labels_valid(&age_bands, |label| AgeBand::parse(label).is_some()),
    );
    checks.insert(
        "bmi_band_valid".to_string(),
        labels_valid(&bmi_bands, |label| BmiBand::parse(label).is_some()),
    );
    Ok(CategoryValidityCheck {
        description: "Category validity checks for lab codes and banded fields".to_string(),
        checks,
    })
}

fn lab_codes_valid(values: &[Option<i64>]) -> bool {
    values
        .iter()
        .all(|value| matches!(value, Some(code) if VALID_LAB_CODES.contains(code)))
}

fn labels_valid(values: &[Option<String>], is_valid: impl Fn(&str) -> bool) -> bool {
    values
        .iter()
        .all(|value| value.as_deref().is_some_and(&is_valid))
}

/// Logical rules across related columns
#[derive(Debug, Clone, Serialize)]
pub struct LogicalConsistencyCheck {
    pub description: String,
    pub checks: BTreeMap<String, bool>,
    pub violations: BTreeMap<String, i64>,
}

/// Cross-field consistency: pressure ordering, positive BMI, positive age
pub fn logical_consistency_checks(batch: &RecordBatch) -> Result<LogicalConsistencyCheck> {
    let ap_hi = i64_column(batch, "ap_hi")?;
    let ap_lo = i64_column(batch, "ap_lo")?;
    let bmi = f64_column(batch, "bmi")?;
    let age_days = i64_column(batch, "age_days")?;

    let bp_violations = ap_hi
        .par_iter()
        .zip(ap_lo.par_iter())
        .filter(|(hi, lo)| !matches!((hi, lo), (Some(h), Some(l)) if h >= l))
        .count() as i64;
    let bmi_violations = bmi
        .par_iter()
        .filter(|value| !matches!(value, Some(v) if *v > 0.0))
        .count() as i64;
    let age_violations = age_days
        .par_iter()
        .filter(|value| !matches!(value, Some(v) if *v > 0))
        .count() as i64;

    let mut checks = BTreeMap::new();
    checks.insert("ap_hi_ge_ap_lo".to_string(), bp_violations == 0);
    checks.insert("bmi_positive".to_string(), bmi_violations == 0);
    checks.insert("age_days_positive".to_string(), age_violations == 0);

    let mut violations = BTreeMap::new();
    violations.insert("bp_logic_violations".to_string(), bp_violations);
    violations.insert("bmi_logic_violations".to_string(), bmi_violations);
    violations.insert("age_days_logic_violations".to_string(), age_violations);

    Ok(LogicalConsistencyCheck {
        description: "Logical rules across related columns".to_string(),
        checks,
        violations,
    })
}

/// Uniqueness of the synthetic patient identifier
#[derive(Debug, Clone, Serialize)]
pub struct UniquenessCheck {
    pub description: String,
    pub patient_id_unique: bool,
    pub total_rows: usize,
    pub unique_patient_ids: usize,
    pub duplicate_patient_ids: i64,
}

/// `patient_id` must be unique across all rows
pub fn uniqueness_checks(batch: &RecordBatch) -> Result<UniquenessCheck> {
    let ids = i64_column(batch, "patient_id")?;
    let distinct: FxHashSet<i64> = ids.iter().flatten().copied().collect();
    let total_rows = ids.len();
    let duplicates = (total_rows - distinct.len()) as i64;
    Ok(UniquenessCheck {
        description: "Uniqueness checks for synthetic identifiers".to_string(),
        patient_id_unique: duplicates == 0,
        total_rows,
        unique_patient_ids: distinct.len(),
        duplicate_patient_ids: duplicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch_with(
        name: &str,
        values: Vec<Option<i64>>,
    ) -> RecordBatch {
        let schema = Schema::new(vec![Field::new(name, DataType::Int64, true)]);
        RecordBatch::try_new(Arc::new(schema), vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    #[test]
    fn missingness_is_per_column_percentage() {
        let batch = batch_with("age_years", vec![Some(50), None, Some(61), None]);
        let check = missing_value_checks(&batch);
        assert!((check.percent_missing["age_years"] - 50.0).abs() < f64::EPSILON);
        assert!((check.max_missing_pct() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_check_counts_violations_and_nulls() {
        let schema = Schema::new(vec![
            Field::new("age_years", DataType::Int64, true),
            Field::new("height", DataType::Float64, false),
            Field::new("weight", DataType::Float64, false),
            Field::new("ap_hi", DataType::Int64, false),
            Field::new("ap_lo", DataType::Int64, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![Some(50), Some(110), None])),
                Arc::new(Float64Array::from(vec![170.0, 171.0, 172.0])),
                Arc::new(Float64Array::from(vec![70.0, 71.0, 72.0])),
                Arc::new(Int64Array::from(vec![120, 125, 130])),
                Arc::new(Int64Array::from(vec![80, 82, 85])),
            ],
        )
        .unwrap();
        let check = clinical_range_checks(&batch).unwrap();
        assert_eq!(check.violations["age_out_of_range"], 2);
        assert_eq!(check.violations["ap_hi_out_of_range"], 0);
        assert!(!check.all_pass);
        assert!(check.checks["height_120_220_cm"]);
        assert_eq!(check.total_violations(), 2);
    }

    #[test]
    fn category_check_rejects_unknown_labels_and_codes() {
        let schema = Schema::new(vec![
            Field::new("cholesterol_level", DataType::Int64, false),
            Field::new("glucose_level", DataType::Int64, false),
            Field::new("age_band", DataType::Utf8, false),
            Field::new("bmi_band", DataType::Utf8, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![1, 4])),
                Arc::new(Int64Array::from(vec![2, 3])),
                Arc::new(StringArray::from(vec!["30-39", "40-49"])),
                Arc::new(StringArray::from(vec!["normal", "gigantic"])),
            ],
        )
        .unwrap();
        let check = category_validity_checks(&batch).unwrap();
        assert!(!check.checks["cholesterol_valid_codes"]);
        assert!(check.checks["glucose_valid_codes"]);
        assert!(check.checks["age_band_valid"]);
        assert!(!check.checks["bmi_band_valid"]);
    }

    #[test]
    fn uniqueness_counts_duplicates() {
        let batch = batch_with("patient_id", vec![Some(1), Some(2), Some(2), Some(3), Some(3)]);
        let check = uniqueness_checks(&batch).unwrap();
        assert!(!check.patient_id_unique);
        assert_eq!(check.unique_patient_ids, 3);
        assert_eq!(check.duplicate_patient_ids, 2);
    }
}
