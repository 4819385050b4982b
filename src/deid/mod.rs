//! De-identification stage.
//!
//! Applies the transform engine over the raw dataset in fixed order: derive
//! clinical features, band them, synthesize or clamp measurement dates,
//! coarsen to month grain, drop implausible records, then assign positional
//! patient identifiers. Identifier assignment runs last so the emitted ID
//! space is dense; a dropped record never consumes an ID.

use chrono::NaiveDate;
use log::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{DeidRecord, RawRecord};
use crate::transform::banding::{AgeBand, BmiBand, age_to_band, bmi_to_band};
use crate::transform::dates::{clamp_to_retention, synthetic_measure_dates, truncate_to_month};
use crate::transform::derive::{age_days_to_years, body_mass_index, pulse_pressure};
use crate::transform::sanity;
use crate::utils::io;
use crate::utils::logging::create_progress_bar;

/// Result of a de-identification run
#[derive(Debug)]
pub struct DeidOutcome {
    /// Retained lake records
    pub records: Vec<DeidRecord>,
    /// Records dropped by the sanity filter; audit information, not data
    pub dropped: usize,
}

/// A fully transformed record awaiting identity assignment
#[derive(Debug, Clone)]
pub struct StagedRecord {
    pub age_days: i64,
    pub gender: i32,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: i32,
    pub ap_lo: i32,
    pub cholesterol_level: i32,
    pub glucose_level: i32,
    pub smoke: i32,
    pub alcohol: i32,
    pub active: i32,
    pub target_cvd: i32,
    pub age_years: i32,
    pub bmi: f64,
    pub bp_diff: i32,
    pub age_band: AgeBand,
    pub bmi_band: BmiBand,
    pub measure_date: NaiveDate,
    pub measure_month: NaiveDate,
}

impl StagedRecord {
    fn with_patient_id(self, patient_id: i64) -> DeidRecord {
        DeidRecord {
            age_days: self.age_days,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            ap_hi: self.ap_hi,
            ap_lo: self.ap_lo,
            cholesterol_level: self.cholesterol_level,
            glucose_level: self.glucose_level,
            smoke: self.smoke,
            alcohol: self.alcohol,
            active: self.active,
            target_cvd: self.target_cvd,
            age_years: self.age_years,
            bmi: self.bmi,
            bp_diff: self.bp_diff,
            age_band: self.age_band,
            bmi_band: self.bmi_band,
            measure_date: self.measure_date,
            measure_month: self.measure_month,
            patient_id,
        }
    }
}

/// Apply derivation, banding, date synthesis and month coarsening
///
/// Synthetic dates are generated for the whole input in row order, so the
/// sequence depends only on the seed and the raw row count, not on how many
/// records the sanity filter later drops. A record that arrives with a
/// measurement date keeps it, clamped into the retention window.
#[must_use]
pub fn transform_records(raw: &[RawRecord], seed: u64) -> Vec<StagedRecord> {
    let synthetic = synthetic_measure_dates(seed, raw.len());
    let progress = create_progress_bar(raw.len() as u64, "De-identifying records");

    let mut staged = Vec::with_capacity(raw.len());
    for (record, fallback) in raw.iter().zip(synthetic) {
        let age_years = age_days_to_years(record.age_days);
        let bmi = body_mass_index(record.height, record.weight);
        let measure_date = match record.measure_date {
            Some(date) => clamp_to_retention(date),
            None => fallback,
        };
        staged.push(StagedRecord {
            age_days: record.age_days,
            gender: record.gender,
            height: record.height,
            weight: record.weight,
            ap_hi: record.ap_hi,
            ap_lo: record.ap_lo,
            cholesterol_level: record.cholesterol_level,
            glucose_level: record.glucose_level,
            smoke: record.smoke,
            alcohol: record.alcohol,
            active: record.active,
            target_cvd: record.target_cvd,
            age_years,
            bmi,
            bp_diff: pulse_pressure(record.ap_hi, record.ap_lo),
            age_band: age_to_band(age_years),
            bmi_band: bmi_to_band(bmi),
            measure_date,
            measure_month: truncate_to_month(measure_date),
        });
        progress.inc(1);
    }
    progress.finish_and_clear();
    staged
}

/// Drop staged records violating any clinical sanity rule
///
/// Returns the retained records and the dropped count. Exclusion is expected
/// behavior, not an error; each drop is logged at debug level with the rule
/// it violated.
#[must_use]
pub fn apply_sanity_filter(staged: Vec<StagedRecord>) -> (Vec<StagedRecord>, usize) {
    let total = staged.len();
    let retained: Vec<StagedRecord> = staged
        .into_iter()
        .filter(|record| {
            match sanity::violated_rule(
                record.age_years,
                record.height,
                record.weight,
                record.ap_hi,
                record.ap_lo,
            ) {
                Some(rule) => {
                    debug!("Dropping record violating sanity rule {rule}");
                    false
                }
                None => true,
            }
        })
        .collect();
    let dropped = total - retained.len();
    (retained, dropped)
}

/// Assign positional patient identifiers
///
/// `patient_id` is the 1-based position of each record in the materialized
/// order of `staged`, NOT a content hash. Re-running over a reordered input
/// therefore yields different identifiers; callers own the ordering they
/// pass in. This is the only ordering-sensitive pass in the stage and it
/// must run exactly once, after every other transformation.
#[must_use]
pub fn assign_patient_ids(staged: Vec<StagedRecord>) -> Vec<DeidRecord> {
    staged
        .into_iter()
        .enumerate()
        .map(|(position, record)| record.with_patient_id(position as i64 + 1))
        .collect()
}

/// Run the full de-identification stage over a raw dataset
#[must_use]
pub fn deidentify(raw: &[RawRecord], seed: u64) -> DeidOutcome {
    info!("De-identifying {} raw records", raw.len());
    let staged = transform_records(raw, seed);
    let (retained, dropped) = apply_sanity_filter(staged);
    info!("Dropped {dropped} records failing sanity checks");
    let records = assign_patient_ids(retained);
    DeidOutcome { records, dropped }
}

/// Run the stage end to end: read the raw extract, de-identify, persist the
/// lake dataset
pub fn run(config: &PipelineConfig) -> Result<DeidOutcome> {
    let batch = io::read_table(&config.raw_path, config.raw_delimiter, config.schema_sample_rows)?;
    let raw = RawRecord::from_batch(&batch)?;
    let outcome = deidentify(&raw, config.date_seed);
    let lake = DeidRecord::to_batch(&outcome.records)?;
    io::write_table(&lake, &config.lake_path)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plausible_raw(age_days: i64) -> RawRecord {
        RawRecord {
            age_days,
            gender: 1,
            height: 170.0,
            weight: 70.0,
            ap_hi: 120,
            ap_lo: 80,
            cholesterol_level: 1,
            glucose_level: 1,
            smoke: 0,
            alcohol: 0,
            active: 1,
            target_cvd: 0,
            measure_date: None,
        }
    }

    #[test]
    fn patient_ids_are_dense_after_filtering() {
        let mut raw: Vec<RawRecord> = (0..5).map(|i| plausible_raw(18250 + i)).collect();
        raw[2].ap_hi = 70; // fails the systolic range rule
        let outcome = deidentify(&raw, 42);
        assert_eq!(outcome.dropped, 1);
        let ids: Vec<i64> = outcome.records.iter().map(|r| r.patient_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn reruns_are_bit_identical() {
        let raw: Vec<RawRecord> = (0..50).map(|i| plausible_raw(15000 + i * 100)).collect();
        let first = deidentify(&raw, 42);
        let second = deidentify(&raw, 42);
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn existing_dates_are_clamped_not_replaced() {
        let mut raw = vec![plausible_raw(18250)];
        raw[0].measure_date = NaiveDate::from_ymd_opt(2030, 6, 15);
        let outcome = deidentify(&raw, 42);
        let record = &outcome.records[0];
        assert_eq!(record.measure_date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(record.measure_month, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn every_retained_record_passes_sanity() {
        let mut raw: Vec<RawRecord> = (0..20).map(|i| plausible_raw(10000 + i * 900)).collect();
        raw[4].weight = 20.0;
        raw[9].ap_lo = 200;
        let outcome = deidentify(&raw, 7);
        assert!(outcome.records.iter().all(DeidRecord::passes_sanity));
    }
}
