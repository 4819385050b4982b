//! De-identified lake records.
//!
//! The lake dataset is the system-of-record for every downstream stage. A
//! record is immutable once created; a record failing the sanity filter is
//! never partially written.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use itertools::Itertools;

use crate::error::{PipelineError, Result};
use crate::transform::banding::{AgeBand, BmiBand};
use crate::transform::sanity;
use crate::utils::arrow::{
    naive_to_date32, required_date_column, required_f64_column, required_i32_column,
    required_i64_column, required_string_column,
};

/// Get the Arrow schema for the de-identified lake dataset
#[must_use]
pub fn lake_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("age_days", DataType::Int64, false),
        Field::new("gender", DataType::Int32, false),
        Field::new("height", DataType::Float64, false),
        Field::new("weight", DataType::Float64, false),
        Field::new("ap_hi", DataType::Int32, false),
        Field::new("ap_lo", DataType::Int32, false),
        Field::new("cholesterol_level", DataType::Int32, false),
        Field::new("glucose_level", DataType::Int32, false),
        Field::new("smoke", DataType::Int32, false),
        Field::new("alcohol", DataType::Int32, false),
        Field::new("active", DataType::Int32, false),
        Field::new("target_cvd", DataType::Int32, false),
        Field::new("age_years", DataType::Int32, false),
        Field::new("bmi", DataType::Float64, false),
        Field::new("bp_diff", DataType::Int32, false),
        Field::new("age_band", DataType::Utf8, false),
        Field::new("bmi_band", DataType::Utf8, false),
        Field::new("measure_date", DataType::Date32, false),
        Field::new("measure_month", DataType::Date32, false),
        Field::new("patient_id", DataType::Int64, false),
    ]))
}

/// One de-identified clinical record
#[derive(Debug, Clone, PartialEq)]
pub struct DeidRecord {
    /// Exact age in days, kept for logical-consistency checks
    pub age_days: i64,
    /// Gender code as delivered (1 or 2)
    pub gender: i32,
    /// Height in centimeters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Systolic blood pressure
    pub ap_hi: i32,
    /// Diastolic blood pressure
    pub ap_lo: i32,
    /// Cholesterol lab code (1..=3)
    pub cholesterol_level: i32,
    /// Glucose lab code (1..=3)
    pub glucose_level: i32,
    /// Smoker flag
    pub smoke: i32,
    /// Alcohol intake flag
    pub alcohol: i32,
    /// Physical activity flag
    pub active: i32,
    /// Cardiovascular disease outcome flag
    pub target_cvd: i32,
    /// Age in whole years, rounded from `age_days`
    pub age_years: i32,
    /// Body mass index
    pub bmi: f64,
    /// Pulse pressure (`ap_hi - ap_lo`)
    pub bp_diff: i32,
    /// Coarse age category
    pub age_band: AgeBand,
    /// Coarse BMI category
    pub bmi_band: BmiBand,
    /// Measurement date: synthetic if the extract had none, otherwise
    /// clamped into the retention window
    pub measure_date: NaiveDate,
    /// `measure_date` truncated to the first of its month
    pub measure_month: NaiveDate,
    /// Positional surrogate identifier: 1-based, unique and dense within a
    /// single de-identification run, NOT derived from record content
    pub patient_id: i64,
}

impl DeidRecord {
    /// Whether the record satisfies every clinical sanity predicate
    #[must_use]
    pub fn passes_sanity(&self) -> bool {
        sanity::violated_rule(self.age_years, self.height, self.weight, self.ap_hi, self.ap_lo)
            .is_none()
    }

    /// Convert lake records into a record batch following [`lake_schema`]
    pub fn to_batch(records: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(
                records.iter().map(|r| r.age_days).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.gender).collect_vec(),
            )),
            Arc::new(Float64Array::from(
                records.iter().map(|r| r.height).collect_vec(),
            )),
            Arc::new(Float64Array::from(
                records.iter().map(|r| r.weight).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.ap_hi).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.ap_lo).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.cholesterol_level).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.glucose_level).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.smoke).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.alcohol).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.active).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.target_cvd).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.age_years).collect_vec(),
            )),
            Arc::new(Float64Array::from(
                records.iter().map(|r| r.bmi).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                records.iter().map(|r| r.bp_diff).collect_vec(),
            )),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.age_band.as_str()).collect_vec(),
            )),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.bmi_band.as_str()).collect_vec(),
            )),
            Arc::new(Date32Array::from(
                records.iter().map(|r| naive_to_date32(r.measure_date)).collect_vec(),
            )),
            Arc::new(Date32Array::from(
                records.iter().map(|r| naive_to_date32(r.measure_month)).collect_vec(),
            )),
            Arc::new(Int64Array::from(
                records.iter().map(|r| r.patient_id).collect_vec(),
            )),
        ];
        Ok(RecordBatch::try_new(lake_schema(), columns)?)
    }

    /// Extract lake records from a record batch
    ///
    /// The warehouse builder goes through here and requires every lake field
    /// to be present and non-null; violations are input contract errors.
    pub fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let age_days = required_i64_column(batch, "age_days")?;
        let gender = required_i32_column(batch, "gender")?;
        let height = required_f64_column(batch, "height")?;
        let weight = required_f64_column(batch, "weight")?;
        let ap_hi = required_i32_column(batch, "ap_hi")?;
        let ap_lo = required_i32_column(batch, "ap_lo")?;
        let cholesterol_level = required_i32_column(batch, "cholesterol_level")?;
        let glucose_level = required_i32_column(batch, "glucose_level")?;
        let smoke = required_i32_column(batch, "smoke")?;
        let alcohol = required_i32_column(batch, "alcohol")?;
        let active = required_i32_column(batch, "active")?;
        let target_cvd = required_i32_column(batch, "target_cvd")?;
        let age_years = required_i32_column(batch, "age_years")?;
        let bmi = required_f64_column(batch, "bmi")?;
        let bp_diff = required_i32_column(batch, "bp_diff")?;
        let age_band = parse_bands(required_string_column(batch, "age_band")?, "age_band", AgeBand::parse)?;
        let bmi_band = parse_bands(required_string_column(batch, "bmi_band")?, "bmi_band", BmiBand::parse)?;
        let measure_date = required_date_column(batch, "measure_date")?;
        let measure_month = required_date_column(batch, "measure_month")?;
        let patient_id = required_i64_column(batch, "patient_id")?;

        let mut records = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            records.push(Self {
                age_days: age_days[row],
                gender: gender[row],
                height: height[row],
                weight: weight[row],
                ap_hi: ap_hi[row],
                ap_lo: ap_lo[row],
                cholesterol_level: cholesterol_level[row],
                glucose_level: glucose_level[row],
                smoke: smoke[row],
                alcohol: alcohol[row],
                active: active[row],
                target_cvd: target_cvd[row],
                age_years: age_years[row],
                bmi: bmi[row],
                bp_diff: bp_diff[row],
                age_band: age_band[row],
                bmi_band: bmi_band[row],
                measure_date: measure_date[row],
                measure_month: measure_month[row],
                patient_id: patient_id[row],
            });
        }
        Ok(records)
    }
}

fn parse_bands<B: Copy>(
    labels: Vec<String>,
    column_name: &str,
    parse: impl Fn(&str) -> Option<B>,
) -> Result<Vec<B>> {
    labels
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            parse(&label).ok_or_else(|| {
                PipelineError::Contract(format!(
                    "unknown {column_name} label '{label}' at row {row}"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::banding::{age_to_band, bmi_to_band};

    fn sample_record(patient_id: i64) -> DeidRecord {
        DeidRecord {
            age_days: 18250,
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
            age_years: 50,
            bmi: 24.2,
            bp_diff: 40,
            age_band: age_to_band(50),
            bmi_band: bmi_to_band(24.2),
            measure_date: NaiveDate::from_ymd_opt(2013, 5, 17).unwrap(),
            measure_month: NaiveDate::from_ymd_opt(2013, 5, 1).unwrap(),
            patient_id,
        }
    }

    #[test]
    fn batch_round_trip_preserves_records() {
        let records = vec![sample_record(1), sample_record(2)];
        let batch = DeidRecord::to_batch(&records).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), lake_schema().fields().len());
        let back = DeidRecord::from_batch(&batch).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn sanity_predicate_matches_the_rule_set() {
        let healthy = sample_record(1);
        assert!(healthy.passes_sanity());
        let implausible = DeidRecord { ap_hi: 70, bp_diff: -10, ..sample_record(2) };
        assert!(!implausible.passes_sanity());
    }
}
