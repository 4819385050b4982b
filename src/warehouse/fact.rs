//! Fact table assembly.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use crate::error::{PipelineError, Result};
use crate::models::DeidRecord;
use crate::transform::banding::bp_to_band;

use super::dimensions::{DimLab, DimPatient, DimTime};

/// One row of `fact_clinical_metrics`
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub patient_key: i64,
    pub date_key: i64,
    pub lab_key: i64,
    pub bmi: f64,
    pub ap_hi: i32,
    pub ap_lo: i32,
    pub bp_diff: i32,
    pub cholesterol_level: i32,
    pub glucose_level: i32,
    pub target_cvd: i32,
}

/// Assemble the fact table, one row per lake record
///
/// Foreign keys resolve through the dimension indices built from the same
/// dataset. A miss is a modeling bug, never valid data: the build aborts
/// with the dimension, the attribute tuple and the offending record's
/// `patient_id`, and nothing is written.
pub fn build_fact(
    records: &[DeidRecord],
    dim_patient: &DimPatient,
    dim_time: &DimTime,
    dim_lab: &DimLab,
) -> Result<Vec<FactRow>> {
    records
        .iter()
        .map(|record| {
            let patient_key =
                dim_patient
                    .key_for(record)
                    .ok_or_else(|| PipelineError::UnresolvedKey {
                        dimension: "dim_patient",
                        key: format!("patient_id={}", record.patient_id),
                        patient_id: record.patient_id,
                    })?;
            let date_key = dim_time
                .key_for(record)
                .ok_or_else(|| PipelineError::UnresolvedKey {
                    dimension: "dim_time",
                    key: record.measure_month.to_string(),
                    patient_id: record.patient_id,
                })?;
            let lab_key = dim_lab
                .key_for(record)
                .ok_or_else(|| PipelineError::UnresolvedKey {
                    dimension: "dim_lab",
                    key: format!(
                        "({}, {}, {})",
                        record.cholesterol_level,
                        record.glucose_level,
                        bp_to_band(record.ap_hi)
                    ),
                    patient_id: record.patient_id,
                })?;
            Ok(FactRow {
                patient_key,
                date_key,
                lab_key,
                bmi: record.bmi,
                ap_hi: record.ap_hi,
                ap_lo: record.ap_lo,
                bp_diff: record.bp_diff,
                cholesterol_level: record.cholesterol_level,
                glucose_level: record.glucose_level,
                target_cvd: record.target_cvd,
            })
        })
        .collect()
}

/// Convert fact rows into a record batch
pub fn fact_to_batch(rows: &[FactRow]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(
            rows.iter().map(|r| r.patient_key).collect_vec(),
        )),
        Arc::new(Int64Array::from(
            rows.iter().map(|r| r.date_key).collect_vec(),
        )),
        Arc::new(Int64Array::from(
            rows.iter().map(|r| r.lab_key).collect_vec(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.bmi).collect_vec(),
        )),
        Arc::new(Int32Array::from(
            rows.iter().map(|r| r.ap_hi).collect_vec(),
        )),
        Arc::new(Int32Array::from(
            rows.iter().map(|r| r.ap_lo).collect_vec(),
        )),
        Arc::new(Int32Array::from(
            rows.iter().map(|r| r.bp_diff).collect_vec(),
        )),
        Arc::new(Int32Array::from(
            rows.iter().map(|r| r.cholesterol_level).collect_vec(),
        )),
        Arc::new(Int32Array::from(
            rows.iter().map(|r| r.glucose_level).collect_vec(),
        )),
        Arc::new(Int32Array::from(
            rows.iter().map(|r| r.target_cvd).collect_vec(),
        )),
    ];
    Ok(RecordBatch::try_new(fact_schema(), columns)?)
}

/// Get the Arrow schema for `fact_clinical_metrics`
#[must_use]
pub fn fact_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("patient_key", DataType::Int64, false),
        Field::new("date_key", DataType::Int64, false),
        Field::new("lab_key", DataType::Int64, false),
        Field::new("bmi", DataType::Float64, false),
        Field::new("ap_hi", DataType::Int32, false),
        Field::new("ap_lo", DataType::Int32, false),
        Field::new("bp_diff", DataType::Int32, false),
        Field::new("cholesterol_level", DataType::Int32, false),
        Field::new("glucose_level", DataType::Int32, false),
        Field::new("target_cvd", DataType::Int32, false),
    ]))
}
