//! Dimension tables: deduplicated attribute projections with surrogate keys.
//!
//! Every dimension is built in one pass over the lake dataset. Surrogate
//! keys are dense, 1-based and assigned in first-occurrence order, and each
//! dimension keeps a hash index from its attribute tuple to its key so fact
//! assembly never rescans a table.

use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::models::DeidRecord;
use crate::transform::banding::{AgeBand, BmiBand, BpBand, bp_to_band};
use crate::utils::arrow::naive_to_date32;

/// Attribute tuple keying the patient dimension
///
/// `patient_id` is part of the key, so this dimension never collapses two
/// records and its row count equals the lake row count.
pub type PatientAttributes = (i64, i32, AgeBand, BmiBand, i32, i32, i32);

/// Attribute tuple keying the lab dimension
pub type LabAttributes = (i32, i32, BpBand);

/// One row of `dim_patient`
#[derive(Debug, Clone, PartialEq)]
pub struct DimPatientRow {
    pub patient_key: i64,
    pub patient_id: i64,
    pub gender: i32,
    pub age_band: AgeBand,
    pub bmi_band: BmiBand,
    pub smoker_flag: i32,
    pub alcohol_flag: i32,
    pub active_flag: i32,
}

/// The patient dimension with its key index
#[derive(Debug)]
pub struct DimPatient {
    /// Rows in surrogate-key order
    pub rows: Vec<DimPatientRow>,
    index: FxHashMap<PatientAttributes, i64>,
}

impl DimPatient {
    /// Build the dimension from the lake dataset
    #[must_use]
    pub fn build(records: &[DeidRecord]) -> Self {
        let mut rows = Vec::new();
        let mut index = FxHashMap::default();
        for record in records {
            let attributes = Self::attributes(record);
            if index.contains_key(&attributes) {
                continue;
            }
            let patient_key = rows.len() as i64 + 1;
            index.insert(attributes, patient_key);
            rows.push(DimPatientRow {
                patient_key,
                patient_id: record.patient_id,
                gender: record.gender,
                age_band: record.age_band,
                bmi_band: record.bmi_band,
                smoker_flag: record.smoke,
                alcohol_flag: record.alcohol,
                active_flag: record.active,
            });
        }
        Self { rows, index }
    }

    fn attributes(record: &DeidRecord) -> PatientAttributes {
        (
            record.patient_id,
            record.gender,
            record.age_band,
            record.bmi_band,
            record.smoke,
            record.alcohol,
            record.active,
        )
    }

    /// Look up the surrogate key for a lake record
    #[must_use]
    pub fn key_for(&self, record: &DeidRecord) -> Option<i64> {
        self.index.get(&Self::attributes(record)).copied()
    }

    /// Convert the dimension into a record batch
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(
                self.rows.iter().map(|r| r.patient_key).collect_vec(),
            )),
            Arc::new(Int64Array::from(
                self.rows.iter().map(|r| r.patient_id).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.gender).collect_vec(),
            )),
            Arc::new(StringArray::from(
                self.rows.iter().map(|r| r.age_band.as_str()).collect_vec(),
            )),
            Arc::new(StringArray::from(
                self.rows.iter().map(|r| r.bmi_band.as_str()).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.smoker_flag).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.alcohol_flag).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.active_flag).collect_vec(),
            )),
        ];
        Ok(RecordBatch::try_new(dim_patient_schema(), columns)?)
    }
}

/// Get the Arrow schema for `dim_patient`
#[must_use]
pub fn dim_patient_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("patient_key", DataType::Int64, false),
        Field::new("patient_id", DataType::Int64, false),
        Field::new("gender", DataType::Int32, false),
        Field::new("age_band", DataType::Utf8, false),
        Field::new("bmi_band", DataType::Utf8, false),
        Field::new("smoker_flag", DataType::Int32, false),
        Field::new("alcohol_flag", DataType::Int32, false),
        Field::new("active_flag", DataType::Int32, false),
    ]))
}

/// One row of `dim_time`, at month grain
#[derive(Debug, Clone, PartialEq)]
pub struct DimTimeRow {
    pub date_key: i64,
    /// First day of the month
    pub date: NaiveDate,
    pub year: i32,
    pub month: i32,
    pub quarter: i32,
}

/// The time dimension with its key index
#[derive(Debug)]
pub struct DimTime {
    /// Rows in surrogate-key order
    pub rows: Vec<DimTimeRow>,
    index: FxHashMap<NaiveDate, i64>,
}

impl DimTime {
    /// Build the dimension from the lake dataset's `measure_month` values
    #[must_use]
    pub fn build(records: &[DeidRecord]) -> Self {
        let mut rows = Vec::new();
        let mut index = FxHashMap::default();
        for record in records {
            let month = record.measure_month;
            if index.contains_key(&month) {
                continue;
            }
            let date_key = rows.len() as i64 + 1;
            index.insert(month, date_key);
            rows.push(DimTimeRow {
                date_key,
                date: month,
                year: month.year(),
                month: month.month() as i32,
                quarter: (month.month0() / 3 + 1) as i32,
            });
        }
        Self { rows, index }
    }

    /// Look up the surrogate key for a lake record
    #[must_use]
    pub fn key_for(&self, record: &DeidRecord) -> Option<i64> {
        self.index.get(&record.measure_month).copied()
    }

    /// Convert the dimension into a record batch
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(
                self.rows.iter().map(|r| r.date_key).collect_vec(),
            )),
            Arc::new(Date32Array::from(
                self.rows.iter().map(|r| naive_to_date32(r.date)).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.year).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.month).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.quarter).collect_vec(),
            )),
        ];
        Ok(RecordBatch::try_new(dim_time_schema(), columns)?)
    }
}

/// Get the Arrow schema for `dim_time`
#[must_use]
pub fn dim_time_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("date_key", DataType::Int64, false),
        Field::new("date", DataType::Date32, false),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::Int32, false),
        Field::new("quarter", DataType::Int32, false),
    ]))
}

/// One row of `dim_lab`
#[derive(Debug, Clone, PartialEq)]
pub struct DimLabRow {
    pub lab_key: i64,
    pub cholesterol_level: i32,
    pub glucose_level: i32,
    pub bp_band: BpBand,
}

/// The lab dimension with its key index
#[derive(Debug)]
pub struct DimLab {
    /// Rows in surrogate-key order
    pub rows: Vec<DimLabRow>,
    index: FxHashMap<LabAttributes, i64>,
}

impl DimLab {
    /// Build the dimension from the lake dataset
    ///
    /// `bp_band` is recomputed from the systolic reading here; it is not a
    /// lake column.
    #[must_use]
    pub fn build(records: &[DeidRecord]) -> Self {
        let mut rows = Vec::new();
        let mut index = FxHashMap::default();
        for record in records {
            let attributes = Self::attributes(record);
            if index.contains_key(&attributes) {
                continue;
            }
            let lab_key = rows.len() as i64 + 1;
            index.insert(attributes, lab_key);
            rows.push(DimLabRow {
                lab_key,
                cholesterol_level: record.cholesterol_level,
                glucose_level: record.glucose_level,
                bp_band: attributes.2,
            });
        }
        Self { rows, index }
    }

    fn attributes(record: &DeidRecord) -> LabAttributes {
        (
            record.cholesterol_level,
            record.glucose_level,
            bp_to_band(record.ap_hi),
        )
    }

    /// Look up the surrogate key for a lake record
    #[must_use]
    pub fn key_for(&self, record: &DeidRecord) -> Option<i64> {
        self.index.get(&Self::attributes(record)).copied()
    }

    /// Convert the dimension into a record batch
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(
                self.rows.iter().map(|r| r.lab_key).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.cholesterol_level).collect_vec(),
            )),
            Arc::new(Int32Array::from(
                self.rows.iter().map(|r| r.glucose_level).collect_vec(),
            )),
            Arc::new(StringArray::from(
                self.rows.iter().map(|r| r.bp_band.as_str()).collect_vec(),
            )),
        ];
        Ok(RecordBatch::try_new(dim_lab_schema(), columns)?)
    }
}

/// Get the Arrow schema for `dim_lab`
#[must_use]
pub fn dim_lab_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("lab_key", DataType::Int64, false),
        Field::new("cholesterol_level", DataType::Int32, false),
        Field::new("glucose_level", DataType::Int32, false),
        Field::new("bp_band", DataType::Utf8, false),
    ]))
}
