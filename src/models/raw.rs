//! Raw clinical observations as delivered by the source extract.

use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::Result;
use crate::utils::arrow::{
    date_column, has_column, required_f64_column, required_i32_column, required_i64_column,
};

/// One raw clinical observation
///
/// Field names already follow the lake vocabulary; the extract's `age`,
/// `cholesterol`, `gluc`, `alco` and `cardio` columns are renamed during
/// extraction. Raw records are ephemeral and consumed entirely by the
/// de-identification stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Exact age in days
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
    /// Measurement date, when the extract carries one
    pub measure_date: Option<NaiveDate>,
}

impl RawRecord {
    /// Extract raw records from a record batch
    ///
    /// A missing required column or a null in a required field is an input
    /// contract violation and aborts the stage before anything is written.
    /// Extra columns (such as a source row id) are ignored.
    pub fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let age_days = required_i64_column(batch, "age")?;
        let gender = required_i32_column(batch, "gender")?;
        let height = required_f64_column(batch, "height")?;
        let weight = required_f64_column(batch, "weight")?;
        let ap_hi = required_i32_column(batch, "ap_hi")?;
        let ap_lo = required_i32_column(batch, "ap_lo")?;
        let cholesterol_level = required_i32_column(batch, "cholesterol")?;
        let glucose_level = required_i32_column(batch, "gluc")?;
        let smoke = required_i32_column(batch, "smoke")?;
        let alcohol = required_i32_column(batch, "alco")?;
        let active = required_i32_column(batch, "active")?;
        let target_cvd = required_i32_column(batch, "cardio")?;
        let measure_date = if has_column(batch, "measure_date") {
            date_column(batch, "measure_date")?
        } else {
            vec![None; batch.num_rows()]
        };

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
                measure_date: measure_date[row],
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn raw_batch() -> RecordBatch {
        let mut fields = vec![Field::new("age", DataType::Int64, false)];
        let mut columns: Vec<arrow::array::ArrayRef> =
            vec![Arc::new(Int64Array::from(vec![18250_i64, 20000]))];
        for (name, values) in [
            ("gender", vec![1_i64, 2]),
            ("ap_hi", vec![120, 140]),
            ("ap_lo", vec![80, 90]),
            ("cholesterol", vec![1, 3]),
            ("gluc", vec![1, 2]),
            ("smoke", vec![0, 1]),
            ("alco", vec![0, 0]),
            ("active", vec![1, 0]),
            ("cardio", vec![0, 1]),
        ] {
            fields.push(Field::new(name, DataType::Int64, false));
            columns.push(Arc::new(Int64Array::from(values)));
        }
        for (name, values) in [("height", vec![170.0, 165.0]), ("weight", vec![70.0, 82.5])] {
            fields.push(Field::new(name, DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from(values)));
        }
        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
    }

    #[test]
    fn extraction_renames_source_columns() {
        let records = RawRecord::from_batch(&raw_batch()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].age_days, 18250);
        assert_eq!(records[1].cholesterol_level, 3);
        assert_eq!(records[1].glucose_level, 2);
        assert_eq!(records[1].target_cvd, 1);
        assert_eq!(records[0].measure_date, None);
    }

    #[test]
    fn missing_required_column_aborts() {
        let schema = Schema::new(vec![Field::new("age", DataType::Int64, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int64Array::from(vec![18250_i64]))],
        )
        .unwrap();
        assert!(RawRecord::from_batch(&batch).is_err());
    }
}
