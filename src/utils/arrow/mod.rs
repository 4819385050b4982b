//! Utilities for working with Arrow record batches.
//!
//! Delimited files arrive with whatever types schema inference produced, so
//! typed column extraction casts to the requested type before downcasting and
//! reports failures with the column named.

use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::compute;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};

use crate::error::{PipelineError, Result};

/// Get a required column from a record batch
pub fn get_column(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    match batch.schema().index_of(column_name) {
        Ok(idx) => Ok(batch.column(idx).clone()),
        Err(_) => Err(PipelineError::ColumnNotFound {
            column: column_name.to_string(),
        }),
    }
}

/// Check whether a record batch carries a column
#[must_use]
pub fn has_column(batch: &RecordBatch, column_name: &str) -> bool {
    batch.schema().index_of(column_name).is_ok()
}

/// Downcast a column to a concrete array type with a clear error message
pub fn downcast_array<'a, T: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected: &str,
) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        PipelineError::Contract(format!(
            "column '{column_name}' could not be read as {expected} (stored as {:?})",
            array.data_type()
        ))
    })
}

/// Fetch a column and adapt it to the expected data type
fn adapted_column(batch: &RecordBatch, column_name: &str, to: &DataType) -> Result<ArrayRef> {
    let column = get_column(batch, column_name)?;
    if column.data_type() == to {
        return Ok(column);
    }
    compute::cast(&column, to).map_err(|e| {
        PipelineError::Contract(format!(
            "column '{column_name}' could not be adapted from {:?} to {to:?}: {e}",
            column.data_type()
        ))
    })
}

/// Extract a column as 64-bit integers, adapting the stored type if needed
pub fn i64_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<i64>>> {
    let array = adapted_column(batch, column_name, &DataType::Int64)?;
    let values = downcast_array::<Int64Array>(&array, column_name, "Int64")?;
    Ok((0..values.len())
        .map(|row| (!values.is_null(row)).then(|| values.value(row)))
        .collect())
}

/// Extract a column as 64-bit floats, adapting the stored type if needed
pub fn f64_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<f64>>> {
    let array = adapted_column(batch, column_name, &DataType::Float64)?;
    let values = downcast_array::<Float64Array>(&array, column_name, "Float64")?;
    Ok((0..values.len())
        .map(|row| (!values.is_null(row)).then(|| values.value(row)))
        .collect())
}

/// Extract a column as strings
pub fn string_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<String>>> {
    let array = adapted_column(batch, column_name, &DataType::Utf8)?;
    let values = downcast_array::<StringArray>(&array, column_name, "String")?;
    Ok((0..values.len())
        .map(|row| (!values.is_null(row)).then(|| values.value(row).to_string()))
        .collect())
}

/// Extract a column as calendar dates
///
/// Accepts native `Date32` columns as well as anything castable to one, such
/// as ISO-formatted strings from a delimited file.
pub fn date_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let array = adapted_column(batch, column_name, &DataType::Date32)?;
    let values = downcast_array::<Date32Array>(&array, column_name, "Date32")?;
    Ok((0..values.len())
        .map(|row| {
            if values.is_null(row) {
                None
            } else {
                date32_to_naive(values.value(row))
            }
        })
        .collect())
}

/// Convert days-since-epoch to a calendar date
///
/// Returns `None` only for values outside chrono's representable range.
#[must_use]
pub fn date32_to_naive(days_since_epoch: i32) -> Option<NaiveDate> {
    // chrono's default date is the Unix epoch
    let epoch = NaiveDate::default();
    if days_since_epoch >= 0 {
        epoch.checked_add_days(Days::new(days_since_epoch.unsigned_abs().into()))
    } else {
        epoch.checked_sub_days(Days::new(days_since_epoch.unsigned_abs().into()))
    }
}

/// Convert a calendar date to days-since-epoch for Date32 storage
#[must_use]
pub fn naive_to_date32(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

/// Extract a required i64 column, rejecting nulls as contract violations
pub fn required_i64_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<i64>> {
    require(i64_column(batch, column_name)?, column_name)
}

/// Extract a required i32 column, rejecting nulls and out-of-range values
pub fn required_i32_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<i32>> {
    required_i64_column(batch, column_name)?
        .into_iter()
        .map(|value| {
            i32::try_from(value).map_err(|_| {
                PipelineError::Contract(format!(
                    "value {value} in column '{column_name}' overflows 32 bits"
                ))
            })
        })
        .collect()
}

/// Extract a required f64 column, rejecting nulls as contract violations
pub fn required_f64_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<f64>> {
    require(f64_column(batch, column_name)?, column_name)
}

/// Extract a required string column, rejecting nulls as contract violations
pub fn required_string_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<String>> {
    require(string_column(batch, column_name)?, column_name)
}

/// Extract a required date column, rejecting nulls as contract violations
pub fn required_date_column(batch: &RecordBatch, column_name: &str) -> Result<Vec<NaiveDate>> {
    require(date_column(batch, column_name)?, column_name)
}

fn require<T>(values: Vec<Option<T>>, column_name: &str) -> Result<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                PipelineError::Contract(format!(
                    "null value in required column '{column_name}' at row {row}"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn single_column_batch() -> RecordBatch {
        let schema = Schema::new(vec![Field::new("age", DataType::Int64, true)]);
        let values = Int64Array::from(vec![Some(20), None, Some(30)]);
        RecordBatch::try_new(Arc::new(schema), vec![Arc::new(values)]).unwrap()
    }

    #[test]
    fn missing_column_is_a_contract_violation() {
        let batch = single_column_batch();
        let err = get_column(&batch, "weight").unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound { column } if column == "weight"));
    }

    #[test]
    fn optional_extraction_preserves_nulls() {
        let batch = single_column_batch();
        let values = i64_column(&batch, "age").unwrap();
        assert_eq!(values, vec![Some(20), None, Some(30)]);
    }

    #[test]
    fn required_extraction_rejects_nulls() {
        let batch = single_column_batch();
        assert!(required_i64_column(&batch, "age").is_err());
    }

    #[test]
    fn date32_round_trip() {
        let date = NaiveDate::from_ymd_opt(2012, 7, 15).unwrap();
        assert_eq!(date32_to_naive(naive_to_date32(date)), Some(date));
    }
}
