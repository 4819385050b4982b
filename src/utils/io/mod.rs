//! Dataset file I/O.
//!
//! Reads collapse a whole file into a single record batch; the datasets this
//! pipeline handles are small enough that per-batch streaming buys nothing.
//! Writes go to a temporary sibling file and are renamed into place, so a
//! downstream reader never observes a partial snapshot.

use std::fs::{self, File};
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{PipelineError, Result};
use crate::utils::logging::{log_read_complete, log_write_complete};

/// Read a delimited file into a single record batch
///
/// The schema is inferred from the first `sample_rows` rows; a header row is
/// required.
pub fn read_delimited(path: &Path, delimiter: u8, sample_rows: usize) -> Result<RecordBatch> {
    let start = Instant::now();
    let mut file = File::open(path)?;
    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);
    let (schema, _) = format.infer_schema(&mut file, Some(sample_rows))?;
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    log_read_complete(path, batch.num_rows(), start.elapsed());
    Ok(batch)
}

/// Read a Parquet file into a single record batch
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let start = Instant::now();
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    log_read_complete(path, batch.num_rows(), start.elapsed());
    Ok(batch)
}

/// Read a dataset, dispatching on the file extension
pub fn read_table(path: &Path, delimiter: u8, sample_rows: usize) -> Result<RecordBatch> {
    if is_parquet(path) {
        read_parquet(path)
    } else {
        read_delimited(path, delimiter, sample_rows)
    }
}

/// Write a record batch as a comma-delimited file with a header row
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(batch)?;
        Ok(())
    })?;
    log_write_complete(path, batch.num_rows());
    Ok(())
}

/// Write a record batch as a Parquet file
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    })?;
    log_write_complete(path, batch.num_rows());
    Ok(())
}

/// Write a dataset, dispatching on the file extension
pub fn write_table(batch: &RecordBatch, path: &Path) -> Result<()> {
    if is_parquet(path) {
        write_parquet(batch, path)
    } else {
        write_csv(batch, path)
    }
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// Run `write` against a temporary sibling file, then rename into place
///
/// Either the named file appears with its full content or it is untouched.
pub(crate) fn write_atomic(path: &Path, write: impl FnOnce(File) -> Result<()>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path)?;
    let file = File::create(&tmp)?;
    match write(file) {
        Ok(()) => {
            fs::rename(&tmp, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn tmp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PipelineError::Contract(format!("invalid output path: {}", path.display())))?;
    Ok(path.with_file_name(format!("{file_name}.tmp")))
}
