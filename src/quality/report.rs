//! Quality report assembly and emission.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use log::info;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::io;

use super::checks::{
    self, CategoryValidityCheck, ClinicalRangeCheck, LogicalConsistencyCheck, MissingValueCheck,
    UniquenessCheck,
};
use super::score::{DqScores, compute_dq_scores};

/// The five completed check blocks
#[derive(Debug, Clone, Serialize)]
pub struct Checks {
    pub missing_values: MissingValueCheck,
    pub clinical_ranges: ClinicalRangeCheck,
    pub category_validity: CategoryValidityCheck,
    pub logical_consistency: LogicalConsistencyCheck,
    pub uniqueness: UniquenessCheck,
}

/// Snapshot of one dataset's quality
///
/// Built fresh on every validation run and never mutated afterwards; the
/// report emitter renders it, nothing rewrites it.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub dataset_path: String,
    pub n_rows: usize,
    pub n_columns: usize,
    pub checks: Checks,
    pub dq_scores: DqScores,
}

/// Run all five checks over a dataset and score the result
///
/// The dataset must carry the lake-schema columns the checks read; a missing
/// column is an input contract violation. Low quality is not: a dataset full
/// of rule violations still validates, it just scores badly.
pub fn run_all_validations(batch: &RecordBatch, dataset_path: &str) -> Result<QualityReport> {
    info!("Validating {} ({} rows)", dataset_path, batch.num_rows());
    let checks = Checks {
        missing_values: checks::missing_value_checks(batch),
        clinical_ranges: checks::clinical_range_checks(batch)?,
        category_validity: checks::category_validity_checks(batch)?,
        logical_consistency: checks::logical_consistency_checks(batch)?,
        uniqueness: checks::uniqueness_checks(batch)?,
    };
    let dq_scores = compute_dq_scores(&checks, batch.num_rows());
    Ok(QualityReport {
        dataset_path: dataset_path.to_string(),
        n_rows: batch.num_rows(),
        n_columns: batch.num_columns(),
        checks,
        dq_scores,
    })
}

/// Write the report as pretty-printed JSON
///
/// Goes through the same temp-then-rename path as dataset writes, so a
/// consumer never reads a truncated report.
pub fn write_json(report: &QualityReport, path: &Path) -> Result<()> {
    io::write_atomic(path, |file| {
        serde_json::to_writer_pretty(file, report)?;
        Ok(())
    })?;
    info!("JSON report written to {}", path.display());
    Ok(())
}

/// Log a human-readable summary of the report
pub fn log_summary(report: &QualityReport) {
    let scores = &report.dq_scores;
    info!(
        "Dataset {}: {} rows, {} columns",
        report.dataset_path, report.n_rows, report.n_columns
    );
    info!("Overall data quality score: {:.1}%", scores.overall_score);
    info!(
        "  missingness {:.1}% | clinical {:.1}% | category {:.1}% | logical {:.1}% | uniqueness {:.1}%",
        scores.missing_score,
        scores.clinical_score,
        scores.category_score,
        scores.logical_score,
        scores.uniqueness_score
    );
}

/// Run the stage end to end: read the lake dataset, validate it, persist the
/// JSON report and log the summary
pub fn run(config: &PipelineConfig) -> Result<QualityReport> {
    let batch = io::read_table(&config.lake_path, b',', config.schema_sample_rows)?;
    let report = run_all_validations(&batch, &config.lake_path.display().to_string())?;
    write_json(&report, &config.report_path)?;
    log_summary(&report);
    Ok(report)
}
