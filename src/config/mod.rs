//! Configuration for pipeline runs.

use std::path::PathBuf;

/// Configuration for one pipeline run
///
/// Every stage reads its file locations from here; nothing is taken from
/// ambient state. The defaults mirror the conventional `data/` layout.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw input dataset (semicolon- or comma-delimited)
    pub raw_path: PathBuf,
    /// De-identified lake dataset, the system-of-record for downstream stages.
    /// A `.parquet` extension selects Parquet persistence instead of CSV.
    pub lake_path: PathBuf,
    /// Directory receiving the four warehouse tables
    pub warehouse_dir: PathBuf,
    /// Location of the JSON quality report
    pub report_path: PathBuf,
    /// Field delimiter of the raw input file
    pub raw_delimiter: u8,
    /// Seed for synthetic measurement-date generation
    pub date_seed: u64,
    /// Rows sampled when inferring a delimited file's schema
    pub schema_sample_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("data/raw/cardio_raw_data.csv"),
            lake_path: PathBuf::from("data/lake/cardio_deid_data.csv"),
            warehouse_dir: PathBuf::from("data/warehouse"),
            report_path: PathBuf::from("data/quality_reports/dq_report.json"),
            raw_delimiter: b';',
            date_seed: 42,
            schema_sample_rows: 1024,
        }
    }
}
