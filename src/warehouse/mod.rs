//! Star-schema warehouse built from the de-identified lake dataset.
//!
//! Three dimension tables and one fact table. Dimensions deduplicate their
//! attribute projections and assign dense surrogate keys; the fact table
//! references them through value-equality joins resolved via per-dimension
//! hash indices. Building twice from the same dataset produces identical
//! key assignments.

pub mod dimensions;
pub mod fact;

pub use dimensions::{DimLab, DimPatient, DimTime};
pub use fact::FactRow;

use std::path::Path;

use log::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::DeidRecord;
use crate::utils::io;

/// The four warehouse tables
#[derive(Debug)]
pub struct Warehouse {
    pub dim_patient: DimPatient,
    pub dim_time: DimTime,
    pub dim_lab: DimLab,
    pub fact: Vec<FactRow>,
}

impl Warehouse {
    /// Build all four tables from the lake dataset
    pub fn build(records: &[DeidRecord]) -> Result<Self> {
        info!("Building warehouse from {} lake records", records.len());
        let dim_patient = DimPatient::build(records);
        let dim_time = DimTime::build(records);
        let dim_lab = DimLab::build(records);
        let fact = fact::build_fact(records, &dim_patient, &dim_time, &dim_lab)?;
        info!(
            "Warehouse shapes: dim_patient={}, dim_time={}, dim_lab={}, fact={}",
            dim_patient.rows.len(),
            dim_time.rows.len(),
            dim_lab.rows.len(),
            fact.len()
        );
        Ok(Self {
            dim_patient,
            dim_time,
            dim_lab,
            fact,
        })
    }

    /// Write the four tables under `dir` as comma-delimited files
    pub fn write(&self, dir: &Path) -> Result<()> {
        io::write_csv(&self.dim_patient.to_batch()?, &dir.join("dim_patient.csv"))?;
        io::write_csv(&self.dim_time.to_batch()?, &dir.join("dim_time.csv"))?;
        io::write_csv(&self.dim_lab.to_batch()?, &dir.join("dim_lab.csv"))?;
        io::write_csv(
            &fact::fact_to_batch(&self.fact)?,
            &dir.join("fact_clinical_metrics.csv"),
        )?;
        Ok(())
    }
}

/// Run the stage end to end: read the lake dataset, build the warehouse,
/// persist the four tables
pub fn run(config: &PipelineConfig) -> Result<Warehouse> {
    let batch = io::read_table(&config.lake_path, b',', config.schema_sample_rows)?;
    let records = DeidRecord::from_batch(&batch)?;
    let warehouse = Warehouse::build(&records)?;
    warehouse.write(&config.warehouse_dir)?;
    Ok(warehouse)
}
