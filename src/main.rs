use std::time::Instant;

use log::{info, warn};

use cardio_etl::config::PipelineConfig;
use cardio_etl::{Result, async_io};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let stage = args.next().unwrap_or_else(|| "run".to_string());
    let mut config = PipelineConfig::default();
    if let Some(raw_path) = args.next() {
        config.raw_path = raw_path.into();
    }

    let start = Instant::now();
    match stage.as_str() {
        "deidentify" => {
            let outcome = async_io::deidentify_async(config).await?;
            info!(
                "Retained {} records ({} dropped) in {:?}",
                outcome.records.len(),
                outcome.dropped,
                start.elapsed()
            );
        }
        "warehouse" => {
            let warehouse = async_io::warehouse_async(config).await?;
            info!(
                "Warehouse built with {} fact rows in {:?}",
                warehouse.fact.len(),
                start.elapsed()
            );
        }
        "quality" => {
            let report = async_io::quality_async(config).await?;
            info!(
                "Validation finished with overall score {:.1} in {:?}",
                report.dq_scores.overall_score,
                start.elapsed()
            );
        }
        "run" => {
            let outcome = async_io::deidentify_async(config.clone()).await?;
            info!(
                "Retained {} records ({} dropped)",
                outcome.records.len(),
                outcome.dropped
            );
            let (warehouse, report) = async_io::run_downstream(&config).await?;
            info!(
                "Pipeline complete: {} fact rows, overall quality {:.1}, total {:?}",
                warehouse.fact.len(),
                report.dq_scores.overall_score,
                start.elapsed()
            );
        }
        other => {
            warn!("Unknown stage '{other}', expected deidentify, warehouse, quality or run");
        }
    }
    Ok(())
}
