//! Async wrappers for pipeline stages.
//!
//! The dimensional modeler and quality validator both consume the lake
//! snapshot without depending on each other, so the binary runs them
//! concurrently. Each stage stays a blocking batch job internally; the
//! wrappers delegate to the blocking pool.

use anyhow::anyhow;

use crate::config::PipelineConfig;
use crate::deid::{self, DeidOutcome};
use crate::error::{PipelineError, Result};
use crate::quality::{self, QualityReport};
use crate::warehouse::{self, Warehouse};

async fn spawn<T: Send + 'static>(task: impl FnOnce() -> Result<T> + Send + 'static) -> Result<T> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| PipelineError::Other(anyhow!("background stage task failed: {e}")))?
}

/// Run the de-identification stage on the blocking pool
pub async fn deidentify_async(config: PipelineConfig) -> Result<DeidOutcome> {
    spawn(move || deid::run(&config)).await
}

/// Run the warehouse stage on the blocking pool
pub async fn warehouse_async(config: PipelineConfig) -> Result<Warehouse> {
    spawn(move || warehouse::run(&config)).await
}

/// Run the quality stage on the blocking pool
pub async fn quality_async(config: PipelineConfig) -> Result<QualityReport> {
    spawn(move || quality::run(&config)).await
}

/// Run the two independent lake consumers concurrently
///
/// Each reads its own immutable snapshot of the lake dataset; neither sees
/// the other's output.
pub async fn run_downstream(config: &PipelineConfig) -> Result<(Warehouse, QualityReport)> {
    futures::future::try_join(
        warehouse_async(config.clone()),
        quality_async(config.clone()),
    )
    .await
}
