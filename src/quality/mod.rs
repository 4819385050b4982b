//! Data-quality validation and composite scoring.
//!
//! Runs independent rule checks over a dataset and aggregates them into five
//! component scores plus one overall score in [0, 100]. Quality is
//! observational, never gating: a low-scoring dataset still produces full
//! output plus a report reflecting the low score.

pub mod checks;
pub mod report;
pub mod score;

pub use checks::{
    CategoryValidityCheck, ClinicalRangeCheck, LogicalConsistencyCheck, MissingValueCheck,
    UniquenessCheck,
};
pub use report::{Checks, QualityReport, log_summary, run, run_all_validations, write_json};
pub use score::{DqScores, compute_dq_scores};
