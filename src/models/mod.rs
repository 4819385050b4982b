//! Typed row models for pipeline datasets.

pub mod deid;
pub mod raw;

pub use deid::{DeidRecord, lake_schema};
pub use raw::RawRecord;
