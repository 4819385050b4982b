//! The transform engine: pure per-record and per-column transformations.
//!
//! Everything here is deterministic, total over its declared domain and free
//! of shared state; the de-identification stage composes these functions in a
//! fixed order.

pub mod banding;
pub mod dates;
pub mod derive;
pub mod sanity;

pub use banding::{AgeBand, BmiBand, BpBand, age_to_band, bmi_to_band, bp_to_band};
pub use dates::{clamp_to_retention, synthetic_measure_dates, truncate_to_month};
pub use derive::{age_days_to_years, body_mass_index, pulse_pressure};
pub use sanity::{SanityRule, violated_rule};
