#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::Path;

use cardio_etl::RawRecord;

/// A clinically plausible raw record; tests tweak individual fields through
/// struct update syntax
pub fn plausible_raw(age_days: i64) -> RawRecord {
    RawRecord {
        age_days,
        gender: 1,
        height: 170.0,
        weight: 70.0,
        ap_hi: 120,
        ap_lo: 80,
        cholesterol_level: 1,
        glucose_level: 1,
        smoke: 0,
        alcohol: 0,
        active: 1,
        target_cvd: 0,
        measure_date: None,
    }
}

/// Write records as a semicolon-delimited raw extract, including the source
/// `id` column the pipeline is expected to ignore
pub fn write_raw_csv(path: &Path, records: &[RawRecord]) {
    let mut text = String::from(
        "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio\n",
    );
    for (idx, r) in records.iter().enumerate() {
        writeln!(
            text,
            "{};{};{};{};{};{};{};{};{};{};{};{};{}",
            idx + 1,
            r.age_days,
            r.gender,
            r.height,
            r.weight,
            r.ap_hi,
            r.ap_lo,
            r.cholesterol_level,
            r.glucose_level,
            r.smoke,
            r.alcohol,
            r.active,
            r.target_cvd
        )
        .unwrap();
    }
    std::fs::write(path, text).unwrap();
}
