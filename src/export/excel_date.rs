// src/export/excel_date.rs

use crate::models::cell::DATETIME_FMT;
use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Prova a interpretare un timestamp salvato come seriale Excel,
/// restituendo anche la formattazione numerica da applicare.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    let dt = NaiveDateTime::parse_from_str(s.trim(), DATETIME_FMT)
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
        .ok()?;

    let serial = naive_datetime_to_excel_serial(&dt)?;

    // mezzanotte → solo data
    if dt.num_seconds_from_midnight() == 0 {
        Some(("yyyy-mm-dd", serial))
    } else {
        Some(("yyyy-mm-dd hh:mm", serial))
    }
}

fn naive_datetime_to_excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;

    let duration = *dt - excel_epoch;

    let days = duration.num_days() as f64;
    let secs = (duration.num_seconds() - duration.num_days() * 86400) as f64;

    Some(days + secs / 86400.0)
}
