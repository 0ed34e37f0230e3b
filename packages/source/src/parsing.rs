//! Shared parsing utilities for raw source rows.
//!
//! Common coordinate, month, and raw-row accessor functions used by the
//! fetchers and the schema normalizer.

use chrono::{Datelike as _, NaiveDate};
use hotspot_map_incident_models::RawRow;

/// Returns the non-empty string value of a raw-row column, if present.
///
/// Archive rows carry every cell as a string; the remote fetcher flattens
/// its payload to the same shape. Empty cells count as absent.
#[must_use]
pub fn raw_str<'a>(row: &'a RawRow, key: &str) -> Option<&'a str> {
    match row.get(key) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Parses a coordinate from optional source text. Returns `None` if
/// missing or unparseable.
#[must_use]
pub fn parse_coord(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok()
}

/// Parses a `YYYY-MM` month string to the first day of that month.
///
/// Also accepts a full `YYYY-MM-DD` date, which collapses to its month.
#[must_use]
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return NaiveDate::from_ymd_opt(date.year(), date.month(), 1);
    }
    let (year, month) = s.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::Value::String((*v).to_string())))
            .collect()
    }

    #[test]
    fn parses_year_month() {
        let date = parse_month("2024-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn full_date_collapses_to_month_start() {
        let date = parse_month("2024-05-17").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(parse_month("not-a-month").is_none());
        assert!(parse_month("2024-13").is_none());
        assert!(parse_month("2024").is_none());
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_coord(Some("51.5074")), Some(51.5074));
        assert_eq!(parse_coord(Some(" -0.1278 ")), Some(-0.1278));
    }

    #[test]
    fn rejects_missing_or_garbled_coordinates() {
        assert!(parse_coord(None).is_none());
        assert!(parse_coord(Some("fifty-one")).is_none());
    }

    #[test]
    fn raw_str_skips_empty_cells() {
        let r = row(&[("Crime type", "Burglary"), ("Crime ID", "")]);
        assert_eq!(raw_str(&r, "Crime type"), Some("Burglary"));
        assert!(raw_str(&r, "Crime ID").is_none());
        assert!(raw_str(&r, "Month").is_none());
    }
}
