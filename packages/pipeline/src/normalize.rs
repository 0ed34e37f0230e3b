//! Schema normalization from raw rows to [`IncidentRecord`]s.
//!
//! Applies the fixed rename table from source column names to canonical
//! field names. Absent source columns simply stay absent; they are never
//! synthesized. Coordinates are coerced to numbers, with unparseable
//! values becoming `None` rather than dropping the row — that decision
//! belongs to the cleaner. Columns outside the canonical set pass through
//! untouched.

use std::collections::BTreeMap;

use hotspot_map_incident_models::{IncidentRecord, RawRow, raw_columns};
use hotspot_map_source::parsing::{parse_coord, raw_str};

/// The fixed rename table from source columns to canonical field names.
pub const RENAME_TABLE: &[(&str, &str)] = &[
    (raw_columns::CRIME_ID, "crime_id"),
    (raw_columns::MONTH, "month"),
    (raw_columns::REPORTED_BY, "force"),
    (raw_columns::CRIME_TYPE, "category"),
    (raw_columns::LATITUDE, "latitude"),
    (raw_columns::LONGITUDE, "longitude"),
    (raw_columns::LAST_OUTCOME, "outcome_status"),
];

/// Normalizes a batch of raw rows into canonical records.
#[must_use]
pub fn normalize_rows(rows: &[RawRow]) -> Vec<IncidentRecord> {
    let records: Vec<IncidentRecord> = rows.iter().map(normalize_row).collect();
    log::info!("Normalized {} records", records.len());
    records
}

/// Normalizes one raw row.
///
/// The fetcher-stamped `force` column takes precedence over the source's
/// own `Reported by` column.
#[must_use]
pub fn normalize_row(row: &RawRow) -> IncidentRecord {
    let force = raw_str(row, raw_columns::FORCE)
        .or_else(|| raw_str(row, raw_columns::REPORTED_BY))
        .unwrap_or_default()
        .to_owned();

    let mut extra = BTreeMap::new();
    for (key, value) in row {
        if key.as_str() == raw_columns::FORCE
            || RENAME_TABLE.iter().any(|(source, _)| *source == key.as_str())
        {
            continue;
        }
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        extra.insert(key.clone(), text);
    }

    IncidentRecord {
        crime_id: raw_str(row, raw_columns::CRIME_ID).map(str::to_owned),
        month_raw: raw_str(row, raw_columns::MONTH).map(str::to_owned),
        month: None,
        force,
        category: raw_str(row, raw_columns::CRIME_TYPE)
            .unwrap_or_default()
            .to_owned(),
        latitude: parse_coord(raw_str(row, raw_columns::LATITUDE)),
        longitude: parse_coord(raw_str(row, raw_columns::LONGITUDE)),
        projected_x: None,
        projected_y: None,
        outcome_status: raw_str(row, raw_columns::LAST_OUTCOME).map(str::to_owned),
        extra,
    }
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
    fn renames_all_canonical_columns() {
        let record = normalize_row(&row(&[
            ("Crime ID", "abc123"),
            ("Month", "2024-05"),
            ("Reported by", "Test Force"),
            ("Crime type", "Burglary"),
            ("Latitude", "51.5"),
            ("Longitude", "-0.1"),
            ("Last outcome category", "Under investigation"),
        ]));

        assert_eq!(record.crime_id.as_deref(), Some("abc123"));
        assert_eq!(record.month_raw.as_deref(), Some("2024-05"));
        assert_eq!(record.force, "Test Force");
        assert_eq!(record.category, "Burglary");
        assert_eq!(record.latitude, Some(51.5));
        assert_eq!(record.longitude, Some(-0.1));
        assert_eq!(record.outcome_status.as_deref(), Some("Under investigation"));
        assert!(record.month.is_none());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn absent_columns_stay_absent() {
        let record = normalize_row(&row(&[("Crime type", "Burglary")]));

        assert!(record.crime_id.is_none());
        assert!(record.month_raw.is_none());
        assert!(record.latitude.is_none());
        assert!(record.outcome_status.is_none());
        assert!(record.force.is_empty());
    }

    #[test]
    fn unparseable_coordinates_become_null_not_dropped() {
        let record = normalize_row(&row(&[
            ("Latitude", "not-a-number"),
            ("Longitude", "-0.1"),
        ]));

        assert!(record.latitude.is_none());
        assert_eq!(record.longitude, Some(-0.1));
    }

    #[test]
    fn stamped_force_wins_over_reported_by() {
        let record = normalize_row(&row(&[
            ("Reported by", "Somewhere Else"),
            ("force", "Test Force"),
        ]));

        assert_eq!(record.force, "Test Force");
    }

    #[test]
    fn unknown_columns_pass_through() {
        let record = normalize_row(&row(&[
            ("Crime type", "Burglary"),
            ("LSOA name", "City of London 001A"),
            ("Context", ""),
        ]));

        assert_eq!(
            record.extra.get("LSOA name").map(String::as_str),
            Some("City of London 001A")
        );
        // Empty passthrough cells survive as empty strings.
        assert_eq!(record.extra.get("Context").map(String::as_str), Some(""));
    }
}
