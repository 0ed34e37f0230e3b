//! Record cleaning: coordinate validation, month parsing, and category
//! normalization.
//!
//! Applied after schema normalization and before projection. The whole
//! step is idempotent: running it on already-cleaned output changes
//! nothing.

use std::ops::RangeInclusive;

use hotspot_map_incident_models::IncidentRecord;
use hotspot_map_source::parsing::parse_month;

/// Approximate national bounding box, latitude.
const LAT_RANGE: RangeInclusive<f64> = 49.0..=61.0;
/// Approximate national bounding box, longitude.
const LON_RANGE: RangeInclusive<f64> = -8.0..=2.0;

/// Cleans a batch of normalized records. In order:
///
/// 1. Drop rows with a null latitude or longitude.
/// 2. Parse `month_raw` into `month`; unparsable months stay `None` and
///    the row is kept.
/// 3. Retain only rows inside the national bounding box
///    (latitude 49..=61, longitude -8..=2).
/// 4. Lowercase the category and collapse hyphens to spaces.
#[must_use]
pub fn clean(records: Vec<IncidentRecord>) -> Vec<IncidentRecord> {
    let input_len = records.len();

    let cleaned: Vec<IncidentRecord> = records
        .into_iter()
        .filter(|r| r.latitude.is_some() && r.longitude.is_some())
        .map(|mut r| {
            r.month = r.month_raw.as_deref().and_then(parse_month);
            r
        })
        .filter(|r| {
            let lat = r.latitude.unwrap_or(f64::NAN);
            let lon = r.longitude.unwrap_or(f64::NAN);
            LAT_RANGE.contains(&lat) && LON_RANGE.contains(&lon)
        })
        .map(|mut r| {
            r.category = r.category.to_lowercase().replace('-', " ");
            r
        })
        .collect();

    log::info!("Cleaned records: {} of {input_len} remaining", cleaned.len());
    cleaned
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;

    fn record(latitude: Option<f64>, longitude: Option<f64>) -> IncidentRecord {
        IncidentRecord {
            crime_id: None,
            month_raw: Some("2024-05".to_string()),
            month: None,
            force: "Test Force".to_string(),
            category: "Anti-social behaviour".to_string(),
            latitude,
            longitude,
            projected_x: None,
            projected_y: None,
            outcome_status: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn keeps_valid_and_drops_out_of_bounds() {
        let records = vec![record(Some(51.5), Some(-0.1)), record(Some(90.0), Some(200.0))];

        let cleaned = clean(records);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].latitude, Some(51.5));
        assert_eq!(cleaned[0].longitude, Some(-0.1));
    }

    #[test]
    fn drops_null_coordinates() {
        let records = vec![
            record(None, Some(-0.1)),
            record(Some(51.5), None),
            record(Some(51.5), Some(-0.1)),
        ];

        assert_eq!(clean(records).len(), 1);
    }

    #[test]
    fn bounding_box_edges_are_inclusive() {
        let records = vec![
            record(Some(49.0), Some(-8.0)),
            record(Some(61.0), Some(2.0)),
            record(Some(48.999), Some(0.0)),
            record(Some(52.0), Some(2.001)),
        ];

        assert_eq!(clean(records).len(), 2);
    }

    #[test]
    fn parses_month_and_keeps_unparsable_rows() {
        let mut bad_month = record(Some(51.5), Some(-0.1));
        bad_month.month_raw = Some("never".to_string());
        let records = vec![record(Some(51.5), Some(-0.1)), bad_month];

        let cleaned = clean(records);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].month, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(cleaned[1].month.is_none());
    }

    #[test]
    fn normalizes_category_text() {
        let cleaned = clean(vec![record(Some(51.5), Some(-0.1))]);
        assert_eq!(cleaned[0].category, "anti social behaviour");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let records = vec![
            record(Some(51.5), Some(-0.1)),
            record(Some(55.9), Some(-3.2)),
            record(Some(90.0), Some(200.0)),
        ];

        let once = clean(records);
        let twice = clean(once.clone());

        assert_eq!(once, twice);
    }
}
