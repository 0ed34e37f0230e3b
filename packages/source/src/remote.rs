//! Remote street-crime API client.
//!
//! Issues a single `GET <base_url>?date=YYYY-MM&force=<slug>&key=<key>`
//! per unit with a bounded timeout and flattens the JSON payload into the
//! shared raw-row column vocabulary, so the normalizer sees the same
//! schema regardless of which path produced a row.

use std::time::Duration;

use async_trait::async_trait;
use hotspot_map_incident_models::{QueryUnit, RawRow, raw_columns};
use serde::Deserialize;

use crate::registry::force_slug;
use crate::{FetchError, RemoteSource};

/// Remote API client for street-crime records.
#[derive(Debug, Clone)]
pub struct StreetCrimeApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl StreetCrimeApi {
    /// Creates a client for the given endpoint with the given per-request
    /// timeout. The key is supplied by the caller's configuration; there
    /// is no default.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RemoteUnavailable`] if the HTTP client
    /// cannot be constructed.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            api_key: api_key.to_owned(),
        })
    }
}

/// Raw record shape from the street-crime API.
#[derive(Debug, Deserialize)]
struct StreetCrime {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    persistent_id: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    month: Option<String>,
    #[serde(default)]
    location: Option<CrimeLocation>,
    #[serde(default)]
    outcome_status: Option<OutcomeStatus>,
}

#[derive(Debug, Deserialize)]
struct CrimeLocation {
    #[serde(default)]
    latitude: Option<String>,
    #[serde(default)]
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutcomeStatus {
    #[serde(default)]
    category: Option<String>,
}

#[async_trait]
impl RemoteSource for StreetCrimeApi {
    async fn fetch_unit(&self, unit: &QueryUnit) -> Result<Vec<RawRow>, FetchError> {
        let params = [
            ("date", unit.date_param()),
            ("force", force_slug(unit.force())),
            ("key", self.api_key.clone()),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let crimes: Vec<StreetCrime> = response.json().await?;

        log::info!("Fetched {} records from API for {unit}", crimes.len());

        Ok(crimes
            .into_iter()
            .map(|crime| flatten_crime(crime, unit.force()))
            .collect())
    }
}

/// Flattens one API record into the shared raw-row shape, stamping the
/// unit's configured force name onto the row.
fn flatten_crime(crime: StreetCrime, force: &str) -> RawRow {
    let mut row = RawRow::new();

    let crime_id = crime
        .persistent_id
        .filter(|id| !id.is_empty())
        .or_else(|| crime.id.map(|id| id.to_string()));
    if let Some(id) = crime_id {
        row.insert(raw_columns::CRIME_ID.to_owned(), id.into());
    }
    if let Some(month) = crime.month {
        row.insert(raw_columns::MONTH.to_owned(), month.into());
    }
    if let Some(category) = crime.category {
        row.insert(raw_columns::CRIME_TYPE.to_owned(), category.into());
    }
    if let Some(location) = crime.location {
        if let Some(lat) = location.latitude {
            row.insert(raw_columns::LATITUDE.to_owned(), lat.into());
        }
        if let Some(lng) = location.longitude {
            row.insert(raw_columns::LONGITUDE.to_owned(), lng.into());
        }
    }
    if let Some(outcome) = crime.outcome_status.and_then(|o| o.category) {
        row.insert(raw_columns::LAST_OUTCOME.to_owned(), outcome.into());
    }
    row.insert(raw_columns::FORCE.to_owned(), force.into());

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::raw_str;

    fn sample() -> StreetCrime {
        serde_json::from_str(
            r#"{
                "category": "anti-social-behaviour",
                "persistent_id": "abc123",
                "id": 981234,
                "month": "2024-05",
                "location": {"latitude": "51.5074", "longitude": "-0.1278"},
                "outcome_status": {"category": "Under investigation"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn flattens_into_shared_columns() {
        let row = flatten_crime(sample(), "Test Force");
        assert_eq!(raw_str(&row, raw_columns::CRIME_ID), Some("abc123"));
        assert_eq!(raw_str(&row, raw_columns::MONTH), Some("2024-05"));
        assert_eq!(
            raw_str(&row, raw_columns::CRIME_TYPE),
            Some("anti-social-behaviour")
        );
        assert_eq!(raw_str(&row, raw_columns::LATITUDE), Some("51.5074"));
        assert_eq!(raw_str(&row, raw_columns::LONGITUDE), Some("-0.1278"));
        assert_eq!(
            raw_str(&row, raw_columns::LAST_OUTCOME),
            Some("Under investigation")
        );
        assert_eq!(raw_str(&row, raw_columns::FORCE), Some("Test Force"));
    }

    #[test]
    fn falls_back_to_numeric_id() {
        let mut crime = sample();
        crime.persistent_id = Some(String::new());
        let row = flatten_crime(crime, "Test Force");
        assert_eq!(raw_str(&row, raw_columns::CRIME_ID), Some("981234"));
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let crime: StreetCrime = serde_json::from_str(r#"{"category": "burglary"}"#).unwrap();
        let row = flatten_crime(crime, "Test Force");
        assert!(raw_str(&row, raw_columns::CRIME_ID).is_none());
        assert!(raw_str(&row, raw_columns::LATITUDE).is_none());
        assert_eq!(raw_str(&row, raw_columns::CRIME_TYPE), Some("burglary"));
        assert_eq!(raw_str(&row, raw_columns::FORCE), Some("Test Force"));
    }
}
