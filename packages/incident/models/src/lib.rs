#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical incident record schema and query unit types.
//!
//! Every fetch path (remote API or local archive) produces raw rows in a
//! shared column vocabulary; the pipeline normalizes them into
//! [`IncidentRecord`], the single record shape used by every later stage.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw source column names shared by both fetch paths.
///
/// The archive CSVs carry these as literal header names; the remote
/// fetcher flattens its JSON payload into the same vocabulary so the
/// normalizer only ever sees one input schema.
pub mod raw_columns {
    /// Source incident identifier.
    pub const CRIME_ID: &str = "Crime ID";
    /// Month of occurrence as `YYYY-MM` text.
    pub const MONTH: &str = "Month";
    /// Force that reported the incident.
    pub const REPORTED_BY: &str = "Reported by";
    /// Source crime category label.
    pub const CRIME_TYPE: &str = "Crime type";
    /// Geodetic latitude as text.
    pub const LATITUDE: &str = "Latitude";
    /// Geodetic longitude as text.
    pub const LONGITUDE: &str = "Longitude";
    /// Latest outcome label, if any.
    pub const LAST_OUTCOME: &str = "Last outcome category";
    /// Force name stamped onto every row by the fetcher. Takes precedence
    /// over [`REPORTED_BY`] during normalization.
    pub const FORCE: &str = "force";
}

/// One raw source record: a JSON object keyed by source column names.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// One `(force, year, month)` fetch target.
///
/// Uniquely identifies a single fetch attempt and is immutable once
/// constructed; the month is validated at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryUnit {
    force: String,
    year: i32,
    month: u32,
}

impl QueryUnit {
    /// Creates a query unit for the given force, year, and month.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMonthError`] if `month` is not in `1..=12`.
    pub fn new(force: impl Into<String>, year: i32, month: u32) -> Result<Self, InvalidMonthError> {
        if !(1..=12).contains(&month) {
            return Err(InvalidMonthError { month });
        }
        Ok(Self {
            force: force.into(),
            year,
            month,
        })
    }

    /// The force name this unit targets.
    #[must_use]
    pub fn force(&self) -> &str {
        &self.force
    }

    /// The year this unit targets.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The month this unit targets (`1..=12`).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The zero-padded `YYYY-MM` date string used by the remote API.
    #[must_use]
    pub fn date_param(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for QueryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}-{:02}", self.force, self.year, self.month)
    }
}

/// Error returned when constructing a [`QueryUnit`] with a month outside
/// `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The invalid month value that was provided.
    pub month: u32,
}

impl std::fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid month {}: expected 1-12", self.month)
    }
}

impl std::error::Error for InvalidMonthError {}

/// An incident normalized to the canonical schema.
///
/// Produced by the schema normalizer. Coordinates are optional until the
/// cleaner has run; `projected_x`/`projected_y` are populated only after
/// the projection stage. Columns the canonical schema does not name pass
/// through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Source incident identifier. `None` when the source omits it.
    pub crime_id: Option<String>,
    /// Month of occurrence as source text (`YYYY-MM`).
    pub month_raw: Option<String>,
    /// Month of occurrence, parsed by the cleaner to the first of the
    /// month. Stays `None` for unparsable source text; such rows are
    /// kept, not dropped.
    pub month: Option<NaiveDate>,
    /// Force the incident belongs to.
    pub force: String,
    /// Crime category label. Lowercased with hyphens collapsed to spaces
    /// by the cleaner.
    pub category: String,
    /// Geodetic latitude (WGS84). `None` when missing or unparseable.
    pub latitude: Option<f64>,
    /// Geodetic longitude (WGS84). `None` when missing or unparseable.
    pub longitude: Option<f64>,
    /// Planar easting in metres, populated by the projector.
    pub projected_x: Option<f64>,
    /// Planar northing in metres, populated by the projector.
    pub projected_y: Option<f64>,
    /// Latest outcome label, if the source supplied one.
    pub outcome_status: Option<String>,
    /// Passthrough columns the canonical schema does not name.
    pub extra: BTreeMap<String, String>,
}

impl IncidentRecord {
    /// Returns the projected planar location, if the projector has run.
    #[must_use]
    pub const fn projected(&self) -> Option<(f64, f64)> {
        match (self.projected_x, self.projected_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}
