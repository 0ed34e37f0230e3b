#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Breakdown statistics over proximity-selected incident subsets.
//!
//! Produces the tables chart renderers consume: incident counts by
//! category and by month. Rendering itself lives with the consumer.

use std::collections::BTreeMap;

use hotspot_map_incident_models::IncidentRecord;
use serde::Serialize;

/// Count tables for one proximity subset.
///
/// Records with a null month are counted by category but omitted from the
/// month table; they are never dropped from the subset itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Incident count per normalized category label.
    pub by_category: BTreeMap<String, u64>,
    /// Incident count per `YYYY-MM` month.
    pub by_month: BTreeMap<String, u64>,
}

impl Breakdown {
    /// Total number of incidents the breakdown covers.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.by_category.values().sum()
    }
}

/// Computes category and month count tables over a set of records.
///
/// An empty input yields empty tables, which is valid output.
#[must_use]
pub fn breakdown<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Breakdown {
    let mut result = Breakdown::default();

    for record in records {
        *result
            .by_category
            .entry(record.category.clone())
            .or_default() += 1;
        if let Some(month) = record.month {
            *result
                .by_month
                .entry(month.format("%Y-%m").to_string())
                .or_default() += 1;
        }
    }

    log::debug!(
        "Breakdown over {} incidents: {} categories, {} months",
        result.total(),
        result.by_category.len(),
        result.by_month.len()
    );

    result
}
