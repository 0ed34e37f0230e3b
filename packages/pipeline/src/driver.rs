//! Pipeline driver: query expansion and bounded-concurrency fetching.
//!
//! A query is the cross product of years, months, and forces. Units are
//! expanded years-outer, months-middle, forces-inner and fetched through
//! a bounded worker pool; completed batches land in the run's own
//! accumulator in iteration order. An optional deadline stops *issuing*
//! new fetches when it expires — batches already fetched are kept and the
//! run reports a timed-out outcome instead of discarding work.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::StreamExt as _;
use hotspot_map_incident_models::{IncidentRecord, QueryUnit, RawRow, raw_columns};
use hotspot_map_source::parsing::raw_str;
use hotspot_map_source::unit::resolve_unit;
use hotspot_map_source::{ArchiveSource, RemoteSource};
use serde::Serialize;
use strum_macros::Display;

use crate::{PipelineError, normalize};

/// A bulk query over the cross product of forces, years, and months.
#[derive(Debug, Clone)]
pub struct Query {
    /// Force names, matched exactly against the configured registry.
    pub forces: Vec<String>,
    /// Years to cover.
    pub years: Vec<i32>,
    /// Months to cover (`1..=12`).
    pub months: Vec<u32>,
    /// Optional restriction to a set of *raw* category labels, applied
    /// before normalization. An empty set means no restriction.
    pub category_filter: Option<BTreeSet<String>>,
}

/// How a driver run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunOutcome {
    /// Every unit was attempted.
    Complete,
    /// The deadline expired; the table holds only the units fetched
    /// before expiry.
    TimedOut,
}

/// Result of one driver run.
#[derive(Debug)]
pub struct RunReport {
    /// Normalized records from every resolved unit.
    pub records: Vec<IncidentRecord>,
    /// Whether the run completed or hit its deadline.
    pub outcome: RunOutcome,
    /// Number of units the query expanded to.
    pub units_total: usize,
    /// Number of units that contributed at least one row.
    pub units_resolved: usize,
}

/// Expands a query into units: years outer, months middle, forces inner.
///
/// The order affects only log ordering, not correctness.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidQuery`] if any month is outside
/// `1..=12`.
pub fn expand_units(query: &Query) -> Result<Vec<QueryUnit>, PipelineError> {
    let mut units = Vec::with_capacity(query.years.len() * query.months.len() * query.forces.len());
    for year in &query.years {
        for month in &query.months {
            for force in &query.forces {
                let unit = QueryUnit::new(force.clone(), *year, *month).map_err(|e| {
                    PipelineError::InvalidQuery {
                        message: e.to_string(),
                    }
                })?;
                units.push(unit);
            }
        }
    }
    Ok(units)
}

/// Runs the fetch half of the pipeline: expand, fetch every unit with
/// remote-then-archive fallback, filter by raw category label, and
/// normalize.
///
/// An empty result table is a data-availability condition, logged at
/// error level — never an `Err`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidQuery`] if the query cannot be
/// expanded into valid units.
pub async fn run<R, A>(
    remote: &R,
    archive: &A,
    query: &Query,
    concurrency: usize,
    deadline: Option<Duration>,
) -> Result<RunReport, PipelineError>
where
    R: RemoteSource,
    A: ArchiveSource,
{
    let units = expand_units(query)?;
    let units_total = units.len();
    log::info!("Running query over {units_total} units (concurrency {concurrency})");

    let deadline = deadline.map(|d| Instant::now() + d);
    let timed_out = AtomicBool::new(false);

    let resolutions: Vec<Option<(QueryUnit, Vec<RawRow>)>> = futures::stream::iter(units)
        .map(|unit| {
            let timed_out = &timed_out;
            async move {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    if !timed_out.swap(true, Ordering::SeqCst) {
                        log::warn!("Deadline expired, not issuing further fetches");
                    }
                    return None;
                }
                let rows = resolve_unit(remote, archive, &unit).await.into_rows();
                Some((unit, rows))
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut rows: Vec<RawRow> = Vec::new();
    let mut units_resolved = 0_usize;
    for (unit, batch) in resolutions.into_iter().flatten() {
        if batch.is_empty() {
            continue;
        }
        log::info!("{unit}: {} raw records", batch.len());
        units_resolved += 1;
        rows.extend(batch);
    }

    if rows.is_empty() {
        log::error!("No data retrieved from remote source or archive");
    }

    let rows = match &query.category_filter {
        Some(filter) if !filter.is_empty() => {
            let before = rows.len();
            let filtered: Vec<RawRow> = rows
                .into_iter()
                .filter(|row| {
                    raw_str(row, raw_columns::CRIME_TYPE).is_some_and(|c| filter.contains(c))
                })
                .collect();
            log::info!(
                "Category filter kept {} of {before} raw records",
                filtered.len()
            );
            filtered
        }
        _ => rows,
    };

    let records = normalize::normalize_rows(&rows);
    let outcome = if timed_out.load(Ordering::SeqCst) {
        RunOutcome::TimedOut
    } else {
        RunOutcome::Complete
    };

    Ok(RunReport {
        records,
        outcome,
        units_total,
        units_resolved,
    })
}
