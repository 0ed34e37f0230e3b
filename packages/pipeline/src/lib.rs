#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline orchestration for the hotspot map.
//!
//! Ties the stages together — fetch, normalize, clean, project, bin —
//! behind the two operations callers actually invoke: a bulk map query
//! producing a projected point set plus grid aggregation, and a proximity
//! query producing breakdown tables around a geodetic center.

pub mod clean;
pub mod config;
pub mod driver;
pub mod normalize;

use std::path::PathBuf;

use geo::Coord;
use hotspot_map_analytics::Breakdown;
use hotspot_map_incident_models::IncidentRecord;
use hotspot_map_source::archive::CsvArchive;
use hotspot_map_source::remote::StreetCrimeApi;
use hotspot_map_spatial::GridCell;

pub use config::PipelineConfig;
pub use driver::{Query, RunOutcome, RunReport};

/// Default grid cell side length in metres.
pub const DEFAULT_CELL_SIZE: f64 = 1_000.0;
/// Default proximity radius in metres.
pub const DEFAULT_RADIUS: f64 = 1_000.0;

/// Errors surfaced to callers of the pipeline.
///
/// Data emptiness is never an error — an exhausted query yields an empty
/// table and a logged data-availability message.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration file could not be read or parsed.
    #[error("configuration file {}: {message}", path.display())]
    Config {
        /// Path that was being loaded.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// No API key was supplied by the environment or the config file.
    #[error("no API key configured: set {} or api_key in the config file", config::ENV_API_KEY)]
    MissingApiKey,

    /// The query could not be expanded into valid units.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of what went wrong.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    HttpClient {
        /// Description of what went wrong.
        message: String,
    },
}

/// Result of a bulk map query: the cleaned and projected point set plus
/// its grid aggregation, for map rendering.
#[derive(Debug)]
pub struct MapQueryResult {
    /// Cleaned, projected records.
    pub records: Vec<IncidentRecord>,
    /// Grid cells covering the projected points.
    pub cells: Vec<GridCell>,
    /// Whether the underlying fetch completed or hit its deadline.
    pub outcome: RunOutcome,
}

/// Result of a proximity query: the selected incidents and their
/// breakdown tables, for chart rendering.
#[derive(Debug)]
pub struct ProximityReport {
    /// Incidents within the requested radius.
    pub incidents: Vec<IncidentRecord>,
    /// Category and month count tables over those incidents.
    pub breakdown: Breakdown,
    /// Whether the underlying fetch completed or hit its deadline.
    pub outcome: RunOutcome,
}

/// Runs the full bulk pipeline: fetch, normalize, clean, project, and
/// aggregate into a grid of `cell_size`-metre cells.
///
/// # Errors
///
/// Returns [`PipelineError`] for configuration or query problems; data
/// emptiness yields an empty result instead.
pub async fn run_map_query(
    config: &PipelineConfig,
    query: &Query,
    cell_size: f64,
) -> Result<MapQueryResult, PipelineError> {
    let (records, outcome) = cleaned_projected(config, query).await?;

    let points: Vec<Coord<f64>> = records
        .iter()
        .filter_map(IncidentRecord::projected)
        .map(|(x, y)| Coord { x, y })
        .collect();
    let cells = hotspot_map_spatial::aggregate(&points, cell_size);

    Ok(MapQueryResult {
        records,
        cells,
        outcome,
    })
}

/// Runs the pipeline and selects incidents within `radius` metres of a
/// geodetic center, which is converted to planar coordinates internally.
///
/// # Errors
///
/// Returns [`PipelineError`] for configuration or query problems; an
/// empty selection is valid output.
pub async fn run_proximity_query(
    config: &PipelineConfig,
    query: &Query,
    latitude: f64,
    longitude: f64,
    radius: f64,
) -> Result<ProximityReport, PipelineError> {
    let (records, outcome) = cleaned_projected(config, query).await?;

    let center = hotspot_map_spatial::wgs84_to_national_grid(latitude, longitude);

    let mut points: Vec<Coord<f64>> = Vec::with_capacity(records.len());
    let mut record_indices: Vec<usize> = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if let Some((x, y)) = record.projected() {
            points.push(Coord { x, y });
            record_indices.push(i);
        }
    }

    let hits = hotspot_map_spatial::within_radius(&points, center, radius);
    let incidents: Vec<IncidentRecord> = hits
        .iter()
        .map(|&point_idx| records[record_indices[point_idx]].clone())
        .collect();

    log::info!(
        "Proximity query at ({latitude:.5}, {longitude:.5}) radius {radius} m matched {} incidents",
        incidents.len()
    );

    let breakdown = hotspot_map_analytics::breakdown(&incidents);

    Ok(ProximityReport {
        incidents,
        breakdown,
        outcome,
    })
}

/// Shared front half of both caller-facing operations: fetch, normalize,
/// clean, project.
async fn cleaned_projected(
    config: &PipelineConfig,
    query: &Query,
) -> Result<(Vec<IncidentRecord>, RunOutcome), PipelineError> {
    let remote = StreetCrimeApi::new(&config.api.base_url, &config.api.key, config.api.timeout)
        .map_err(|e| PipelineError::HttpClient {
            message: e.to_string(),
        })?;
    let archive = CsvArchive::new(&config.data_dir);

    let report = driver::run(&remote, &archive, query, config.concurrency, config.deadline).await?;

    let mut records = clean::clean(report.records);
    hotspot_map_spatial::project_records(&mut records);

    Ok((records, report.outcome))
}
