#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the hotspot map pipeline.
//!
//! Stands in for the request-routing layer: each subcommand builds a
//! query, runs the pipeline, and prints the tables a renderer would
//! otherwise consume.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotspot_map_pipeline::{
    DEFAULT_CELL_SIZE, DEFAULT_RADIUS, PipelineConfig, Query, RunOutcome, run_map_query,
    run_proximity_query,
};

#[derive(Parser)]
#[command(name = "hotspot_map", about = "UK street-crime hotspot pipeline")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, clean, and aggregate incidents into hotspot grid cells
    Map {
        /// Force to include (repeatable; defaults to every configured force)
        #[arg(long = "force")]
        forces: Vec<String>,
        /// Year to cover (repeatable)
        #[arg(long = "year", required = true)]
        years: Vec<i32>,
        /// Month to cover, 1-12 (repeatable; defaults to all twelve)
        #[arg(long = "month")]
        months: Vec<u32>,
        /// Restrict to a raw category label (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Grid cell side length in metres
        #[arg(long, default_value_t = DEFAULT_CELL_SIZE)]
        cell_size: f64,
    },
    /// Select incidents around a point and print breakdown tables
    Nearby {
        /// Geodetic latitude of the center
        #[arg(long)]
        lat: f64,
        /// Geodetic longitude of the center
        #[arg(long)]
        lng: f64,
        /// Radius in metres
        #[arg(long, default_value_t = DEFAULT_RADIUS)]
        radius: f64,
        /// Force to include (repeatable; defaults to every configured force)
        #[arg(long = "force")]
        forces: Vec<String>,
        /// Year to cover (repeatable)
        #[arg(long = "year", required = true)]
        years: Vec<i32>,
        /// Month to cover, 1-12 (repeatable; defaults to all twelve)
        #[arg(long = "month")]
        months: Vec<u32>,
    },
    /// List the configured forces
    Forces,
}

/// Assembles a query from CLI selectors, falling back to the configured
/// force list and all twelve months.
fn build_query(
    config: &PipelineConfig,
    forces: Vec<String>,
    years: Vec<i32>,
    months: Vec<u32>,
    categories: Vec<String>,
) -> Query {
    Query {
        forces: if forces.is_empty() {
            config.forces.clone()
        } else {
            forces
        },
        years,
        months: if months.is_empty() {
            (1..=12).collect()
        } else {
            months
        },
        category_filter: if categories.is_empty() {
            None
        } else {
            Some(categories.into_iter().collect())
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Map {
            forces,
            years,
            months,
            categories,
            cell_size,
        } => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            let query = build_query(&config, forces, years, months, categories);
            let result = run_map_query(&config, &query, cell_size).await?;

            if result.outcome == RunOutcome::TimedOut {
                println!("warning: deadline expired, results are partial");
            }
            println!(
                "{} incidents across {} grid cells",
                result.records.len(),
                result.cells.len()
            );

            let mut hotspots: Vec<_> = result
                .cells
                .iter()
                .filter(|c| c.crime_count > 0)
                .collect();
            hotspots.sort_by(|a, b| b.crime_count.cmp(&a.crime_count));

            println!("top hotspots:");
            for cell in hotspots.iter().take(10) {
                let level = cell
                    .hotspot_level()
                    .map_or_else(String::new, |l| l.to_string());
                println!(
                    "  E {:>8.0}  N {:>8.0}  {:>6} incidents  {level}",
                    cell.centroid.x, cell.centroid.y, cell.crime_count
                );
            }
        }
        Commands::Nearby {
            lat,
            lng,
            radius,
            forces,
            years,
            months,
        } => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            let query = build_query(&config, forces, years, months, Vec::new());
            let report = run_proximity_query(&config, &query, lat, lng, radius).await?;

            if report.outcome == RunOutcome::TimedOut {
                println!("warning: deadline expired, results are partial");
            }
            println!(
                "{} incidents within {radius} m of ({lat}, {lng})",
                report.incidents.len()
            );

            println!("by category:");
            for (category, count) in &report.breakdown.by_category {
                println!("  {count:>6}  {category}");
            }
            println!("by month:");
            for (month, count) in &report.breakdown.by_month {
                println!("  {count:>6}  {month}");
            }
        }
        Commands::Forces => {
            for force in hotspot_map_source::registry::default_forces() {
                println!("{force}");
            }
        }
    }

    Ok(())
}
