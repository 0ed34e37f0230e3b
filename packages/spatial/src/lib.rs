#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Planar spatial analysis over projected incident points.
//!
//! Grid binning and radius queries both assume Euclidean distance, which
//! is invalid on geodetic degrees, so everything here operates on national
//! grid eastings/northings produced by [`projection`].

pub mod grid;
pub mod projection;
pub mod proximity;

pub use grid::{GridCell, HotspotLevel, aggregate};
pub use projection::{project_records, wgs84_to_national_grid};
pub use proximity::within_radius;
