#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Street-crime data sources and per-unit fallback resolution.
//!
//! A [`QueryUnit`] is resolved by trying the remote API once and, only if
//! that fails or returns nothing, the local CSV archive once. Failures
//! below the resolution boundary are logged and absorbed; a unit always
//! yields a (possibly empty) batch of raw rows, never an error.
//!
//! [`QueryUnit`]: hotspot_map_incident_models::QueryUnit

pub mod archive;
pub mod parsing;
pub mod registry;
pub mod remote;
pub mod unit;

use std::path::PathBuf;

use async_trait::async_trait;
use hotspot_map_incident_models::{QueryUnit, RawRow};

/// Errors that can occur while fetching raw rows for a single unit.
///
/// All variants are recovered below the pipeline driver: remote failures
/// fall back to the archive, archive failures cause the unit to be
/// skipped. Nothing here propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP transport failed, the server answered non-2xx, or the payload
    /// was not a JSON array of records.
    #[error("remote source unavailable: {message}")]
    RemoteUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// The archive directory or per-force file does not exist.
    #[error("archive entry missing: {}", path.display())]
    ArchiveMissing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The archive file exists but could not be read or parsed.
    #[error("archive entry unreadable {}: {message}", path.display())]
    ArchiveUnreadable {
        /// Path that was being read.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::RemoteUnavailable {
            message: e.to_string(),
        }
    }
}

/// A remote per-unit record source, attempted first for every unit.
///
/// Implementations make exactly one attempt per call; retry policy is
/// deliberately absent (each source is tried once per unit).
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches all raw rows for one unit from the remote API.
    ///
    /// An empty `Vec` is a successful response that happens to carry no
    /// records; the caller treats it the same as a failure for fallback
    /// purposes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RemoteUnavailable`] on transport, status, or
    /// payload errors.
    async fn fetch_unit(&self, unit: &QueryUnit) -> Result<Vec<RawRow>, FetchError>;
}

/// A local per-unit record source, consulted only after the remote source
/// has been exhausted.
pub trait ArchiveSource: Send + Sync {
    /// Loads all raw rows for one unit from the local archive.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ArchiveMissing`] when the directory or file
    /// is absent and [`FetchError::ArchiveUnreadable`] when it exists but
    /// cannot be parsed.
    fn load_unit(&self, unit: &QueryUnit) -> Result<Vec<RawRow>, FetchError>;
}
