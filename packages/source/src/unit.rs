//! Per-unit fetch resolution.
//!
//! Each unit walks an explicit state machine:
//! `Unresolved → RemoteAttempted → (Resolved | LocalAttempted → (Resolved
//! | Empty))`. The archive is consulted only after the remote source has
//! failed or returned nothing, each source is attempted at most once, and
//! every failure is absorbed into logs — a unit always resolves to a
//! (possibly empty) batch of rows.

use hotspot_map_incident_models::{QueryUnit, RawRow};

use crate::{ArchiveSource, FetchError, RemoteSource};

/// Intermediate states a unit passes through while being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    /// No source attempted yet.
    Unresolved,
    /// The single remote attempt is made on entry to this state.
    RemoteAttempted,
    /// The single archive attempt is made on entry to this state.
    LocalAttempted,
}

/// Which source ultimately produced a unit's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// The remote API answered with records.
    Remote,
    /// The local archive supplied records after remote fallback.
    Archive,
}

/// Terminal outcome of resolving one unit.
#[derive(Debug)]
pub enum Resolution {
    /// One of the sources produced records.
    Resolved {
        /// The source that produced the rows.
        origin: FetchOrigin,
        /// The raw rows for this unit.
        rows: Vec<RawRow>,
    },
    /// Both sources are exhausted and the unit contributes nothing.
    Empty,
}

impl Resolution {
    /// The rows this resolution carries (empty for [`Resolution::Empty`]).
    #[must_use]
    pub fn into_rows(self) -> Vec<RawRow> {
        match self {
            Self::Resolved { rows, .. } => rows,
            Self::Empty => Vec::new(),
        }
    }

    /// The origin that produced rows, if any.
    #[must_use]
    pub const fn origin(&self) -> Option<FetchOrigin> {
        match self {
            Self::Resolved { origin, .. } => Some(*origin),
            Self::Empty => None,
        }
    }
}

/// Resolves one unit against a remote source with archive fallback.
///
/// The fallback invariant is structural: the loop enters each attempt
/// state at most once, and the archive state is only reachable from a
/// failed or empty remote attempt.
pub async fn resolve_unit<R, A>(remote: &R, archive: &A, unit: &QueryUnit) -> Resolution
where
    R: RemoteSource + ?Sized,
    A: ArchiveSource + ?Sized,
{
    let mut state = FetchState::Unresolved;

    loop {
        match state {
            FetchState::Unresolved => state = FetchState::RemoteAttempted,
            FetchState::RemoteAttempted => match remote.fetch_unit(unit).await {
                Ok(rows) if !rows.is_empty() => {
                    return Resolution::Resolved {
                        origin: FetchOrigin::Remote,
                        rows,
                    };
                }
                Ok(_) => {
                    log::warn!("No remote data for {unit}, falling back to archive");
                    state = FetchState::LocalAttempted;
                }
                Err(e) => {
                    log::warn!("Remote fetch failed for {unit}: {e}, falling back to archive");
                    state = FetchState::LocalAttempted;
                }
            },
            FetchState::LocalAttempted => match archive.load_unit(unit) {
                Ok(rows) if !rows.is_empty() => {
                    return Resolution::Resolved {
                        origin: FetchOrigin::Archive,
                        rows,
                    };
                }
                Ok(_) => {
                    log::warn!("Archive file for {unit} contains no records");
                    return Resolution::Empty;
                }
                Err(e @ FetchError::ArchiveMissing { .. }) => {
                    log::warn!("Skipping {unit}: {e}");
                    return Resolution::Empty;
                }
                Err(e) => {
                    log::error!("Skipping {unit}: {e}");
                    return Resolution::Empty;
                }
            },
        }
    }
}
