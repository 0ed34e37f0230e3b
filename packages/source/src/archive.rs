//! Local CSV archive reader.
//!
//! The archive is laid out as `<data_root>/<year>-<month>/` with one file
//! per force named `<year>-<month>-<force-slug>-street.csv`. Directory
//! and month components are unpadded (`2024-5`), matching how the archive
//! is distributed. Rows come back as JSON objects keyed by the trimmed
//! header names, with the unit's force name stamped on.

use std::path::{Path, PathBuf};

use hotspot_map_incident_models::{QueryUnit, RawRow, raw_columns};

use crate::registry::force_slug;
use crate::{ArchiveSource, FetchError};

/// Read-only CSV archive rooted at a data directory.
#[derive(Debug, Clone)]
pub struct CsvArchive {
    data_root: PathBuf,
}

impl CsvArchive {
    /// Creates an archive reader rooted at `data_root`.
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// The path the given unit's CSV file is expected at.
    #[must_use]
    pub fn unit_path(&self, unit: &QueryUnit) -> PathBuf {
        let folder = format!("{}-{}", unit.year(), unit.month());
        let file = format!(
            "{}-{}-{}-street.csv",
            unit.year(),
            unit.month(),
            force_slug(unit.force())
        );
        self.data_root.join(folder).join(file)
    }
}

impl ArchiveSource for CsvArchive {
    fn load_unit(&self, unit: &QueryUnit) -> Result<Vec<RawRow>, FetchError> {
        let path = self.unit_path(unit);
        if !path.exists() {
            return Err(FetchError::ArchiveMissing { path });
        }
        let rows = parse_csv(&path, unit.force())?;
        log::info!("Loaded {} records from {}", rows.len(), path.display());
        Ok(rows)
    }
}

/// Parses one archive CSV into raw rows, stamping `force` on each.
fn parse_csv(path: &Path, force: &str) -> Result<Vec<RawRow>, FetchError> {
    let unreadable = |message: String| FetchError::ArchiveUnreadable {
        path: path.to_path_buf(),
        message,
    };

    let file = std::fs::File::open(path).map_err(|e| unreadable(e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| unreadable(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.is_empty() {
        return Err(unreadable("CSV file contains no header row".to_owned()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| unreadable(e.to_string()))?;

        let mut row = RawRow::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("").trim().to_owned();
            row.insert(header.clone(), value.into());
        }
        row.insert(raw_columns::FORCE.to_owned(), force.into());
        rows.push(row);
    }

    Ok(rows)
}
