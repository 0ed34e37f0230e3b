//! Pipeline configuration.
//!
//! Everything the driver needs arrives through one explicit
//! [`PipelineConfig`] value: the force list, the remote endpoint and its
//! key, the archive location, and concurrency limits. The embedded force
//! registry is only the default for the `forces` field; nothing reads it
//! as module state. The API key has no default and must come from the
//! environment or the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::PipelineError;

/// Environment variable supplying the remote API key.
pub const ENV_API_KEY: &str = "HOTSPOT_MAP_API_KEY";
/// Environment variable overriding the archive data directory.
pub const ENV_DATA_DIR: &str = "HOTSPOT_MAP_DATA_DIR";
/// Environment variable overriding the remote API endpoint.
pub const ENV_API_URL: &str = "HOTSPOT_MAP_API_URL";

/// Default remote endpoint for street-crime records.
const DEFAULT_API_URL: &str = "https://data.police.uk/api/crimes-street/all-crime";
/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default bound on concurrent unit fetches, kept small to respect the
/// remote source's implicit rate limits.
const DEFAULT_CONCURRENCY: usize = 4;
/// Default archive location.
const DEFAULT_DATA_DIR: &str = "data";

/// Remote API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Endpoint queried with `date`/`force`/`key` parameters.
    pub base_url: String,
    /// Access key. Externally supplied; never compiled in.
    pub key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Fully resolved pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Known forces; the unit expansion and archive lookups use these
    /// exact names.
    pub forces: Vec<String>,
    /// Remote API settings.
    pub api: ApiConfig,
    /// Root directory of the local CSV archive.
    pub data_dir: PathBuf,
    /// Maximum number of units fetched concurrently.
    pub concurrency: usize,
    /// Optional overall deadline for one driver run.
    pub deadline: Option<Duration>,
}

/// On-disk configuration shape; every field optional so the file can
/// override only what it needs to.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    forces: Option<Vec<String>>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    data_dir: Option<PathBuf>,
    #[serde(default)]
    concurrency: Option<usize>,
    #[serde(default)]
    deadline_secs: Option<u64>,
}

impl PipelineConfig {
    /// Loads configuration from an optional TOML file, applying
    /// environment overrides on top and registry defaults underneath.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the file cannot be read or
    /// parsed, and [`PipelineError::MissingApiKey`] if no key is supplied
    /// by either the file or the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let file = match path {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                toml::from_str::<ConfigFile>(&contents).map_err(|e| PipelineError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
            None => ConfigFile::default(),
        };

        Self::from_parts(file)
    }

    fn from_parts(file: ConfigFile) -> Result<Self, PipelineError> {
        let key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.api_key)
            .ok_or(PipelineError::MissingApiKey)?;

        let base_url = std::env::var(ENV_API_URL)
            .ok()
            .filter(|u| !u.is_empty())
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        let data_dir = std::env::var(ENV_DATA_DIR)
            .ok()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            forces: file
                .forces
                .unwrap_or_else(hotspot_map_source::registry::default_forces),
            api: ApiConfig {
                base_url,
                key,
                timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            },
            data_dir,
            concurrency: file.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
            deadline: file.deadline_secs.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_required() {
        // The env var is absent in the test environment unless a caller
        // exports it; rely on the file-only path for determinism.
        let file = ConfigFile::default();
        if std::env::var(ENV_API_KEY).is_ok() {
            return;
        }
        assert!(matches!(
            PipelineConfig::from_parts(file),
            Err(PipelineError::MissingApiKey)
        ));
    }

    #[test]
    fn file_key_fills_defaults() {
        let file: ConfigFile = toml::from_str(r#"api_key = "secret""#).unwrap();
        let config = PipelineConfig::from_parts(file).unwrap();

        assert_eq!(config.api.key, "secret");
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.forces.len(), 44);
        assert!(config.deadline.is_none());
    }

    #[test]
    fn file_overrides_apply() {
        let file: ConfigFile = toml::from_str(
            r#"
            api_key = "secret"
            api_url = "http://localhost:9000/crimes"
            timeout_secs = 3
            data_dir = "/srv/archive"
            concurrency = 8
            deadline_secs = 120
            forces = ["Test Force"]
            "#,
        )
        .unwrap();
        let config = PipelineConfig::from_parts(file).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9000/crimes");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.data_dir, PathBuf::from("/srv/archive"));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.deadline, Some(Duration::from_secs(120)));
        assert_eq!(config.forces, vec!["Test Force".to_string()]);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let file: ConfigFile =
            toml::from_str("api_key = \"secret\"\nconcurrency = 0").unwrap();
        let config = PipelineConfig::from_parts(file).unwrap();
        assert_eq!(config.concurrency, 1);
    }
}
