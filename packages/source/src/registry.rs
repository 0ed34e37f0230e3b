//! Force registry — the known police forces, loaded from embedded TOML.
//!
//! The registry is baked into the binary via [`include_str!`] but is only
//! a *default*: callers receive it through the pipeline configuration
//! object, never by reading module state directly.

use serde::Deserialize;

/// Forces TOML embedded at compile time.
const FORCES_TOML: &str = include_str!("../forces.toml");

/// Total number of configured forces (used in tests).
#[cfg(test)]
const EXPECTED_FORCE_COUNT: usize = 44;

#[derive(Debug, Deserialize)]
struct ForcesFile {
    forces: Vec<String>,
}

/// Returns the default force list, parsed from the embedded TOML.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn default_forces() -> Vec<String> {
    let parsed: ForcesFile =
        toml::from_str(FORCES_TOML).unwrap_or_else(|e| panic!("Failed to parse forces.toml: {e}"));
    parsed.forces
}

/// Derives the slug form of a force name: lowercased, spaces to hyphens,
/// `&` to `and`.
///
/// The same slug is used for the remote API `force` parameter and for
/// archive file names.
#[must_use]
pub fn force_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-").replace('&', "and")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_forces() {
        assert_eq!(default_forces().len(), EXPECTED_FORCE_COUNT);
    }

    #[test]
    fn force_names_are_unique() {
        let mut names = default_forces();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EXPECTED_FORCE_COUNT);
    }

    #[test]
    fn force_names_are_non_empty() {
        for name in &default_forces() {
            assert!(!name.is_empty(), "force name is empty");
        }
    }

    #[test]
    fn slugs_lowercase_and_hyphenate() {
        assert_eq!(
            force_slug("Avon and Somerset Constabulary"),
            "avon-and-somerset-constabulary"
        );
        assert_eq!(
            force_slug("Metropolitan Police Service"),
            "metropolitan-police-service"
        );
    }

    #[test]
    fn slug_substitutes_ampersand() {
        assert_eq!(
            force_slug("Devon & Cornwall Police"),
            "devon-and-cornwall-police"
        );
    }

    #[test]
    fn slug_preserves_existing_hyphens() {
        assert_eq!(force_slug("Dyfed-Powys Police"), "dyfed-powys-police");
    }
}
