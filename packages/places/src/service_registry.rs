//! Compile-time registry of places provider configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`enabled_services`].

use serde::Deserialize;

/// A places service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesService {
    /// Unique identifier (e.g., `"google_places"`, `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be auto-selected.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order — lower values are tried first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Static JSON fixture file.
    Fixture {
        /// Environment variable holding the fixture path.
        path_env: String,
    },
    /// Google Places Nearby Search.
    GooglePlaces {
        /// Endpoint URL.
        base_url: String,
        /// Environment variable holding the API key.
        api_key_env: String,
    },
    /// Nominatim / `OpenStreetMap` free-form search.
    Nominatim {
        /// Endpoint URL (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// `User-Agent` header required by the Nominatim usage policy.
        user_agent: String,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
        /// Maximum results per keyword query.
        #[serde(default = "default_max_results")]
        max_results: u32,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_max_results() -> u32 {
    20
}

impl PlacesService {
    /// Returns the provider's base URL regardless of variant.
    ///
    /// Returns an empty string for providers without one (e.g., `Fixture`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::GooglePlaces { base_url, .. }
            | ProviderConfig::Nominatim { base_url, .. } => base_url,
            ProviderConfig::Fixture { .. } => "",
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("fixture", include_str!("../services/fixture.toml")),
    ("google_places", include_str!("../services/google_places.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 3;

/// Returns all places service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this is caught by the test suite).
#[must_use]
pub fn all_services() -> Vec<PlacesService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse places service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<PlacesService> {
    let mut services: Vec<PlacesService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Looks up a service by id.
#[must_use]
pub fn find_service(id: &str) -> Option<PlacesService> {
    all_services().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        let services = all_services();
        assert_eq!(services.len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let services = all_services();
        let mut seen = BTreeSet::new();
        for svc in &services {
            assert!(seen.insert(&svc.id), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn network_services_have_base_urls() {
        for svc in &all_services() {
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            if !matches!(svc.provider, ProviderConfig::Fixture { .. }) {
                assert!(
                    svc.base_url().starts_with("https://"),
                    "Service {} has no https base_url",
                    svc.id
                );
            }
        }
    }

    #[test]
    fn enabled_services_sorted_by_priority() {
        let services = enabled_services();
        for window in services.windows(2) {
            assert!(
                window[0].priority <= window[1].priority,
                "Services not sorted by priority: {} ({}) > {} ({})",
                window[0].id,
                window[0].priority,
                window[1].id,
                window[1].priority
            );
        }
    }

    #[test]
    fn finds_service_by_id() {
        let svc = find_service("nominatim").unwrap();
        assert!(matches!(
            svc.provider,
            ProviderConfig::Nominatim {
                rate_limit_ms: 1000,
                ..
            }
        ));
        assert!(find_service("missing").is_none());
    }
}
