#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nearby safety place search.
//!
//! Finds police stations, hospitals and government offices around a point
//! by fanning one query per category keyword out to a [`PlaceProvider`],
//! then merging, deduplicating and ranking the results by great-circle
//! distance. See [`aggregator::search_nearby`].
//!
//! Providers are configured via TOML files in `services/`:
//!
//! 1. **Static fixture** (priority 1) — a JSON file named by
//!    `SAFE_ZONE_FIXTURE`, for offline use and demos.
//! 2. **Google Places** (priority 2) — requires `GOOGLE_MAPS_API_KEY`.
//! 3. **Nominatim / OpenStreetMap** (priority 3) — free, 1 req/sec rate
//!    limit.
//!
//! [`providers::create_provider_from_env`] picks the first configured one
//! unless `SAFE_ZONE_PROVIDER` names a service explicitly.

pub mod aggregator;
pub mod providers;
pub mod service_registry;

pub use aggregator::{SearchOptions, search_nearby};
pub use providers::PlaceProvider;

use thiserror::Error;

/// Errors from place search operations.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a fixture file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The provider answered with an error status.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// The places provider is unreachable or not configured. Callers
    /// should offer a retry.
    #[error("Places provider unavailable: {message}")]
    ProviderUnavailable {
        /// Description.
        message: String,
    },
}

impl PlacesError {
    /// Whether this is the aggregation-level
    /// [`PlacesError::ProviderUnavailable`] condition.
    #[must_use]
    pub const fn is_provider_unavailable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }
}
