//! Places provider abstraction and implementations.
//!
//! The aggregator only ever talks to a [`PlaceProvider`]; concrete
//! providers wrap Google Places, Nominatim, or a static fixture.

pub mod fixture;
pub mod google;
pub mod nominatim;

use std::time::Duration;

use safe_zone_places_models::{Coordinate, ProviderPlace};

use crate::PlacesError;
use crate::service_registry::{self, PlacesService, ProviderConfig};

/// Trait for places search providers.
#[async_trait::async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Whether the provider has everything it needs (credentials, data)
    /// to answer queries.
    fn is_configured(&self) -> bool {
        true
    }

    /// Time allowed for one attempt of `queries` concurrent searches.
    ///
    /// Providers that queue their own requests stretch `default` by the
    /// time those requests spend waiting their turn.
    fn attempt_timeout(&self, default: Duration, _queries: usize) -> Duration {
        default
    }

    /// Searches for places matching `keyword` within `radius_meters` of
    /// `center`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the request fails or the response cannot
    /// be parsed.
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<ProviderPlace>, PlacesError>;
}

/// Builds the provider described by a registry entry.
///
/// # Errors
///
/// Returns [`PlacesError::Config`] if the provider's environment
/// configuration is missing, or an IO/JSON error if a fixture file cannot
/// be loaded.
pub fn create_provider(service: &PlacesService) -> Result<Box<dyn PlaceProvider>, PlacesError> {
    match &service.provider {
        ProviderConfig::Fixture { path_env } => {
            let path = std::env::var(path_env).map_err(|_| PlacesError::Config {
                message: format!("{path_env} environment variable not set"),
            })?;
            Ok(Box::new(fixture::StaticProvider::from_json_file(path)?))
        }
        ProviderConfig::GooglePlaces {
            base_url,
            api_key_env,
        } => {
            let api_key = std::env::var(api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty());
            Ok(Box::new(google::GooglePlacesProvider::new(
                base_url.clone(),
                api_key,
            )))
        }
        ProviderConfig::Nominatim {
            base_url,
            user_agent,
            rate_limit_ms,
            max_results,
        } => Ok(Box::new(nominatim::NominatimProvider::new(
            base_url.clone(),
            user_agent,
            Duration::from_millis(*rate_limit_ms),
            *max_results,
        )?)),
    }
}

/// Creates a places provider based on environment variables.
///
/// If `SAFE_ZONE_PROVIDER` is set, uses the service with that id.
/// Otherwise tries enabled services in priority order and returns the
/// first one that can be built and reports itself configured.
///
/// # Errors
///
/// Returns [`PlacesError::Config`] if the requested service does not exist
/// or cannot be built, and [`PlacesError::ProviderUnavailable`] if no
/// service is configured.
pub fn create_provider_from_env() -> Result<Box<dyn PlaceProvider>, PlacesError> {
    if let Ok(requested) = std::env::var("SAFE_ZONE_PROVIDER") {
        let service =
            service_registry::find_service(&requested).ok_or_else(|| PlacesError::Config {
                message: format!(
                    "Unknown places provider: {requested}. Use 'fixture', 'google_places', or 'nominatim'."
                ),
            })?;
        log::info!("Using places provider: {} (SAFE_ZONE_PROVIDER)", service.name);
        return create_provider(&service);
    }

    for service in service_registry::enabled_services() {
        match create_provider(&service) {
            Ok(provider) if provider.is_configured() => {
                log::info!("Auto-detected places provider: {}", service.name);
                return Ok(provider);
            }
            Ok(_) => log::debug!("Skipping {}: not configured", service.id),
            Err(e) => log::debug!("Skipping {}: {e}", service.id),
        }
    }

    Err(PlacesError::ProviderUnavailable {
        message: "no places provider configured; set GOOGLE_MAPS_API_KEY or SAFE_ZONE_FIXTURE"
            .to_string(),
    })
}
