//! HTTP handler functions for the safe zone API.

use actix_web::{HttpResponse, web};
use safe_zone_places::aggregator::FALLBACK_RADIUS_METERS;
use safe_zone_places::{PlacesError, search_nearby};
use safe_zone_places_models::{Coordinate, PlaceCategory};
use safe_zone_server_models::{
    ApiCategory, ApiError, ApiHealth, ApiNearbyResponse, ApiSosContext, LocationQueryParams,
};
use safe_zone_zone::sos::SosContext;

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.provider.name().to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns every place category with its search keywords.
pub async fn categories() -> HttpResponse {
    let categories: Vec<ApiCategory> = PlaceCategory::ALL
        .iter()
        .copied()
        .map(ApiCategory::from)
        .collect();

    HttpResponse::Ok().json(categories)
}

/// `GET /api/nearby`
///
/// Searches for safe places around `lat`/`lng` and classifies the zone.
/// Requires a location.
pub async fn nearby(
    state: web::Data<AppState>,
    params: web::Query<LocationQueryParams>,
) -> HttpResponse {
    let center = match parse_location(&params) {
        Ok(Some(center)) => center,
        Ok(None) => return bad_request("lat and lng are required"),
        Err(response) => return response,
    };

    let mut options = state.search_options.clone();
    if let Some(radius) = params.radius {
        options.initial_radius_meters = radius;
    }

    match search_nearby(state.provider.as_ref(), center, &options).await {
        Ok(search) => {
            let zone = safe_zone_zone::classify(Some(center), &search.places);
            HttpResponse::Ok().json(ApiNearbyResponse::new(search, zone))
        }
        Err(e) => search_failed(&e),
    }
}

/// `GET /api/zone`
///
/// Returns only the zone verdict. A missing location yields the
/// `UNKNOWN` zone rather than an error.
pub async fn zone(
    state: web::Data<AppState>,
    params: web::Query<LocationQueryParams>,
) -> HttpResponse {
    let center = match parse_location(&params) {
        Ok(center) => center,
        Err(response) => return response,
    };

    let Some(center) = center else {
        return HttpResponse::Ok().json(safe_zone_zone::classify(None, &[]));
    };

    match search_nearby(state.provider.as_ref(), center, &state.search_options).await {
        Ok(search) => HttpResponse::Ok().json(safe_zone_zone::classify(Some(center), &search.places)),
        Err(e) => search_failed(&e),
    }
}

/// `GET /api/sos-context`
///
/// Renders the text attached to an SOS alert. Never fails on provider
/// errors: the alert still goes out with an unknown zone.
pub async fn sos_context(
    state: web::Data<AppState>,
    params: web::Query<LocationQueryParams>,
) -> HttpResponse {
    let location = match parse_location(&params) {
        Ok(location) => location,
        Err(response) => return response,
    };

    let places = match location {
        Some(center) => {
            match search_nearby(state.provider.as_ref(), center, &state.search_options).await {
                Ok(search) => search.places,
                Err(e) => {
                    log::warn!("SOS context without nearby places: {e}");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    let zone = safe_zone_zone::classify(location, &places);
    let text = SosContext::new(location, &zone).render();

    HttpResponse::Ok().json(ApiSosContext { text, zone })
}

/// Reads an optional location from query parameters.
///
/// Both `lat` and `lng` absent means no location; one without the other
/// or out-of-range values are rejected, as is a `radius` outside
/// `1..=50000` meters.
fn parse_location(params: &LocationQueryParams) -> Result<Option<Coordinate>, HttpResponse> {
    if params
        .radius
        .is_some_and(|r| !(1..=FALLBACK_RADIUS_METERS).contains(&r))
    {
        return Err(bad_request(&format!(
            "radius must be between 1 and {FALLBACK_RADIUS_METERS} meters"
        )));
    }

    match (params.lat, params.lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(Some)
            .map_err(|e| bad_request(&e.to_string())),
        _ => Err(bad_request("lat and lng must be given together")),
    }
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError {
        error: message.to_string(),
        retryable: false,
    })
}

fn search_failed(e: &PlacesError) -> HttpResponse {
    if e.is_provider_unavailable() {
        log::warn!("Place search unavailable: {e}");
        return HttpResponse::ServiceUnavailable().json(ApiError {
            error: e.to_string(),
            retryable: true,
        });
    }

    log::error!("Place search failed: {e}");
    HttpResponse::InternalServerError().json(ApiError {
        error: "Failed to search nearby places".to_string(),
        retryable: true,
    })
}
