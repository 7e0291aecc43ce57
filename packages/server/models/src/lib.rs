#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the safe zone server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the core place types to allow independent evolution of the API
//! contract.

use chrono::{DateTime, Utc};
use safe_zone_places_models::{NearbySearch, PlaceCategory, SafePlace, ZoneStatus};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Id of the places provider in use.
    pub provider: String,
}

/// A place category with its search keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    /// Category.
    pub category: PlaceCategory,
    /// Display label.
    pub label: String,
    /// Marker icon name.
    pub icon: String,
    /// Provider search keywords.
    pub keywords: Vec<String>,
}

impl From<PlaceCategory> for ApiCategory {
    fn from(category: PlaceCategory) -> Self {
        Self {
            category,
            label: category.label().to_string(),
            icon: category.icon().to_string(),
            keywords: category
                .keywords()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Query parameters for location-based endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQueryParams {
    /// Latitude of the user.
    pub lat: Option<f64>,
    /// Longitude of the user.
    pub lng: Option<f64>,
    /// Initial search radius in meters.
    pub radius: Option<u32>,
}

/// Response of the nearby endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNearbyResponse {
    /// Places sorted by ascending distance.
    pub places: Vec<SafePlace>,
    /// Radius that produced `places`, in meters.
    pub radius_used_meters: u32,
    /// Radius that produced `places`, in kilometers.
    pub radius_used_km: f64,
    /// Zone verdict for the query location.
    pub zone: ZoneStatus,
    /// When the search ran.
    pub generated_at: DateTime<Utc>,
}

impl ApiNearbyResponse {
    /// Builds a response from a search and its classification.
    #[must_use]
    pub fn new(search: NearbySearch, zone: ZoneStatus) -> Self {
        Self {
            radius_used_km: search.radius_used_km(),
            radius_used_meters: search.radius_used_meters,
            places: search.places,
            zone,
            generated_at: Utc::now(),
        }
    }
}

/// Response of the SOS context endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSosContext {
    /// Rendered plain-text context block.
    pub text: String,
    /// Zone verdict included in the text.
    pub zone: ZoneStatus,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Description.
    pub error: String,
    /// Whether the client should offer a retry.
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use safe_zone_places_models::{Coordinate, Zone};

    use super::*;

    #[test]
    fn nearby_response_serializes_camel_case() {
        let search = NearbySearch {
            places: Vec::new(),
            radius_used_meters: 50_000,
        };
        let zone = ZoneStatus {
            zone: Zone::Unknown,
            nearest_distance_km: 0.0,
            nearest_place: None,
            message: "Safety zone unknown".to_string(),
        };
        let json = serde_json::to_value(ApiNearbyResponse::new(search, zone)).unwrap();
        assert_eq!(json["radiusUsedMeters"], 50_000);
        assert_eq!(json["radiusUsedKm"], 50.0);
        assert_eq!(json["zone"]["zone"], "UNKNOWN");
        assert!(json["zone"]["nearestPlace"].is_null());
        assert!(json["generatedAt"].is_string());
    }

    #[test]
    fn category_lists_keywords() {
        let api = ApiCategory::from(PlaceCategory::Hospital);
        assert_eq!(api.keywords, ["hospital", "emergency", "medical center"]);
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["category"], "HOSPITAL");
    }

    #[test]
    fn safe_place_serializes_distance() {
        let center = Coordinate::new(0.0, 0.0).unwrap();
        let place = SafePlace::from_provider(
            safe_zone_places_models::ProviderPlace {
                id: "x".to_string(),
                name: "X".to_string(),
                address: None,
                coordinate: center,
                rating: None,
                open_now: Some(false),
            },
            PlaceCategory::Government,
            &center,
        );
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["distanceMeters"], 0.0);
        assert_eq!(json["openNow"], false);
        assert_eq!(json["coordinate"]["latitude"], 0.0);
    }
}
