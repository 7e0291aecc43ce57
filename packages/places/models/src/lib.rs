#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core value types for nearby safety place search and zone
//! classification.
//!
//! Every place returned to a caller is a [`SafePlace`]: a provider record
//! tagged with the [`PlaceCategory`] it was searched under and annotated
//! with its distance from the query center. [`ZoneStatus`] is the derived
//! view of how far the user is from the nearest of those places.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Address placeholder used when a provider returns no address.
pub const ADDRESS_UNAVAILABLE: &str = "unavailable";

/// A WGS84 point.
///
/// Always within `[-90, 90]` latitude and `[-180, 180]` longitude; use
/// [`Coordinate::new`] to construct one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Creates a coordinate from degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Haversine distance to `other` in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        safe_zone_spatial::haversine_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Error returned when a latitude or longitude is outside the valid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinateError {
    /// Latitude not in `[-90, 90]` or not finite.
    Latitude(f64),
    /// Longitude not in `[-180, 180]` or not finite.
    Longitude(f64),
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude(v) => write!(f, "invalid latitude {v}: expected -90 to 90"),
            Self::Longitude(v) => write!(f, "invalid longitude {v}: expected -180 to 180"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Kind of safety-relevant place.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PlaceCategory {
    /// Police stations and posts.
    Police,
    /// Hospitals, emergency rooms and medical centers.
    Hospital,
    /// Government offices, collectorates and fire stations.
    Government,
}

impl PlaceCategory {
    /// Every category, in search order.
    pub const ALL: &[Self] = &[Self::Police, Self::Hospital, Self::Government];

    /// Provider search keywords for this category, in search order.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Police => &["police station", "police"],
            Self::Hospital => &["hospital", "emergency", "medical center"],
            Self::Government => &["government office", "collectorate", "fire station"],
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Police => "Police Station",
            Self::Hospital => "Hospital",
            Self::Government => "Government Office",
        }
    }

    /// Map marker icon name.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Police => "shield",
            Self::Hospital => "local_hospital",
            Self::Government => "account_balance",
        }
    }

    /// Every `(category, keyword)` pair the aggregator queries, in order.
    pub fn search_pairs() -> impl Iterator<Item = (Self, &'static str)> {
        Self::ALL
            .iter()
            .flat_map(|c| c.keywords().iter().map(move |k| (*c, *k)))
    }
}

/// A place as returned by a places provider, before it is categorized
/// and measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPlace {
    /// Provider-assigned identifier, stable per underlying place.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text address, if the provider has one.
    #[serde(default)]
    pub address: Option<String>,
    /// Location of the place.
    pub coordinate: Coordinate,
    /// Average user rating.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Whether the place is currently open.
    #[serde(default)]
    pub open_now: Option<bool>,
}

/// A safety-relevant place near a query center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafePlace {
    /// Provider-assigned identifier, unique within one search result.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category this place was found under.
    pub category: PlaceCategory,
    /// Free-text address or [`ADDRESS_UNAVAILABLE`].
    pub address: String,
    /// Location of the place.
    pub coordinate: Coordinate,
    /// Distance from the query center in meters. `None` when the place
    /// was not produced by a search (e.g. supplied by a caller).
    pub distance_meters: Option<f64>,
    /// Average user rating.
    pub rating: Option<f64>,
    /// Whether the place is currently open.
    pub open_now: Option<bool>,
}

impl SafePlace {
    /// Tags a provider record with its category and its distance from
    /// `center`.
    #[must_use]
    pub fn from_provider(place: ProviderPlace, category: PlaceCategory, center: &Coordinate) -> Self {
        let distance = center.distance_to(&place.coordinate);
        Self {
            id: place.id,
            name: place.name,
            category,
            address: place
                .address
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string()),
            coordinate: place.coordinate,
            distance_meters: Some(distance),
            rating: place.rating,
            open_now: place.open_now,
        }
    }

    /// Distance from `center`, using the stored value when present.
    #[must_use]
    pub fn distance_from(&self, center: &Coordinate) -> f64 {
        self.distance_meters
            .unwrap_or_else(|| center.distance_to(&self.coordinate))
    }
}

/// Result of a nearby place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySearch {
    /// Places sorted by ascending distance.
    pub places: Vec<SafePlace>,
    /// Radius of the attempt that produced `places`.
    pub radius_used_meters: u32,
}

impl NearbySearch {
    /// Radius used, in kilometers.
    #[must_use]
    pub fn radius_used_km(&self) -> f64 {
        f64::from(self.radius_used_meters) / 1000.0
    }
}

/// Coarse safety level derived from distance to the nearest safe place.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    /// No location or no nearby places.
    Unknown,
    /// Within 1 km of a safe place.
    Green,
    /// Between 1 km and 5 km.
    Orange,
    /// Further than 5 km.
    Red,
}

/// Zone verdict for a user location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    /// The zone.
    pub zone: Zone,
    /// Distance to the nearest place in kilometers; `0` when unknown.
    pub nearest_distance_km: f64,
    /// The nearest place, if any.
    pub nearest_place: Option<SafePlace>,
    /// Human-readable status line.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(InvalidCoordinateError::Latitude(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.1),
            Err(InvalidCoordinateError::Longitude(-180.1))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn coordinate_deserialize_validates() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 28.6139, "longitude": 77.209}"#).unwrap();
        assert!((ok.latitude() - 28.6139).abs() < 1e-9);
        assert!(
            serde_json::from_str::<Coordinate>(r#"{"latitude": 128.0, "longitude": 0.0}"#)
                .is_err()
        );
    }

    #[test]
    fn search_pairs_cover_every_keyword_in_order() {
        let pairs: Vec<_> = PlaceCategory::search_pairs().collect();
        assert_eq!(pairs.len(), 8);
        assert_eq!(pairs[0], (PlaceCategory::Police, "police station"));
        assert_eq!(pairs[1], (PlaceCategory::Police, "police"));
        assert_eq!(pairs[4], (PlaceCategory::Hospital, "medical center"));
        assert_eq!(pairs[7], (PlaceCategory::Government, "fire station"));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("police".parse::<PlaceCategory>(), Ok(PlaceCategory::Police));
        assert_eq!(
            "GOVERNMENT".parse::<PlaceCategory>(),
            Ok(PlaceCategory::Government)
        );
        assert_eq!(PlaceCategory::Hospital.to_string(), "HOSPITAL");
    }

    #[test]
    fn from_provider_measures_and_fills_address() {
        let center = Coordinate::new(12.9716, 77.5946).unwrap();
        let place = ProviderPlace {
            id: "H1".to_string(),
            name: "City Hospital".to_string(),
            address: Some("  ".to_string()),
            coordinate: Coordinate::new(12.9716, 77.5946).unwrap(),
            rating: Some(4.2),
            open_now: None,
        };
        let safe = SafePlace::from_provider(place, PlaceCategory::Hospital, &center);
        assert_eq!(safe.address, ADDRESS_UNAVAILABLE);
        assert_eq!(safe.distance_meters, Some(0.0));
        assert_eq!(safe.category, PlaceCategory::Hospital);
    }

    #[test]
    fn distance_from_recomputes_when_missing() {
        let center = Coordinate::new(0.0, 0.0).unwrap();
        let place = SafePlace {
            id: "X".to_string(),
            name: "X".to_string(),
            category: PlaceCategory::Police,
            address: ADDRESS_UNAVAILABLE.to_string(),
            coordinate: Coordinate::new(1.0, 0.0).unwrap(),
            distance_meters: None,
            rating: None,
            open_now: None,
        };
        assert!((place.distance_from(&center) - 111_194.93).abs() < 1.0);
    }
}
