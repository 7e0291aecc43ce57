#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safety zone classification.
//!
//! Buckets the distance from the user to the nearest known safe place into
//! a [`Zone`]:
//!
//! | Distance            | Zone   |
//! |---------------------|--------|
//! | `d <= 1 km`         | Green  |
//! | `1 km < d <= 5 km`  | Orange |
//! | `d > 5 km`          | Red    |
//!
//! Boundaries go to the safer zone. Without a user location or without any
//! places the zone is [`Zone::Unknown`]. Classification is a pure function
//! of its inputs and never fails; callers recompute it whenever the
//! location or the place list changes.

pub mod sos;

pub use safe_zone_places_models::{Zone, ZoneStatus};

use safe_zone_places_models::{Coordinate, SafePlace};

/// Upper bound of the green zone, in kilometers.
pub const GREEN_MAX_KM: f64 = 1.0;

/// Upper bound of the orange zone, in kilometers.
pub const ORANGE_MAX_KM: f64 = 5.0;

/// Classifies `user`'s exposure from the nearest of `places`.
///
/// Places carrying a distance are trusted as measured from `user`; the
/// rest are measured here with the haversine formula. Places whose
/// distance is not a finite number are ignored.
#[must_use]
pub fn classify(user: Option<Coordinate>, places: &[SafePlace]) -> ZoneStatus {
    let Some(user) = user else {
        return unknown();
    };

    let nearest = places
        .iter()
        .map(|p| (p.distance_from(&user), p))
        .filter(|(d, _)| d.is_finite())
        .fold(None::<(f64, &SafePlace)>, |best, (d, p)| match best {
            Some((best_d, _)) if best_d <= d => best,
            _ => Some((d, p)),
        });

    let Some((distance_meters, place)) = nearest else {
        return unknown();
    };

    let distance_km = distance_meters / 1000.0;
    let zone = zone_for_distance_km(distance_km);
    log::trace!("Nearest safe place '{}' at {distance_km:.3} km: {zone}", place.name);

    ZoneStatus {
        zone,
        nearest_distance_km: distance_km,
        nearest_place: Some(place.clone()),
        message: message(zone, distance_km),
    }
}

/// Maps a distance in kilometers to its zone.
#[must_use]
pub fn zone_for_distance_km(distance_km: f64) -> Zone {
    if distance_km <= GREEN_MAX_KM {
        Zone::Green
    } else if distance_km <= ORANGE_MAX_KM {
        Zone::Orange
    } else {
        Zone::Red
    }
}

/// Human-readable status line for a zone.
#[must_use]
pub fn message(zone: Zone, distance_km: f64) -> String {
    match zone {
        Zone::Unknown => "Safety zone unknown".to_string(),
        Zone::Green => "You are in a safe zone".to_string(),
        Zone::Orange => format!("{distance_km:.1}km to safety"),
        Zone::Red => format!("{distance_km:.1}km from nearest safe place"),
    }
}

fn unknown() -> ZoneStatus {
    ZoneStatus {
        zone: Zone::Unknown,
        nearest_distance_km: 0.0,
        nearest_place: None,
        message: message(Zone::Unknown, 0.0),
    }
}
