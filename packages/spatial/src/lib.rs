#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spherical-earth helpers for nearby place search.
//!
//! All proximity math in the workspace goes through [`haversine_meters`],
//! which uses a fixed mean Earth radius of 6 371 000 m so that distances
//! are reproducible across providers and tests.

/// Mean Earth radius in meters used by every distance computation.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two `(lat, lng)` points given
/// in degrees.
///
/// ```text
/// a = sin²(Δφ/2) + cos(φ1)·cos(φ2)·sin²(Δλ/2)
/// c = 2·atan2(√a, √(1−a))
/// d = R · c
/// ```
#[must_use]
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// An axis-aligned `(west, south, east, north)` box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western longitude.
    pub west: f64,
    /// Southern latitude.
    pub south: f64,
    /// Eastern longitude.
    pub east: f64,
    /// Northern latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Returns the box enclosing a circle of `radius_meters` around
    /// `(lat, lng)`.
    ///
    /// Latitudes are clamped to the poles. When the circle reaches a pole
    /// the box spans every longitude. Boxes that would cross the
    /// antimeridian are clamped to `[-180, 180]` rather than wrapped.
    #[must_use]
    pub fn around(lat: f64, lng: f64, radius_meters: f64) -> Self {
        let delta_lat = (radius_meters / EARTH_RADIUS_METERS).to_degrees();
        let south = (lat - delta_lat).max(-90.0);
        let north = (lat + delta_lat).min(90.0);

        let cos_lat = lat.to_radians().cos();
        if south <= -90.0 || north >= 90.0 || cos_lat < 1e-9 {
            log::trace!("Bounding box around ({lat}, {lng}) reaches a pole; spanning all longitudes");
            return Self {
                west: -180.0,
                south,
                east: 180.0,
                north,
            };
        }

        let delta_lng = delta_lat / cos_lat;
        Self {
            west: (lng - delta_lng).max(-180.0),
            south,
            east: (lng + delta_lng).min(180.0),
            north,
        }
    }

    /// Whether `(lat, lng)` lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}
