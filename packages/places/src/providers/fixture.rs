//! In-memory places provider backed by a keyword → places map.
//!
//! The JSON fixture format is an object keyed by search keyword:
//!
//! ```json
//! {
//!   "police": [
//!     { "id": "P1", "name": "Central Police Station",
//!       "coordinate": { "latitude": 28.61, "longitude": 77.21 } }
//!   ]
//! }
//! ```
//!
//! Only places within the requested radius of the center are returned.

use std::collections::BTreeMap;
use std::path::Path;

use safe_zone_places_models::{Coordinate, ProviderPlace};

use super::PlaceProvider;
use crate::PlacesError;

/// Provider answering from a static keyword map.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    places: BTreeMap<String, Vec<ProviderPlace>>,
}

impl StaticProvider {
    /// Creates a provider from a keyword map. Keywords match
    /// case-insensitively.
    #[must_use]
    pub fn new(places: BTreeMap<String, Vec<ProviderPlace>>) -> Self {
        Self {
            places: places
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Parses a fixture from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Json`] if the JSON is malformed or a
    /// coordinate is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, PlacesError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Loads a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Io`] if the file cannot be read, or
    /// [`PlacesError::Json`] if it cannot be parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PlacesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let provider = Self::from_json_str(&json)?;
        log::info!(
            "Loaded places fixture {} ({} keywords)",
            path.display(),
            provider.places.len()
        );
        Ok(provider)
    }
}

#[async_trait::async_trait]
impl PlaceProvider for StaticProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<ProviderPlace>, PlacesError> {
        let Some(candidates) = self.places.get(&keyword.to_lowercase()) else {
            return Ok(Vec::new());
        };

        Ok(candidates
            .iter()
            .filter(|p| center.distance_to(&p.coordinate) <= f64::from(radius_meters))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "Police": [
            { "id": "P1", "name": "Near", "coordinate": { "latitude": 28.62, "longitude": 77.21 } },
            { "id": "P2", "name": "Far", "coordinate": { "latitude": 29.10, "longitude": 77.21 } }
        ]
    }"#;

    #[tokio::test]
    async fn filters_by_keyword_and_radius() {
        let provider = StaticProvider::from_json_str(FIXTURE).unwrap();
        let center = Coordinate::new(28.6139, 77.2090).unwrap();

        let near = provider.search(center, 20_000, "police").await.unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id, "P1");

        let wide = provider.search(center, 60_000, "POLICE").await.unwrap();
        assert_eq!(wide.len(), 2);

        assert!(provider.search(center, 60_000, "hospital").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bundled_new_delhi_fixture_loads() {
        let provider =
            StaticProvider::from_json_str(include_str!("../../fixtures/new_delhi.json")).unwrap();
        let center = Coordinate::new(28.6139, 77.2090).unwrap();

        let police = provider.search(center, 20_000, "police station").await.unwrap();
        assert_eq!(police.len(), 2);
        assert_eq!(police[0].open_now, Some(true));

        let ambulance = provider.search(center, 20_000, "ambulance").await.unwrap();
        assert!(ambulance.is_empty());
    }

    #[test]
    fn rejects_invalid_coordinates() {
        let bad = r#"{ "police": [ { "id": "X", "name": "X",
            "coordinate": { "latitude": 91.0, "longitude": 0.0 } } ] }"#;
        assert!(matches!(
            StaticProvider::from_json_str(bad),
            Err(PlacesError::Json(_))
        ));
    }
}
