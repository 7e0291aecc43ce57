//! Google Places Nearby Search client.
//!
//! Issues one `nearbysearch` request per keyword. The API reports errors
//! through a `status` field in an HTTP 200 body, so both the HTTP status
//! and the body status are checked.
//!
//! See <https://developers.google.com/maps/documentation/places/web-service/search-nearby>

use safe_zone_places_models::{Coordinate, ProviderPlace};

use super::PlaceProvider;
use crate::PlacesError;

/// Google Places API provider.
pub struct GooglePlacesProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GooglePlacesProvider {
    /// Creates a new provider. Without an API key the provider reports
    /// itself unconfigured and every search fails.
    #[must_use]
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl PlaceProvider for GooglePlacesProvider {
    fn name(&self) -> &str {
        "google_places"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<ProviderPlace>, PlacesError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(PlacesError::ProviderUnavailable {
                message: "Google Places API key not configured".to_string(),
            });
        };

        let location = format!("{},{}", center.latitude(), center.longitude());
        let radius = radius_meters.to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", keyword),
                ("key", api_key),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(PlacesError::Provider {
                message: format!("Google Places returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nearby Search JSON response.
///
/// Results without a `place_id` or with unusable coordinates are skipped.
fn parse_response(body: &serde_json::Value) -> Result<Vec<ProviderPlace>, PlacesError> {
    let status = body["status"].as_str().ok_or_else(|| PlacesError::Parse {
        message: "Google Places response missing 'status'".to_string(),
    })?;

    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        "OVER_QUERY_LIMIT" => return Err(PlacesError::RateLimited),
        "REQUEST_DENIED" => {
            return Err(PlacesError::ProviderUnavailable {
                message: error_message(body, status),
            });
        }
        _ => {
            return Err(PlacesError::Provider {
                message: error_message(body, status),
            });
        }
    }

    let results = body["results"]
        .as_array()
        .ok_or_else(|| PlacesError::Parse {
            message: "Google Places response missing 'results' array".to_string(),
        })?;

    Ok(results.iter().filter_map(parse_result).collect())
}

fn parse_result(result: &serde_json::Value) -> Option<ProviderPlace> {
    let Some(id) = result["place_id"].as_str() else {
        log::debug!("Skipping Google Places result without place_id");
        return None;
    };

    let lat = result.pointer("/geometry/location/lat")?.as_f64()?;
    let lng = result.pointer("/geometry/location/lng")?.as_f64()?;
    let coordinate = match Coordinate::new(lat, lng) {
        Ok(c) => c,
        Err(e) => {
            log::debug!("Skipping Google Places result {id}: {e}");
            return None;
        }
    };

    let address = result["vicinity"]
        .as_str()
        .or_else(|| result["formatted_address"].as_str())
        .map(String::from);

    Some(ProviderPlace {
        id: id.to_string(),
        name: result["name"].as_str().unwrap_or(id).to_string(),
        address,
        coordinate,
        rating: result["rating"].as_f64(),
        open_now: result
            .pointer("/opening_hours/open_now")
            .and_then(serde_json::Value::as_bool),
    })
}

fn error_message(body: &serde_json::Value, status: &str) -> String {
    body["error_message"].as_str().map_or_else(
        || format!("Google Places status {status}"),
        |msg| format!("Google Places status {status}: {msg}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nearby_results() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [{
                "place_id": "ChIJ-police-1",
                "name": "Parliament Street Police Station",
                "vicinity": "Parliament St, New Delhi",
                "geometry": { "location": { "lat": 28.6225, "lng": 77.2131 } },
                "rating": 3.9,
                "opening_hours": { "open_now": true }
            }, {
                "place_id": "ChIJ-hosp-1",
                "name": "RML Hospital",
                "formatted_address": "Baba Kharak Singh Marg, New Delhi",
                "geometry": { "location": { "lat": 28.6263, "lng": 77.2006 } }
            }]
        });
        let places = parse_response(&body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "ChIJ-police-1");
        assert_eq!(places[0].open_now, Some(true));
        assert_eq!(places[0].rating, Some(3.9));
        assert_eq!(
            places[1].address.as_deref(),
            Some("Baba Kharak Singh Marg, New Delhi")
        );
        assert!(places[1].rating.is_none());
        assert!((places[1].coordinate.latitude() - 28.6263).abs() < 1e-6);
    }

    #[test]
    fn zero_results_is_empty() {
        let body = serde_json::json!({ "status": "ZERO_RESULTS", "results": [] });
        assert!(parse_response(&body).unwrap().is_empty());
    }

    #[test]
    fn request_denied_is_provider_unavailable() {
        let body = serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        });
        let err = parse_response(&body).unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(err.to_string().contains("API key is invalid"));
    }

    #[test]
    fn over_query_limit_is_rate_limited() {
        let body = serde_json::json!({ "status": "OVER_QUERY_LIMIT", "results": [] });
        assert!(matches!(
            parse_response(&body),
            Err(PlacesError::RateLimited)
        ));
    }

    #[test]
    fn skips_results_without_id_or_location() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [
                { "name": "No id", "geometry": { "location": { "lat": 1.0, "lng": 1.0 } } },
                { "place_id": "no-geom", "name": "No geometry" },
                { "place_id": "bad", "geometry": { "location": { "lat": 95.0, "lng": 1.0 } } }
            ]
        });
        assert!(parse_response(&body).unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_without_key_is_unavailable() {
        let provider = GooglePlacesProvider::new("https://example.invalid".to_string(), None);
        assert!(!provider.is_configured());
        let center = Coordinate::new(28.6139, 77.2090).unwrap();
        let err = provider.search(center, 20_000, "police").await.unwrap_err();
        assert!(err.is_provider_unavailable());
    }
}
