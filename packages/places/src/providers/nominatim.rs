//! Nominatim / OpenStreetMap places client.
//!
//! Runs a free-form keyword search bounded to the box enclosing the
//! search circle, then drops hits that fall in the box corners outside
//! the radius. The public instance allows **1 request per second**, so
//! requests from one provider are spaced by `rate_limit_ms` regardless of
//! how many keyword queries the aggregator has in flight. Time spent in
//! that queue is added to the attempt budget so a busy provider is not
//! mistaken for an unreachable one.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use safe_zone_places_models::{Coordinate, ProviderPlace};
use safe_zone_spatial::BoundingBox;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::PlaceProvider;
use crate::PlacesError;

/// Nominatim search provider.
pub struct NominatimProvider {
    base_url: String,
    rate_limit: Duration,
    max_results: u32,
    client: reqwest::Client,
    next_slot: Mutex<Instant>,
    queued: AtomicUsize,
}

impl NominatimProvider {
    /// Creates a new provider that sends `user_agent` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: String,
        user_agent: &str,
        rate_limit: Duration,
        max_results: u32,
    ) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            base_url,
            rate_limit,
            max_results,
            client,
            next_slot: Mutex::new(Instant::now()),
            queued: AtomicUsize::new(0),
        })
    }

    /// Waits until this provider may send its next request.
    async fn acquire_slot(&self) {
        let mut next = self.next_slot.lock().await;
        let now = Instant::now();
        if *next > now {
            tokio::time::sleep_until(*next).await;
        }
        *next = (*next).max(now) + self.rate_limit;
    }
}

/// Counts a request as queued until it completes or is dropped.
struct QueuedRequest<'a>(&'a AtomicUsize);

impl<'a> QueuedRequest<'a> {
    fn enter(queued: &'a AtomicUsize) -> Self {
        queued.fetch_add(1, Ordering::SeqCst);
        Self(queued)
    }
}

impl Drop for QueuedRequest<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PlaceProvider for NominatimProvider {
    fn name(&self) -> &str {
        "nominatim"
    }

    fn attempt_timeout(&self, default: Duration, queries: usize) -> Duration {
        let pending = self.queued.load(Ordering::SeqCst) + queries;
        let slots = u32::try_from(pending).unwrap_or(u32::MAX);
        default.saturating_add(self.rate_limit.saturating_mul(slots))
    }

    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<ProviderPlace>, PlacesError> {
        let bbox = BoundingBox::around(
            center.latitude(),
            center.longitude(),
            f64::from(radius_meters),
        );
        let viewbox = format!("{},{},{},{}", bbox.west, bbox.north, bbox.east, bbox.south);
        let limit = self.max_results.to_string();

        let _queued = QueuedRequest::enter(&self.queued);
        self.acquire_slot().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", keyword),
                ("viewbox", viewbox.as_str()),
                ("bounded", "1"),
                ("format", "jsonv2"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(PlacesError::Provider {
                message: format!("Nominatim returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        let places = parse_response(&body)?;

        Ok(places
            .into_iter()
            .filter(|p| center.distance_to(&p.coordinate) <= f64::from(radius_meters))
            .collect())
    }
}

/// Parses a Nominatim `jsonv2` search response.
fn parse_response(body: &serde_json::Value) -> Result<Vec<ProviderPlace>, PlacesError> {
    let results = body.as_array().ok_or_else(|| PlacesError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    Ok(results.iter().filter_map(parse_result).collect())
}

fn parse_result(result: &serde_json::Value) -> Option<ProviderPlace> {
    let id = match (result["osm_type"].as_str(), result["osm_id"].as_u64()) {
        (Some(osm_type), Some(osm_id)) => format!("osm:{osm_type}/{osm_id}"),
        _ => format!("nominatim:{}", result["place_id"].as_u64()?),
    };

    let lat = result["lat"].as_str().and_then(|s| s.parse::<f64>().ok())?;
    let lon = result["lon"].as_str().and_then(|s| s.parse::<f64>().ok())?;
    let coordinate = Coordinate::new(lat, lon).ok()?;

    let display_name = result["display_name"].as_str().map(String::from);
    let name = result["name"]
        .as_str()
        .filter(|n| !n.is_empty())
        .map(String::from)
        .or_else(|| {
            display_name
                .as_deref()
                .and_then(|d| d.split(',').next())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| id.clone());

    Some(ProviderPlace {
        id,
        name,
        address: display_name,
        coordinate,
        rating: None,
        open_now: None,
    })
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::aggregator::{FALLBACK_RADIUS_METERS, SearchOptions, search_nearby};

    /// Serves `[]` to every request on a local port.
    async fn empty_nominatim() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&chunk[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let response = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]";
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}/search")
    }

    #[test]
    fn attempt_budget_covers_rate_limited_queries() {
        let provider = NominatimProvider::new(
            "https://nominatim.openstreetmap.org/search".to_string(),
            "safe-zone-test",
            Duration::from_millis(1000),
            20,
        )
        .unwrap();

        assert_eq!(
            provider.attempt_timeout(Duration::from_secs(10), 8),
            Duration::from_secs(18)
        );
    }

    #[tokio::test]
    async fn overlapping_searches_both_complete_behind_rate_limit() {
        let base_url = empty_nominatim().await;
        let provider =
            NominatimProvider::new(base_url, "safe-zone-test", Duration::from_millis(50), 20)
                .unwrap();
        let center = Coordinate::new(12.9716, 77.5946).unwrap();
        // Eight queries spaced 50 ms apart need 350 ms on their own.
        let options = SearchOptions {
            attempt_timeout: Duration::from_millis(300),
            ..SearchOptions::default()
        };

        let (a, b) = tokio::join!(
            search_nearby(&provider, center, &options),
            search_nearby(&provider, center, &options)
        );

        for result in [a, b] {
            let search = result.unwrap();
            assert!(search.places.is_empty());
            assert_eq!(search.radius_used_meters, FALLBACK_RADIUS_METERS);
        }
        assert_eq!(provider.queued.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn parses_nominatim_results() {
        let body = serde_json::json!([{
            "place_id": 1234,
            "osm_type": "node",
            "osm_id": 987_654,
            "lat": "12.9750",
            "lon": "77.5900",
            "name": "Cubbon Park Police Station",
            "display_name": "Cubbon Park Police Station, Kasturba Road, Bengaluru"
        }, {
            "place_id": 5678,
            "lat": "12.9600",
            "lon": "77.6000",
            "name": "",
            "display_name": "Bowring Hospital, Shivajinagar, Bengaluru"
        }]);
        let places = parse_response(&body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "osm:node/987654");
        assert_eq!(places[0].name, "Cubbon Park Police Station");
        assert_eq!(places[1].id, "nominatim:5678");
        assert_eq!(places[1].name, "Bowring Hospital");
        assert_eq!(
            places[1].address.as_deref(),
            Some("Bowring Hospital, Shivajinagar, Bengaluru")
        );
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array() {
        let body = serde_json::json!({ "error": "bad request" });
        assert!(matches!(
            parse_response(&body),
            Err(PlacesError::Parse { .. })
        ));
    }

    #[test]
    fn skips_results_with_bad_coordinates() {
        let body = serde_json::json!([{
            "osm_type": "way",
            "osm_id": 1,
            "lat": "not a number",
            "lon": "77.0"
        }]);
        assert!(parse_response(&body).unwrap().is_empty());
    }
}
