//! Multi-keyword nearby place aggregation with radius fallback.
//!
//! One search runs at most two attempts. Each attempt sends one provider
//! query per `(category, keyword)` pair concurrently and joins on all of
//! them before merging, so the merged list is only touched by the calling
//! task. Results are deduplicated by provider id (first occurrence in
//! category/keyword order wins), sorted by distance and truncated.
//!
//! Dropping the returned future abandons the search; in-flight request
//! results are discarded.

use std::collections::BTreeSet;
use std::time::Duration;

use futures::future::join_all;
use safe_zone_places_models::{Coordinate, NearbySearch, PlaceCategory, SafePlace};

use crate::{PlaceProvider, PlacesError};

/// Radius of the first attempt unless overridden.
pub const DEFAULT_RADIUS_METERS: u32 = 20_000;

/// Radius of the second attempt when the first finds nothing.
pub const FALLBACK_RADIUS_METERS: u32 = 50_000;

/// Maximum number of places returned.
pub const MAX_RESULTS: usize = 8;

/// Upper bound on one attempt, covering every query in it.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for [`search_nearby`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Radius of the first attempt, in meters.
    pub initial_radius_meters: u32,
    /// Timeout applied to each attempt as a whole. Providers that queue
    /// their own requests may extend it.
    pub attempt_timeout: Duration,
    /// Maximum number of places returned.
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            initial_radius_meters: DEFAULT_RADIUS_METERS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_results: MAX_RESULTS,
        }
    }
}

/// How one radius attempt ended.
enum Attempt {
    /// Every query settled before the timeout.
    Completed {
        places: Vec<SafePlace>,
        failed: usize,
        total: usize,
    },
    /// The attempt hit its timeout.
    TimedOut { after: Duration },
}

impl Attempt {
    const fn all_failed(&self) -> bool {
        matches!(self, Self::Completed { failed, total, .. } if *failed == *total)
    }
}

/// Finds the nearest police, hospital and government places around
/// `center`.
///
/// Searches at `options.initial_radius_meters` first and, if that yields
/// nothing, once more at [`FALLBACK_RADIUS_METERS`]. Individual keyword
/// failures are logged and skipped. A timed-out first attempt counts as
/// empty.
///
/// # Errors
///
/// Returns [`PlacesError::ProviderUnavailable`] if the provider is not
/// configured, if every query of the first attempt fails, or if the
/// fallback attempt fails entirely or times out.
pub async fn search_nearby(
    provider: &dyn PlaceProvider,
    center: Coordinate,
    options: &SearchOptions,
) -> Result<NearbySearch, PlacesError> {
    if !provider.is_configured() {
        return Err(PlacesError::ProviderUnavailable {
            message: format!("{} is not configured", provider.name()),
        });
    }

    let radius = options.initial_radius_meters;
    let first = run_attempt(provider, center, radius, options.attempt_timeout).await;

    if first.all_failed() {
        return Err(PlacesError::ProviderUnavailable {
            message: format!("all {} queries failed", provider.name()),
        });
    }

    match first {
        Attempt::Completed { places, .. } if !places.is_empty() => {
            return Ok(finish(places, radius, options.max_results));
        }
        Attempt::Completed { .. } => {
            log::info!(
                "No places within {radius} m of {center}; widening to {FALLBACK_RADIUS_METERS} m"
            );
        }
        Attempt::TimedOut { after } => {
            log::warn!(
                "Place search at {radius} m timed out after {after:?}; widening to {FALLBACK_RADIUS_METERS} m"
            );
        }
    }

    let fallback = run_attempt(
        provider,
        center,
        FALLBACK_RADIUS_METERS,
        options.attempt_timeout,
    )
    .await;

    if fallback.all_failed() {
        return Err(PlacesError::ProviderUnavailable {
            message: format!("all {} queries failed", provider.name()),
        });
    }

    match fallback {
        Attempt::Completed { places, .. } => Ok(finish(
            places,
            FALLBACK_RADIUS_METERS,
            options.max_results,
        )),
        Attempt::TimedOut { after } => Err(PlacesError::ProviderUnavailable {
            message: format!("{} search timed out after {after:?}", provider.name()),
        }),
    }
}

fn finish(mut places: Vec<SafePlace>, radius_used_meters: u32, max_results: usize) -> NearbySearch {
    places.truncate(max_results);
    NearbySearch {
        places,
        radius_used_meters,
    }
}

/// Runs every `(category, keyword)` query at `radius_meters` and joins on
/// all of them.
///
/// The provider may stretch `timeout` to cover requests it queues itself.
async fn run_attempt(
    provider: &dyn PlaceProvider,
    center: Coordinate,
    radius_meters: u32,
    timeout: Duration,
) -> Attempt {
    let pairs: Vec<_> = PlaceCategory::search_pairs().collect();
    let budget = provider.attempt_timeout(timeout, pairs.len());

    let queries = pairs.into_iter().map(|(category, keyword)| async move {
        let result = provider.search(center, radius_meters, keyword).await;
        (category, keyword, result)
    });

    let Ok(results) = tokio::time::timeout(budget, join_all(queries)).await else {
        return Attempt::TimedOut { after: budget };
    };

    let total = results.len();
    let mut failed = 0;
    let mut merged = Vec::new();

    for (category, keyword, result) in results {
        match result {
            Ok(found) => {
                log::debug!(
                    "{}: {} result(s) for '{keyword}' within {radius_meters} m",
                    provider.name(),
                    found.len()
                );
                merged.extend(
                    found
                        .into_iter()
                        .map(|p| SafePlace::from_provider(p, category, &center)),
                );
            }
            Err(e) => {
                failed += 1;
                log::warn!("{}: query '{keyword}' ({category}) failed: {e}", provider.name());
            }
        }
    }

    Attempt::Completed {
        places: rank_places(merged),
        failed,
        total,
    }
}

/// Removes duplicate ids (keeping the first) and stable-sorts by
/// ascending distance.
///
/// Places without a distance sort last.
#[must_use]
pub fn rank_places(places: Vec<SafePlace>) -> Vec<SafePlace> {
    let mut seen = BTreeSet::new();
    let mut unique: Vec<SafePlace> = places
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect();

    unique.sort_by(|a, b| {
        a.distance_meters
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance_meters.unwrap_or(f64::INFINITY))
    });
    unique
}
