#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for nearby safe places and safety zones.
//!
//! Serves the REST API consumed by the map and SOS screens: ranked nearby
//! police / hospital / government places, the safety zone verdict for a
//! location, and the plain-text context attached to SOS alerts. Place
//! lookups go through whichever places provider
//! [`safe_zone_places::providers::create_provider_from_env`] selects.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safe_zone_places::{PlaceProvider, PlacesError, SearchOptions};

/// Shared application state.
pub struct AppState {
    /// Places provider used for every search.
    pub provider: Arc<dyn PlaceProvider>,
    /// Search tunables applied to every request.
    pub search_options: SearchOptions,
}

impl AppState {
    /// Creates state around an existing provider with default search
    /// options.
    #[must_use]
    pub fn new(provider: Arc<dyn PlaceProvider>) -> Self {
        Self {
            provider,
            search_options: SearchOptions::default(),
        }
    }

    /// Creates state using the provider selected from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if no provider can be created.
    pub fn from_env() -> Result<Self, PlacesError> {
        let provider = safe_zone_places::providers::create_provider_from_env()?;
        Ok(Self::new(Arc::from(provider)))
    }
}

/// Registers the `/api` routes on a service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/nearby", web::get().to(handlers::nearby))
            .route("/zone", web::get().to(handlers::zone))
            .route("/sos-context", web::get().to(handlers::sos_context)),
    );
}

/// Starts the safe zone API server.
///
/// Binds to `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
/// This is a regular async function — the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState) -> std::io::Result<()> {
    log::info!("Using places provider: {}", state.provider.name());

    let state = web::Data::new(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
