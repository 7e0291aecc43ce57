#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for nearby safe place search.
//!
//! Looks up police, hospital and government places around a location,
//! prints the safety zone, renders SOS context text, or starts the API
//! server. The places provider comes from `--fixture` when given and from
//! the environment otherwise (see
//! [`safe_zone_places::providers::create_provider_from_env`]).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use safe_zone_places::providers::fixture::StaticProvider;
use safe_zone_places::service_registry::all_services;
use safe_zone_places::{PlaceProvider, SearchOptions, search_nearby};
use safe_zone_places_models::Coordinate;
use safe_zone_zone::sos::SosContext;

#[derive(Parser)]
#[command(name = "safe_zone", about = "Nearby safe places and safety zones")]
struct Cli {
    /// Answer place searches from a JSON fixture file instead of a live
    /// provider
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lng: Option<f64>,
}

impl LocationArgs {
    fn coordinate(&self) -> Result<Option<Coordinate>, Box<dyn std::error::Error>> {
        match (self.lat, self.lng) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng)) => Ok(Some(Coordinate::new(lat, lng)?)),
            _ => Err("--lat and --lng must be given together".into()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the nearest police, hospital and government places
    Nearby {
        #[command(flatten)]
        location: LocationArgs,
        /// Initial search radius in meters, 1 to 50000 (falls back to 50 km
        /// if empty)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50_000))]
        radius: Option<u32>,
    },
    /// Print the safety zone for a location
    Zone {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Print the context text attached to an SOS alert
    Sos {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// List configured places providers
    Providers,
    /// Start the API server
    Serve,
}

fn provider(fixture: Option<&PathBuf>) -> Result<Arc<dyn PlaceProvider>, Box<dyn std::error::Error>> {
    let provider: Arc<dyn PlaceProvider> = match fixture {
        Some(path) => Arc::new(StaticProvider::from_json_file(path)?),
        None => Arc::from(safe_zone_places::providers::create_provider_from_env()?),
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Providers => {
            println!(
                "{:<15} {:<9} {:<8} {:<30} ENDPOINT",
                "ID", "PRIORITY", "ENABLED", "NAME"
            );
            println!("{}", "-".repeat(100));
            for service in &all_services() {
                let endpoint = match service.base_url() {
                    "" => "-",
                    url => url,
                };
                println!(
                    "{:<15} {:<9} {:<8} {:<30} {endpoint}",
                    service.id, service.priority, service.enabled, service.name
                );
            }
        }
        Commands::Nearby { location, radius } => {
            let Some(center) = location.coordinate()? else {
                return Err("--lat and --lng are required".into());
            };
            let provider = provider(cli.fixture.as_ref())?;

            let mut options = SearchOptions::default();
            if let Some(radius) = radius {
                options.initial_radius_meters = radius;
            }

            let search = search_nearby(provider.as_ref(), center, &options).await?;
            let status = safe_zone_zone::classify(Some(center), &search.places);

            println!(
                "{} place(s) within {:.0} km of {center}",
                search.places.len(),
                search.radius_used_km()
            );
            println!("{:<3} {:<11} {:>9}  NAME", "#", "CATEGORY", "DISTANCE");
            println!("{}", "-".repeat(60));
            for (i, place) in search.places.iter().enumerate() {
                let km = place.distance_meters.unwrap_or_default() / 1000.0;
                println!(
                    "{:<3} {:<11} {km:>6.2} km  {} ({})",
                    i + 1,
                    place.category,
                    place.name,
                    place.address
                );
            }
            println!();
            println!("{}: {}", status.zone, status.message);
        }
        Commands::Zone { location } => {
            let center = location.coordinate()?;
            let places = match center {
                Some(center) => {
                    let provider = provider(cli.fixture.as_ref())?;
                    search_nearby(provider.as_ref(), center, &SearchOptions::default())
                        .await?
                        .places
                }
                None => {
                    log::warn!("No location given; zone is unknown");
                    Vec::new()
                }
            };

            let status = safe_zone_zone::classify(center, &places);
            println!("{}: {}", status.zone, status.message);
        }
        Commands::Sos { location } => {
            let center = location.coordinate()?;
            let mut places = Vec::new();
            if let Some(center) = center {
                let provider = provider(cli.fixture.as_ref())?;
                match search_nearby(provider.as_ref(), center, &SearchOptions::default()).await {
                    Ok(search) => places = search.places,
                    Err(e) => log::warn!("Sending SOS context without nearby places: {e}"),
                }
            }

            let status = safe_zone_zone::classify(center, &places);
            print!("{}", SosContext::new(center, &status));
        }
        Commands::Serve => {
            let state = safe_zone_server::AppState::new(provider(cli.fixture.as_ref())?);
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(safe_zone_server::run_server(state))
            })
            .await??;
        }
    }

    Ok(())
}
