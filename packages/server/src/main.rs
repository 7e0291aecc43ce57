#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for nearby safe places and safety zones.

use safe_zone_server::{AppState, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let state = AppState::from_env().map_err(|e| {
        log::error!("Failed to create places provider: {e}");
        std::io::Error::other(e.to_string())
    })?;

    run_server(state).await
}
