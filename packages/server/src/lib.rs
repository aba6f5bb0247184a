#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the disaster map application.
//!
//! Serves the REST API for geospatial disaster analysis (flood,
//! building damage, social vulnerability, AI-assisted queries) and
//! proxies map tiles from the Earth Observation backend. The server
//! starts even without upstream credentials: analysis endpoints then
//! report the provider unavailable and AI queries degrade to canned
//! responses.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use disaster_map_ai::providers::create_provider_from_env;
use disaster_map_analysis::Orchestrator;
use disaster_map_earth::{EarthObservationProvider, RestEarthEngine};
use disaster_map_models::Coordinates;
use disaster_map_tiles::{LayerGroup, TileProxy};

/// Fallback analysis location (Coimbatore, Tamil Nadu).
const DEFAULT_LAT: f64 = 11.0168;
/// Fallback analysis longitude.
const DEFAULT_LNG: f64 = 76.9558;

/// Shared application state.
pub struct AppState {
    /// The analysis orchestrator.
    pub orchestrator: Orchestrator,
    /// Earth Observation provider, for layer rendering and readiness.
    pub provider: Arc<dyn EarthObservationProvider>,
    /// Tile proxy for the live layer set.
    pub tile_proxy: TileProxy,
    /// Location used when a request carries no coordinates.
    pub default_coords: Coordinates,
}

/// Reads the default analysis location from `DEFAULT_LAT`/`DEFAULT_LNG`.
fn default_coords_from_env() -> Coordinates {
    let lat = std::env::var("DEFAULT_LAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LAT);
    let lng = std::env::var("DEFAULT_LNG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LNG);
    Coordinates::new(lat, lng)
}

/// Starts the disaster map API server.
///
/// Builds the Earth Observation adapter and the AI completion provider
/// from the environment, wires the orchestrator and tile proxy, and
/// starts the Actix-Web HTTP server. This is a regular async function —
/// the caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the upstream HTTP client cannot be built.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Building Earth Engine adapter...");
    let provider: Arc<dyn EarthObservationProvider> = Arc::new(
        RestEarthEngine::from_env().expect("Failed to build Earth Engine HTTP client"),
    );

    let completion = match create_provider_from_env() {
        Ok(provider) => Some(provider),
        Err(e) => {
            log::warn!("AI completion provider unavailable: {e}");
            None
        }
    };

    let default_coords = default_coords_from_env();
    log::info!(
        "Default analysis location: {}, {}",
        default_coords.lat,
        default_coords.lng
    );

    let orchestrator = Orchestrator::new(Arc::clone(&provider), completion);
    let tile_proxy = TileProxy::new(Arc::clone(&provider), default_coords, LayerGroup::Live);

    let state = web::Data::new(AppState {
        orchestrator,
        provider,
        tile_proxy,
        default_coords,
    });

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
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/query", web::post().to(handlers::query))
                    .route("/analyze-location", web::post().to(handlers::analyze_location))
                    .route(
                        "/regional-analysis",
                        web::post().to(handlers::regional_analysis),
                    )
                    .route("/flood-analysis", web::get().to(handlers::flood_analysis))
                    .route(
                        "/building-analysis",
                        web::get().to(handlers::building_analysis),
                    )
                    .route("/map-layers", web::get().to(handlers::map_layers))
                    .route("/live-layers", web::get().to(handlers::live_layers))
                    .route("/test-map", web::get().to(handlers::test_map)),
            )
            .route(
                "/tiles/{layer_name}/{z}/{x}/{y}",
                web::get().to(handlers::tile),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
