//! HTTP handler functions for the disaster map API.

use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::Utc;
use disaster_map_analysis::{
    AnalysisError, DEFAULT_BUILDING_RADIUS_M, DEFAULT_FLOOD_RADIUS_M,
};
use disaster_map_earth::EarthError;
use disaster_map_models::Coordinates;
use disaster_map_server_models::{
    ApiHealth, LiveLayer, LiveLayersResponse, LocationAnalysisRequest, MapCenter, MapLayersQuery,
    MapLayersResponse, PointQuery, QueryRequest, RegionalAnalysisRequest,
};
use disaster_map_tiles::{LayerGroup, TileError, generate_layers};

use crate::AppState;

/// Query synthesized for location analyses that request AI output.
const CANONICAL_ANALYSIS_QUERY: &str = "Comprehensive disaster vulnerability analysis";

/// Default zoom for the map layers viewport.
const DEFAULT_ZOOM: u8 = 10;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        earth_engine_initialized: state.provider.initialized(),
        ai_available: state.orchestrator.ai_available(),
    })
}

/// `POST /api/query`
///
/// Natural-language query with an optional location. With coordinates
/// the full analysis suite runs; without, only the AI layer answers at
/// the configured default location.
pub async fn query(state: web::Data<AppState>, request: web::Json<QueryRequest>) -> HttpResponse {
    let report = match request.coordinates {
        Some(coords) => {
            state
                .orchestrator
                .process_location(coords, Some(&request.query))
                .await
        }
        None => {
            state
                .orchestrator
                .process_general_query(&request.query, state.default_coords)
                .await
        }
    };
    HttpResponse::Ok().json(report)
}

/// `POST /api/analyze-location`
///
/// Full analysis suite for a point; AI interpretation is attached
/// unless explicitly disabled.
pub async fn analyze_location(
    state: web::Data<AppState>,
    request: web::Json<LocationAnalysisRequest>,
) -> HttpResponse {
    let query = request
        .include_ai
        .unwrap_or(true)
        .then_some(CANONICAL_ANALYSIS_QUERY);
    let report = state
        .orchestrator
        .process_location(request.coordinates, query)
        .await;
    HttpResponse::Ok().json(report)
}

/// `POST /api/regional-analysis`
///
/// Analyzes a rectangular region by reducing it to its centroid.
pub async fn regional_analysis(
    state: web::Data<AppState>,
    request: web::Json<RegionalAnalysisRequest>,
) -> HttpResponse {
    let analysis_type = request.analysis_type.as_deref().unwrap_or("comprehensive");
    match state
        .orchestrator
        .process_region(&request.bounds, analysis_type)
        .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => analysis_error_response(&e),
    }
}

/// `GET /api/flood-analysis?lat&lng&radius`
pub async fn flood_analysis(
    state: web::Data<AppState>,
    params: web::Query<PointQuery>,
) -> HttpResponse {
    let coords = Coordinates::new(params.lat, params.lng);
    let radius = params.radius.unwrap_or(DEFAULT_FLOOD_RADIUS_M);
    match state
        .orchestrator
        .flood_analyzer()
        .analyze(coords, radius)
        .await
    {
        Ok(analysis) => HttpResponse::Ok().json(analysis),
        Err(e) => analysis_error_response(&e),
    }
}

/// `GET /api/building-analysis?lat&lng&radius`
pub async fn building_analysis(
    state: web::Data<AppState>,
    params: web::Query<PointQuery>,
) -> HttpResponse {
    let coords = Coordinates::new(params.lat, params.lng);
    let radius = params.radius.unwrap_or(DEFAULT_BUILDING_RADIUS_M);
    match state
        .orchestrator
        .building_analyzer()
        .analyze(coords, radius)
        .await
    {
        Ok(analysis) => HttpResponse::Ok().json(analysis),
        Err(e) => analysis_error_response(&e),
    }
}

/// `GET /api/map-layers?lat&lng&zoom`
///
/// Renders the visualization layer set for a viewport.
pub async fn map_layers(
    state: web::Data<AppState>,
    params: web::Query<MapLayersQuery>,
) -> HttpResponse {
    let center = Coordinates::new(
        params.lat.unwrap_or(state.default_coords.lat),
        params.lng.unwrap_or(state.default_coords.lng),
    );
    let zoom = params.zoom.unwrap_or(DEFAULT_ZOOM);

    match generate_layers(state.provider.as_ref(), center, LayerGroup::Visualization).await {
        Ok(layers) => HttpResponse::Ok().json(MapLayersResponse {
            layers: layers.into_iter().collect(),
            center: MapCenter {
                lat: center.lat,
                lng: center.lng,
                zoom,
            },
            timestamp: Utc::now(),
        }),
        Err(e) => earth_error_response(&e),
    }
}

/// `GET /api/live-layers`
///
/// Regenerates and publishes the proxied live layer set, and returns
/// its metadata with tile URL templates pointing back at the proxy.
pub async fn live_layers(state: web::Data<AppState>) -> HttpResponse {
    match state.tile_proxy.refresh_layers().await {
        Ok(layers) => {
            let layers = layers
                .iter()
                .map(|(key, handle)| {
                    (
                        key.clone(),
                        LiveLayer {
                            name: handle.name.clone(),
                            description: handle.description.clone(),
                            tile_url: format!("/tiles/{key}/{{z}}/{{x}}/{{y}}"),
                        },
                    )
                })
                .collect();
            HttpResponse::Ok().json(LiveLayersResponse {
                layers,
                location: state.default_coords,
                timestamp: Utc::now(),
            })
        }
        Err(e) => tile_error_response(&e),
    }
}

/// `GET /api/test-map`
///
/// Diagnostic endpoint: serves the pre-recorded map snapshot when one
/// exists, otherwise renders a single fresh elevation layer.
pub async fn test_map(state: web::Data<AppState>) -> HttpResponse {
    let path = std::env::var("MAP_SNAPSHOT_PATH")
        .unwrap_or_else(|_| "earth_engine_test_results.json".to_string());
    if let Ok(contents) = std::fs::read_to_string(&path) {
        match serde_json::from_str::<serde_json::Value>(&contents) {
            Ok(snapshot) => return HttpResponse::Ok().json(snapshot),
            Err(e) => log::warn!("Ignoring unparseable map snapshot at {path}: {e}"),
        }
    }

    if !state.provider.initialized() {
        return HttpResponse::Ok().json(serde_json::json!({
            "status": "error",
            "message": "Earth Engine not initialized",
        }));
    }

    let Some(spec) = LayerGroup::Visualization
        .specs(state.default_coords)
        .into_iter()
        .find(|s| s.layer_name == "elevation")
    else {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "No elevation layer configured"
        }));
    };

    match state.provider.render_layer(&spec).await {
        Ok(handle) => HttpResponse::Ok().json(serde_json::json!({
            "status": "success",
            "earth_engine_connected": true,
            "center": { "lat": state.default_coords.lat, "lng": state.default_coords.lng },
            "zoom": 12,
            "layers": { "elevation": handle },
            "timestamp": Utc::now(),
        })),
        Err(e) => earth_error_response(&e),
    }
}

/// `GET /tiles/{layer_name}/{z}/{x}/{y}`
pub async fn tile(
    state: web::Data<AppState>,
    path: web::Path<(String, u32, u32, u32)>,
) -> HttpResponse {
    let (layer_name, z, x, y) = path.into_inner();
    match state.tile_proxy.get_tile(&layer_name, z, x, y).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("image/png")
            .insert_header(("Cache-Control", "public, max-age=86400"))
            .body(bytes),
        Err(e) => tile_error_response(&e),
    }
}

/// Maps an analysis failure to its HTTP status: 503 when the provider
/// is unavailable, 502 for upstream failures, 400 for bad bounds.
fn analysis_error_response(e: &AnalysisError) -> HttpResponse {
    let status = match e {
        AnalysisError::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        AnalysisError::InvalidBounds(_) => StatusCode::BAD_REQUEST,
    };
    HttpResponse::build(status).json(serde_json::json!({ "error": e.to_string() }))
}

fn earth_error_response(e: &EarthError) -> HttpResponse {
    let status = match e {
        EarthError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    HttpResponse::build(status).json(serde_json::json!({ "error": e.to_string() }))
}

/// Maps a tile failure to its HTTP status, forwarding the upstream
/// status for fetch failures.
fn tile_error_response(e: &TileError) -> HttpResponse {
    let status = match e {
        TileError::LayerNotFound { .. } => StatusCode::NOT_FOUND,
        TileError::UpstreamFetch { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        TileError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    HttpResponse::build(status).json(serde_json::json!({ "error": e.to_string() }))
}
