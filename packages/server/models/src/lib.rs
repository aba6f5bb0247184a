#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the disaster map server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the analysis domain types to allow independent
//! evolution of the API contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use disaster_map_models::{Coordinates, MapLayerHandle, RegionBounds};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is up.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether the Earth Observation provider is ready.
    pub earth_engine_initialized: bool,
    /// Whether an AI completion provider is configured.
    pub ai_available: bool,
}

/// Natural-language query request, with an optional location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// The natural-language query.
    pub query: String,
    /// Location the query is about, when known.
    pub coordinates: Option<Coordinates>,
}

/// Full location analysis request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAnalysisRequest {
    /// Location to analyze.
    pub coordinates: Coordinates,
    /// Whether to attach an AI interpretation (default true).
    pub include_ai: Option<bool>,
}

/// Regional analysis request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAnalysisRequest {
    /// Rectangle to analyze.
    pub bounds: RegionBounds,
    /// Analysis focus, e.g. `flood` (default `comprehensive`).
    pub analysis_type: Option<String>,
}

/// Query parameters for the single-analysis endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PointQuery {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Analysis radius in meters (endpoint-specific default).
    pub radius: Option<f64>,
}

/// Query parameters for the map layers endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MapLayersQuery {
    /// Latitude (configured default when absent).
    pub lat: Option<f64>,
    /// Longitude (configured default when absent).
    pub lng: Option<f64>,
    /// Initial map zoom level.
    pub zoom: Option<u8>,
}

/// One live layer served through the tile proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveLayer {
    /// Display name for map legends.
    pub name: String,
    /// Short description of what the layer shows.
    pub description: String,
    /// Proxy tile URL template with `{z}/{x}/{y}` placeholders.
    pub tile_url: String,
}

/// Live layers response: the proxied layer set and where it was
/// rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveLayersResponse {
    /// Proxied layers keyed by layer name.
    pub layers: BTreeMap<String, LiveLayer>,
    /// Location the layers were rendered for.
    pub location: Coordinates,
    /// When the layers were rendered.
    pub timestamp: DateTime<Utc>,
}

/// Map center with the suggested zoom level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapCenter {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

/// Map layers response: the rendered layer set plus the viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayersResponse {
    /// Rendered layers keyed by layer name.
    pub layers: BTreeMap<String, MapLayerHandle>,
    /// Viewport the layers were rendered for.
    pub center: MapCenter,
    /// When the layers were rendered.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_camel_case() {
        let health = ApiHealth {
            healthy: true,
            version: "0.1.0".to_string(),
            earth_engine_initialized: true,
            ai_available: false,
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["earthEngineInitialized"], true);
        assert_eq!(json["aiAvailable"], false);
    }

    #[test]
    fn location_request_accepts_include_ai() {
        let request: LocationAnalysisRequest = serde_json::from_str(
            r#"{"coordinates":{"lat":11.0168,"lng":76.9558},"includeAi":false}"#,
        )
        .unwrap();
        assert_eq!(request.include_ai, Some(false));
    }

    #[test]
    fn live_layer_serializes_camel_case() {
        let layer = LiveLayer {
            name: "Elevation (SRTM)".to_string(),
            description: "Digital elevation model showing terrain height".to_string(),
            tile_url: "/tiles/elevation/{z}/{x}/{y}".to_string(),
        };
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["tileUrl"], "/tiles/elevation/{z}/{x}/{y}");
    }

    #[test]
    fn query_request_coordinates_are_optional() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"query":"Is this area at flood risk?"}"#).unwrap();
        assert!(request.coordinates.is_none());
    }
}
