//! REST implementation of the Earth Observation provider.
//!
//! Talks to the Earth Engine REST surface: `value:compute` for zonal
//! statistics and `maps` for layer generation. Authentication is a
//! bearer token from the environment; the adapter reports itself
//! uninitialized (and every call fails fast) when credentials are
//! missing, so the server can still start and serve degraded reports.

use std::collections::BTreeMap;
use std::time::Duration;

use disaster_map_models::MapLayerHandle;
use serde::{Deserialize, Serialize};

use crate::{EarthError, EarthObservationProvider, LayerSpec, ZonalStatsQuery};

/// Default REST endpoint base.
const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com/v1";

/// Request timeout for stats and render calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connect timeout for the upstream.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Earth Engine REST adapter.
pub struct RestEarthEngine {
    client: reqwest::Client,
    base_url: String,
    project: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct ComputeRequest<'a> {
    expression: &'a ZonalStatsQuery,
}

#[derive(Deserialize)]
struct ComputeResponse {
    result: BTreeMap<String, f64>,
}

#[derive(Serialize)]
struct MapsRequest<'a> {
    expression: &'a LayerSpec,
}

#[derive(Deserialize)]
struct MapsResponse {
    /// Fully qualified map name, `projects/{project}/maps/{map_id}`.
    name: String,
    /// Access token for the legacy tile endpoint, when issued.
    token: Option<String>,
    /// Direct tile URL template with `{z}/{x}/{y}` placeholders, when
    /// the API returns one.
    tile_url_format: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamError {
    error: UpstreamErrorDetail,
}

#[derive(Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

impl RestEarthEngine {
    /// Creates an adapter with explicit credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: String,
        project: String,
        token: Option<String>,
    ) -> Result<Self, EarthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            project,
            token,
        })
    }

    /// Creates an adapter from `EARTH_ENGINE_BASE_URL`,
    /// `EARTH_ENGINE_PROJECT`, and `EARTH_ENGINE_TOKEN`.
    ///
    /// Missing project or token leaves the adapter uninitialized
    /// rather than failing — analyzer calls will return
    /// [`EarthError::NotInitialized`] until credentials are provided.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, EarthError> {
        let base_url = std::env::var("EARTH_ENGINE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let project = std::env::var("EARTH_ENGINE_PROJECT").unwrap_or_default();
        let token = std::env::var("EARTH_ENGINE_TOKEN").ok();

        if project.is_empty() || token.is_none() {
            log::warn!(
                "Earth Engine credentials not configured \
                 (EARTH_ENGINE_PROJECT/EARTH_ENGINE_TOKEN); \
                 analysis endpoints will report the provider unavailable"
            );
        }

        Self::new(base_url, project, token)
    }

    fn bearer(&self) -> Result<&str, EarthError> {
        self.token.as_deref().ok_or(EarthError::NotInitialized)
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, EarthError> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<UpstreamError>(&text)
                .map_or_else(|_| text.clone(), |e| e.error.message);
            return Err(EarthError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait::async_trait]
impl EarthObservationProvider for RestEarthEngine {
    fn initialized(&self) -> bool {
        !self.project.is_empty() && self.token.is_some()
    }

    async fn query_zonal_stats(
        &self,
        query: &ZonalStatsQuery,
    ) -> Result<BTreeMap<String, f64>, EarthError> {
        if !self.initialized() {
            return Err(EarthError::NotInitialized);
        }

        let url = format!("{}/projects/{}/value:compute", self.base_url, self.project);
        log::debug!("computing zonal stats for {}", query.image.dataset);

        let response: ComputeResponse =
            self.post_json(&url, &ComputeRequest { expression: query }).await?;
        Ok(response.result)
    }

    async fn render_layer(&self, spec: &LayerSpec) -> Result<MapLayerHandle, EarthError> {
        if !self.initialized() {
            return Err(EarthError::NotInitialized);
        }

        let url = format!("{}/projects/{}/maps", self.base_url, self.project);
        log::debug!("rendering layer '{}'", spec.layer_name);

        let response: MapsResponse =
            self.post_json(&url, &MapsRequest { expression: spec }).await?;

        Ok(MapLayerHandle {
            layer_name: spec.layer_name.clone(),
            map_id: map_id_from_name(&response.name),
            access_token: response.token,
            tile_url_template: response.tile_url_format,
            name: spec.name.clone(),
            description: spec.description.clone(),
            source: spec.source.clone(),
        })
    }
}

/// Extracts the bare map ID from a fully qualified
/// `projects/{project}/maps/{map_id}` resource name.
fn map_id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_map_id_from_resource_name() {
        assert_eq!(
            map_id_from_name("projects/my-project/maps/abc123"),
            "abc123"
        );
        assert_eq!(map_id_from_name("abc123"), "abc123");
    }

    #[test]
    fn uninitialized_without_credentials() {
        let adapter =
            RestEarthEngine::new(DEFAULT_BASE_URL.to_string(), String::new(), None).unwrap();
        assert!(!adapter.initialized());
    }

    #[test]
    fn initialized_with_credentials() {
        let adapter = RestEarthEngine::new(
            DEFAULT_BASE_URL.to_string(),
            "my-project".to_string(),
            Some("token".to_string()),
        )
        .unwrap();
        assert!(adapter.initialized());
    }

    #[tokio::test]
    async fn stats_fail_fast_when_uninitialized() {
        let adapter =
            RestEarthEngine::new(DEFAULT_BASE_URL.to_string(), String::new(), None).unwrap();
        let query = ZonalStatsQuery {
            image: crate::datasets::elevation(),
            center: disaster_map_models::Coordinates::new(11.0168, 76.9558),
            radius_m: 5000.0,
            reducer: crate::Reducer::Mean,
            scale_m: 30.0,
        };
        let result = adapter.query_zonal_stats(&query).await;
        assert!(matches!(result, Err(EarthError::NotInitialized)));
    }
}
