//! Upstream tile fetching.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use disaster_map_earth::{EarthObservationProvider, TILE_BASE_URL};
use disaster_map_models::{Coordinates, MapLayerHandle};

use crate::{LayerCache, LayerGroup, TileError, generate_layers};

/// Upstream fetch timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Serves map tiles for one layer group, regenerating the group on a
/// cache miss.
pub struct TileProxy {
    provider: Arc<dyn EarthObservationProvider>,
    cache: LayerCache,
    client: reqwest::Client,
    center: Coordinates,
    group: LayerGroup,
}

impl TileProxy {
    /// Creates a proxy serving `group` centered on `center`, with an
    /// empty cache.
    ///
    /// # Panics
    ///
    /// Panics if the upstream HTTP client cannot be built.
    #[must_use]
    pub fn new(
        provider: Arc<dyn EarthObservationProvider>,
        center: Coordinates,
        group: LayerGroup,
    ) -> Self {
        Self {
            provider,
            cache: LayerCache::new(),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build tile fetch HTTP client"),
            center,
            group,
        }
    }

    /// Regenerates the proxy's layer group, publishes it, and returns
    /// the new map.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Generation`] when rendering fails; the
    /// cache keeps its previous contents.
    pub async fn refresh_layers(
        &self,
    ) -> Result<Arc<HashMap<String, MapLayerHandle>>, TileError> {
        let layers = generate_layers(self.provider.as_ref(), self.center, self.group).await?;
        self.cache.publish(layers);
        Ok(self.cache.snapshot())
    }

    /// Fetches one tile for a named layer.
    ///
    /// A cache miss regenerates the whole layer group before giving up:
    /// rendered handles expire upstream, so a stale or empty cache is
    /// the expected steady state after a restart.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::LayerNotFound`] when the layer is not part
    /// of the group, [`TileError::Generation`] when regeneration fails,
    /// or [`TileError::UpstreamFetch`] when the tile fetch fails.
    pub async fn get_tile(
        &self,
        layer_name: &str,
        z: u32,
        x: u32,
        y: u32,
    ) -> Result<Bytes, TileError> {
        let handle = match self.cache.get(layer_name) {
            Some(handle) => handle,
            None => {
                log::info!("layer cache miss for '{layer_name}', regenerating layer group");
                let layers = self.refresh_layers().await?;
                layers
                    .get(layer_name)
                    .cloned()
                    .ok_or_else(|| TileError::LayerNotFound {
                        layer: layer_name.to_string(),
                    })?
            }
        };

        let url = tile_url(&handle, z, x, y);
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| TileError::UpstreamFetch {
                    status: 502,
                    message: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TileError::UpstreamFetch {
                status: status.as_u16(),
                message: "Failed to fetch tile from upstream".to_string(),
            });
        }

        response.bytes().await.map_err(|e| TileError::UpstreamFetch {
            status: 502,
            message: e.to_string(),
        })
    }

    /// The proxy's layer cache, for direct inspection.
    #[must_use]
    pub const fn cache(&self) -> &LayerCache {
        &self.cache
    }
}

/// Builds the upstream tile URL for a handle.
///
/// Handles carrying a URL template get `{z}/{x}/{y}` substituted;
/// otherwise the canonical maps path is built from the map id and
/// access token.
fn tile_url(handle: &MapLayerHandle, z: u32, x: u32, y: u32) -> String {
    handle.tile_url_template.as_ref().map_or_else(
        || {
            let mut url = format!("{TILE_BASE_URL}/{}/tiles/{z}/{x}/{y}", handle.map_id);
            if let Some(token) = handle.access_token.as_ref() {
                url.push_str("?token=");
                url.push_str(token);
            }
            url
        },
        |template| {
            template
                .replace("{z}", &z.to_string())
                .replace("{x}", &x.to_string())
                .replace("{y}", &y.to_string())
        },
    )
}
