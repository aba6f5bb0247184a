#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Disaster analysis engine.
//!
//! The flood and building analyzers compute their domain metrics from
//! Earth Observation zonal statistics; the vulnerability calculator
//! combines their outputs into the composite Social Vulnerability
//! Index; the orchestrator sequences everything, isolating sub-analysis
//! failures into per-slot error markers so a composite report is
//! always produced.

mod building;
mod flood;
mod orchestrator;
mod vulnerability;

use disaster_map_earth::EarthError;
use disaster_map_models::InvalidBoundsError;
use thiserror::Error;

pub use building::{BuildingAnalyzer, DEFAULT_BUILDING_RADIUS_M};
pub use flood::{DEFAULT_FLOOD_RADIUS_M, FloodAnalyzer};
pub use orchestrator::Orchestrator;
pub use vulnerability::compute_social_vulnerability;

/// Errors that can occur during an analysis operation.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The Earth Observation provider is not initialized; the query
    /// was not attempted.
    #[error("Earth Engine not initialized")]
    ProviderUnavailable,

    /// The provider-side query failed.
    #[error("Upstream query failed (HTTP {status}): {message}")]
    Upstream {
        /// Upstream HTTP status code, 502 for transport failures.
        status: u16,
        /// Failure description.
        message: String,
    },

    /// Region bounds were missing or inconsistent.
    #[error("{0}")]
    InvalidBounds(#[from] InvalidBoundsError),
}

impl From<EarthError> for AnalysisError {
    fn from(e: EarthError) -> Self {
        match e {
            EarthError::NotInitialized => Self::ProviderUnavailable,
            EarthError::Upstream { status, message } => Self::Upstream { status, message },
            EarthError::Http(e) => Self::Upstream {
                status: 502,
                message: e.to_string(),
            },
            EarthError::Json(e) => Self::Upstream {
                status: 502,
                message: format!("invalid provider response: {e}"),
            },
        }
    }
}

/// Rounds to 2 decimal places for presentation.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to 3 decimal places for presentation.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted Earth Observation provider for analyzer tests.

    use std::collections::BTreeMap;

    use disaster_map_earth::{
        EarthError, EarthObservationProvider, LayerSpec, ZonalStatsQuery, datasets,
    };
    use disaster_map_models::MapLayerHandle;

    /// Mock provider keyed on the queried dataset.
    ///
    /// `None` for a fraction means "no scene matched" (empty stats
    /// map), mirroring the provider contract.
    pub struct MockEarth {
        pub initialized: bool,
        pub fail_all: bool,
        pub flood_fraction: Option<f64>,
        pub elevation: f64,
        pub built_up_fraction: Option<f64>,
    }

    impl Default for MockEarth {
        fn default() -> Self {
            Self {
                initialized: true,
                fail_all: false,
                flood_fraction: Some(0.0),
                elevation: 100.0,
                built_up_fraction: Some(0.0),
            }
        }
    }

    #[async_trait::async_trait]
    impl EarthObservationProvider for MockEarth {
        fn initialized(&self) -> bool {
            self.initialized
        }

        async fn query_zonal_stats(
            &self,
            query: &ZonalStatsQuery,
        ) -> Result<BTreeMap<String, f64>, EarthError> {
            if !self.initialized {
                return Err(EarthError::NotInitialized);
            }
            if self.fail_all {
                return Err(EarthError::Upstream {
                    status: 500,
                    message: "computation failed".to_string(),
                });
            }

            let mut stats = BTreeMap::new();
            match query.image.dataset.as_str() {
                datasets::SENTINEL1_COLLECTION => {
                    if let Some(fraction) = self.flood_fraction {
                        stats.insert("VV".to_string(), fraction);
                    }
                }
                datasets::SRTM_DATASET => {
                    stats.insert("elevation".to_string(), self.elevation);
                }
                datasets::SENTINEL2_COLLECTION => {
                    if let Some(fraction) = self.built_up_fraction {
                        stats.insert("B11".to_string(), fraction);
                    }
                }
                _ => {}
            }
            Ok(stats)
        }

        async fn render_layer(&self, spec: &LayerSpec) -> Result<MapLayerHandle, EarthError> {
            if !self.initialized {
                return Err(EarthError::NotInitialized);
            }
            Ok(MapLayerHandle {
                layer_name: spec.layer_name.clone(),
                map_id: format!("mock-{}", spec.layer_name),
                access_token: Some("mock-token".to_string()),
                tile_url_template: None,
                name: spec.name.clone(),
                description: spec.description.clone(),
                source: spec.source.clone(),
            })
        }
    }
}
