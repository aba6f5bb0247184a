//! Building density and damage estimation from optical imagery.

use std::sync::Arc;

use disaster_map_earth::{EarthObservationProvider, Reducer, ZonalStatsQuery, datasets};
use disaster_map_models::{BuildingAnalysis, Coordinates};

use crate::{AnalysisError, FloodAnalyzer, round2};

/// Default analysis radius for building queries, in meters.
pub const DEFAULT_BUILDING_RADIUS_M: f64 = 2000.0;

/// Pixel scale for built-up statistics, in meters.
const OPTICAL_SCALE_M: f64 = 10.0;

/// Computes built-up coverage and a damage estimate for a point.
///
/// Has a hard dependency on [`FloodAnalyzer`]: the damage factor is
/// derived from the flood risk level at the same point, so a failed
/// internal flood call fails the building analysis. The analyzer is
/// injected rather than constructed internally so the coupling stays
/// visible and mockable.
#[derive(Clone)]
pub struct BuildingAnalyzer {
    provider: Arc<dyn EarthObservationProvider>,
    flood: FloodAnalyzer,
}

impl BuildingAnalyzer {
    /// Creates an analyzer over the given provider and flood analyzer.
    #[must_use]
    pub const fn new(provider: Arc<dyn EarthObservationProvider>, flood: FloodAnalyzer) -> Self {
        Self { provider, flood }
    }

    /// Analyzes building density and potential damage for a disk of
    /// `radius_m` meters around `coords`.
    ///
    /// Built-up coverage is the mean of the thresholded NDBI mask over
    /// a cloud-filtered Sentinel-2 composite; no usable scene yields an
    /// all-zero result. The building count is an approximate proxy
    /// (`built_up_percentage * radius / 100`), kept for output
    /// compatibility, not a real count.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ProviderUnavailable`] when the provider
    /// is not initialized, or [`AnalysisError::Upstream`] if either the
    /// built-up query or the internal flood call fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub async fn analyze(
        &self,
        coords: Coordinates,
        radius_m: f64,
    ) -> Result<BuildingAnalysis, AnalysisError> {
        if !self.provider.initialized() {
            return Err(AnalysisError::ProviderUnavailable);
        }

        let stats = self
            .provider
            .query_zonal_stats(&ZonalStatsQuery {
                image: datasets::built_up_mask(),
                center: coords,
                radius_m,
                reducer: Reducer::Mean,
                scale_m: OPTICAL_SCALE_M,
            })
            .await?;

        // Empty stats means no cloud-free scene matched the filters.
        if stats.is_empty() {
            return Ok(BuildingAnalysis {
                total_buildings: 0,
                damaged_buildings: 0,
                built_up_percentage: 0.0,
                damage_percentage: 0.0,
                coordinates: coords,
            });
        }

        let built_up_percentage = stats.get("B11").copied().unwrap_or(0.0) * 100.0;
        let estimated_buildings = (built_up_percentage * radius_m / 100.0).floor().max(0.0) as u32;

        let flood = self.flood.analyze(coords, radius_m).await?;
        let damage_factor = flood.risk_level.damage_factor();
        let damaged_buildings = (f64::from(estimated_buildings) * damage_factor).floor() as u32;

        // Zero buildings are counted as one for the ratio denominator
        // only, so an empty area reads 0% rather than dividing by zero.
        let damage_percentage =
            f64::from(damaged_buildings) / f64::from(estimated_buildings.max(1)) * 100.0;

        Ok(BuildingAnalysis {
            total_buildings: estimated_buildings,
            damaged_buildings,
            built_up_percentage: round2(built_up_percentage),
            damage_percentage: round2(damage_percentage),
            coordinates: coords,
        })
    }
}
