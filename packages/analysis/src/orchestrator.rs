//! Composite analysis orchestration.

use std::sync::Arc;

use chrono::Utc;
use disaster_map_ai::providers::CompletionProvider;
use disaster_map_ai::query::process_natural_query;
use disaster_map_ai::report::generate_report;
use disaster_map_earth::EarthObservationProvider;
use disaster_map_models::{
    Coordinates, CompositeReport, RegionBounds, ReportStatus, Section,
};

use crate::{
    AnalysisError, BuildingAnalyzer, DEFAULT_BUILDING_RADIUS_M, DEFAULT_FLOOD_RADIUS_M,
    FloodAnalyzer, compute_social_vulnerability,
};

/// Runs every analysis for a location and assembles the composite
/// report.
///
/// Sub-analysis failures never fail the report: each analysis lands in
/// its slot as data or as an error marker, the vulnerability index is
/// computed from whatever succeeded, and the report always completes.
pub struct Orchestrator {
    flood: FloodAnalyzer,
    building: BuildingAnalyzer,
    completion: Option<Box<dyn CompletionProvider>>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given observation provider and
    /// optional completion provider.
    #[must_use]
    pub fn new(
        provider: Arc<dyn EarthObservationProvider>,
        completion: Option<Box<dyn CompletionProvider>>,
    ) -> Self {
        let flood = FloodAnalyzer::new(Arc::clone(&provider));
        let building = BuildingAnalyzer::new(provider, flood.clone());
        Self {
            flood,
            building,
            completion,
        }
    }

    /// The flood analyzer, for direct single-analysis requests.
    #[must_use]
    pub const fn flood_analyzer(&self) -> &FloodAnalyzer {
        &self.flood
    }

    /// The building analyzer, for direct single-analysis requests.
    #[must_use]
    pub const fn building_analyzer(&self) -> &BuildingAnalyzer {
        &self.building
    }

    /// Whether a completion provider is configured.
    #[must_use]
    pub const fn ai_available(&self) -> bool {
        self.completion.is_some()
    }

    /// Runs the full analysis suite for a point and assembles the
    /// composite report. Never fails: individual analysis failures are
    /// recorded as per-slot error markers.
    pub async fn process_location(
        &self,
        coords: Coordinates,
        query: Option<&str>,
    ) -> CompositeReport {
        let mut report = CompositeReport {
            coordinates: coords,
            timestamp: Utc::now(),
            status: ReportStatus::Processing,
            flood_analysis: None,
            building_analysis: None,
            social_vulnerability: None,
            ai_analysis: None,
            report: None,
            error: None,
        };

        report.flood_analysis = Some(match self.flood.analyze(coords, DEFAULT_FLOOD_RADIUS_M).await
        {
            Ok(analysis) => Section::Data(analysis),
            Err(e) => {
                log::warn!("flood analysis failed for {}, {}: {e}", coords.lat, coords.lng);
                Section::err(e.to_string())
            }
        });

        report.building_analysis = Some(
            match self
                .building
                .analyze(coords, DEFAULT_BUILDING_RADIUS_M)
                .await
            {
                Ok(analysis) => Section::Data(analysis),
                Err(e) => {
                    log::warn!(
                        "building analysis failed for {}, {}: {e}",
                        coords.lat,
                        coords.lng
                    );
                    Section::err(e.to_string())
                }
            },
        );

        report.social_vulnerability = Some(compute_social_vulnerability(
            report.flood_analysis.as_ref().and_then(Section::data),
            report.building_analysis.as_ref().and_then(Section::data),
        ));

        if let Some(query) = query {
            report.ai_analysis =
                Some(process_natural_query(self.completion.as_deref(), query, Some(coords)).await);
        }

        report.report = Some(generate_report(&report));
        report.status = ReportStatus::Completed;
        report
    }

    /// Runs the analysis suite for a rectangular region by reducing it
    /// to its centroid.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidBounds`] when the bounds are
    /// inconsistent.
    pub async fn process_region(
        &self,
        bounds: &RegionBounds,
        analysis_type: &str,
    ) -> Result<CompositeReport, AnalysisError> {
        bounds.validate()?;
        let query = format!("Analyze {analysis_type} disaster risk for the selected region");
        Ok(self.process_location(bounds.centroid(), Some(&query)).await)
    }

    /// Answers a natural-language query without running the geospatial
    /// analyzers, for requests that carry no coordinates.
    pub async fn process_general_query(
        &self,
        query: &str,
        coords: Coordinates,
    ) -> CompositeReport {
        let ai_analysis =
            process_natural_query(self.completion.as_deref(), query, Some(coords)).await;

        CompositeReport {
            coordinates: coords,
            timestamp: Utc::now(),
            status: ReportStatus::Completed,
            flood_analysis: None,
            building_analysis: None,
            social_vulnerability: None,
            ai_analysis: Some(ai_analysis),
            report: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use disaster_map_models::{RiskLevel, VulnerabilityCategory};

    use super::*;
    use crate::testing::MockEarth;

    fn orchestrator(provider: MockEarth) -> Orchestrator {
        Orchestrator::new(Arc::new(provider), None)
    }

    fn coimbatore() -> Coordinates {
        Coordinates::new(11.0168, 76.9558)
    }

    #[tokio::test]
    async fn full_pipeline_for_a_flood_prone_city() {
        let orchestrator = orchestrator(MockEarth {
            flood_fraction: Some(0.125),
            elevation: 45.0,
            built_up_fraction: Some(0.2),
            ..MockEarth::default()
        });

        let report = orchestrator.process_location(coimbatore(), None).await;
        assert_eq!(report.status, ReportStatus::Completed);

        let flood = report.flood_analysis.as_ref().and_then(Section::data).unwrap();
        assert_eq!(flood.risk_level, RiskLevel::Medium);
        assert!((flood.flood_percentage - 12.5).abs() < f64::EPSILON);

        let building = report
            .building_analysis
            .as_ref()
            .and_then(Section::data)
            .unwrap();
        assert_eq!(building.total_buildings, 400);
        assert_eq!(building.damaged_buildings, 60);

        let svi = report.social_vulnerability.as_ref().unwrap();
        assert!((svi.score - 0.53).abs() < 1e-9);
        assert_eq!(svi.category, VulnerabilityCategory::High);

        let text = report.report.as_ref().unwrap();
        assert!(text.contains("Flood Risk Assessment"));
        assert!(text.contains("Building Damage Assessment"));
        assert!(report.ai_analysis.is_none());
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn completes_with_error_markers_when_provider_is_down() {
        let orchestrator = orchestrator(MockEarth {
            initialized: false,
            ..MockEarth::default()
        });

        let report = orchestrator.process_location(coimbatore(), None).await;
        assert_eq!(report.status, ReportStatus::Completed);
        assert!(report.flood_analysis.as_ref().unwrap().data().is_none());
        assert!(report.building_analysis.as_ref().unwrap().data().is_none());

        let svi = report.social_vulnerability.as_ref().unwrap();
        assert!(svi.score.abs() < f64::EPSILON);
        assert_eq!(svi.category, VulnerabilityCategory::Low);

        // The report text still renders its location section.
        assert!(report.report.as_ref().unwrap().contains("Analysis Location"));
    }

    #[tokio::test]
    async fn query_attaches_ai_analysis() {
        let orchestrator = orchestrator(MockEarth::default());

        let report = orchestrator
            .process_location(coimbatore(), Some("Is this area at flood risk?"))
            .await;
        let ai = report.ai_analysis.as_ref().unwrap();
        assert_eq!(ai.intent, disaster_map_models::Intent::FloodAnalysis);
        assert!((ai.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn region_reduces_to_centroid() {
        let orchestrator = orchestrator(MockEarth::default());
        let bounds = RegionBounds {
            north: 12.0,
            south: 10.0,
            east: 78.0,
            west: 76.0,
        };

        let report = orchestrator.process_region(&bounds, "flood").await.unwrap();
        assert!((report.coordinates.lat - 11.0).abs() < f64::EPSILON);
        assert!((report.coordinates.lng - 77.0).abs() < f64::EPSILON);
        assert!(report.ai_analysis.is_some());
    }

    #[tokio::test]
    async fn rejects_inverted_bounds() {
        let orchestrator = orchestrator(MockEarth::default());
        let bounds = RegionBounds {
            north: 10.0,
            south: 12.0,
            east: 78.0,
            west: 76.0,
        };

        let result = orchestrator.process_region(&bounds, "flood").await;
        assert!(matches!(result, Err(AnalysisError::InvalidBounds(_))));
    }

    #[tokio::test]
    async fn general_query_skips_the_analyzers() {
        let orchestrator = orchestrator(MockEarth {
            fail_all: true,
            ..MockEarth::default()
        });

        let report = orchestrator
            .process_general_query("What can you analyze?", coimbatore())
            .await;
        assert_eq!(report.status, ReportStatus::Completed);
        assert!(report.flood_analysis.is_none());
        assert!(report.social_vulnerability.is_none());
        assert!(report.ai_analysis.is_some());
    }
}
