#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared domain types for the disaster-map system.
//!
//! This crate defines the value types exchanged between the analyzers,
//! the orchestrator, and the tile layer, plus the composite report
//! returned to API callers. All analysis types are derived per request
//! and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A geographic point in WGS84 decimal degrees.
///
/// `lat` is in `[-90, 90]`, `lng` in `[-180, 180]`. Passed by value
/// throughout — the type is small and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A rectangular geographic region in WGS84 decimal degrees.
///
/// Regions are deliberately collapsed to their centroid before analysis
/// — the system performs point analysis only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    /// Northern latitude bound.
    pub north: f64,
    /// Southern latitude bound.
    pub south: f64,
    /// Eastern longitude bound.
    pub east: f64,
    /// Western longitude bound.
    pub west: f64,
}

impl RegionBounds {
    /// Checks that the bounds describe a non-degenerate rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBoundsError`] if any bound is non-finite, or if
    /// `north <= south` or `east <= west`.
    pub fn validate(&self) -> Result<(), InvalidBoundsError> {
        let values = [self.north, self.south, self.east, self.west];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(InvalidBoundsError {
                message: "bounds must be finite numbers".to_string(),
            });
        }
        if self.north <= self.south {
            return Err(InvalidBoundsError {
                message: format!(
                    "north ({}) must be greater than south ({})",
                    self.north, self.south
                ),
            });
        }
        if self.east <= self.west {
            return Err(InvalidBoundsError {
                message: format!(
                    "east ({}) must be greater than west ({})",
                    self.east, self.west
                ),
            });
        }
        Ok(())
    }

    /// Returns the center point of the region.
    #[must_use]
    pub fn centroid(&self) -> Coordinates {
        Coordinates::new(
            f64::midpoint(self.north, self.south),
            f64::midpoint(self.east, self.west),
        )
    }
}

/// Error returned when region bounds are missing or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBoundsError {
    /// Description of which invariant was violated.
    pub message: String,
}

impl std::fmt::Display for InvalidBoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid region bounds: {}", self.message)
    }
}

impl std::error::Error for InvalidBoundsError {}

/// Flood risk level derived from flood coverage and elevation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// Coverage <= 10% and elevation >= 50m.
    Low,
    /// Coverage > 10% or elevation below 50m.
    Medium,
    /// Coverage > 30% or elevation below 10m.
    High,
}

impl RiskLevel {
    /// Fraction of estimated buildings assumed damaged at this risk
    /// level.
    #[must_use]
    pub const fn damage_factor(self) -> f64 {
        match self {
            Self::Low => 0.05,
            Self::Medium => 0.15,
            Self::High => 0.35,
        }
    }

    /// Contribution of this risk level to the social vulnerability
    /// flood factor.
    #[must_use]
    pub const fn vulnerability_factor(self) -> f64 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.5,
            Self::High => 0.8,
        }
    }
}

/// Flood analysis result for a point and radius.
///
/// Percentages and elevation are rounded to 2 decimal places for
/// presentation; the analyzer computes with full precision internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodAnalysis {
    /// Percentage of the analyzed disk detected as water, in `[0, 100]`.
    pub flood_percentage: f64,
    /// Mean elevation over the disk in meters. May be negative near
    /// sea level.
    pub average_elevation: f64,
    /// Derived risk level.
    pub risk_level: RiskLevel,
    /// Center of the analyzed disk.
    pub coordinates: Coordinates,
    /// Radius of the analyzed disk in meters.
    pub analysis_radius: f64,
}

/// Building density and damage estimate for a point and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingAnalysis {
    /// Estimated building count. A heuristic proxy derived from
    /// built-up coverage, not a real count.
    pub total_buildings: u32,
    /// Estimated damaged buildings, always `<= total_buildings`.
    pub damaged_buildings: u32,
    /// Percentage of the disk classified as built-up, in `[0, 100]`.
    pub built_up_percentage: f64,
    /// `damaged_buildings / max(total_buildings, 1) * 100`.
    pub damage_percentage: f64,
    /// Center of the analyzed disk.
    pub coordinates: Coordinates,
}

/// Social vulnerability category, from a composite score in `[0, 1]`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum VulnerabilityCategory {
    /// Score <= 0.25.
    Low,
    /// Score in (0.25, 0.5].
    Moderate,
    /// Score in (0.5, 0.75].
    High,
    /// Score > 0.75.
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
}

impl VulnerabilityCategory {
    /// Categorizes a composite vulnerability score.
    ///
    /// Thresholds are exclusive on the upper bound: a score of exactly
    /// 0.75 is `High`, not `VeryHigh`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.75 {
            Self::VeryHigh
        } else if score > 0.5 {
            Self::High
        } else if score > 0.25 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Individual factor contributions to the vulnerability score, each in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityFactors {
    /// Contribution from flood risk level.
    pub flood_risk: f64,
    /// Contribution from built-up density.
    pub building_density: f64,
    /// Contribution from low elevation.
    pub elevation_risk: f64,
    /// Inverse proxy for infrastructure access, floored at 0.3.
    pub infrastructure_access: f64,
}

impl VulnerabilityFactors {
    /// All-zero factors, used when no sub-analysis succeeded.
    pub const ZERO: Self = Self {
        flood_risk: 0.0,
        building_density: 0.0,
        elevation_risk: 0.0,
        infrastructure_access: 0.0,
    };
}

/// Composite Social Vulnerability Index.
///
/// A pure function of the flood and building analyses — it has no
/// independent lifecycle and is recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialVulnerability {
    /// Weighted composite score in `[0, 1]`, rounded to 3 decimals.
    pub score: f64,
    /// Category derived from the score.
    pub category: VulnerabilityCategory,
    /// The individual factor values that produced the score.
    pub factors: VulnerabilityFactors,
    /// Human-readable summary of the category.
    pub description: String,
}

/// Analysis intent extracted from a free-text query.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// Flood extent and water coverage questions.
    FloodAnalysis,
    /// Building damage and infrastructure questions.
    BuildingDamage,
    /// Population and community vulnerability questions.
    SocialVulnerability,
    /// Broad risk evaluation questions.
    RiskAssessment,
    /// Anything that matched no other category.
    GeneralAnalysis,
}

/// Natural-language interpretation of a query, produced once per
/// request and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    /// Classified intent of the query.
    pub intent: Intent,
    /// Free-text response, either from the completion provider or a
    /// canned fallback.
    pub ai_response: String,
    /// 0.9 for a genuine completion, 0.7 for the canned fallback.
    pub confidence: f64,
    /// Suggested follow-up actions for this intent.
    pub suggested_actions: Vec<String>,
}

/// One slot of the composite report: either the analysis data or an
/// error marker.
///
/// Serializes untagged so an errored slot appears as
/// `{"error": "..."}` on the wire, alongside data slots with their
/// normal shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    /// The analysis succeeded.
    Data(T),
    /// The analysis failed; the error is carried in place of the data.
    Error(SectionError),
}

/// Error marker stored in a report slot when a sub-analysis failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionError {
    /// Description of the failure.
    pub error: String,
}

impl<T> Section<T> {
    /// Wraps an error message as a failed section.
    pub fn err(message: impl Into<String>) -> Self {
        Self::Error(SectionError {
            error: message.into(),
        })
    }

    /// Returns the data if this section succeeded.
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Error(_) => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Section<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Data(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Lifecycle status of a composite report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Analysis in progress (never observed by callers).
    Processing,
    /// Report assembled; individual slots may still carry errors.
    Completed,
    /// Report assembly itself failed.
    Error,
}

/// The aggregated analysis result returned to callers.
///
/// Each sub-analysis slot independently carries data or an error
/// marker — the report never fails wholesale because one sub-analysis
/// failed. The top-level `error` field is populated only when the
/// orchestration could not assemble a report at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeReport {
    /// Location the report describes.
    pub coordinates: Coordinates,
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
    /// Report lifecycle status.
    pub status: ReportStatus,
    /// Flood analysis result or error marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flood_analysis: Option<Section<FloodAnalysis>>,
    /// Building analysis result or error marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_analysis: Option<Section<BuildingAnalysis>>,
    /// Composite vulnerability index, computed from whatever succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_vulnerability: Option<SocialVulnerability>,
    /// Natural-language interpretation, present when a query was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
    /// Textual summary of the present sections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    /// Top-level failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle for a generated visualization layer.
///
/// Produced by the Earth Observation provider; valid until the next
/// full layer regeneration replaces the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayerHandle {
    /// Cache key and URL path segment for this layer.
    pub layer_name: String,
    /// Provider-assigned map identifier.
    pub map_id: String,
    /// Access token for tile fetches, when the provider issues one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Tile URL template with `{z}/{x}/{y}` placeholders, when the
    /// provider returns one directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_url_template: Option<String>,
    /// Display name for map legends.
    pub name: String,
    /// Short description of what the layer shows.
    pub description: String,
    /// Upstream dataset attribution.
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_midpoint() {
        let bounds = RegionBounds {
            north: 12.0,
            south: 10.0,
            east: 78.0,
            west: 76.0,
        };
        let center = bounds.centroid();
        assert!((center.lat - 11.0).abs() < f64::EPSILON);
        assert!((center.lng - 77.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let bounds = RegionBounds {
            north: 10.0,
            south: 12.0,
            east: 78.0,
            west: 76.0,
        };
        assert!(bounds.validate().is_err());

        let bounds = RegionBounds {
            north: 12.0,
            south: 10.0,
            east: 76.0,
            west: 78.0,
        };
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_bounds() {
        let bounds = RegionBounds {
            north: f64::NAN,
            south: 10.0,
            east: 78.0,
            west: 76.0,
        };
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn category_thresholds_are_exclusive() {
        assert_eq!(
            VulnerabilityCategory::from_score(0.75),
            VulnerabilityCategory::High
        );
        assert_eq!(
            VulnerabilityCategory::from_score(0.5),
            VulnerabilityCategory::Moderate
        );
        assert_eq!(
            VulnerabilityCategory::from_score(0.25),
            VulnerabilityCategory::Low
        );
        assert_eq!(
            VulnerabilityCategory::from_score(0.76),
            VulnerabilityCategory::VeryHigh
        );
        assert_eq!(
            VulnerabilityCategory::from_score(0.0),
            VulnerabilityCategory::Low
        );
    }

    #[test]
    fn very_high_serializes_with_space() {
        let json = serde_json::to_string(&VulnerabilityCategory::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");
        assert_eq!(VulnerabilityCategory::VeryHigh.to_string(), "Very High");
    }

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::FloodAnalysis).unwrap();
        assert_eq!(json, "\"flood_analysis\"");
        assert_eq!(Intent::GeneralAnalysis.to_string(), "general_analysis");
    }

    #[test]
    fn section_error_serializes_as_error_object() {
        let section: Section<FloodAnalysis> = Section::err("Earth Engine not initialized");
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "Earth Engine not initialized" })
        );
    }

    #[test]
    fn section_data_serializes_transparently() {
        let section = Section::Data(VulnerabilityFactors::ZERO);
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["flood_risk"], 0.0);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn risk_level_factors() {
        assert!((RiskLevel::High.damage_factor() - 0.35).abs() < f64::EPSILON);
        assert!((RiskLevel::Low.vulnerability_factor() - 0.2).abs() < f64::EPSILON);
    }
}
