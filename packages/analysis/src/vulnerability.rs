//! Composite Social Vulnerability Index.

use disaster_map_models::{
    BuildingAnalysis, FloodAnalysis, SocialVulnerability, VulnerabilityCategory,
    VulnerabilityFactors,
};

use crate::round3;

/// Factor weights: flood risk, building density, elevation risk,
/// infrastructure access.
const WEIGHTS: [f64; 4] = [0.3, 0.2, 0.3, 0.2];

/// Combines the flood and building outputs into a social vulnerability
/// score.
///
/// Pure and total: missing inputs leave their factors at zero, and when
/// both inputs are absent the result is the all-zero index rather than
/// a synthetic baseline.
#[must_use]
pub fn compute_social_vulnerability(
    flood: Option<&FloodAnalysis>,
    building: Option<&BuildingAnalysis>,
) -> SocialVulnerability {
    let factors = if flood.is_none() && building.is_none() {
        VulnerabilityFactors::ZERO
    } else {
        let (flood_risk, elevation_risk) = flood.map_or((0.0, 0.0), |f| {
            (
                f.risk_level.vulnerability_factor(),
                elevation_risk(f.average_elevation),
            )
        });
        let building_density =
            building.map_or(0.0, |b| (b.built_up_percentage / 100.0).min(1.0) * 0.6);

        VulnerabilityFactors {
            flood_risk,
            building_density,
            elevation_risk,
            infrastructure_access: (1.0 - building_density).max(0.3),
        }
    };

    let score = round3(
        factors.flood_risk * WEIGHTS[0]
            + factors.building_density * WEIGHTS[1]
            + factors.elevation_risk * WEIGHTS[2]
            + factors.infrastructure_access * WEIGHTS[3],
    );
    let category = VulnerabilityCategory::from_score(score);

    SocialVulnerability {
        score,
        description: format!(
            "Social vulnerability is {} based on flood risk, building density, and elevation factors.",
            category.to_string().to_lowercase()
        ),
        category,
        factors,
    }
}

/// Elevation vulnerability band: lower ground is more exposed.
fn elevation_risk(average_elevation: f64) -> f64 {
    if average_elevation < 10.0 {
        0.9
    } else if average_elevation < 50.0 {
        0.6
    } else if average_elevation < 100.0 {
        0.3
    } else {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use disaster_map_models::{Coordinates, RiskLevel};

    use super::*;

    fn flood(percentage: f64, elevation: f64, risk: RiskLevel) -> FloodAnalysis {
        FloodAnalysis {
            flood_percentage: percentage,
            average_elevation: elevation,
            risk_level: risk,
            coordinates: Coordinates::new(11.0168, 76.9558),
            analysis_radius: 5000.0,
        }
    }

    fn building(built_up: f64) -> BuildingAnalysis {
        BuildingAnalysis {
            total_buildings: 400,
            damaged_buildings: 60,
            built_up_percentage: built_up,
            damage_percentage: 15.0,
            coordinates: Coordinates::new(11.0168, 76.9558),
        }
    }

    #[test]
    fn combines_weighted_factors() {
        let flood = flood(12.5, 45.0, RiskLevel::Medium);
        let building = building(20.0);

        let svi = compute_social_vulnerability(Some(&flood), Some(&building));
        assert!((svi.factors.flood_risk - 0.5).abs() < f64::EPSILON);
        assert!((svi.factors.building_density - 0.12).abs() < 1e-9);
        assert!((svi.factors.elevation_risk - 0.6).abs() < f64::EPSILON);
        assert!((svi.factors.infrastructure_access - 0.88).abs() < 1e-9);
        assert!((svi.score - 0.53).abs() < 1e-9);
        assert_eq!(svi.category, VulnerabilityCategory::High);
        assert!(svi.description.contains("high"));
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let flood = flood(95.0, 2.0, RiskLevel::High);
        let building = building(100.0);

        let svi = compute_social_vulnerability(Some(&flood), Some(&building));
        assert!(svi.score >= 0.0 && svi.score <= 1.0);
        assert_eq!(svi.category, VulnerabilityCategory::High);
    }

    #[test]
    fn no_inputs_yields_zero_index() {
        let svi = compute_social_vulnerability(None, None);
        assert!(svi.score.abs() < f64::EPSILON);
        assert_eq!(svi.category, VulnerabilityCategory::Low);
        assert!((svi.factors.infrastructure_access).abs() < f64::EPSILON);
    }

    #[test]
    fn building_only_still_scores_infrastructure() {
        let building = building(50.0);
        let svi = compute_social_vulnerability(None, Some(&building));
        // density 0.3, access max(0.3, 0.7) = 0.7
        assert!((svi.factors.building_density - 0.3).abs() < 1e-9);
        assert!((svi.factors.infrastructure_access - 0.7).abs() < 1e-9);
        assert!(svi.factors.flood_risk.abs() < f64::EPSILON);
        assert!((svi.score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn infrastructure_access_floors_at_point_three() {
        let building = building(100.0);
        let svi = compute_social_vulnerability(None, Some(&building));
        // density capped at 0.6, access max(0.3, 0.4) = 0.4
        assert!((svi.factors.building_density - 0.6).abs() < 1e-9);
        assert!((svi.factors.infrastructure_access - 0.4).abs() < 1e-9);
    }

    #[test]
    fn elevation_bands() {
        assert!((elevation_risk(5.0) - 0.9).abs() < f64::EPSILON);
        assert!((elevation_risk(10.0) - 0.6).abs() < f64::EPSILON);
        assert!((elevation_risk(50.0) - 0.3).abs() < f64::EPSILON);
        assert!((elevation_risk(100.0) - 0.1).abs() < f64::EPSILON);
    }
}
