//! Keyword-based intent classification.

use disaster_map_models::Intent;

/// Keyword sets checked in order; the first matching category wins.
/// The order is load-bearing — queries can match multiple sets, and
/// flood must win over building, building over social, social over
/// risk.
const INTENT_KEYWORDS: [(Intent, &[&str]); 4] = [
    (
        Intent::FloodAnalysis,
        &["flood", "flooding", "water", "inundation"],
    ),
    (
        Intent::BuildingDamage,
        &["building", "damage", "infrastructure", "structure"],
    ),
    (
        Intent::SocialVulnerability,
        &["vulnerability", "social", "population", "community"],
    ),
    (
        Intent::RiskAssessment,
        &["risk", "assessment", "evaluation"],
    ),
];

/// Classifies a free-text query into an analysis intent.
///
/// Pure and total — unmatched queries fall through to
/// [`Intent::GeneralAnalysis`].
#[must_use]
pub fn classify_intent(query: &str) -> Intent {
    let query_lower = query.to_lowercase();

    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|word| query_lower.contains(word)) {
            return intent;
        }
    }

    Intent::GeneralAnalysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_flood_queries() {
        assert_eq!(
            classify_intent("Is this area at flood risk?"),
            Intent::FloodAnalysis
        );
        assert_eq!(
            classify_intent("show me water inundation"),
            Intent::FloodAnalysis
        );
    }

    #[test]
    fn classifies_building_queries() {
        assert_eq!(
            classify_intent("How many buildings are damaged?"),
            Intent::BuildingDamage
        );
    }

    #[test]
    fn classifies_social_queries() {
        assert_eq!(
            classify_intent("What is the community vulnerability here?"),
            Intent::SocialVulnerability
        );
    }

    #[test]
    fn classifies_risk_queries() {
        assert_eq!(
            classify_intent("Give me a risk assessment"),
            Intent::RiskAssessment
        );
    }

    #[test]
    fn defaults_to_general() {
        assert_eq!(
            classify_intent("Tell me about this place"),
            Intent::GeneralAnalysis
        );
    }

    #[test]
    fn flood_wins_over_later_categories() {
        // Matches both flood and risk keyword sets; flood is checked
        // first.
        assert_eq!(
            classify_intent("assess the flood risk"),
            Intent::FloodAnalysis
        );
        // Matches building and risk; building is checked first.
        assert_eq!(
            classify_intent("risk of building collapse"),
            Intent::BuildingDamage
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_intent("FLOODING"), Intent::FloodAnalysis);
    }
}
