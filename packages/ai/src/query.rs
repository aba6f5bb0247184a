//! Natural-language query processing with graceful degradation.

use disaster_map_models::{AiAnalysis, Coordinates, Intent};

use crate::intent::classify_intent;
use crate::providers::CompletionProvider;

/// Confidence reported for a genuine completion.
const COMPLETION_CONFIDENCE: f64 = 0.9;

/// Confidence reported for the canned fallback response.
const FALLBACK_CONFIDENCE: f64 = 0.7;

/// Fixed response text used when no completion provider is reachable.
#[must_use]
pub const fn fallback_response(intent: Intent) -> &'static str {
    match intent {
        Intent::FloodAnalysis => {
            "Analyzing flood vulnerability using satellite data and elevation models. \
             This includes water detection from SAR imagery and topographic analysis."
        }
        Intent::BuildingDamage => {
            "Assessing building damage potential using optical satellite imagery and \
             building footprint detection algorithms."
        }
        Intent::SocialVulnerability => {
            "Evaluating social vulnerability using demographic data and infrastructure \
             proximity analysis."
        }
        Intent::RiskAssessment => {
            "Conducting comprehensive risk assessment combining flood probability, \
             building exposure, and population vulnerability."
        }
        Intent::GeneralAnalysis => {
            "Performing general disaster risk analysis using available geospatial \
             datasets and Earth observation data."
        }
    }
}

/// Suggested follow-up actions for an intent.
#[must_use]
pub fn suggested_actions(intent: Intent) -> Vec<String> {
    let actions: [&str; 4] = match intent {
        Intent::FloodAnalysis => [
            "View flood risk zones on map",
            "Check historical flood data",
            "Analyze drainage patterns",
            "Assess elevation vulnerability",
        ],
        Intent::BuildingDamage => [
            "Identify vulnerable structures",
            "Calculate exposure metrics",
            "Map critical infrastructure",
            "Estimate repair costs",
        ],
        Intent::SocialVulnerability => [
            "Map population density",
            "Identify vulnerable communities",
            "Assess evacuation routes",
            "Locate emergency facilities",
        ],
        Intent::RiskAssessment => [
            "Generate risk report",
            "Create vulnerability map",
            "Plan mitigation strategies",
            "Design early warning system",
        ],
        Intent::GeneralAnalysis => [
            "Analyze available data",
            "Generate basic report",
            "View satellite imagery",
            "Export analysis results",
        ],
    };
    actions.iter().map(ToString::to_string).collect()
}

/// Builds the system context for a completion request.
fn system_context(coordinates: Option<Coordinates>) -> String {
    let mut context =
        "You are an expert in disaster risk assessment and geospatial analysis.".to_string();
    if let Some(coords) = coordinates {
        context.push_str(&format!(
            " The user is asking about location: {}, {}.",
            coords.lat, coords.lng
        ));
    }
    context
}

/// Processes a natural-language query about disaster analysis.
///
/// Classifies the intent, then requests a completion when a provider is
/// present. Any completion failure degrades to the canned per-intent
/// response with reduced confidence — this function never fails.
pub async fn process_natural_query(
    provider: Option<&dyn CompletionProvider>,
    query: &str,
    coordinates: Option<Coordinates>,
) -> AiAnalysis {
    let intent = classify_intent(query);

    if let Some(provider) = provider {
        let context = system_context(coordinates);
        let prompt = format!("Analyze this disaster-related query: {query}");
        match provider.complete(&context, &prompt).await {
            Ok(response) => {
                return AiAnalysis {
                    intent,
                    ai_response: response,
                    confidence: COMPLETION_CONFIDENCE,
                    suggested_actions: suggested_actions(intent),
                };
            }
            Err(e) => {
                log::warn!("AI completion failed, falling back to canned response: {e}");
            }
        }
    }

    AiAnalysis {
        intent,
        ai_response: fallback_response(intent).to_string(),
        confidence: FALLBACK_CONFIDENCE,
        suggested_actions: suggested_actions(intent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AiError;

    struct CannedProvider {
        response: Result<String, ()>,
    }

    #[async_trait::async_trait]
    impl CompletionProvider for CannedProvider {
        async fn complete(&self, _system: &str, _query: &str) -> Result<String, AiError> {
            self.response
                .clone()
                .map_err(|()| AiError::Provider {
                    message: "provider down".to_string(),
                })
        }
    }

    #[tokio::test]
    async fn uses_completion_when_provider_succeeds() {
        let provider = CannedProvider {
            response: Ok("The area shows moderate flood exposure.".to_string()),
        };
        let analysis =
            process_natural_query(Some(&provider), "Is this area at flood risk?", None).await;

        assert_eq!(analysis.intent, Intent::FloodAnalysis);
        assert_eq!(analysis.ai_response, "The area shows moderate flood exposure.");
        assert!((analysis.confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(analysis.suggested_actions.len(), 4);
    }

    #[tokio::test]
    async fn falls_back_when_provider_errors() {
        let provider = CannedProvider { response: Err(()) };
        let analysis =
            process_natural_query(Some(&provider), "Is this area at flood risk?", None).await;

        assert_eq!(analysis.intent, Intent::FloodAnalysis);
        assert_eq!(
            analysis.ai_response,
            fallback_response(Intent::FloodAnalysis)
        );
        assert!((analysis.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn falls_back_without_provider() {
        let analysis = process_natural_query(None, "building damage?", None).await;

        assert_eq!(analysis.intent, Intent::BuildingDamage);
        assert!((analysis.confidence - 0.7).abs() < f64::EPSILON);
        assert_eq!(
            analysis.suggested_actions[0],
            "Identify vulnerable structures"
        );
    }

    #[tokio::test]
    async fn intent_is_deterministic_regardless_of_provider() {
        let up = CannedProvider {
            response: Ok("ok".to_string()),
        };
        let down = CannedProvider { response: Err(()) };

        let query = "Is this area at flood risk?";
        let with_provider = process_natural_query(Some(&up), query, None).await;
        let degraded = process_natural_query(Some(&down), query, None).await;
        let without = process_natural_query(None, query, None).await;

        assert_eq!(with_provider.intent, Intent::FloodAnalysis);
        assert_eq!(degraded.intent, Intent::FloodAnalysis);
        assert_eq!(without.intent, Intent::FloodAnalysis);
    }

    #[test]
    fn system_context_includes_location() {
        let context = system_context(Some(Coordinates::new(11.0168, 76.9558)));
        assert!(context.contains("11.0168, 76.9558"));
    }
}
