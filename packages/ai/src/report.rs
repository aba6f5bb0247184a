//! Textual summary report generation.

use disaster_map_models::CompositeReport;

/// Placeholder emitted when no section has data.
const EMPTY_REPORT: &str = "Analysis report is being generated. Please check back shortly.";

/// Generates the textual summary for a composite report.
///
/// Concatenates a section per present analysis — slots carrying an
/// error marker are omitted. Returns a fixed placeholder sentence when
/// nothing is present.
#[must_use]
pub fn generate_report(report: &CompositeReport) -> String {
    let mut sections = Vec::new();

    if let Some(flood) = report.flood_analysis.as_ref().and_then(|s| s.data()) {
        sections.push(format!(
            "\n**Flood Risk Assessment:**\n\
             - Current flood coverage: {:.1}%\n\
             - Average elevation: {:.1}m\n\
             - Risk level: {}\n",
            flood.flood_percentage, flood.average_elevation, flood.risk_level
        ));
    }

    if let Some(building) = report.building_analysis.as_ref().and_then(|s| s.data()) {
        sections.push(format!(
            "\n**Building Damage Assessment:**\n\
             - Estimated buildings: {}\n\
             - Potentially damaged: {}\n\
             - Damage rate: {:.1}%\n",
            building.total_buildings, building.damaged_buildings, building.damage_percentage
        ));
    }

    sections.push(format!(
        "\n**Analysis Location:**\n\
         - Coordinates: {:.4}, {:.4}\n\
         - Analysis performed: {}\n",
        report.coordinates.lat,
        report.coordinates.lng,
        report.timestamp.to_rfc3339()
    ));

    if sections.is_empty() {
        EMPTY_REPORT.to_string()
    } else {
        sections.join("\n")
    }
}
