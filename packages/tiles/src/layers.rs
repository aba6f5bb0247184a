//! Layer group definitions and batch rendering.

use std::collections::HashMap;

use disaster_map_earth::{
    EarthError, EarthObservationProvider, LayerSpec, VisParams, datasets,
};
use disaster_map_models::{Coordinates, MapLayerHandle};

/// Clip radius for the live layer set, in meters.
const LIVE_RADIUS_M: f64 = 5000.0;

/// Clip radius for the visualization layer set, in meters.
const VISUALIZATION_RADIUS_M: f64 = 10_000.0;

/// Trailing window for the precipitation layer, in days.
const PRECIPITATION_WINDOW_DAYS: i64 = 30;

/// A fixed, named set of layers that is always rendered and replaced
/// together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerGroup {
    /// Layers served through the tile proxy: elevation, land cover, and
    /// recent precipitation.
    Live,
    /// Layers for the map overview: true-color satellite, vegetation
    /// index, and elevation.
    Visualization,
}

impl LayerGroup {
    /// The specs for every layer in the group, centered on `center`.
    #[must_use]
    pub fn specs(self, center: Coordinates) -> Vec<LayerSpec> {
        match self {
            Self::Live => vec![
                LayerSpec {
                    layer_name: "elevation".to_string(),
                    image: datasets::elevation(),
                    center,
                    radius_m: LIVE_RADIUS_M,
                    vis: VisParams {
                        bands: Vec::new(),
                        min: 0.0,
                        max: 500.0,
                        palette: palette(&["blue", "cyan", "yellow", "red"]),
                        gamma: None,
                    },
                    name: "Elevation (SRTM)".to_string(),
                    description: "Digital elevation model showing terrain height".to_string(),
                    source: datasets::SRTM_DATASET.to_string(),
                },
                LayerSpec {
                    layer_name: "landcover".to_string(),
                    image: datasets::land_cover(),
                    center,
                    radius_m: LIVE_RADIUS_M,
                    vis: VisParams {
                        bands: Vec::new(),
                        min: 1.0,
                        max: 17.0,
                        palette: palette(&[
                            "green", "darkgreen", "brown", "yellow", "red", "blue",
                        ]),
                        gamma: None,
                    },
                    name: "Land Cover".to_string(),
                    description: "MODIS land cover classification".to_string(),
                    source: datasets::MODIS_LANDCOVER_DATASET.to_string(),
                },
                LayerSpec {
                    layer_name: "precipitation".to_string(),
                    image: datasets::recent_precipitation(PRECIPITATION_WINDOW_DAYS),
                    center,
                    radius_m: LIVE_RADIUS_M,
                    vis: VisParams {
                        bands: Vec::new(),
                        min: 0.0,
                        max: 50.0,
                        palette: palette(&["white", "lightblue", "blue", "darkblue"]),
                        gamma: None,
                    },
                    name: "Recent Precipitation".to_string(),
                    description: "Total precipitation in last 30 days".to_string(),
                    source: datasets::GPM_COLLECTION.to_string(),
                },
            ],
            Self::Visualization => vec![
                LayerSpec {
                    layer_name: "satellite".to_string(),
                    image: datasets::optical_composite(),
                    center,
                    radius_m: VISUALIZATION_RADIUS_M,
                    vis: VisParams {
                        bands: palette(&["B4", "B3", "B2"]),
                        min: 0.0,
                        max: 3000.0,
                        palette: Vec::new(),
                        gamma: Some(1.4),
                    },
                    name: "Satellite Imagery".to_string(),
                    description: "True color Sentinel-2 satellite imagery".to_string(),
                    source: "Copernicus Sentinel-2".to_string(),
                },
                LayerSpec {
                    layer_name: "vegetation".to_string(),
                    image: datasets::vegetation_index(),
                    center,
                    radius_m: VISUALIZATION_RADIUS_M,
                    vis: VisParams {
                        bands: Vec::new(),
                        min: -1.0,
                        max: 1.0,
                        palette: palette(&["blue", "white", "green"]),
                        gamma: None,
                    },
                    name: "Vegetation Index".to_string(),
                    description: "NDVI showing vegetation health".to_string(),
                    source: "Calculated from Sentinel-2".to_string(),
                },
                LayerSpec {
                    layer_name: "elevation".to_string(),
                    image: datasets::elevation(),
                    center,
                    radius_m: VISUALIZATION_RADIUS_M,
                    vis: VisParams {
                        bands: Vec::new(),
                        min: 0.0,
                        max: 1000.0,
                        palette: palette(&["blue", "green", "yellow", "red"]),
                        gamma: None,
                    },
                    name: "Elevation".to_string(),
                    description: "Digital elevation model".to_string(),
                    source: "SRTM Global 1 arc-second".to_string(),
                },
            ],
        }
    }
}

fn palette(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// Renders every layer of a group and returns the complete named map.
///
/// All-or-nothing: a single render failure fails the whole batch, so a
/// caller never publishes a partial group.
///
/// # Errors
///
/// Returns the first [`EarthError`] encountered while rendering.
pub async fn generate_layers(
    provider: &dyn EarthObservationProvider,
    center: Coordinates,
    group: LayerGroup,
) -> Result<HashMap<String, MapLayerHandle>, EarthError> {
    let mut layers = HashMap::new();
    for spec in group.specs(center) {
        let handle = provider.render_layer(&spec).await?;
        layers.insert(spec.layer_name, handle);
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_group_has_the_proxied_layers() {
        let specs = LayerGroup::Live.specs(Coordinates::new(11.0168, 76.9558));
        let names: Vec<&str> = specs.iter().map(|s| s.layer_name.as_str()).collect();
        assert_eq!(names, ["elevation", "landcover", "precipitation"]);
    }

    #[test]
    fn visualization_group_has_the_overview_layers() {
        let specs = LayerGroup::Visualization.specs(Coordinates::new(11.0168, 76.9558));
        let names: Vec<&str> = specs.iter().map(|s| s.layer_name.as_str()).collect();
        assert_eq!(names, ["satellite", "vegetation", "elevation"]);
    }

    #[test]
    fn satellite_layer_renders_true_color() {
        let specs = LayerGroup::Visualization.specs(Coordinates::new(0.0, 0.0));
        let satellite = specs.iter().find(|s| s.layer_name == "satellite").unwrap();
        assert_eq!(satellite.vis.bands, ["B4", "B3", "B2"]);
        assert_eq!(satellite.vis.gamma, Some(1.4));
    }
}
