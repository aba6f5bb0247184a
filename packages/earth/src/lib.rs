#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earth Observation provider adapter.
//!
//! Wraps the remote imagery/statistics backend behind the
//! [`EarthObservationProvider`] trait: zonal statistics over a disk
//! around a point, and on-demand rendering of named visualization
//! layers. The analyzers and the tile proxy depend only on the trait,
//! so tests inject scripted providers instead of the HTTP
//! implementation.

pub mod datasets;
pub mod rest;

use std::collections::BTreeMap;

use disaster_map_models::{Coordinates, MapLayerHandle};
use serde::Serialize;
use thiserror::Error;

pub use rest::RestEarthEngine;

/// Canonical upstream tile endpoint for handles that carry a bare
/// `map_id`/token pair instead of a URL template.
pub const TILE_BASE_URL: &str =
    "https://earthengine.googleapis.com/v1alpha/projects/earthengine-legacy/maps";

/// Errors that can occur talking to the Earth Observation provider.
#[derive(Debug, Error)]
pub enum EarthError {
    /// The provider adapter is not ready; no query was attempted.
    #[error("Earth Engine not initialized")]
    NotInitialized,

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider returned an error status.
    #[error("Earth Engine error (HTTP {status}): {message}")]
    Upstream {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream error description.
        message: String,
    },
}

/// Aggregation applied to raster values within the query region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Mean of values in the region.
    Mean,
    /// Sum of values in the region.
    Sum,
}

/// Temporal filter applied to an image collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Inclusive start date, `YYYY-MM-DD`.
    pub start: String,
    /// Exclusive end date, `YYYY-MM-DD`.
    pub end: String,
}

/// Metadata filter applied to an image collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectionFilter {
    /// Keep images with cloudy pixel percentage below the value.
    CloudCoverLessThan {
        /// Maximum cloudy pixel percentage.
        percent: f64,
    },
    /// Keep images whose named property equals the value.
    PropertyEquals {
        /// Property name.
        name: String,
        /// Required value.
        value: String,
    },
}

/// How an image collection is collapsed to a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Composite {
    /// Per-pixel median of the collection.
    Median,
    /// The most recent image in the collection.
    MostRecent,
    /// Per-pixel sum of the collection.
    Sum,
}

/// Per-pixel arithmetic applied after compositing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandMath {
    /// `(positive - negative) / (positive + negative)`, the normalized
    /// difference index family (NDVI, NDBI, ...).
    NormalizedDifference {
        /// Band in the positive position.
        positive: String,
        /// Band in the negative position.
        negative: String,
    },
}

/// Binary threshold applied as the final step, producing a 0/1 mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Threshold {
    /// Mask pixels where the value is below the cutoff.
    LessThan {
        /// Cutoff value.
        value: f64,
    },
    /// Mask pixels where the value is above the cutoff.
    GreaterThan {
        /// Cutoff value.
        value: f64,
    },
}

/// Declarative description of the image the provider should compute.
///
/// Covers every shape the analyzers and layer generation need:
/// collection selection, temporal and metadata filtering, compositing,
/// band selection, band math, and thresholding. Constructors for the
/// concrete datasets live in [`datasets`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSpec {
    /// Dataset or collection identifier, e.g. `COPERNICUS/S1_GRD`.
    pub dataset: String,
    /// Temporal filter, when the dataset is a collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Metadata filters, when the dataset is a collection.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<CollectionFilter>,
    /// Compositing method, when the dataset is a collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<Composite>,
    /// Band to select before band math.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    /// Per-pixel arithmetic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_math: Option<BandMath>,
    /// Final binary threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
}

/// A zonal statistics request: reduce `image` over a disk of
/// `radius_m` meters around `center` at `scale_m` meters per pixel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalStatsQuery {
    /// The image to reduce.
    pub image: ImageSpec,
    /// Center of the disk.
    pub center: Coordinates,
    /// Disk radius in meters.
    pub radius_m: f64,
    /// Aggregation to apply.
    pub reducer: Reducer,
    /// Pixel scale in meters.
    pub scale_m: f64,
}

/// Visualization parameters for layer rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisParams {
    /// Bands to render (empty for single-band images).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<String>,
    /// Value mapped to the bottom of the palette.
    pub min: f64,
    /// Value mapped to the top of the palette.
    pub max: f64,
    /// Color palette names or hex values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
    /// Gamma correction, for true-color rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

/// Full description of one visualization layer to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    /// Cache key and URL path segment.
    pub layer_name: String,
    /// The image to render.
    pub image: ImageSpec,
    /// Center of the rendered region.
    pub center: Coordinates,
    /// Clip radius around the center in meters.
    pub radius_m: f64,
    /// Visualization parameters.
    pub vis: VisParams,
    /// Display name for map legends.
    pub name: String,
    /// Short description of what the layer shows.
    pub description: String,
    /// Upstream dataset attribution.
    pub source: String,
}

/// Capability consumed by the analyzers and the tile proxy.
#[async_trait::async_trait]
pub trait EarthObservationProvider: Send + Sync {
    /// Whether the adapter is ready to serve queries. Callers must
    /// check this and fail fast with [`EarthError::NotInitialized`]
    /// instead of attempting a query.
    fn initialized(&self) -> bool;

    /// Computes zonal statistics, returning a mapping from band name
    /// to reduced value.
    ///
    /// A missing band key means the dataset had no data for that band
    /// over the region; an empty map means no image matched the
    /// filters. Callers treat both as zero.
    ///
    /// # Errors
    ///
    /// Returns [`EarthError::NotInitialized`] when the adapter is not
    /// ready, or [`EarthError::Upstream`] on a provider-side failure.
    async fn query_zonal_stats(
        &self,
        query: &ZonalStatsQuery,
    ) -> Result<BTreeMap<String, f64>, EarthError>;

    /// Renders a visualization layer and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`EarthError::NotInitialized`] when the adapter is not
    /// ready, or [`EarthError::Upstream`] on a provider-side failure.
    async fn render_layer(&self, spec: &LayerSpec) -> Result<MapLayerHandle, EarthError>;
}
