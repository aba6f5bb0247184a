//! Constructors for the concrete datasets the system queries.
//!
//! Collection identifiers, band names, and thresholds match the
//! upstream catalog. Date windows for the archive collections are
//! fixed; the precipitation composite uses a trailing window relative
//! to now.

use chrono::{Duration, Utc};

use crate::{BandMath, CollectionFilter, Composite, DateRange, ImageSpec, Threshold};

/// Sentinel-1 SAR backscatter collection.
pub const SENTINEL1_COLLECTION: &str = "COPERNICUS/S1_GRD";
/// Sentinel-2 surface reflectance collection.
pub const SENTINEL2_COLLECTION: &str = "COPERNICUS/S2_SR";
/// SRTM global 1 arc-second elevation image.
pub const SRTM_DATASET: &str = "USGS/SRTMGL1_003";
/// MODIS land cover classification image.
pub const MODIS_LANDCOVER_DATASET: &str = "MODIS/006/MCD12Q1/2020_01_01";
/// GPM IMERG precipitation collection.
pub const GPM_COLLECTION: &str = "NASA/GPM_L3/IMERG_V06";

/// Backscatter threshold in dB below which a pixel is treated as water.
pub const FLOOD_THRESHOLD_DB: f64 = -15.0;
/// Normalized-difference built-up index cutoff for built-up pixels.
pub const BUILT_UP_THRESHOLD: f64 = 0.1;
/// Maximum cloudy pixel percentage for optical composites.
pub const MAX_CLOUD_PERCENT: f64 = 20.0;

/// Archive window queried for Sentinel scenes.
fn archive_window() -> DateRange {
    DateRange {
        start: "2023-01-01".to_string(),
        end: "2024-12-31".to_string(),
    }
}

/// Most recent Sentinel-1 VV backscatter thresholded at
/// [`FLOOD_THRESHOLD_DB`], producing a water mask. The zonal mean of
/// the mask is the flooded fraction.
#[must_use]
pub fn flood_mask() -> ImageSpec {
    ImageSpec {
        dataset: SENTINEL1_COLLECTION.to_string(),
        date_range: Some(archive_window()),
        filters: vec![CollectionFilter::PropertyEquals {
            name: "instrumentMode".to_string(),
            value: "IW".to_string(),
        }],
        composite: Some(Composite::MostRecent),
        band: Some("VV".to_string()),
        band_math: None,
        threshold: Some(Threshold::LessThan {
            value: FLOOD_THRESHOLD_DB,
        }),
    }
}

/// SRTM elevation in meters.
#[must_use]
pub fn elevation() -> ImageSpec {
    ImageSpec {
        dataset: SRTM_DATASET.to_string(),
        date_range: None,
        filters: Vec::new(),
        composite: None,
        band: Some("elevation".to_string()),
        band_math: None,
        threshold: None,
    }
}

/// Cloud-filtered Sentinel-2 median composite, no band selection.
#[must_use]
pub fn optical_composite() -> ImageSpec {
    ImageSpec {
        dataset: SENTINEL2_COLLECTION.to_string(),
        date_range: Some(archive_window()),
        filters: vec![CollectionFilter::CloudCoverLessThan {
            percent: MAX_CLOUD_PERCENT,
        }],
        composite: Some(Composite::Median),
        band: None,
        band_math: None,
        threshold: None,
    }
}

/// Built-up mask: NDBI `(B11 - B8) / (B11 + B8)` over the optical
/// composite, thresholded at [`BUILT_UP_THRESHOLD`]. The zonal mean of
/// the mask is the built-up fraction, keyed by the SWIR band `B11`.
#[must_use]
pub fn built_up_mask() -> ImageSpec {
    ImageSpec {
        band_math: Some(BandMath::NormalizedDifference {
            positive: "B11".to_string(),
            negative: "B8".to_string(),
        }),
        threshold: Some(Threshold::GreaterThan {
            value: BUILT_UP_THRESHOLD,
        }),
        ..optical_composite()
    }
}

/// Vegetation index (NDVI) over the optical composite.
#[must_use]
pub fn vegetation_index() -> ImageSpec {
    ImageSpec {
        band_math: Some(BandMath::NormalizedDifference {
            positive: "B8".to_string(),
            negative: "B4".to_string(),
        }),
        ..optical_composite()
    }
}

/// MODIS land cover classification.
#[must_use]
pub fn land_cover() -> ImageSpec {
    ImageSpec {
        dataset: MODIS_LANDCOVER_DATASET.to_string(),
        date_range: None,
        filters: Vec::new(),
        composite: None,
        band: Some("LC_Type1".to_string()),
        band_math: None,
        threshold: None,
    }
}

/// Total GPM IMERG precipitation over the trailing `days` window.
#[must_use]
pub fn recent_precipitation(days: i64) -> ImageSpec {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(days);
    ImageSpec {
        dataset: GPM_COLLECTION.to_string(),
        date_range: Some(DateRange {
            start: start.format("%Y-%m-%d").to_string(),
            end: end.format("%Y-%m-%d").to_string(),
        }),
        filters: Vec::new(),
        composite: Some(Composite::Sum),
        band: Some("precipitationCal".to_string()),
        band_math: None,
        threshold: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_mask_thresholds_vv_backscatter() {
        let spec = flood_mask();
        assert_eq!(spec.dataset, SENTINEL1_COLLECTION);
        assert_eq!(spec.band.as_deref(), Some("VV"));
        assert_eq!(spec.composite, Some(Composite::MostRecent));
        assert_eq!(
            spec.threshold,
            Some(Threshold::LessThan { value: -15.0 })
        );
    }

    #[test]
    fn built_up_mask_is_thresholded_ndbi() {
        let spec = built_up_mask();
        assert_eq!(spec.dataset, SENTINEL2_COLLECTION);
        assert_eq!(
            spec.band_math,
            Some(BandMath::NormalizedDifference {
                positive: "B11".to_string(),
                negative: "B8".to_string(),
            })
        );
        assert_eq!(
            spec.threshold,
            Some(Threshold::GreaterThan { value: 0.1 })
        );
        assert!(
            spec.filters
                .iter()
                .any(|f| matches!(f, CollectionFilter::CloudCoverLessThan { .. }))
        );
    }

    #[test]
    fn precipitation_window_is_trailing() {
        let spec = recent_precipitation(30);
        let range = spec.date_range.expect("date range");
        assert!(range.start < range.end);
        assert_eq!(spec.composite, Some(Composite::Sum));
    }
}
