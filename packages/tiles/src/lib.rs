#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map layer cache and tile proxy.
//!
//! Rendered layer handles are short-lived upstream artifacts, so the
//! cache regenerates the whole layer group on a miss and publishes the
//! new map atomically. The proxy turns cached handles into upstream
//! tile URLs and streams the raw tile bytes back.

mod cache;
mod layers;
mod proxy;

use disaster_map_earth::EarthError;
use thiserror::Error;

pub use cache::LayerCache;
pub use layers::{LayerGroup, generate_layers};
pub use proxy::TileProxy;

/// Errors that can occur serving a tile.
#[derive(Debug, Error)]
pub enum TileError {
    /// The requested layer does not exist, even after regeneration.
    #[error("Layer '{layer}' not found")]
    LayerNotFound {
        /// The requested layer name.
        layer: String,
    },

    /// The upstream tile fetch failed.
    #[error("Failed to fetch tile from upstream (HTTP {status}): {message}")]
    UpstreamFetch {
        /// Upstream HTTP status, 502 for transport failures.
        status: u16,
        /// Failure description.
        message: String,
    },

    /// Layer regeneration failed; the cache was left untouched.
    #[error("Layer generation failed: {0}")]
    Generation(#[from] EarthError),
}
