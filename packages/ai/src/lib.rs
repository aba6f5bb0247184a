#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Natural-language layer for the disaster-map system.
//!
//! Provides the text completion provider abstraction (Anthropic Claude
//! or `OpenAI`, selected via the `AI_PROVIDER` environment variable or
//! auto-detected from credentials), rule-based intent classification,
//! canned fallback responses for when no provider is reachable, and
//! generation of the textual summary report.
//!
//! Completion failures never propagate: every path through
//! [`query::process_natural_query`] degrades to the canned response.

pub mod intent;
pub mod providers;
pub mod query;
pub mod report;

use thiserror::Error;

/// Errors that can occur during completion provider operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
