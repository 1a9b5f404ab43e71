//! Typed errors for the scrape pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The browser could not be started at all.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// Every loading strategy was exhausted.
    #[error("failed to load page after {attempts} attempts: {details}")]
    StrategiesExhausted { attempts: usize, details: String },

    /// Browser protocol error outside of navigation (page setup, eval).
    #[error("browser error: {0}")]
    Browser(String),
}

/// Errors from the hosted language model.
///
/// These never escape the extractor; they are absorbed into a
/// placeholder record, but the message stays inspectable.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("model request failed: {0}")]
    Http(String),

    /// Non-success status from the model API.
    #[error("model API error: {0}")]
    Api(String),

    /// The API answered with no choices / empty content.
    #[error("no response from model")]
    Empty,

    /// Client-side deadline on the model call.
    #[error("model request timed out after {0}s")]
    Timeout(u64),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
