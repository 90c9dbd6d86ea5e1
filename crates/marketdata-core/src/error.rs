//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when requesting, fetching, or normalizing market data.

use thiserror::Error;

/// Errors that can occur during data operations.
///
/// Variants fall into two groups. Caller errors (`InvalidParameter`,
/// `UnsupportedDataset`, `UnsupportedFrequency`) are raised before any
/// provider call and are never retried. Provider failures (`Network`,
/// `RateLimited`, `Parse`, `Other`) are transient from the caller's point of
/// view and are subject to a [`RetryPolicy`](crate::retry::RetryPolicy).
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The source that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested dataset is not in the supported set.
    #[error("Unsupported dataset: {0}")]
    UnsupportedDataset(String),

    /// The requested bar frequency is not in the supported set.
    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    /// Caller-supplied parameters are invalid for the requested dataset.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No registered source can serve the request.
    #[error("Source not configured: {0}")]
    SourceNotConfigured(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
