#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/marketdata-rs/marketdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for market data sources.
//!
//! This crate provides the foundational abstractions for fetching financial
//! time series from rate-limited remote providers:
//!
//! - [`DataSource`](source::DataSource) - Capability trait implemented per provider
//! - [`FetchRequest`](types::FetchRequest) - Parameters for a single fetch
//! - [`split_date_range`](range::split_date_range) - Chunking for providers with bounded request windows
//! - [`RetryPolicy`](retry::RetryPolicy) - Retry wrapper around provider calls

/// Error types for data operations.
pub mod error;
/// Bar frequency definitions.
pub mod frequency;
/// Date ranges and range splitting.
pub mod range;
/// Retry policy for provider calls.
pub mod retry;
/// Data source trait.
pub mod source;
/// Core data types (Symbol, Dataset, FetchRequest).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DataError, Result};
pub use frequency::BarFrequency;
pub use range::{DateRange, SplitPeriod, split_date_range};
pub use retry::RetryPolicy;
pub use source::DataSource;
pub use types::{Dataset, FetchRequest, Symbol};
