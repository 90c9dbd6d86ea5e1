#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/marketdata-rs/marketdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified market data source interface.
//!
//! This crate re-exports the core types and the provider implementations,
//! and provides a [`SourceRegistry`] for managing multiple sources with
//! ordered fallback.
//!
//! # Features
//!
//! - `tushare` - Tushare Pro source for China A-share data (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use marketdata::{SourceRegistry, Dataset, FetchRequest, BarFrequency};
//!
//! #[tokio::main]
//! async fn main() -> marketdata::Result<()> {
//!     let registry = SourceRegistry::new().with_tushare("your_api_token");
//!
//!     let request = FetchRequest::new()
//!         .with_symbol("600000")
//!         .with_frequency(BarFrequency::Daily);
//!
//!     let bars = registry.fetch(Dataset::History, request).await?;
//!     println!("{bars}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use marketdata_core::*;

// Sources
#[cfg(feature = "tushare")]
pub use marketdata_tushare::TushareSource;

mod registry;
pub use registry::SourceRegistry;
