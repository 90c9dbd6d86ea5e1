//! Data source trait.
//!
//! A data source is the capability set `{fetch}` implemented per provider:
//! it knows how to reach one remote provider, how to split a requested span
//! into windows the provider accepts, and how to normalize the provider's
//! raw responses into the canonical table schema.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Dataset, FetchRequest},
};

/// A remote market-data provider.
///
/// `fetch` is stateless across calls: each invocation independently resolves
/// the request window, plans chunks, executes one retried provider call per
/// chunk, and concatenates the normalized chunks in chronological order. It
/// returns either the complete requested table or an error; a multi-chunk
/// fetch that fails partway never returns a partial result.
///
/// The returned `DataFrame` carries, per row: `symbol` (bare identifier),
/// `date` (polars `Date`), `time` (millisecond `Datetime`, intraday price
/// bars only), and either the OHLCV columns `open`/`high`/`low`/`close`/
/// `prev`/`volume`/`amount` or the single `adj_factor` column, depending on
/// the dataset. Rows are sorted ascending by `date` (then `time`).
#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g. "Tushare").
    fn name(&self) -> &str;

    /// Returns a description of this source.
    fn description(&self) -> &str;

    /// Returns the datasets this source can serve.
    fn supported_datasets(&self) -> &[Dataset];

    /// Fetches one dataset as a canonical table.
    async fn fetch(&self, dataset: Dataset, request: FetchRequest) -> Result<DataFrame>;
}
