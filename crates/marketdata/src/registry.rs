//! Source registry for managing multiple data sources with fallback behavior.

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, warn};

use marketdata_core::{DataError, DataSource, Dataset, FetchRequest, Result};

/// Registry for managing multiple data sources with automatic fallback.
///
/// Sources are tried in registration order; the first one that supports the
/// requested dataset and returns data wins. Sources that do not support the
/// dataset are skipped.
///
/// # Example
///
/// ```rust,ignore
/// use marketdata::{SourceRegistry, Dataset, FetchRequest, BarFrequency};
///
/// let registry = SourceRegistry::new().with_tushare("your_api_token");
///
/// let bars = registry.fetch(
///     Dataset::History,
///     FetchRequest::new()
///         .with_symbol("600000")
///         .with_frequency(BarFrequency::Daily),
/// ).await?;
/// ```
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn DataSource>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data source.
    pub fn register(&mut self, source: Arc<dyn DataSource>) {
        debug!(source = source.name(), "Registering data source");
        self.sources.push(source);
    }

    /// Fetch a dataset, trying sources in order until one succeeds.
    pub async fn fetch(&self, dataset: Dataset, request: FetchRequest) -> Result<DataFrame> {
        if self.sources.is_empty() {
            return Err(DataError::SourceNotConfigured(
                "No data sources registered".to_string(),
            ));
        }

        let mut last_error = None;
        for source in &self.sources {
            if !source.supported_datasets().contains(&dataset) {
                continue;
            }

            debug!(source = source.name(), dataset = %dataset, "Fetching dataset");

            match source.fetch(dataset, request.clone()).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DataError::SourceNotConfigured(format!(
                "No registered source supports dataset {dataset}"
            ))
        }))
    }

    // Builder methods for easy setup with specific sources

    /// Add the Tushare Pro source.
    #[cfg(feature = "tushare")]
    #[must_use]
    pub fn with_tushare(mut self, token: impl Into<String>) -> Self {
        self.register(Arc::new(marketdata_tushare::TushareSource::new(token)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    #[derive(Debug)]
    struct StubSource {
        name: &'static str,
        datasets: &'static [Dataset],
        fail: bool,
    }

    #[async_trait]
    impl DataSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "stub source"
        }

        fn supported_datasets(&self) -> &[Dataset] {
            self.datasets
        }

        async fn fetch(&self, _dataset: Dataset, _request: FetchRequest) -> Result<DataFrame> {
            if self.fail {
                Err(DataError::Network("stub offline".to_string()))
            } else {
                Ok(DataFrame::empty())
            }
        }
    }

    #[tokio::test]
    async fn test_empty_registry_fails() {
        let registry = SourceRegistry::new();
        let result = registry
            .fetch(Dataset::History, FetchRequest::new())
            .await;
        assert!(matches!(result, Err(DataError::SourceNotConfigured(_))));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_source() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(StubSource {
            name: "first",
            datasets: &[Dataset::History],
            fail: true,
        }));
        registry.register(Arc::new(StubSource {
            name: "second",
            datasets: &[Dataset::History],
            fail: false,
        }));

        let result = registry.fetch(Dataset::History, FetchRequest::new()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_skips_sources_without_dataset() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(StubSource {
            name: "factors-only",
            datasets: &[Dataset::AdjustFactor],
            fail: false,
        }));

        let result = registry.fetch(Dataset::History, FetchRequest::new()).await;
        assert!(matches!(result, Err(DataError::SourceNotConfigured(_))));
    }

    #[tokio::test]
    async fn test_all_sources_failing_returns_last_error() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(StubSource {
            name: "only",
            datasets: &[Dataset::History, Dataset::AdjustFactor],
            fail: true,
        }));

        let result = registry.fetch(Dataset::History, FetchRequest::new()).await;
        assert!(matches!(result, Err(DataError::Network(_))));
    }

    #[cfg(feature = "tushare")]
    #[tokio::test]
    async fn test_registered_source_validates_request() {
        // A registered source receives the request; contract violations
        // surface through the registry as the last error.
        let registry = SourceRegistry::new().with_tushare("token");
        let result = registry
            .fetch(Dataset::History, FetchRequest::new())
            .await;
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));
    }

    #[cfg(feature = "tushare")]
    #[test]
    fn test_debug_lists_source_names() {
        let registry = SourceRegistry::new().with_tushare("token");
        let debug_str = format!("{registry:?}");
        assert!(debug_str.contains("Tushare"));
        assert!(!debug_str.contains("token"));
    }
}
