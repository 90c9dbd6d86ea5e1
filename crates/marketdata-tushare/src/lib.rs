#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/marketdata-rs/marketdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Tushare Pro data source.
//!
//! This crate implements the marketdata-core [`DataSource`] trait for the
//! [Tushare Pro](https://tushare.pro/) API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use marketdata_tushare::TushareSource;
//! use marketdata_core::{DataSource, Dataset, FetchRequest, BarFrequency};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = TushareSource::new("your_api_token");
//!
//!     // Fetch five-minute bars across several years; the source splits the
//!     // span into windows the provider accepts and stitches them back.
//!     let request = FetchRequest::new()
//!         .with_symbol("600000")
//!         .with_start_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
//!         .with_end_date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
//!         .with_frequency(BarFrequency::Min5);
//!
//!     let bars = source.fetch(Dataset::History, request).await?;
//!     println!("{bars}");
//!
//!     Ok(())
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use marketdata_core::{
    BarFrequency, DataError, DataSource, Dataset, DateRange, FetchRequest, Result, RetryPolicy,
    SplitPeriod, Symbol, split_date_range,
};
use polars::prelude::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Endpoint for the Tushare Pro JSON API.
const TUSHARE_API_URL: &str = "http://api.tushare.pro";

/// Datasets this source can serve.
const SUPPORTED_DATASETS: &[Dataset] = &[Dataset::History, Dataset::AdjustFactor];

/// Provider limit on raw bars returned by one intraday call.
const INTRADAY_BAR_LIMIT: u32 = 10_000;

/// Trading minutes in one A-share session.
const TRADING_MINUTES_PER_DAY: u32 = 240;

/// Chunk span for the daily endpoint, which accepts arbitrary windows. Large
/// enough that any request resolves to a single chunk.
const DAILY_CHUNK_DAYS: u32 = 3_650_000;

/// Daily bars report volume in lots of 100 shares.
const SHARES_PER_LOT: f64 = 100.0;

/// Daily bars report turnover in thousands of yuan.
const YUAN_PER_AMOUNT_UNIT: f64 = 1000.0;

/// Tushare Pro data source.
///
/// Provides access to:
/// - Historical daily and intraday OHLCV bars
/// - Corporate adjustment factors
#[derive(Clone)]
pub struct TushareSource {
    client: Client,
    token: String,
    retry: RetryPolicy,
}

impl fmt::Debug for TushareSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TushareSource")
            .field("token", &"[REDACTED]")
            .field("retry", &self.retry)
            .finish()
    }
}

impl TushareSource {
    /// Create a new Tushare source with the given API token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a new Tushare source with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy applied to each provider call.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Make one API call and unwrap the columnar payload.
    async fn call(&self, api_name: &str, params: Value) -> Result<ResultSet> {
        debug!(api = api_name, "tushare request");

        let body = json!({
            "api_name": api_name,
            "token": self.token,
            "params": params,
        });

        let response = self
            .client
            .post(TUSHARE_API_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: "Tushare".to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            return Err(DataError::Network(format!("HTTP {}", response.status())));
        }

        let reply: ApiReply = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        if reply.code != 0 {
            return Err(DataError::Other(format!(
                "tushare error {}: {}",
                reply.code,
                reply.msg.unwrap_or_default()
            )));
        }

        reply
            .data
            .ok_or_else(|| DataError::Parse("response missing data payload".to_string()))
    }

    /// Fetch and normalize one chunk of daily bars.
    async fn daily_bars(&self, symbol: &Symbol, range: &DateRange) -> Result<DataFrame> {
        let data = self
            .call(
                "daily",
                json!({
                    "ts_code": market_code(symbol),
                    "start_date": compact_date(range.start),
                    "end_date": compact_date(range.end),
                }),
            )
            .await?;
        normalize_daily(data)
    }

    /// Fetch and normalize one chunk of intraday bars.
    async fn intraday_bars(
        &self,
        symbol: &Symbol,
        range: &DateRange,
        frequency: BarFrequency,
    ) -> Result<DataFrame> {
        let data = self
            .call(
                "stk_mins",
                json!({
                    "ts_code": market_code(symbol),
                    "freq": frequency.as_str(),
                    "start_date": format!("{} 09:00:00", range.start.format("%Y-%m-%d")),
                    "end_date": format!("{} 17:00:00", range.end.format("%Y-%m-%d")),
                }),
            )
            .await?;
        normalize_intraday(data)
    }

    /// Fetch and normalize adjustment factors for a window.
    async fn adjust_factors(&self, symbol: &Symbol, range: &DateRange) -> Result<DataFrame> {
        let data = self
            .call(
                "adj_factor",
                json!({
                    "ts_code": market_code(symbol),
                    "start_date": compact_date(range.start),
                    "end_date": compact_date(range.end),
                }),
            )
            .await?;
        normalize_adjust(data)
    }

    /// The `history` dataset handler.
    ///
    /// Splits the resolved window into chunks the provider accepts at the
    /// requested frequency, fetches the chunks sequentially (one retried
    /// call each), and concatenates them in range order. A chunk failure
    /// aborts the whole fetch; no partial table is ever returned.
    async fn fetch_history(&self, request: FetchRequest) -> Result<DataFrame> {
        let symbol = request
            .symbol
            .clone()
            .ok_or_else(|| DataError::InvalidParameter("history requires a symbol".to_string()))?;
        let frequency = request.frequency.ok_or_else(|| {
            DataError::InvalidParameter("history requires a frequency".to_string())
        })?;
        if request.fields.is_some() {
            return Err(DataError::InvalidParameter(
                "history does not support a field filter".to_string(),
            ));
        }

        let (start, end) = request.window()?;
        let ranges = split_date_range(start, end, SplitPeriod::Days(max_chunk_days(frequency)));
        debug!(
            symbol = %symbol,
            frequency = %frequency,
            chunks = ranges.len(),
            "fetching price history"
        );

        let mut frames = Vec::with_capacity(ranges.len());
        for range in &ranges {
            let frame = if frequency.is_intraday() {
                self.retry
                    .run(|| self.intraday_bars(&symbol, range, frequency))
                    .await?
            } else {
                self.retry.run(|| self.daily_bars(&symbol, range)).await?
            };
            frames.push(frame);
        }
        concat_chunks(frames)
    }

    /// The `adjust_factor` dataset handler.
    async fn fetch_adjust_factor(&self, request: FetchRequest) -> Result<DataFrame> {
        let symbol = request.symbol.clone().ok_or_else(|| {
            DataError::InvalidParameter("adjust_factor requires a symbol".to_string())
        })?;

        let (start, end) = request.window()?;
        let range = DateRange::new(start, end);
        debug!(symbol = %symbol, range = %range, "fetching adjustment factors");

        self.retry.run(|| self.adjust_factors(&symbol, &range)).await
    }
}

#[async_trait]
impl DataSource for TushareSource {
    fn name(&self) -> &str {
        "Tushare"
    }

    fn description(&self) -> &str {
        "Tushare Pro - China A-share market data"
    }

    fn supported_datasets(&self) -> &[Dataset] {
        SUPPORTED_DATASETS
    }

    async fn fetch(&self, dataset: Dataset, request: FetchRequest) -> Result<DataFrame> {
        match dataset {
            Dataset::History => self.fetch_history(request).await,
            Dataset::AdjustFactor => self.fetch_adjust_factor(request).await,
        }
    }
}

/// Derives the market-qualified Tushare code from a bare symbol.
///
/// The rule is total and depends only on the leading character: codes
/// starting with `6` get the Shanghai suffix (`.SH`); every other code gets
/// the Shenzhen suffix (`.SZ`), including codes from venues outside the two
/// exchanges this rule was derived from.
fn market_code(symbol: &Symbol) -> String {
    if symbol.as_str().starts_with('6') {
        format!("{symbol}.SH")
    } else {
        format!("{symbol}.SZ")
    }
}

/// Strips the exchange suffix from a market-qualified code.
fn bare_code(code: &str) -> String {
    code.split('.').next().unwrap_or(code).to_string()
}

/// Formats a date the way the daily endpoints expect it.
fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Maximum calendar days one provider call may cover at `frequency`.
///
/// The intraday endpoint returns at most [`INTRADAY_BAR_LIMIT`] bars per
/// call; with a fixed-length trading session that bounds the days a window
/// may span. Daily history goes through the same chunking machinery with a
/// span that always yields one chunk.
fn max_chunk_days(frequency: BarFrequency) -> u32 {
    match frequency.bar_minutes() {
        Some(minutes) => INTRADAY_BAR_LIMIT / (TRADING_MINUTES_PER_DAY / minutes),
        None => DAILY_CHUNK_DAYS,
    }
}

/// Concatenates per-chunk frames in chunk order.
///
/// Chunks are disjoint and already chronological, and each frame is
/// intra-sorted during normalization, so no re-sort is needed here.
fn concat_chunks(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let frames: Vec<LazyFrame> = frames.into_iter().map(|df| df.lazy()).collect();
    concat(frames, UnionArgs::default())
        .map_err(|e| DataError::Other(e.to_string()))?
        .collect()
        .map_err(|e| DataError::Other(e.to_string()))
}

/// Normalizes one chunk of daily bars into the canonical schema.
///
/// Rows are sorted ascending by trade date, the exchange suffix is stripped
/// from the symbol, every numeric field is coerced to `f64`, and volume and
/// amount are converted from the provider's native lots and thousands of
/// yuan into shares and yuan.
fn normalize_daily(mut data: ResultSet) -> Result<DataFrame> {
    data.sort_rows("trade_date")?;

    let symbols: Vec<String> = data
        .str_column("ts_code")?
        .iter()
        .map(|code| bare_code(code))
        .collect();
    let dates = date_column(&data.str_column("trade_date")?)?;
    let opens = data.f64_column("open")?;
    let highs = data.f64_column("high")?;
    let lows = data.f64_column("low")?;
    let closes = data.f64_column("close")?;
    let prevs = data.f64_column("pre_close")?;
    let volumes: Vec<f64> = data
        .f64_column("vol")?
        .into_iter()
        .map(|v| v * SHARES_PER_LOT)
        .collect();
    let amounts: Vec<f64> = data
        .f64_column("amount")?
        .into_iter()
        .map(|v| v * YUAN_PER_AMOUNT_UNIT)
        .collect();

    let date_col = Column::new("date".into(), dates)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Other(e.to_string()))?;

    DataFrame::new(vec![
        Column::new("symbol".into(), symbols),
        date_col,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
        Column::new("amount".into(), amounts),
        Column::new("prev".into(), prevs),
    ])
    .map_err(|e| DataError::Other(e.to_string()))
}

/// Normalizes one chunk of intraday bars into the canonical schema.
///
/// Intraday bars already report volume in shares and amount in yuan, so no
/// unit conversion is applied.
fn normalize_intraday(mut data: ResultSet) -> Result<DataFrame> {
    data.sort_rows("trade_time")?;

    let symbols: Vec<String> = data
        .str_column("ts_code")?
        .iter()
        .map(|code| bare_code(code))
        .collect();
    let dates = date_column(&data.str_column("trade_date")?)?;
    let times = time_column(&data.str_column("trade_time")?)?;
    let opens = data.f64_column("open")?;
    let highs = data.f64_column("high")?;
    let lows = data.f64_column("low")?;
    let closes = data.f64_column("close")?;
    let prevs = data.f64_column("pre_close")?;
    let volumes = data.f64_column("vol")?;
    let amounts = data.f64_column("amount")?;

    let date_col = Column::new("date".into(), dates)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Other(e.to_string()))?;
    let time_col = Column::new("time".into(), times)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(|e| DataError::Other(e.to_string()))?;

    DataFrame::new(vec![
        Column::new("symbol".into(), symbols),
        date_col,
        time_col,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
        Column::new("amount".into(), amounts),
        Column::new("prev".into(), prevs),
    ])
    .map_err(|e| DataError::Other(e.to_string()))
}

/// Normalizes one window of adjustment factors into the canonical schema.
fn normalize_adjust(mut data: ResultSet) -> Result<DataFrame> {
    data.sort_rows("trade_date")?;

    let symbols: Vec<String> = data
        .str_column("ts_code")?
        .iter()
        .map(|code| bare_code(code))
        .collect();
    let dates = date_column(&data.str_column("trade_date")?)?;
    let factors = data.f64_column("adj_factor")?;

    let date_col = Column::new("date".into(), dates)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Other(e.to_string()))?;

    DataFrame::new(vec![
        Column::new("symbol".into(), symbols),
        date_col,
        Column::new("adj_factor".into(), factors),
    ])
    .map_err(|e| DataError::Other(e.to_string()))
}

/// Parses a trade date in either of the provider's wire formats.
fn parse_trade_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|e| DataError::Parse(format!("bad trade date {s:?}: {e}")))
}

/// Trade dates as days since the Unix epoch, for the polars `Date` dtype.
fn date_column(raw: &[String]) -> Result<Vec<i32>> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    raw.iter()
        .map(|s| parse_trade_date(s).map(|d| (d - epoch).num_days() as i32))
        .collect()
}

/// Trade times as epoch milliseconds, for the polars `Datetime` dtype.
fn time_column(raw: &[String]) -> Result<Vec<i64>> {
    raw.iter()
        .map(|s| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.and_utc().timestamp_millis())
                .map_err(|e| DataError::Parse(format!("bad trade time {s:?}: {e}")))
        })
        .collect()
}

// ============================================================================
// Tushare API Response Types
// ============================================================================

/// Top-level API reply envelope.
#[derive(Debug, Deserialize)]
struct ApiReply {
    code: i64,
    msg: Option<String>,
    data: Option<ResultSet>,
}

/// Columnar payload: row-major `items` with positions named by `fields`.
///
/// An empty `items` with a well-formed `fields` list is a valid empty
/// window, not a failure.
#[derive(Debug, Clone, Deserialize)]
struct ResultSet {
    fields: Vec<String>,
    items: Vec<Vec<Value>>,
}

impl ResultSet {
    fn index(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| DataError::Parse(format!("response missing field {name}")))
    }

    /// Sorts rows ascending by the named column's string form.
    ///
    /// Both wire formats for trade dates and times sort lexicographically in
    /// chronological order.
    fn sort_rows(&mut self, name: &str) -> Result<()> {
        let idx = self.index(name)?;
        self.items.sort_by(|a, b| {
            let a = a.get(idx).and_then(Value::as_str).unwrap_or("");
            let b = b.get(idx).and_then(Value::as_str).unwrap_or("");
            a.cmp(b)
        });
        Ok(())
    }

    fn str_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.index(name)?;
        self.items
            .iter()
            .map(|row| {
                row.get(idx)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| DataError::Parse(format!("field {name} is not a string")))
            })
            .collect()
    }

    /// A numeric column coerced to `f64` whatever its wire representation.
    fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.index(name)?;
        self.items
            .iter()
            .map(|row| coerce_f64(row.get(idx), name))
            .collect()
    }
}

/// Coerces a wire value to `f64`: numbers pass through, numeric strings are
/// parsed, nulls become NaN.
fn coerce_f64(value: Option<&Value>, name: &str) -> Result<f64> {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| DataError::Parse(format!("field {name} overflows f64"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| DataError::Parse(format!("field {name} has non-numeric value {s:?}"))),
        Some(Value::Null) | None => Ok(f64::NAN),
        Some(other) => Err(DataError::Parse(format!(
            "field {name} has non-numeric value {other}"
        ))),
    }
}
