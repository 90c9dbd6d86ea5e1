//! Core data types for market data requests.
//!
//! This module defines:
//!
//! - [`Symbol`] - Bare instrument identifier
//! - [`Dataset`] - The closed set of fetchable datasets
//! - [`FetchRequest`] - Parameters for a single fetch

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::frequency::BarFrequency;

/// Earliest date used when a request omits `start_date`.
///
/// A fixed historical floor lets callers ask for "everything up to now"
/// without knowing provider-specific earliest availability.
#[must_use]
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date")
}

/// A bare instrument identifier, without any exchange qualification.
///
/// Providers that need a market-qualified identifier derive it from the bare
/// code; normalized tables always carry the bare code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A fetchable dataset.
///
/// Parsing accepts the aliases `history` and `ohlcv` for price bars, and
/// `adjust_factor` for corporate adjustment factors; anything else is
/// rejected with [`DataError::UnsupportedDataset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    /// Historical OHLCV price bars.
    #[serde(rename = "history")]
    History,
    /// Corporate adjustment factors.
    #[serde(rename = "adjust_factor")]
    AdjustFactor,
}

impl Dataset {
    /// Returns the canonical dataset name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::History => "history",
            Self::AdjustFactor => "adjust_factor",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "history" | "ohlcv" => Ok(Self::History),
            "adjust_factor" => Ok(Self::AdjustFactor),
            other => Err(DataError::UnsupportedDataset(other.to_string())),
        }
    }
}

/// Parameters for a single fetch.
///
/// All fields are optional at this level; each dataset handler enforces its
/// own requirements and rejects violations with
/// [`DataError::InvalidParameter`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchRequest {
    /// Instrument to fetch.
    pub symbol: Option<Symbol>,
    /// First day of the requested window.
    pub start_date: Option<NaiveDate>,
    /// Last day of the requested window.
    pub end_date: Option<NaiveDate>,
    /// Single-day shortcut; conflicts with an explicit start or end.
    pub trade_date: Option<NaiveDate>,
    /// Bar frequency, required for price history.
    pub frequency: Option<BarFrequency>,
    /// Field subset filter.
    pub fields: Option<Vec<String>>,
}

impl FetchRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instrument.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Sets the first day of the window.
    #[must_use]
    pub const fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Sets the last day of the window.
    #[must_use]
    pub const fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Sets the single-day shortcut.
    #[must_use]
    pub const fn with_trade_date(mut self, day: NaiveDate) -> Self {
        self.trade_date = Some(day);
        self
    }

    /// Sets the bar frequency.
    #[must_use]
    pub const fn with_frequency(mut self, frequency: BarFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Sets the field subset filter.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Resolves the requested date window.
    ///
    /// `trade_date` alone resolves to a one-day window; combining it with an
    /// explicit `start_date` or `end_date` is a contract violation. A
    /// missing start defaults to [`default_start_date`]; a missing end
    /// defaults to the current UTC date. A resolved window with
    /// `start > end` is rejected.
    pub fn window(&self) -> crate::error::Result<(NaiveDate, NaiveDate)> {
        if let Some(day) = self.trade_date {
            if self.start_date.is_some() || self.end_date.is_some() {
                return Err(DataError::InvalidParameter(
                    "trade_date cannot be combined with start_date or end_date".to_string(),
                ));
            }
            return Ok((day, day));
        }

        let start = self.start_date.unwrap_or_else(default_start_date);
        let end = self.end_date.unwrap_or_else(|| Utc::now().date_naive());
        if start > end {
            return Err(DataError::InvalidParameter(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dataset_aliases() {
        assert_eq!("history".parse::<Dataset>().unwrap(), Dataset::History);
        assert_eq!("ohlcv".parse::<Dataset>().unwrap(), Dataset::History);
        assert_eq!(
            "adjust_factor".parse::<Dataset>().unwrap(),
            Dataset::AdjustFactor
        );
    }

    #[test]
    fn test_dataset_rejects_unknown_name() {
        match "nonexistent".parse::<Dataset>().unwrap_err() {
            DataError::UnsupportedDataset(name) => assert_eq!(name, "nonexistent"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_window_defaults() {
        let request = FetchRequest::new().with_end_date(date(2024, 6, 1));
        let (start, end) = request.window().unwrap();
        assert_eq!(start, default_start_date());
        assert_eq!(end, date(2024, 6, 1));
    }

    #[test]
    fn test_window_trade_date_shortcut() {
        let request = FetchRequest::new().with_trade_date(date(2024, 3, 15));
        assert_eq!(
            request.window().unwrap(),
            (date(2024, 3, 15), date(2024, 3, 15))
        );
    }

    #[test]
    fn test_window_trade_date_conflicts_with_range() {
        let request = FetchRequest::new()
            .with_trade_date(date(2024, 3, 15))
            .with_start_date(date(2024, 1, 1));
        assert!(matches!(
            request.window(),
            Err(DataError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let request = FetchRequest::new()
            .with_start_date(date(2024, 6, 1))
            .with_end_date(date(2024, 1, 1));
        assert!(matches!(
            request.window(),
            Err(DataError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_symbol_roundtrip() {
        let symbol = Symbol::from("600000");
        assert_eq!(symbol.as_str(), "600000");
        assert_eq!(symbol.to_string(), "600000");
    }
}
