//! Bar frequency definitions.
//!
//! This module defines [`BarFrequency`], the closed set of sampling intervals
//! a caller may request for historical price bars.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Sampling interval of historical price bars.
///
/// Parses from and displays as the provider-facing tags `daily`, `1min`,
/// `5min`, `15min`, `30min`, `60min`. Any other tag is rejected with
/// [`DataError::UnsupportedFrequency`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarFrequency {
    /// One bar per trading day.
    #[serde(rename = "daily")]
    Daily,
    /// One-minute bars.
    #[serde(rename = "1min")]
    Min1,
    /// Five-minute bars.
    #[serde(rename = "5min")]
    Min5,
    /// Fifteen-minute bars.
    #[serde(rename = "15min")]
    Min15,
    /// Thirty-minute bars.
    #[serde(rename = "30min")]
    Min30,
    /// Sixty-minute bars.
    #[serde(rename = "60min")]
    Min60,
}

impl BarFrequency {
    /// Returns the provider-facing frequency tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Min1 => "1min",
            Self::Min5 => "5min",
            Self::Min15 => "15min",
            Self::Min30 => "30min",
            Self::Min60 => "60min",
        }
    }

    /// Returns the bar length in minutes, or `None` for daily bars.
    #[must_use]
    pub const fn bar_minutes(&self) -> Option<u32> {
        match self {
            Self::Daily => None,
            Self::Min1 => Some(1),
            Self::Min5 => Some(5),
            Self::Min15 => Some(15),
            Self::Min30 => Some(30),
            Self::Min60 => Some(60),
        }
    }

    /// Returns true if this is a sub-daily frequency.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        !matches!(self, Self::Daily)
    }
}

impl fmt::Display for BarFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarFrequency {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "1min" => Ok(Self::Min1),
            "5min" => Ok(Self::Min5),
            "15min" => Ok(Self::Min15),
            "30min" => Ok(Self::Min30),
            "60min" => Ok(Self::Min60),
            other => Err(DataError::UnsupportedFrequency(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_tags() {
        for (tag, expected) in [
            ("daily", BarFrequency::Daily),
            ("1min", BarFrequency::Min1),
            ("5min", BarFrequency::Min5),
            ("15min", BarFrequency::Min15),
            ("30min", BarFrequency::Min30),
            ("60min", BarFrequency::Min60),
        ] {
            assert_eq!(tag.parse::<BarFrequency>().unwrap(), expected);
            assert_eq!(expected.to_string(), tag);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_tag() {
        let err = "3min".parse::<BarFrequency>().unwrap_err();
        match err {
            DataError::UnsupportedFrequency(tag) => assert_eq!(tag, "3min"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bar_minutes() {
        assert_eq!(BarFrequency::Daily.bar_minutes(), None);
        assert_eq!(BarFrequency::Min5.bar_minutes(), Some(5));
        assert_eq!(BarFrequency::Min60.bar_minutes(), Some(60));
        assert!(BarFrequency::Min1.is_intraday());
        assert!(!BarFrequency::Daily.is_intraday());
    }
}
