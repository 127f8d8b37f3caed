//! Release-train version resolution.
//!
//! Shopify versions its APIs by calendar quarter: a new version ships on the
//! first day of January, April, July and October and is named
//! `YYYY-MM` after that month.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The four quarter boundaries of the release train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quarter {
    January,
    April,
    July,
    October,
}

impl Quarter {
    /// Quarter containing a 0-indexed month (0 = January).
    ///
    /// Months above 11 are treated as December.
    pub fn from_month0(month0: u32) -> Self {
        match month0 {
            0..=2 => Quarter::January,
            3..=5 => Quarter::April,
            6..=8 => Quarter::July,
            _ => Quarter::October,
        }
    }

    /// 1-indexed month the quarter starts on.
    pub fn start_month(&self) -> u32 {
        match self {
            Quarter::January => 1,
            Quarter::April => 4,
            Quarter::July => 7,
            Quarter::October => 10,
        }
    }

    fn from_start_month(month: u32) -> Option<Self> {
        match month {
            1 => Some(Quarter::January),
            4 => Some(Quarter::April),
            7 => Some(Quarter::July),
            10 => Some(Quarter::October),
            _ => None,
        }
    }
}

/// An API version string such as `2024-04`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    year: i32,
    quarter: Quarter,
}

impl ApiVersion {
    pub fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    /// Version for a year and 0-indexed month.
    pub fn from_month0(year: i32, month0: u32) -> Self {
        Self::new(year, Quarter::from_month0(month0))
    }

    /// Version in effect on `date`.
    pub fn for_date<D: Datelike>(date: &D) -> Self {
        Self::from_month0(date.year(), date.month0())
    }

    /// Version in effect today, in UTC.
    pub fn current() -> Self {
        Self::for_date(&Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }

    /// First day of the quarter this version belongs to.
    pub fn release_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.quarter.start_month(), 1)
    }
}

/// Resolve the API version for a calendar date.
pub fn resolve<D: Datelike>(date: &D) -> ApiVersion {
    ApiVersion::for_date(date)
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.quarter.start_month())
    }
}

/// Rejected version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid api version {0:?}: expected YYYY-01, YYYY-04, YYYY-07 or YYYY-10")]
pub struct InvalidApiVersion(pub String);

impl FromStr for ApiVersion {
    type Err = InvalidApiVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidApiVersion(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let quarter = Quarter::from_start_month(month).ok_or_else(invalid)?;
        Ok(Self::new(year, quarter))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
